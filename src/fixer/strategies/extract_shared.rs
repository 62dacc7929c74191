use std::path::Path;

use crate::detector::Cycle;
use crate::error::CycleBreakerError;
use crate::fixer::{FixContext, FixResult, FixStrategy, StrategyKind};
use crate::graph::ModuleGraph;

const SCORE: u8 = 30;

/// Proposes moving the code the cycle members share into a new module
///
/// Never touches files; the outcome is a list of manual steps.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractSharedStrategy;

/// `shared-<cycle id>.<ext>` next to the first module of the cycle
fn proposed_module(cycle: &Cycle) -> String {
    let first = Path::new(cycle.paths.first().map(String::as_str).unwrap_or_default());
    let extension = first
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("ts");
    let name = format!("shared-{}.{extension}", cycle.id);

    match first.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            dir.join(name).to_string_lossy().replace('\\', "/")
        }
        _ => name,
    }
}

/// Identifiers imported along the cycle, first occurrence order
fn shared_identifiers(cycle: &Cycle) -> Vec<&str> {
    let mut identifiers: Vec<&str> = Vec::new();
    for name in cycle.edges.iter().flat_map(|edge| &edge.import_info.identifiers) {
        if !identifiers.contains(&name.as_str()) {
            identifiers.push(name);
        }
    }
    identifiers
}

impl FixStrategy for ExtractSharedStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ExtractShared
    }

    fn can_fix(&self, cycle: &Cycle, _graph: &ModuleGraph) -> bool {
        !cycle.is_self_loop()
    }

    fn score(&self, _cycle: &Cycle, _graph: &ModuleGraph) -> u8 {
        SCORE
    }

    fn apply(
        &self,
        cycle: &Cycle,
        _graph: &ModuleGraph,
        _ctx: &mut FixContext<'_>,
    ) -> Result<FixResult, CycleBreakerError> {
        let shared = proposed_module(cycle);
        let identifiers = shared_identifiers(cycle);

        let mut steps = vec![format!(
            "Create {shared} for the code shared by the {} modules of this cycle",
            cycle.len()
        )];

        if identifiers.is_empty() {
            steps.push(format!(
                "Move the declarations these modules import from each other into {shared}"
            ));
        } else {
            steps.push(format!("Move {} into {shared}", identifiers.join(", ")));
        }

        steps.extend(cycle.edges.iter().map(|edge| {
            format!(
                "Update {} (line {}) to import from {shared} instead of {}",
                edge.from, edge.import_info.line, edge.to
            )
        }));
        steps.push(format!(
            "Re-run cycle detection to confirm cycle {} is gone",
            cycle.id
        ));

        Ok(FixResult::new(cycle, Some(self.kind())).with_manual_steps(steps))
    }
}
