use super::rewrite_line;
use crate::core::ImportKind;
use crate::detector::{Cycle, CycleEdge};
use crate::error::CycleBreakerError;
use crate::fixer::{FileWrite, FixContext, FixResult, FixStrategy, StrategyKind};
use crate::graph::ModuleGraph;

const SCORE: u8 = 80;

/// Turns a TypeScript import that only brings in types into `import type`,
/// which is erased at compile time and no longer creates a runtime edge
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportTypeStrategy;

/// PascalCase names and `I`-prefixed interface names
fn looks_like_type(name: &str) -> bool {
    let mut chars = name.chars();
    let (Some(first), second) = (chars.next(), chars.next()) else {
        return false;
    };

    if !first.is_ascii_uppercase() || !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return false;
    }

    let interface_prefix = first == 'I' && second.is_some_and(|c| c.is_ascii_uppercase());
    interface_prefix || name.chars().any(|c| c.is_ascii_lowercase())
}

fn type_only_edge<'c>(cycle: &'c Cycle, graph: &ModuleGraph) -> Option<&'c CycleEdge> {
    cycle.edges.iter().find(|edge| {
        let import = &edge.import_info;
        import.kind == ImportKind::Static
            && !import.identifiers.is_empty()
            && import.identifiers.iter().all(|name| looks_like_type(name))
            && graph.get(&edge.from).is_some_and(|module| module.is_typescript)
    })
}

fn to_type_import(line: &str) -> Option<String> {
    if line.contains("import type") || !line.contains("import {") {
        return None;
    }
    Some(line.replacen("import {", "import type {", 1))
}

impl FixStrategy for ImportTypeStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ImportType
    }

    fn can_fix(&self, cycle: &Cycle, graph: &ModuleGraph) -> bool {
        type_only_edge(cycle, graph).is_some()
    }

    fn score(&self, _cycle: &Cycle, _graph: &ModuleGraph) -> u8 {
        SCORE
    }

    fn apply(
        &self,
        cycle: &Cycle,
        graph: &ModuleGraph,
        ctx: &mut FixContext<'_>,
    ) -> Result<FixResult, CycleBreakerError> {
        let result = FixResult::new(cycle, Some(self.kind()));
        let Some(edge) = type_only_edge(cycle, graph) else {
            return Ok(result.with_error("cycle has no type-only import"));
        };

        let content = ctx.read(&edge.from)?;
        let line = edge.import_info.line;
        let Some(rewritten) = rewrite_line(&content, line, to_type_import) else {
            return Ok(result.with_error(format!(
                "line {line} of {} is not a named value import",
                edge.from
            )));
        };

        let outcome = ctx.write_all(&[FileWrite::new(edge.from.as_str(), rewritten)])?;
        tracing::debug!(path = %edge.from, line, "converted import to type-only import");
        Ok(result.with_writes(outcome))
    }
}
