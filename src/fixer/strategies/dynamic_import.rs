use super::rewrite_line;
use crate::core::ImportKind;
use crate::detector::{Cycle, CycleEdge};
use crate::error::CycleBreakerError;
use crate::fixer::{FileWrite, FixContext, FixResult, FixStrategy, StrategyKind};
use crate::graph::ModuleGraph;

const SCORE: u8 = 50;

/// Replaces one static import of the cycle with a lazily evaluated
/// `import()`, deferring the dependency to runtime
#[derive(Debug, Clone, Copy, Default)]
pub struct DynamicImportStrategy;

fn importers_in_cycle(cycle: &Cycle, graph: &ModuleGraph, path: &str) -> usize {
    graph
        .importers(path)
        .filter(|module| cycle.contains(&module.path))
        .count()
}

/// The static edge whose importing module is least depended upon inside the
/// cycle; the first such edge on ties
fn edge_to_defer<'c>(cycle: &'c Cycle, graph: &ModuleGraph) -> Option<&'c CycleEdge> {
    cycle
        .edges
        .iter()
        .filter(|edge| edge.import_info.kind == ImportKind::Static)
        .min_by_key(|edge| importers_in_cycle(cycle, graph, &edge.from))
}

/// `./user-service.ts` becomes `loadUserService`
fn loader_name(specifier: &str) -> String {
    let last = specifier.rsplit('/').next().unwrap_or(specifier);
    let stem = last.split('.').next().unwrap_or(last);

    let pascal: String = stem
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars
                .next()
                .map(|first| first.to_ascii_uppercase().to_string() + chars.as_str())
                .unwrap_or_default()
        })
        .collect();

    if pascal.is_empty() {
        "loadModule".to_string()
    } else {
        format!("load{pascal}")
    }
}

fn comment_out(line: &str, specifier: &str) -> Option<String> {
    let trimmed = line.trim_start();
    let multiline = trimmed.contains('{') && !trimmed.contains('}');
    let names_specifier = ['\'', '"']
        .iter()
        .any(|quote| trimmed.contains(&format!("{quote}{specifier}{quote}")));
    if !trimmed.starts_with("import ") || multiline || !names_specifier {
        return None;
    }

    let indent = &line[..line.len() - trimmed.len()];
    Some(format!("{indent}// {trimmed}"))
}

impl FixStrategy for DynamicImportStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::DynamicImport
    }

    fn can_fix(&self, cycle: &Cycle, _graph: &ModuleGraph) -> bool {
        cycle
            .edges
            .iter()
            .any(|edge| edge.import_info.kind == ImportKind::Static)
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
        let Some(edge) = edge_to_defer(cycle, graph) else {
            return Ok(result.with_error("cycle has no static import"));
        };

        let import = &edge.import_info;
        let content = ctx.read(&edge.from)?;
        let Some(mut rewritten) =
            rewrite_line(&content, import.line, |line| comment_out(line, &import.source))
        else {
            return Ok(result.with_error(format!(
                "line {} of {} is not a single-line import of '{}'",
                import.line, edge.from, import.source
            )));
        };

        let loader = loader_name(&import.source);
        if !rewritten.is_empty() && !rewritten.ends_with('\n') {
            rewritten.push('\n');
        }
        rewritten.push_str(&format!(
            "\nasync function {loader}() {{\n  return import('{}');\n}}\n",
            import.source
        ));

        let outcome = ctx.write_all(&[FileWrite::new(edge.from.as_str(), rewritten)])?;
        tracing::debug!(path = %edge.from, specifier = %import.source, "deferred static import");

        let usage = if import.identifiers.is_empty() {
            format!(
                "Update code in {} that relied on '{}' to call `await {loader}()`",
                edge.from, import.source
            )
        } else {
            format!(
                "Replace uses of {} in {} with `(await {loader}()).<name>`",
                import.identifiers.join(", "),
                edge.from
            )
        };

        Ok(result.with_writes(outcome).with_manual_steps([
            usage,
            format!("Make the call sites in {} async where needed", edge.from),
            "Re-run cycle detection to confirm the cycle is broken".to_string(),
        ]))
    }
}
