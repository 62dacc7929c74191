use super::context::FixContext;
use super::types::{FixResult, FixStrategy, StrategyKind};
use crate::constants::fix::{MANUAL_INTERVENTION_STEP, MANUAL_REVIEW_STEP};
use crate::detector::Cycle;
use crate::error::CycleBreakerError;
use crate::graph::ModuleGraph;

/// Picks and runs remediation strategies for one cycle at a time
///
/// Strategies are consulted in registration order; candidates are tried by
/// descending score, ties keeping registration order. The first result that
/// either fixed the cycle or carries manual steps is returned.
pub struct FixOrchestrator<'s> {
    strategies: &'s [Box<dyn FixStrategy>],
    allowed: Option<&'s [StrategyKind]>,
}

struct Candidate<'s> {
    strategy: &'s dyn FixStrategy,
    score: u8,
}

impl<'s> FixOrchestrator<'s> {
    pub fn new(strategies: &'s [Box<dyn FixStrategy>]) -> Self {
        Self {
            strategies,
            allowed: None,
        }
    }

    /// Only consider strategies of these kinds
    pub fn with_allowed(mut self, allowed: Option<&'s [StrategyKind]>) -> Self {
        self.allowed = allowed;
        self
    }

    fn is_allowed(&self, kind: StrategyKind) -> bool {
        self.allowed.is_none_or(|allowed| allowed.contains(&kind))
    }

    fn candidates(&self, cycle: &Cycle, graph: &ModuleGraph) -> Vec<Candidate<'s>> {
        let mut candidates: Vec<Candidate<'s>> = self
            .strategies
            .iter()
            .map(|strategy| strategy.as_ref())
            .filter(|strategy| self.is_allowed(strategy.kind()))
            .filter(|strategy| strategy.can_fix(cycle, graph))
            .map(|strategy| Candidate {
                strategy,
                score: strategy.score(cycle, graph).min(100),
            })
            .collect();

        // stable: equal scores keep registration order
        candidates.sort_by(|a, b| b.score.cmp(&a.score));
        candidates
    }

    /// Produce the terminal result for `cycle`
    pub fn fix_cycle(
        &self,
        cycle: &Cycle,
        graph: &ModuleGraph,
        ctx: &mut FixContext<'_>,
    ) -> FixResult {
        let candidates = self.candidates(cycle, graph);

        if candidates.is_empty() {
            tracing::debug!(cycle = %cycle.id, "no strategy can fix cycle");
            return FixResult::new(cycle, None).with_manual_steps([MANUAL_REVIEW_STEP]);
        }

        let first_attempted = candidates[0].strategy.kind();
        let mut last_error = None;
        // Files a failed strategy changed and could not restore
        let mut left_modified: Vec<String> = Vec::new();

        for Candidate { strategy, score } in candidates {
            let kind = strategy.kind();
            tracing::debug!(cycle = %cycle.id, strategy = %kind, score, "trying strategy");

            let mut result = match strategy.apply(cycle, graph, ctx) {
                Ok(result) => result,
                Err(e) => {
                    tracing::warn!(cycle = %cycle.id, strategy = %kind, error = %e, "strategy failed");
                    if let CycleBreakerError::PartialWrite { unrestored, .. } = &e {
                        left_modified.extend(unrestored.iter().cloned());
                    }
                    last_error = Some(e.to_string());
                    continue;
                }
            };

            if ctx.is_dry_run() && result.touched_files() {
                let path = result
                    .modified_files
                    .iter()
                    .chain(&result.created_files)
                    .next()
                    .cloned()
                    .unwrap_or_default();
                let e = CycleBreakerError::DryRunViolation { path };
                tracing::warn!(cycle = %cycle.id, strategy = %kind, error = %e, "strategy ignored dry run");
                last_error = Some(e.to_string());
                continue;
            }

            if result.is_accepted() {
                result.strategy = Some(kind);
                result.score = Some(score);
                result.modified_files.extend(left_modified);
                return result;
            }

            tracing::debug!(
                cycle = %cycle.id,
                strategy = %kind,
                reason = result.error.as_deref().unwrap_or("declined"),
                "strategy did not fix cycle"
            );
            if result.error.is_some() {
                last_error = result.error;
            }
        }

        let mut result = FixResult::new(cycle, Some(first_attempted))
            .with_manual_steps([MANUAL_INTERVENTION_STEP]);
        result.error = last_error;
        result.modified_files = left_modified;
        result
    }
}
