use std::path::{Path, PathBuf};

use serde::Serialize;

use super::rules::{CompiledRule, PolicyRule, Severity};
use crate::analysis::AnalysisResult;
use crate::detector::Cycle;
use crate::error::CycleBreakerError;
use crate::fixer::StrategyKind;

/// A cycle edge crossing a configured boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyViolation {
    pub rule: String,
    pub severity: Severity,
    pub from: String,
    pub to: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_strategies: Option<Vec<StrategyKind>>,
}

/// Evaluates boundary rules against the edges of detected cycles
///
/// Rules are compiled once at construction; an invalid pattern is a
/// configuration error reported there, so evaluation itself cannot fail.
#[derive(Debug, Clone)]
pub struct PolicyEnforcer {
    root: PathBuf,
    rules: Vec<CompiledRule>,
}

impl PolicyEnforcer {
    pub fn new(root: impl Into<PathBuf>, rules: Vec<PolicyRule>) -> Result<Self, CycleBreakerError> {
        let rules = rules
            .into_iter()
            .map(CompiledRule::compile)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            root: root.into(),
            rules,
        })
    }

    /// An enforcer with no rules never reports anything
    pub fn empty(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            rules: Vec::new(),
        }
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn evaluate(&self, result: &AnalysisResult) -> Vec<PolicyViolation> {
        self.evaluate_cycles(&result.cycles)
    }

    /// One violation per (edge, matching rule), in cycle, edge and rule order
    pub fn evaluate_cycles(&self, cycles: &[Cycle]) -> Vec<PolicyViolation> {
        if self.rules.is_empty() {
            return Vec::new();
        }

        let mut violations = Vec::new();
        for cycle in cycles {
            for edge in &cycle.edges {
                let from = relative_to(&self.root, &edge.from);
                let to = relative_to(&self.root, &edge.to);

                for compiled in self.rules.iter().filter(|r| r.matches(&from, &to)) {
                    let rule = &compiled.rule;
                    violations.push(PolicyViolation {
                        rule: rule.name.clone(),
                        severity: rule.severity,
                        message: format!(
                            "'{from}' imports '{to}', which violates boundary rule '{}'",
                            rule.name
                        ),
                        from: from.clone(),
                        to: to.clone(),
                        description: rule.description.clone(),
                        cycle_id: Some(cycle.id.clone()),
                        recommended_strategies: rule.recommended_strategies.clone(),
                    });
                }
            }
        }

        violations
    }
}

/// Whether any violation is an error
pub fn has_errors(violations: &[PolicyViolation]) -> bool {
    violations.iter().any(|v| v.severity == Severity::Error)
}

/// Express `path` relative to `root` with `/` separators
///
/// Paths outside the root are returned unchanged apart from separator
/// normalization.
pub fn relative_to(root: &Path, path: &str) -> String {
    let relative = Path::new(path)
        .strip_prefix(root)
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| path.to_string());

    relative.replace('\\', "/")
}
