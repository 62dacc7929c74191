//! Strategy interface and fix outcomes

use std::fmt;

use serde::{Deserialize, Serialize};

use super::context::{FixContext, WriteOutcome};
use crate::detector::Cycle;
use crate::error::CycleBreakerError;
use crate::graph::ModuleGraph;

/// Built-in remediation strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    ImportType,
    DynamicImport,
    ExtractShared,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::ImportType => "import-type",
            StrategyKind::DynamicImport => "dynamic-import",
            StrategyKind::ExtractShared => "extract-shared",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pluggable remediation policy
///
/// `score` is only asked for when `can_fix` returned true and should be in
/// `0..=100`, higher preferred. `apply` must route every file mutation
/// through the context so dry runs and the per-run write ledger are honored.
pub trait FixStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    fn can_fix(&self, cycle: &Cycle, graph: &ModuleGraph) -> bool;

    fn score(&self, cycle: &Cycle, graph: &ModuleGraph) -> u8;

    fn apply(
        &self,
        cycle: &Cycle,
        graph: &ModuleGraph,
        ctx: &mut FixContext<'_>,
    ) -> Result<FixResult, CycleBreakerError>;
}

/// Terminal outcome of fixing one cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixResult {
    pub cycle: Cycle,
    pub strategy: Option<StrategyKind>,
    pub success: bool,
    pub modified_files: Vec<String>,
    pub created_files: Vec<String>,
    /// Files the strategy would touch; filled in dry runs
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub planned_files: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub manual_steps: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
}

impl FixResult {
    /// An unsuccessful result with nothing touched
    pub fn new(cycle: &Cycle, strategy: Option<StrategyKind>) -> Self {
        Self {
            cycle: cycle.clone(),
            strategy,
            success: false,
            modified_files: Vec::new(),
            created_files: Vec::new(),
            planned_files: Vec::new(),
            error: None,
            manual_steps: Vec::new(),
            score: None,
        }
    }

    pub fn with_manual_steps<I, S>(mut self, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.manual_steps = steps.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Record what a successful [`FixContext::write_all`] did
    pub fn with_writes(mut self, outcome: WriteOutcome) -> Self {
        self.success = true;
        self.modified_files = outcome.modified;
        self.created_files = outcome.created;
        self.planned_files = outcome.planned;
        self
    }

    /// Whether the orchestrator stops at this result: an automatic fix, or
    /// actionable manual guidance
    pub fn is_accepted(&self) -> bool {
        self.success || !self.manual_steps.is_empty()
    }

    /// Whether the strategy reported touching any file
    pub fn touched_files(&self) -> bool {
        !self.modified_files.is_empty() || !self.created_files.is_empty()
    }
}
