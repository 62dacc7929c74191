//! Result of a detection run, as handed to reporters

use std::time::Duration;

use serde::Serialize;

use crate::detector::Cycle;
use crate::policy::PolicyViolation;

/// Counters collected while analyzing a source tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetrics {
    pub files_discovered: usize,
    /// Files run through the parser this time; cache hits are not included
    pub files_parsed: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,
    pub parse_failures: usize,
    pub edges: usize,
    pub detection_ms: u128,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub cycles: Vec<Cycle>,
    pub total_modules: usize,
    /// Distinct modules participating in at least one cycle
    pub affected_modules: usize,
    #[serde(serialize_with = "serialize_millis")]
    pub duration: Duration,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub metrics: AnalysisMetrics,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<PolicyViolation>,
    /// Set when some files could not be read or parsed
    pub is_partial: bool,
}

impl AnalysisResult {
    pub fn has_cycles(&self) -> bool {
        !self.cycles.is_empty()
    }

    pub fn cycle(&self, id: &str) -> Option<&Cycle> {
        self.cycles.iter().find(|cycle| cycle.id == id)
    }
}

fn serialize_millis<S: serde::Serializer>(duration: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u128(duration.as_millis())
}
