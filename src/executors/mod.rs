//! Use case executors that sequence the analysis pipeline
//!
//! [`DetectExecutor`] discovers, parses and analyzes a source tree.
//! [`FixExecutor`] runs a detection and then hands every cycle to the
//! strategy orchestrator, sharing one write ledger across the run.

pub mod detect;
pub mod fix;

pub use detect::{Analysis, DetectExecutor};
pub use fix::{FixExecutor, FixReport};
