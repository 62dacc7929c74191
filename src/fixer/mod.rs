//! # Fix Orchestration
//!
//! Each detected cycle is handed to a [`FixOrchestrator`], which asks every
//! registered [`FixStrategy`] whether it can act, tries the applicable ones
//! by descending score and keeps the first result that fixed the cycle or
//! produced manual guidance. Strategies never touch the file system
//! directly: all writes go through a [`FixContext`], which enforces dry runs
//! and refuses to modify a file twice in one run.
//!
//! ## Example
//!
//! ```
//! use cycle_breaker::fixer::{FixOrchestrator, default_strategies};
//!
//! let strategies = default_strategies();
//! let orchestrator = FixOrchestrator::new(&strategies);
//! # let _ = orchestrator;
//! ```

mod context;
mod orchestrator;
mod strategies;
mod types;

pub use context::{FileWrite, FixContext, WriteOutcome};
pub use orchestrator::FixOrchestrator;
pub use strategies::{
    DynamicImportStrategy, ExtractSharedStrategy, ImportTypeStrategy, default_strategies,
};
pub use types::{FixResult, FixStrategy, StrategyKind};
