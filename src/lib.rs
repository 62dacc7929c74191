//! # Cycle Breaker - Find and Break Circular Imports
//!
//! Cycle Breaker builds a directed graph of source modules from parsed import
//! edges, finds every circular import chain with Tarjan's SCC algorithm and
//! either reports the cycles (with boundary rule violations) or hands each
//! one to a set of remediation strategies.
//!
//! ## Main Components
//!
//! - **Graph**: Module graph assembled from parsed modules
//! - **Detector**: Strongly connected components, one representative path and
//!   a stable id per cycle
//! - **Cache**: Content-hash keyed parse results persisted between runs
//! - **Policy**: Glob based boundary rules evaluated against cycles
//! - **Fixer**: Scored strategies with fallback to manual steps
//! - **Executors**: Detect and fix use cases wiring everything together
//!
//! Parsing is not part of this crate. Callers provide a [`parser::Parser`]
//! and a [`fs::FileSystem`] (usually [`fs::LocalFileSystem`]).
//!
//! ## Usage
//!
//! ```no_run
//! use cycle_breaker::common::ConfigBuilder;
//! use cycle_breaker::config::{DetectConfig, FixConfig};
//! use cycle_breaker::core::Module;
//! use cycle_breaker::error::CycleBreakerError;
//! use cycle_breaker::executors::{DetectExecutor, FixExecutor};
//! use cycle_breaker::fs::LocalFileSystem;
//! use cycle_breaker::parser::Parser;
//! use cycle_breaker::progress::ProgressReporter;
//!
//! struct MyParser;
//!
//! impl Parser for MyParser {
//!     fn parse(&self, path: &str, _content: &str) -> Result<Module, CycleBreakerError> {
//!         // extract import edges from the content here
//!         Ok(Module::new(path, Vec::new()))
//!     }
//!
//!     fn supports(&self, extension: &str) -> bool {
//!         matches!(extension, "ts" | "tsx")
//!     }
//! }
//!
//! # fn main() -> miette::Result<()> {
//! let fs = LocalFileSystem;
//! let progress = ProgressReporter::for_terminal();
//!
//! let detect = DetectConfig::builder()
//!     .with_root("/path/to/project")
//!     .build()?;
//!
//! let analysis = DetectExecutor::new(&fs, &MyParser).execute(&detect, progress.as_ref())?;
//! for cycle in &analysis.cycles {
//!     println!("{}: {}", cycle.id, cycle.paths.join(" → "));
//! }
//!
//! // Preview what the strategies would change
//! let fix = FixConfig::builder()
//!     .with_detect(detect)
//!     .with_dry_run(true)
//!     .build()?;
//! let report = FixExecutor::new(&fs, &MyParser).execute(&fix, None, progress.as_ref())?;
//! println!("{} fixable, {} need manual work", report.fixed, report.manual);
//! # Ok(())
//! # }
//! ```

// Private modules
mod constants;
mod utils;

// Public modules
pub mod analysis;
pub mod cache;
pub mod common;
pub mod config;
pub mod core;
pub mod detector;
pub mod error;
pub mod executors;
pub mod fixer;
pub mod fs;
pub mod graph;
pub mod parser;
pub mod policy;
pub mod progress;
