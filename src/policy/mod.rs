//! # Dependency Policy
//!
//! Boundary rules describe imports that must not exist, e.g. domain code
//! reaching into infrastructure. The enforcer checks every edge of every
//! detected cycle against the configured rules; a rule fires when both its
//! `from` and `to` globs match the edge endpoints (relative to the analysis
//! root).
//!
//! ## Example
//!
//! ```
//! use cycle_breaker::policy::{PolicyEnforcer, PolicyRule, Severity};
//!
//! let enforcer = PolicyEnforcer::new(
//!     "/repo",
//!     vec![PolicyRule::new(
//!         "domain-is-pure",
//!         "src/domain/**",
//!         "src/infrastructure/**",
//!         Severity::Error,
//!     )],
//! )
//! .unwrap();
//!
//! assert!(enforcer.evaluate_cycles(&[]).is_empty());
//! ```

mod enforcer;
mod rules;

pub use enforcer::{PolicyEnforcer, PolicyViolation, has_errors, relative_to};
pub use rules::{CompiledRule, PolicyRule, Severity, compile_pattern};
