//! # Configuration Module
//!
//! Run configurations for the detect and fix use cases, built with `with_*`
//! builders implementing [`ConfigBuilder`](crate::common::ConfigBuilder),
//! plus loading of boundary rules from TOML policy files.
//!
//! ## Example
//!
//! ```
//! use cycle_breaker::common::ConfigBuilder;
//! use cycle_breaker::config::{DetectConfig, FixConfig, PolicyFile};
//! use cycle_breaker::fixer::StrategyKind;
//!
//! let policy = PolicyFile::parse_str(
//!     "policy.toml",
//!     r#"
//! [[rules]]
//! name = "domain-is-pure"
//! from = "src/domain/**"
//! to = "src/infrastructure/**"
//! severity = "error"
//! "#,
//! )?;
//!
//! let detect = DetectConfig::builder()
//!     .with_root("/path/to/project")
//!     .with_rules(policy.rules)
//!     .build()?;
//!
//! let fix = FixConfig::builder()
//!     .with_detect(detect)
//!     .with_dry_run(true)
//!     .with_allowed_strategies(Some(vec![StrategyKind::ImportType]))
//!     .build()?;
//!
//! assert!(fix.dry_run);
//! # Ok::<(), cycle_breaker::error::CycleBreakerError>(())
//! ```

pub mod detect;
pub mod fix;
pub mod policy;

pub use detect::{DetectConfig, DetectConfigBuilder};
pub use fix::{FixConfig, FixConfigBuilder};
pub use policy::PolicyFile;
