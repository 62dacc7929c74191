//! # Module Graph
//!
//! This module provides the in-memory directed graph of source modules that
//! the cycle detector walks, plus the builder that assembles it from parsed
//! modules.
//!
//! ## Components
//!
//! - **ModuleGraph**: Read-only mapping from module path to [`Module`]
//! - **ModuleGraphBuilder**: Assembles a graph and drops imports that do not
//!   resolve to a discovered module
//!
//! ## Example
//!
//! ```
//! use cycle_breaker::core::{ImportEdge, ImportKind, Module};
//! use cycle_breaker::graph::ModuleGraphBuilder;
//!
//! let mut builder = ModuleGraphBuilder::new().with_modules(vec![
//!     Module::new(
//!         "/repo/src/app.ts",
//!         vec![
//!             ImportEdge::new("./db", Some("/repo/src/db.ts"), 1, ImportKind::Static),
//!             ImportEdge::new("express", None, 2, ImportKind::Static),
//!         ],
//!     ),
//!     Module::new("/repo/src/db.ts", vec![]),
//! ]);
//!
//! let graph = builder.build(None);
//! assert_eq!(graph.len(), 2);
//! assert_eq!(graph.edge_count(), 1);
//! ```
//!
//! [`Module`]: crate::core::Module

mod builder;
mod types;

pub use builder::ModuleGraphBuilder;
pub use types::ModuleGraph;
