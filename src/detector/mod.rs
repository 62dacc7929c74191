//! # Cycle Detection Module
//!
//! This module implements the algorithms for detecting circular imports in
//! the module graph.
//!
//! ## Algorithm
//!
//! We use Tarjan's Strongly Connected Components (SCC) algorithm to partition
//! the graph in O(V + E) time, where V is the number of modules and E the
//! number of resolved imports. Components with more than one module, and
//! modules importing themselves, are cycles. The DFS runs on an explicit
//! heap stack, so arbitrarily long import chains are handled.
//!
//! For each such component a second, stack-based DFS restricted to the
//! component stops at the first back-edge and yields one simple cyclic path.
//! Dense components therefore produce a single representative cycle rather
//! than every elementary cycle they contain.
//!
//! ## Key Components
//!
//! - **CycleDetector**: Main detector that finds cycles using Tarjan's
//!   algorithm
//! - **Cycle**: A closed path through the graph with a stable 8 character id
//! - **CycleEdge**: The import taken between two consecutive cycle members
//!
//! ## Example
//!
//! ```
//! use cycle_breaker::core::{ImportEdge, ImportKind, Module};
//! use cycle_breaker::detector::CycleDetector;
//! use cycle_breaker::graph::ModuleGraphBuilder;
//!
//! // a.ts -> b.ts -> a.ts
//! let mut builder = ModuleGraphBuilder::new().with_modules(vec![
//!     Module::new(
//!         "/repo/a.ts",
//!         vec![ImportEdge::new("./b", Some("/repo/b.ts"), 1, ImportKind::Static)],
//!     ),
//!     Module::new(
//!         "/repo/b.ts",
//!         vec![ImportEdge::new("./a", Some("/repo/a.ts"), 1, ImportKind::Static)],
//!     ),
//! ]);
//! let graph = builder.build(None);
//!
//! let mut detector = CycleDetector::new();
//! detector.detect_cycles(&graph, None);
//!
//! assert!(detector.has_cycles());
//! assert_eq!(detector.cycle_count(), 1);
//! assert_eq!(detector.cycles()[0].paths, vec!["/repo/a.ts", "/repo/b.ts", "/repo/a.ts"]);
//! ```

mod detector_impl;

pub use detector_impl::*;
