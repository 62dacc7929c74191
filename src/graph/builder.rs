use std::collections::{BTreeMap, HashSet};

use super::types::ModuleGraph;
use crate::core::Module;
use crate::progress::ProgressReporter;

/// Builder for constructing module graphs
///
/// Collects parsed modules, then drops every import whose resolved path is
/// missing or points outside the discovered module set so the resulting
/// graph never contains dangling edges.
#[derive(Debug, Default)]
pub struct ModuleGraphBuilder {
    modules: BTreeMap<String, Module>,
    dropped_edges: usize,
}

impl ModuleGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module, replacing any earlier module with the same path
    pub fn add_module(&mut self, module: Module) -> &mut Self {
        self.modules.insert(module.path.clone(), module);
        self
    }

    pub fn with_modules<I>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = Module>,
    {
        for module in modules {
            self.add_module(module);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Imports removed by the last [`build`](Self::build)
    pub fn dropped_edges(&self) -> usize {
        self.dropped_edges
    }

    /// Assemble the graph
    pub fn build(&mut self, progress: Option<&ProgressReporter>) -> ModuleGraph {
        let known: HashSet<String> = self.modules.keys().cloned().collect();
        let mut dropped = 0;

        let modules: Vec<Module> = self
            .modules
            .values()
            .map(|module| {
                if let Some(p) = progress {
                    p.assembling_module(&module.path);
                }

                let mut filtered = module.clone();
                let before = filtered.imports.len();
                filtered.imports.retain(|edge| {
                    edge.resolved_path
                        .as_ref()
                        .is_some_and(|target| known.contains(target))
                });
                dropped += before - filtered.imports.len();
                filtered
            })
            .collect();

        self.dropped_edges = dropped;
        tracing::debug!(
            modules = modules.len(),
            dropped_edges = dropped,
            "assembled module graph"
        );

        ModuleGraph::from_modules(modules)
    }
}
