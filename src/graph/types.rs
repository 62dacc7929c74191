//! Core graph types
//!
//! This module contains the read-only module graph handed to the cycle
//! detector and the fix strategies.

use std::collections::BTreeMap;

use crate::core::{ImportEdge, Module};

/// Directed graph of modules keyed by absolute module path
///
/// Modules are kept in a sorted map so every traversal over the graph visits
/// nodes in the same order regardless of how files were discovered.
#[derive(Debug, Clone, Default)]
pub struct ModuleGraph {
    modules: BTreeMap<String, Module>,
}

impl ModuleGraph {
    /// Wrap a set of modules without filtering their imports
    ///
    /// Prefer [`ModuleGraphBuilder`](super::ModuleGraphBuilder), which drops
    /// imports that do not resolve to a discovered module.
    pub fn from_modules<I>(modules: I) -> Self
    where
        I: IntoIterator<Item = Module>,
    {
        Self {
            modules: modules
                .into_iter()
                .map(|module| (module.path.clone(), module))
                .collect(),
        }
    }

    pub fn get(&self, path: &str) -> Option<&Module> {
        self.modules.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.modules.contains_key(path)
    }

    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.values()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Number of imports that point at a module inside this graph
    pub fn edge_count(&self) -> usize {
        self.modules
            .values()
            .flat_map(|module| module.resolved_imports())
            .filter(|edge| self.edge_target(edge).is_some())
            .count()
    }

    /// Targets imported by `path`, in source order, skipping dangling edges
    pub fn successors<'a>(&'a self, path: &str) -> impl Iterator<Item = &'a str> + use<'a> {
        self.modules
            .get(path)
            .into_iter()
            .flat_map(|module| module.imports.iter())
            .filter_map(move |edge| self.edge_target(edge))
    }

    /// Modules in this graph importing `path`
    pub fn importers<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a Module> + 'a {
        self.modules
            .values()
            .filter(move |module| module.import_to(path).is_some())
    }

    fn edge_target<'a>(&'a self, edge: &ImportEdge) -> Option<&'a str> {
        let target = edge.resolved_path.as_deref()?;
        self.modules
            .get_key_value(target)
            .map(|(key, _)| key.as_str())
    }
}
