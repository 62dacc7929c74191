//! Core type definitions
//!
//! This module contains the basic data structures used throughout the
//! library, with minimal logic - focusing on data representation.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::discovery::TYPESCRIPT_EXTENSIONS;

/// How an import was written in the source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportKind {
    Static,
    Dynamic,
    Require,
    ExportFrom,
}

impl fmt::Display for ImportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportKind::Static => write!(f, "static"),
            ImportKind::Dynamic => write!(f, "dynamic"),
            ImportKind::Require => write!(f, "require"),
            ImportKind::ExportFrom => write!(f, "export-from"),
        }
    }
}

/// A single import statement discovered in a module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportEdge {
    /// Raw specifier as written, e.g. `./user` or `react`
    pub source: String,
    /// Absolute module path, `None` for packages and unresolvable specifiers
    pub resolved_path: Option<String>,
    /// 1-based line number of the statement
    pub line: usize,
    pub kind: ImportKind,
    pub identifiers: Vec<String>,
}

impl ImportEdge {
    pub fn new(source: &str, resolved_path: Option<&str>, line: usize, kind: ImportKind) -> Self {
        Self {
            source: source.to_string(),
            resolved_path: resolved_path.map(str::to_string),
            line,
            kind,
            identifiers: Vec::new(),
        }
    }

    pub fn with_identifiers<I, S>(mut self, identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.identifiers = identifiers.into_iter().map(Into::into).collect();
        self
    }

    pub fn points_to(&self, target: &str) -> bool {
        self.resolved_path.as_deref() == Some(target)
    }
}

/// A parsed source file, keyed by its absolute normalized path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub path: String,
    pub imports: Vec<ImportEdge>,
    pub extension: String,
    pub is_typescript: bool,
}

impl Module {
    /// Create a module, deriving the extension and TypeScript flag from the
    /// path
    pub fn new(path: &str, imports: Vec<ImportEdge>) -> Self {
        let extension = Path::new(path)
            .extension()
            .map(|ext| ext.to_string_lossy().to_string())
            .unwrap_or_default();
        let is_typescript = TYPESCRIPT_EXTENSIONS.contains(&extension.as_str());

        Self {
            path: path.to_string(),
            imports,
            extension,
            is_typescript,
        }
    }

    /// Imports that resolved to a module path, in source order
    pub fn resolved_imports(&self) -> impl Iterator<Item = &ImportEdge> {
        self.imports.iter().filter(|edge| edge.resolved_path.is_some())
    }

    /// First import (in source order) that targets the given module
    pub fn import_to(&self, target: &str) -> Option<&ImportEdge> {
        self.imports.iter().find(|edge| edge.points_to(target))
    }

    pub fn has_self_import(&self) -> bool {
        self.import_to(&self.path).is_some()
    }
}
