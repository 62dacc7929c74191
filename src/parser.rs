//! Source parser capability
//!
//! Turning file content into import edges is left to the embedding
//! application. A parser must report each import with its resolved absolute
//! path (or `None` when the specifier names a package or cannot be resolved).

use crate::core::Module;
use crate::error::CycleBreakerError;

pub trait Parser: Send + Sync {
    /// Parse `content` read from `path` into a module
    ///
    /// Errors are recorded as warnings by the caller and the file is left out
    /// of the graph.
    fn parse(&self, path: &str, content: &str) -> Result<Module, CycleBreakerError>;

    /// Whether files with this extension (without the dot) can be parsed
    fn supports(&self, extension: &str) -> bool;
}
