//! Detect run configuration

use std::path::{Path, PathBuf};

use crate::common::{ConfigBuilder, required};
use crate::constants::cache::{DEFAULT_DIR, FILE_NAME};
use crate::constants::discovery::{DEFAULT_EXCLUDE, DEFAULT_INCLUDE};
use crate::error::CycleBreakerError;
use crate::policy::{CompiledRule, PolicyRule};

/// Configuration for a detection run
///
/// Boundary rules are compiled while building, so an invalid glob is reported
/// here rather than during evaluation.
#[derive(Debug, Clone)]
pub struct DetectConfig {
    /// Root of the source tree; policy patterns are relative to it
    pub root: PathBuf,
    /// Glob patterns selecting source files
    pub include: Vec<String>,
    /// Glob patterns removing files from the selection
    pub exclude: Vec<String>,
    /// Accepted for API symmetry; cycle detection is not depth limited
    pub max_depth: Option<usize>,
    /// Reuse parse results of unchanged files between runs
    pub use_cache: bool,
    /// Directory holding the analysis cache
    pub cache_dir: PathBuf,
    /// Boundary rules evaluated against detected cycles
    pub rules: Vec<PolicyRule>,
}

impl DetectConfig {
    pub fn builder() -> DetectConfigBuilder {
        DetectConfigBuilder::new()
    }

    /// Path of the cache file inside [`cache_dir`](Self::cache_dir)
    pub fn cache_file(&self) -> PathBuf {
        self.cache_dir.join(FILE_NAME)
    }
}

#[derive(Default)]
pub struct DetectConfigBuilder {
    root: Option<PathBuf>,
    include: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
    max_depth: Option<usize>,
    use_cache: Option<bool>,
    cache_dir: Option<PathBuf>,
    rules: Vec<PolicyRule>,
}

impl DetectConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn with_include(mut self, include: Vec<String>) -> Self {
        self.include = Some(include);
        self
    }

    pub fn with_exclude(mut self, exclude: Vec<String>) -> Self {
        self.exclude = Some(exclude);
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_use_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = Some(use_cache);
        self
    }

    /// Cache directory; relative paths are resolved against the root
    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(cache_dir.into());
        self
    }

    pub fn with_rules(mut self, rules: Vec<PolicyRule>) -> Self {
        self.rules = rules;
        self
    }
}

fn defaults(patterns: &[&str]) -> Vec<String> {
    patterns.iter().map(|p| p.to_string()).collect()
}

fn resolve(root: &Path, dir: PathBuf) -> PathBuf {
    if dir.is_absolute() { dir } else { root.join(dir) }
}

impl ConfigBuilder for DetectConfigBuilder {
    type Config = DetectConfig;

    fn build(self) -> Result<Self::Config, CycleBreakerError> {
        let root = required(self.root, "root")?;

        let include = self.include.unwrap_or_else(|| defaults(DEFAULT_INCLUDE));
        if include.is_empty() {
            return Err(CycleBreakerError::ConfigurationError {
                message: "At least one include pattern is required".to_string(),
            });
        }

        for rule in &self.rules {
            CompiledRule::compile(rule.clone())?;
        }

        Ok(DetectConfig {
            cache_dir: resolve(&root, self.cache_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_DIR))),
            root,
            include,
            exclude: self.exclude.unwrap_or_else(|| defaults(DEFAULT_EXCLUDE)),
            max_depth: self.max_depth,
            use_cache: self.use_cache.unwrap_or(true),
            rules: self.rules,
        })
    }
}
