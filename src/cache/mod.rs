//! # Analysis Cache
//!
//! Remembers parsed modules between runs, keyed by module path and validated
//! by a SHA-256 hash of the file content. A module is reused only when the
//! freshly computed hash equals the stored one.
//!
//! The cache is an explicit per-run value: the detect use case opens it,
//! threads it through the parse stage and saves it at the end. Corrupt or
//! unreadable cache files degrade to a cold run.

mod analysis_cache;
mod store;

pub use analysis_cache::{AnalysisCache, CacheEntry, CacheState, CacheStats, hash_content};
pub use store::{CacheStore, FileCacheStore, MemoryCacheStore};
