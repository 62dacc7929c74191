use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::store::CacheStore;
use crate::constants::cache::FORMAT_VERSION;
use crate::core::Module;
use crate::error::CycleBreakerError;

/// Parsed module remembered together with the hash of the content it came
/// from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub content_hash: String,
    pub module: Module,
}

/// Everything persisted between runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheState {
    pub version: u32,
    pub entries: BTreeMap<String, CacheEntry>,
}

impl Default for CacheState {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            entries: BTreeMap::new(),
        }
    }
}

impl CacheState {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stored hash for a path
    pub fn hash_of(&self, path: &str) -> Option<&str> {
        self.entries
            .get(path)
            .map(|entry| entry.content_hash.as_str())
    }
}

/// Cache statistics for a single run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub entries: usize,
    pub hits: usize,
    pub misses: usize,
}

/// Content-hash keyed cache of parsed modules
///
/// One value lives for one analysis run. The state loaded at construction is
/// only read from; entries recorded during the run form a fresh state that
/// [`save`](Self::save) persists as a whole, so files that disappeared since
/// the previous run are dropped without an explicit eviction pass.
pub struct AnalysisCache {
    store: Box<dyn CacheStore>,
    previous: CacheState,
    next: CacheState,
    hits: usize,
    misses: usize,
}

impl AnalysisCache {
    /// Open a cache backed by `store`, loading its previous state
    pub fn open(store: Box<dyn CacheStore>) -> Self {
        let mut cache = Self {
            store,
            previous: CacheState::default(),
            next: CacheState::default(),
            hits: 0,
            misses: 0,
        };
        cache.previous = cache.load();
        cache
    }

    /// Read the persisted state
    ///
    /// A missing, unreadable, corrupt or outdated cache yields an empty state.
    pub fn load(&self) -> CacheState {
        let contents = match self.store.read() {
            Ok(Some(contents)) => contents,
            Ok(None) => return CacheState::default(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read analysis cache, starting cold");
                return CacheState::default();
            }
        };

        match serde_json::from_str::<CacheState>(&contents) {
            Ok(state) if state.version == FORMAT_VERSION => state,
            Ok(state) => {
                tracing::debug!(
                    found = state.version,
                    expected = FORMAT_VERSION,
                    "discarding analysis cache with another format version"
                );
                CacheState::default()
            }
            Err(e) => {
                tracing::warn!(error = %e, "analysis cache is corrupt, starting cold");
                CacheState::default()
            }
        }
    }

    /// Persist `state`, replacing whatever the store held
    pub fn save_state(&self, state: &CacheState) -> Result<(), CycleBreakerError> {
        let contents = serde_json::to_string(state)?;
        self.store.write(&contents)?;
        Ok(())
    }

    /// Persist the entries recorded during this run
    pub fn save(&self) -> Result<(), CycleBreakerError> {
        self.save_state(&self.next)
    }

    /// Return the cached module for `path` if its stored hash equals
    /// `content_hash`, carrying the entry over to the next state
    pub fn lookup(&mut self, path: &str, content_hash: &str) -> Option<Module> {
        match self.previous.entries.get(path) {
            Some(entry) if entry.content_hash == content_hash => {
                self.hits += 1;
                self.next.entries.insert(path.to_string(), entry.clone());
                Some(entry.module.clone())
            }
            _ => {
                self.misses += 1;
                None
            }
        }
    }

    /// Record a freshly parsed module
    pub fn insert(&mut self, path: &str, content_hash: &str, module: Module) {
        self.next.entries.insert(
            path.to_string(),
            CacheEntry {
                content_hash: content_hash.to_string(),
                module,
            },
        );
    }

    /// Drop pending entries whose path is not in `live_paths`
    pub fn retain_paths<'a, I>(&mut self, live_paths: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let live: std::collections::BTreeSet<&str> = live_paths.into_iter().collect();
        self.next
            .entries
            .retain(|path, _| live.contains(path.as_str()));
    }

    /// State loaded at the start of the run
    pub fn previous(&self) -> &CacheState {
        &self.previous
    }

    /// State that [`save`](Self::save) will persist
    pub fn pending(&self) -> &CacheState {
        &self.next
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.next.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }
}

/// Deterministic SHA-256 digest of file content, hex encoded
pub fn hash_content(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::store::MemoryCacheStore;
    use crate::core::{ImportEdge, ImportKind};

    fn sample_module(path: &str) -> Module {
        Module::new(
            path,
            vec![ImportEdge::new("./b", Some("/repo/b.ts"), 1, ImportKind::Static)
                .with_identifiers(["User"])],
        )
    }

    #[test]
    fn test_hash_content_is_deterministic() {
        assert_eq!(hash_content("export {}"), hash_content("export {}"));
        assert_ne!(hash_content("export {}"), hash_content("export { a }"));
        assert_eq!(hash_content("").len(), 64);
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let mut cache = AnalysisCache::open(Box::new(MemoryCacheStore::new()));
        cache.insert("/repo/a.ts", &hash_content("a"), sample_module("/repo/a.ts"));
        cache.save().unwrap();

        let state = cache.load();
        assert_eq!(&state, cache.pending());
        assert_eq!(state.hash_of("/repo/a.ts"), Some(hash_content("a").as_str()));
        assert_eq!(state.entries["/repo/a.ts"].module, sample_module("/repo/a.ts"));
    }

    #[test]
    fn test_lookup_hit_and_miss() {
        let mut state = CacheState::default();
        state.entries.insert(
            "/repo/a.ts".to_string(),
            CacheEntry {
                content_hash: hash_content("old"),
                module: sample_module("/repo/a.ts"),
            },
        );
        let store = MemoryCacheStore::with_contents(&serde_json::to_string(&state).unwrap());
        let mut cache = AnalysisCache::open(Box::new(store));

        assert_eq!(
            cache.lookup("/repo/a.ts", &hash_content("old")),
            Some(sample_module("/repo/a.ts"))
        );
        assert_eq!(cache.lookup("/repo/a.ts", &hash_content("new")), None);
        assert_eq!(cache.lookup("/repo/other.ts", &hash_content("old")), None);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn test_entries_not_seen_this_run_are_not_persisted() {
        let mut state = CacheState::default();
        for path in ["/repo/a.ts", "/repo/deleted.ts"] {
            state.entries.insert(
                path.to_string(),
                CacheEntry {
                    content_hash: hash_content(path),
                    module: sample_module(path),
                },
            );
        }
        let store = MemoryCacheStore::with_contents(&serde_json::to_string(&state).unwrap());
        let mut cache = AnalysisCache::open(Box::new(store));

        assert!(cache.lookup("/repo/a.ts", &hash_content("/repo/a.ts")).is_some());
        cache.save().unwrap();

        let reloaded = cache.load();
        assert_eq!(reloaded.len(), 1);
        assert!(reloaded.hash_of("/repo/deleted.ts").is_none());
    }

    #[test]
    fn test_corrupt_cache_degrades_to_empty_state() {
        let cache = AnalysisCache::open(Box::new(MemoryCacheStore::with_contents("{not json")));
        assert!(cache.previous().is_empty());
    }

    #[test]
    fn test_other_format_version_is_discarded() {
        let state = CacheState {
            version: FORMAT_VERSION + 1,
            entries: BTreeMap::new(),
        };
        let store = MemoryCacheStore::with_contents(&serde_json::to_string(&state).unwrap());
        let cache = AnalysisCache::open(Box::new(store));

        assert_eq!(cache.previous(), &CacheState::default());
    }

    #[test]
    fn test_retain_paths_prunes_pending_entries() {
        let mut cache = AnalysisCache::open(Box::new(MemoryCacheStore::new()));
        cache.insert("/repo/a.ts", "h1", sample_module("/repo/a.ts"));
        cache.insert("/repo/b.ts", "h2", sample_module("/repo/b.ts"));

        cache.retain_paths(["/repo/b.ts"]);

        assert_eq!(cache.pending().len(), 1);
        assert_eq!(cache.pending().hash_of("/repo/b.ts"), Some("h2"));
    }
}
