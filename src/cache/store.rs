//! Storage media for the analysis cache

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Opaque persistence for the serialized cache state
pub trait CacheStore: Send + Sync {
    /// Return the stored text, or `None` if nothing has been stored yet
    fn read(&self) -> io::Result<Option<String>>;

    /// Replace the stored text
    fn write(&self, contents: &str) -> io::Result<()>;
}

/// Cache file on local disk
///
/// Writes go to a sibling temporary file that is then renamed over the target,
/// so readers never observe a half-written state.
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    path: PathBuf,
}

impl FileCacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<dir>/<file_name>`
    pub fn in_dir(dir: &Path, file_name: &str) -> Self {
        Self::new(dir.join(file_name))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(format!(".{}.tmp", std::process::id()));
        self.path.with_file_name(name)
    }
}

impl CacheStore for FileCacheStore {
    fn read(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp = self.temp_path();
        fs::write(&temp, contents)?;
        fs::rename(&temp, &self.path).inspect_err(|_| {
            let _ = fs::remove_file(&temp);
        })
    }
}

/// In-memory store, useful for embedding and tests
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    contents: Mutex<Option<String>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: &str) -> Self {
        Self {
            contents: Mutex::new(Some(contents.to_string())),
        }
    }
}

impl CacheStore for MemoryCacheStore {
    fn read(&self) -> io::Result<Option<String>> {
        self.contents
            .lock()
            .map(|guard| guard.clone())
            .map_err(|_| io::Error::other("cache store lock poisoned"))
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        let mut guard = self
            .contents
            .lock()
            .map_err(|_| io::Error::other("cache store lock poisoned"))?;
        *guard = Some(contents.to_string());
        Ok(())
    }
}
