//! File system capability used by the detect and fix use cases

use std::fs;
use std::path::{Component, Path, PathBuf};

use glob::{MatchOptions, Pattern};
use walkdir::WalkDir;

use crate::constants::discovery::RESOLVE_EXTENSIONS;
use crate::constants::fix::BACKUP_SUFFIX;
use crate::error::CycleBreakerError;

/// Everything the core needs from the file system
///
/// Fix strategies only reach `write_file` and `backup` through
/// [`FixContext`](crate::fixer::FixContext), which blocks them during dry
/// runs.
pub trait FileSystem: Send + Sync {
    fn read_file(&self, path: &Path) -> Result<String, CycleBreakerError>;

    /// Replace the file contents in a single operation
    fn write_file(&self, path: &Path, contents: &str) -> Result<(), CycleBreakerError>;

    fn exists(&self, path: &Path) -> bool;

    /// Files under `root` matching any of `patterns` and none of `excludes`,
    /// both matched against the path relative to `root`
    fn glob(
        &self,
        root: &Path,
        patterns: &[String],
        excludes: &[String],
    ) -> Result<Vec<PathBuf>, CycleBreakerError>;

    /// Resolve an import specifier written in `from`; `None` for packages and
    /// anything that does not exist
    fn resolve_module(&self, from: &Path, specifier: &str) -> Option<PathBuf>;

    /// Copy the file aside before it is modified, returning the copy's path
    fn backup(&self, path: &Path) -> Result<PathBuf, CycleBreakerError>;

    /// Delete a file created earlier in the same fix run
    fn remove_file(&self, path: &Path) -> Result<(), CycleBreakerError>;
}

/// [`FileSystem`] backed by the local disk
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        Self
    }
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

fn compile_globs(patterns: &[String]) -> Result<Vec<Pattern>, CycleBreakerError> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|e| CycleBreakerError::ConfigurationError {
                message: format!("Invalid glob '{p}': {e}"),
            })
        })
        .collect()
}

impl FileSystem for LocalFileSystem {
    fn read_file(&self, path: &Path) -> Result<String, CycleBreakerError> {
        fs::read_to_string(path).map_err(|source| CycleBreakerError::FileReadError {
            path: path.to_path_buf(),
            source,
        })
    }

    fn write_file(&self, path: &Path, contents: &str) -> Result<(), CycleBreakerError> {
        let to_error = |source| CycleBreakerError::FileWriteError {
            path: path.to_path_buf(),
            source,
        };

        let mut temp_name = path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        temp_name.push(format!(".{}.tmp", std::process::id()));
        let temp = path.with_file_name(temp_name);

        fs::write(&temp, contents).map_err(to_error)?;
        fs::rename(&temp, path).map_err(|e| {
            let _ = fs::remove_file(&temp);
            to_error(e)
        })
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn glob(
        &self,
        root: &Path,
        patterns: &[String],
        excludes: &[String],
    ) -> Result<Vec<PathBuf>, CycleBreakerError> {
        let includes = compile_globs(patterns)?;
        let excludes = compile_globs(excludes)?;

        let mut files: Vec<PathBuf> = WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| {
                let relative = e.path().strip_prefix(root).ok()?.to_string_lossy().replace('\\', "/");
                let included = includes
                    .iter()
                    .any(|p| p.matches_with(&relative, MATCH_OPTIONS));
                let excluded = excludes
                    .iter()
                    .any(|p| p.matches_with(&relative, MATCH_OPTIONS));
                (included && !excluded).then(|| e.into_path())
            })
            .collect();

        files.sort();
        Ok(files)
    }

    fn resolve_module(&self, from: &Path, specifier: &str) -> Option<PathBuf> {
        let is_relative = specifier == "."
            || specifier == ".."
            || specifier.starts_with("./")
            || specifier.starts_with("../");
        if !is_relative {
            return None;
        }

        let base = normalize(&from.parent()?.join(specifier));
        candidates(&base).into_iter().find(|c| c.is_file())
    }

    fn backup(&self, path: &Path) -> Result<PathBuf, CycleBreakerError> {
        let mut name = path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(format!(".{BACKUP_SUFFIX}"));
        let target = path.with_file_name(name);

        fs::copy(path, &target).map_err(|source| CycleBreakerError::FileWriteError {
            path: target.clone(),
            source,
        })?;
        Ok(target)
    }

    fn remove_file(&self, path: &Path) -> Result<(), CycleBreakerError> {
        fs::remove_file(path).map_err(|source| CycleBreakerError::FileWriteError {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Candidate files for an extensionless or compiled-extension specifier
fn candidates(base: &Path) -> Vec<PathBuf> {
    let mut out = vec![base.to_path_buf()];

    // `./user.js` written in TypeScript sources refers to `./user.ts`
    if let Some(ext) = base.extension().and_then(|e| e.to_str())
        && matches!(ext, "js" | "jsx" | "mjs" | "cjs")
    {
        out.push(base.with_extension(ext.replacen('j', "t", 1)));
    }

    for ext in RESOLVE_EXTENSIONS {
        let mut with_ext = base.as_os_str().to_os_string();
        with_ext.push(format!(".{ext}"));
        out.push(PathBuf::from(with_ext));
    }
    for ext in RESOLVE_EXTENSIONS {
        out.push(base.join(format!("index.{ext}")));
    }

    out
}

/// Lexically remove `.` and `..` components
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
