use std::collections::BTreeSet;
use std::path::Path;

use crate::error::CycleBreakerError;
use crate::fs::FileSystem;

/// Full new contents for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileWrite {
    pub path: String,
    pub contents: String,
}

impl FileWrite {
    pub fn new(path: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }
}

/// What a call to [`FixContext::write_all`] did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteOutcome {
    pub modified: Vec<String>,
    pub created: Vec<String>,
    /// Paths a dry run would have written
    pub planned: Vec<String>,
}

/// The only way a strategy touches the file system during a fix run
///
/// The context outlives a single cycle: it keeps a ledger of every file
/// claimed by an accepted write so that no file is mutated twice in one run.
/// Dry runs claim files too, which keeps their preview faithful to what a real
/// run would do.
pub struct FixContext<'a> {
    fs: &'a dyn FileSystem,
    dry_run: bool,
    backup: bool,
    claimed: BTreeSet<String>,
}

impl<'a> FixContext<'a> {
    pub fn new(fs: &'a dyn FileSystem, dry_run: bool) -> Self {
        Self {
            fs,
            dry_run,
            backup: false,
            claimed: BTreeSet::new(),
        }
    }

    /// Copy existing files aside before overwriting them
    pub fn with_backup(mut self, backup: bool) -> Self {
        self.backup = backup;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn read(&self, path: &str) -> Result<String, CycleBreakerError> {
        self.fs.read_file(Path::new(path))
    }

    pub fn exists(&self, path: &str) -> bool {
        self.fs.exists(Path::new(path))
    }

    /// Whether an earlier write in this run already claimed `path`
    pub fn is_claimed(&self, path: &str) -> bool {
        self.claimed.contains(path)
    }

    pub fn claimed_files(&self) -> impl Iterator<Item = &str> {
        self.claimed.iter().map(String::as_str)
    }

    /// Write a batch of files
    ///
    /// Nothing is written if any path was already claimed in this run or
    /// appears twice in the batch. In dry-run mode nothing is written and the
    /// paths are reported as planned. Otherwise every existing file is backed
    /// up (when enabled) before the first write, then each file is replaced
    /// with a single `write_file` call. If a write fails, files already
    /// written in the batch are restored; any that cannot be are claimed and
    /// listed in a [`CycleBreakerError::PartialWrite`].
    pub fn write_all(&mut self, writes: &[FileWrite]) -> Result<WriteOutcome, CycleBreakerError> {
        let mut batch = BTreeSet::new();
        for write in writes {
            if self.claimed.contains(&write.path) || !batch.insert(write.path.as_str()) {
                tracing::warn!(path = %write.path, "refusing to modify a file twice in one run");
                return Err(CycleBreakerError::WriteConflict {
                    path: write.path.clone(),
                });
            }
        }

        let mut outcome = WriteOutcome::default();

        if self.dry_run {
            for write in writes {
                tracing::debug!(path = %write.path, "dry run, skipping write");
                self.claimed.insert(write.path.clone());
                outcome.planned.push(write.path.clone());
            }
            return Ok(outcome);
        }

        // Prior contents of existing files, kept to undo a half-written batch
        let originals = writes
            .iter()
            .map(|w| self.exists(&w.path).then(|| self.read(&w.path)).transpose())
            .collect::<Result<Vec<Option<String>>, _>>()?;

        if self.backup {
            for (write, _) in writes.iter().zip(&originals).filter(|(_, o)| o.is_some()) {
                let backup = self.fs.backup(Path::new(&write.path))?;
                tracing::debug!(path = %write.path, backup = %backup.display(), "backed up file");
            }
        }

        for (done, (write, original)) in writes.iter().zip(&originals).enumerate() {
            if let Err(e) = self.fs.write_file(Path::new(&write.path), &write.contents) {
                let unrestored = self.roll_back(&writes[..done], &originals[..done]);
                if unrestored.is_empty() {
                    return Err(e);
                }
                self.claimed.extend(unrestored.iter().cloned());
                return Err(CycleBreakerError::PartialWrite {
                    path: write.path.clone(),
                    message: e.to_string(),
                    unrestored,
                });
            }

            if original.is_some() {
                outcome.modified.push(write.path.clone());
            } else {
                outcome.created.push(write.path.clone());
            }
        }

        self.claimed.extend(writes.iter().map(|write| write.path.clone()));
        Ok(outcome)
    }

    /// Undo already applied writes, returning the paths left changed on disk
    fn roll_back(&self, written: &[FileWrite], originals: &[Option<String>]) -> Vec<String> {
        let mut unrestored = Vec::new();
        for (write, original) in written.iter().zip(originals) {
            let path = Path::new(&write.path);
            let restored = match original {
                Some(contents) => self.fs.write_file(path, contents),
                None => self.fs.remove_file(path),
            };
            match restored {
                Ok(()) => tracing::debug!(path = %write.path, "rolled back partial write"),
                Err(e) => {
                    tracing::warn!(path = %write.path, error = %e, "failed to roll back write");
                    unrestored.push(write.path.clone());
                }
            }
        }
        unrestored
    }
}
