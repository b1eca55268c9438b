// ── Key-value persistence backends ──
//
// The store persists each collection as one JSON document under a fixed
// key. Backends only move strings; they know nothing about entities.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use dashmap::DashMap;

use crate::error::{CoreError, Result};

pub trait KeyValueBackend: Send + Sync {
    /// Read a value. Missing keys are `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> Result<()>;

    /// Apply several writes as one unit: every entry lands or none does.
    /// `None` removes the key.
    ///
    /// The default applies entries in order and writes back the previous
    /// values of the keys already touched when a later entry fails.
    fn write_batch(&self, batch: &[(&str, Option<String>)]) -> Result<()> {
        let previous = read_previous(self, batch)?;
        for (done, (key, value)) in batch.iter().enumerate() {
            let outcome = match value {
                Some(value) => self.put(key, value),
                None => self.delete(key),
            };
            if let Err(e) = outcome {
                restore(self, &previous[..done]);
                return Err(e);
            }
        }
        Ok(())
    }
}

fn read_previous<'a, B: KeyValueBackend + ?Sized>(
    backend: &B,
    batch: &[(&'a str, Option<String>)],
) -> Result<Vec<(&'a str, Option<String>)>> {
    batch
        .iter()
        .map(|(key, _)| backend.get(key).map(|value| (*key, value)))
        .collect()
}

/// Put back the values captured before a batch started, newest first.
fn restore<B: KeyValueBackend + ?Sized>(backend: &B, previous: &[(&str, Option<String>)]) {
    for (key, value) in previous.iter().rev() {
        let outcome = match value {
            Some(value) => backend.put(key, value),
            None => backend.delete(key),
        };
        if let Err(e) = outcome {
            tracing::warn!(key = *key, error = %e, "could not restore key after failed batch");
        }
    }
}

/// Process-local backend.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: DashMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn write_batch(&self, batch: &[(&str, Option<String>)]) -> Result<()> {
        for (key, value) in batch {
            match value {
                Some(value) => {
                    self.entries.insert((*key).to_owned(), value.clone());
                }
                None => {
                    self.entries.remove(*key);
                }
            }
        }
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory.
///
/// Writes go to a temporary sibling first and are renamed into place, so
/// a crash mid-write never leaves a truncated document behind. A batch
/// stages every temporary file before the first rename.
#[derive(Debug, Clone)]
pub struct DirectoryBackend {
    root: PathBuf,
}

impl DirectoryBackend {
    /// Open (creating if needed) a backend rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| CoreError::storage(&root.display().to_string(), e))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    fn tmp_path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!(".{key}.json.tmp"))
    }

    fn discard(paths: &[PathBuf]) {
        for path in paths {
            let _ = fs::remove_file(path);
        }
    }
}

impl KeyValueBackend for DirectoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CoreError::storage(key, e)),
        }
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let tmp = self.tmp_path_for(key);
        fs::write(&tmp, value).map_err(|e| CoreError::storage(key, e))?;
        fs::rename(&tmp, self.path_for(key)).map_err(|e| CoreError::storage(key, e))
    }

    fn delete(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CoreError::storage(key, e)),
        }
    }

    fn write_batch(&self, batch: &[(&str, Option<String>)]) -> Result<()> {
        let previous = read_previous(self, batch)?;

        let mut staged = Vec::with_capacity(batch.len());
        for (key, value) in batch {
            let Some(value) = value else { continue };
            let tmp = self.tmp_path_for(key);
            if let Err(e) = fs::write(&tmp, value) {
                staged.push(tmp);
                Self::discard(&staged);
                return Err(CoreError::storage(key, e));
            }
            staged.push(tmp);
        }

        for (done, (key, value)) in batch.iter().enumerate() {
            let outcome = match value {
                Some(_) => fs::rename(self.tmp_path_for(key), self.path_for(key))
                    .map_err(|e| CoreError::storage(key, e)),
                None => self.delete(key),
            };
            if let Err(e) = outcome {
                Self::discard(&staged);
                restore(self, &previous[..done]);
                return Err(e);
            }
        }
        Ok(())
    }
}
