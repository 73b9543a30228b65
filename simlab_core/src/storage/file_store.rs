//! Directory-backed key-value store.
//!
//! Each key maps to `<dir>/<key>.json`. Writes go through
//! [`write_atomic`](crate::file_io::write_atomic). Keys are restricted to
//! ASCII letters, digits, `.`, `-` and `_` so they map onto file names
//! without escaping.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::KeyValueStore;
use crate::errors::{SimError, SimResult};
use crate::file_io::{write_atomic, FileLock};

const VALUE_EXTENSION: &str = "json";

/// Key-value store persisted as one JSON file per key.
pub struct FileStorage {
    dir: PathBuf,
    /// Held for the lifetime of the store when opened with [`FileStorage::open_locked`]
    lock: Option<FileLock>,
}

impl FileStorage {
    /// Open (creating if needed) a storage directory without locking it.
    pub fn open(dir: impl Into<PathBuf>) -> SimResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| SimError::file_error("create storage dir", dir.display().to_string(), e.to_string()))?;
        Ok(FileStorage { dir, lock: None })
    }

    /// Open a storage directory and hold an exclusive lock on it.
    pub fn open_locked(dir: impl Into<PathBuf>, user_id: impl Into<String>) -> SimResult<Self> {
        let mut storage = FileStorage::open(dir)?;
        storage.lock = Some(FileLock::acquire(&storage.dir, user_id)?);
        Ok(storage)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn is_locked(&self) -> bool {
        self.lock.is_some()
    }

    fn path_for(&self, key: &str) -> SimResult<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
        if !valid {
            return Err(SimError::invalid_input(
                "key",
                key,
                "Storage keys may only contain letters, digits, '.', '-' and '_'",
            ));
        }
        Ok(self.dir.join(format!("{}.{}", key, VALUE_EXTENSION)))
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> SimResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SimError::file_error("read", path.display().to_string(), e.to_string())),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> SimResult<()> {
        let path = self.path_for(key)?;
        write_atomic(&path, value.as_bytes())?;
        debug!(key, bytes = value.len(), "stored value");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> SimResult<bool> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(SimError::file_error("remove", path.display().to_string(), e.to_string())),
        }
    }

    fn keys(&self) -> SimResult<Vec<String>> {
        let entries = fs::read_dir(&self.dir)
            .map_err(|e| SimError::file_error("list", self.dir.display().to_string(), e.to_string()))?;

        let mut keys = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|e| SimError::file_error("list", self.dir.display().to_string(), e.to_string()))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(VALUE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}
