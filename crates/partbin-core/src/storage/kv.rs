//! File-backed key-value store
//!
//! Each key is a file directly under the data directory; the value is the
//! file's full content. Writes are atomic (write to temp file, then rename)
//! so a crash never leaves a half-written value behind.
//!
//! Storage location: `~/.local/share/partbin/` (configurable via `Config`)

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::error::{Operation, StorageError, StorageResult};

/// Durable string store keyed by simple names
#[derive(Debug, Clone)]
pub struct KeyValueStore {
    dir: PathBuf,
}

impl KeyValueStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the stored values
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`
    pub fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(key))
    }

    /// Read a value; `None` if it was never written or has been removed
    pub fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(Operation::Read, path, e)),
        }
    }

    /// Read a value as raw bytes, without requiring UTF-8
    pub fn get_bytes(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(Operation::Read, path, e)),
        }
    }

    /// Replace the value stored under `key`
    pub fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.set_bytes(key, value.as_bytes())
    }

    /// Replace the value stored under `key` with raw bytes
    pub fn set_bytes(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        let path = self.path_for(key)?;
        atomic_write(&path, value)?;
        debug!(key, bytes = value.len(), "stored value");
        Ok(())
    }

    /// Remove a value. Removing a missing key is not an error.
    pub fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(key, "removed value");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(Operation::Remove, path, e)),
        }
    }

    /// Check if a value exists
    pub fn contains(&self, key: &str) -> bool {
        self.path_for(key).map(|p| p.is_file()).unwrap_or(false)
    }
}

fn validate_key(key: &str) -> StorageResult<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey {
            key: key.to_string(),
        })
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StorageError::io(Operation::CreateDir, parent, e))?;
    }

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    let write = |e| StorageError::io(Operation::Write, &temp_path, e);
    let mut file = File::create(&temp_path).map_err(write)?;
    file.write_all(data).map_err(write)?;
    file.sync_all().map_err(write)?;

    fs::rename(&temp_path, path).map_err(|e| StorageError::io(Operation::Rename, path, e))?;

    Ok(())
}
