//! Local storage errors

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::codec::CodecError;

/// File operation that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateDir,
    Read,
    Write,
    Rename,
    Remove,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Operation::CreateDir => "create directory",
            Operation::Read => "read",
            Operation::Write => "write",
            Operation::Rename => "replace",
            Operation::Remove => "remove",
        };
        f.write_str(verb)
    }
}

/// Errors raised by the key-value store and the component cache
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Permission denied: cannot {op} '{path}'")]
    PermissionDenied {
        op: Operation,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Out of disk space while writing '{path}'")]
    DiskFull {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to {op} '{path}': {source}")]
    Io {
        op: Operation,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Keys map straight to file names
    #[error("Invalid storage key '{key}': only letters, digits, '_', '-' and '.' are allowed")]
    InvalidKey { key: String },

    #[error("Failed to encode components: {0}")]
    Encode(#[from] CodecError),
}

impl StorageError {
    /// Classify an I/O failure of `op` on `path`
    pub fn io(op: Operation, path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::PermissionDenied {
            StorageError::PermissionDenied { op, path, source }
        } else if out_of_space(&source) {
            StorageError::DiskFull { path, source }
        } else {
            StorageError::Io { op, path, source }
        }
    }

    /// What the user can do about it, if anything
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StorageError::PermissionDenied { .. } => {
                Some("Check ownership and permissions of the data directory (see `partbin config show`).")
            }
            StorageError::DiskFull { .. } => Some("Free up disk space and try again."),
            _ => None,
        }
    }
}

fn out_of_space(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    ["no space left", "disk full", "quota exceeded", "not enough space"]
        .iter()
        .any(|needle| msg.contains(needle))
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied() {
        let source = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err = StorageError::io(Operation::Write, "/data/components.json", source);

        assert!(matches!(
            err,
            StorageError::PermissionDenied {
                op: Operation::Write,
                ..
            }
        ));
        assert!(err.to_string().contains("cannot write"));
        assert!(err.recovery_suggestion().is_some());
    }

    #[test]
    fn test_out_of_space() {
        let source = io::Error::new(io::ErrorKind::Other, "No space left on device");
        let err = StorageError::io(Operation::Write, "/full/disk", source);

        assert!(matches!(err, StorageError::DiskFull { .. }));
        assert_eq!(err.recovery_suggestion(), Some("Free up disk space and try again."));
    }

    #[test]
    fn test_other_failure() {
        let source = io::Error::new(io::ErrorKind::Other, "device busy");
        let err = StorageError::io(Operation::Rename, "/busy", source);

        assert!(matches!(err, StorageError::Io { .. }));
        assert_eq!(err.to_string(), "Failed to replace '/busy': device busy");
        assert!(err.recovery_suggestion().is_none());
    }

    #[test]
    fn test_invalid_key_display() {
        let err = StorageError::InvalidKey {
            key: "../etc".to_string(),
        };
        assert!(err.to_string().contains("../etc"));
    }
}
