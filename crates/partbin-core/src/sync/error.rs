//! Sync error handling

use thiserror::Error;

use crate::codec::CodecError;
use crate::remote::RemoteError;
use crate::storage::StorageError;

/// Errors surfaced by a push
#[derive(Error, Debug)]
pub enum SyncError {
    /// Another push is still outstanding
    #[error("A sync is already in progress")]
    PushInProgress,

    /// The operation needs credentials and none are set
    #[error("GitHub sync is not configured")]
    NotConfigured,

    /// The remote store rejected or failed the request
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The local collection could not be encoded
    #[error("Failed to encode components: {0}")]
    Encode(#[from] CodecError),

    /// Pulled data could not be written to the local cache
    #[error("Failed to save pulled components locally: {0}")]
    Storage(#[from] StorageError),
}

impl SyncError {
    /// User-facing advice for this failure
    pub fn guidance(&self) -> &'static str {
        match self {
            SyncError::PushInProgress => "Wait for the current sync to finish.",
            SyncError::NotConfigured => "Set a token and repository with `partbin auth set`.",
            SyncError::Remote(e) => e.guidance(),
            SyncError::Encode(_) => "The local data could not be serialized; nothing was sent.",
            SyncError::Storage(e) => e
                .recovery_suggestion()
                .unwrap_or("The local cache was left unchanged."),
        }
    }

    /// The remote failure category, if this came from the remote store
    pub fn remote(&self) -> Option<&RemoteError> {
        match self {
            SyncError::Remote(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_guidance_passthrough() {
        let err = SyncError::from(RemoteError::Auth("HTTP 401".into()));
        assert_eq!(err.guidance(), RemoteError::Auth(String::new()).guidance());
        assert!(matches!(err.remote(), Some(RemoteError::Auth(_))));
        assert_eq!(err.to_string(), "Authentication failed: HTTP 401");
    }

    #[test]
    fn test_in_progress() {
        let err = SyncError::PushInProgress;
        assert!(err.remote().is_none());
        assert!(err.to_string().contains("already in progress"));
    }

    #[test]
    fn test_not_configured() {
        let err = SyncError::NotConfigured;
        assert!(err.remote().is_none());
        assert!(err.guidance().contains("auth set"));
    }
}
