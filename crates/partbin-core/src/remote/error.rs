//! Remote store errors

use thiserror::Error;

/// Failure categories surfaced by a [`super::RemoteStore`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// No document at the requested path (not an error for callers that
    /// can start fresh)
    #[error("Document not found")]
    NotFound,

    /// The version token is stale; the document changed since it was fetched
    #[error("Version conflict: {0}")]
    Conflict(String),

    /// Token missing, invalid or expired
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// API rate limit hit
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Transport failure, timeout or unexpected HTTP status
    #[error("Network error: {0}")]
    Network(String),

    /// Content arrived but could not be parsed
    #[error("Malformed remote content: {0}")]
    Decode(String),
}

impl RemoteError {
    /// Whether retrying the same call later may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RemoteError::RateLimited(_) | RemoteError::Network(_) | RemoteError::Conflict(_)
        )
    }

    /// What the user should do about it
    pub fn guidance(&self) -> &'static str {
        match self {
            RemoteError::NotFound => "The document will be created on the next sync.",
            RemoteError::Conflict(_) => {
                "The remote document changed since it was last read. Sync again to overwrite it with local data."
            }
            RemoteError::Auth(_) => {
                "The GitHub token is invalid or expired. Set a new one with `partbin auth set`."
            }
            RemoteError::RateLimited(_) => "GitHub API rate limit reached. Try again later.",
            RemoteError::Network(_) => "Could not reach GitHub. Check your network connection.",
            RemoteError::Decode(_) => {
                "The remote document is not a valid component list. Fix or remove it in the repository."
            }
        }
    }
}

/// Result type for remote operations
pub type RemoteResult<T> = Result<T, RemoteError>;
