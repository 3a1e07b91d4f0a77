//! Remote document store
//!
//! A minimal versioned-document API: fetch a document with its version
//! token, or overwrite it on the condition that the caller still holds the
//! current token (optimistic concurrency).
//!
//! ## Implementations
//!
//! - [`GitHubClient`]: the GitHub Contents API
//! - [`InMemoryRemote`]: process-local store with failure injection; public
//!   so integration tests can drive a coordinator without a network
//!
//! Content crosses this boundary as raw bytes; turning bytes into
//! components is the caller's job (see [`crate::codec`]).

mod error;
pub mod github;
pub mod memory;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use error::{RemoteError, RemoteResult};
pub use github::GitHubClient;
pub use memory::InMemoryRemote;

/// Opaque revision marker for a remote document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionToken(String);

impl VersionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A fetched document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteDocument {
    /// Raw document bytes
    pub content: Vec<u8>,
    /// Revision the content belongs to
    pub version: VersionToken,
}

/// Versioned document store
///
/// Each call is independent and may fail on its own; nothing is cached
/// between calls.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch the document at `path`.
    ///
    /// Returns [`RemoteError::NotFound`] when no document exists yet.
    async fn fetch(&self, path: &str) -> RemoteResult<RemoteDocument>;

    /// Write `content` to `path` and return the new version.
    ///
    /// With `expected == None` this only succeeds if no document exists.
    /// Otherwise `expected` must equal the current version, or the call
    /// fails with [`RemoteError::Conflict`].
    async fn put(
        &self,
        path: &str,
        content: &[u8],
        expected: Option<&VersionToken>,
        message: &str,
    ) -> RemoteResult<VersionToken>;
}
