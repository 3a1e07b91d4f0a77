//! In-memory remote store
//!
//! Follows the same create/overwrite rules as the GitHub client, keeps
//! everything in process memory, and lets tests script failures. Clones
//! share state, so a test can hand one clone to the coordinator and keep
//! another to inspect or sabotage the store.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::{RemoteDocument, RemoteError, RemoteResult, RemoteStore, VersionToken};

#[derive(Debug, Default)]
struct State {
    documents: HashMap<String, RemoteDocument>,
    revision: u64,
    offline: bool,
    latency: Option<Duration>,
    scripted_failures: VecDeque<RemoteError>,
    fetch_calls: usize,
    put_calls: usize,
    last_message: Option<String>,
}

impl State {
    fn next_version(&mut self) -> VersionToken {
        self.revision += 1;
        VersionToken::new(format!("{:040x}", self.revision))
    }

    /// Consume the next scripted failure, or fail because we're offline
    fn injected_failure(&mut self) -> Option<RemoteError> {
        if let Some(err) = self.scripted_failures.pop_front() {
            return Some(err);
        }
        if self.offline {
            return Some(RemoteError::Network("connection refused (offline)".to_string()));
        }
        None
    }
}

/// Process-local [`RemoteStore`]
#[derive(Debug, Clone, Default)]
pub struct InMemoryRemote {
    state: Arc<Mutex<State>>,
}

impl InMemoryRemote {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panicking test thread must not poison the store for the others
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Write a document as some other client would, bypassing the version
    /// check. Returns the new version.
    pub fn external_write(&self, path: &str, content: &[u8]) -> VersionToken {
        let mut state = self.lock();
        let version = state.next_version();
        state.documents.insert(
            path.to_string(),
            RemoteDocument {
                content: content.to_vec(),
                version: version.clone(),
            },
        );
        version
    }

    /// Current document at `path`, without counting as a call
    pub fn document(&self, path: &str) -> Option<RemoteDocument> {
        self.lock().documents.get(path).cloned()
    }

    /// Make every call fail with a network error until switched back
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Delay every call by `latency` before it is handled
    pub fn set_latency(&self, latency: Option<Duration>) {
        self.lock().latency = latency;
    }

    /// Fail the next call (fetch or put) with `error`. Calls queue up.
    pub fn fail_next(&self, error: RemoteError) {
        self.lock().scripted_failures.push_back(error);
    }

    /// Number of `fetch` calls made so far
    pub fn fetch_count(&self) -> usize {
        self.lock().fetch_calls
    }

    /// Number of `put` calls made so far
    pub fn put_count(&self) -> usize {
        self.lock().put_calls
    }

    /// Total calls made so far
    pub fn call_count(&self) -> usize {
        let state = self.lock();
        state.fetch_calls + state.put_calls
    }

    /// Commit message of the most recent successful put
    pub fn last_message(&self) -> Option<String> {
        self.lock().last_message.clone()
    }

    async fn simulate_latency(&self) {
        let latency = self.lock().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl RemoteStore for InMemoryRemote {
    async fn fetch(&self, path: &str) -> RemoteResult<RemoteDocument> {
        self.lock().fetch_calls += 1;
        self.simulate_latency().await;

        let mut state = self.lock();
        if let Some(err) = state.injected_failure() {
            return Err(err);
        }
        state
            .documents
            .get(path)
            .cloned()
            .ok_or(RemoteError::NotFound)
    }

    async fn put(
        &self,
        path: &str,
        content: &[u8],
        expected: Option<&VersionToken>,
        message: &str,
    ) -> RemoteResult<VersionToken> {
        self.lock().put_calls += 1;
        self.simulate_latency().await;

        let mut state = self.lock();
        if let Some(err) = state.injected_failure() {
            return Err(err);
        }

        let current = state.documents.get(path).map(|doc| doc.version.clone());
        match (current.as_ref(), expected) {
            (None, None) => {}
            (Some(current), Some(expected)) if current == expected => {}
            (Some(current), Some(expected)) => {
                return Err(RemoteError::Conflict(format!(
                    "expected version {}, current is {}",
                    expected, current
                )));
            }
            (Some(_), None) => {
                return Err(RemoteError::Conflict(
                    "document already exists; a version is required".to_string(),
                ));
            }
            (None, Some(expected)) => {
                return Err(RemoteError::Conflict(format!(
                    "expected version {}, but the document no longer exists",
                    expected
                )));
            }
        }

        let version = state.next_version();
        state.documents.insert(
            path.to_string(),
            RemoteDocument {
                content: content.to_vec(),
                version: version.clone(),
            },
        );
        state.last_message = Some(message.to_string());
        debug!(path, version = %version, "in-memory put");
        Ok(version)
    }
}
