//! Load and push orchestration
//!
//! Load picks the initial collection from the first source that works:
//! remote document, then local cache, then the built-in default dataset.
//! A local cache with unpushed edits wins over the remote document.
//! Push writes the whole local collection over the remote document,
//! guarded by the version token fetched immediately beforehand. Pull does
//! the reverse and discards unpushed edits.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::error::{SyncError, SyncResult};
use crate::codec;
use crate::config::{DEFAULT_DOCUMENT_PATH, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::credentials::Credentials;
use crate::models::{default_components, Component};
use crate::remote::{RemoteError, RemoteResult, RemoteStore, VersionToken};
use crate::storage::LocalStore;

/// Knobs for the coordinator, usually derived from [`crate::Config`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    /// Document path inside the repository
    pub document_path: String,
    /// Upper bound for each remote call
    pub request_timeout: Duration,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            document_path: DEFAULT_DOCUMENT_PATH.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

/// Where the collection came from at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// Fetched and decoded from the remote document
    Remote,
    /// Read from the local cache
    Local,
    /// Seeded from the built-in dataset
    Default,
}

/// Result of [`SyncCoordinator::load`]
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub source: LoadSource,
    pub components: Vec<Component>,
}

/// Result of a push that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// No credentials; the collection was only saved locally
    NotConfigured,
    /// The remote document now holds the local collection
    Pushed {
        version: VersionToken,
        /// True if the document did not exist before
        created: bool,
    },
}

/// Push progress, for UIs that need to disable their sync control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushStatus {
    Idle,
    Pushing,
    Succeeded,
    Failed,
}

/// Orchestrates load-time precedence and user-triggered push
pub struct SyncCoordinator<R> {
    credentials: Credentials,
    remote: R,
    local: LocalStore,
    settings: SyncSettings,
    push_in_flight: AtomicBool,
    status: watch::Sender<PushStatus>,
}

impl<R: RemoteStore> SyncCoordinator<R> {
    pub fn new(credentials: Credentials, remote: R, local: LocalStore, settings: SyncSettings) -> Self {
        let (status, _) = watch::channel(PushStatus::Idle);
        Self {
            credentials,
            remote,
            local,
            settings,
            push_in_flight: AtomicBool::new(false),
            status,
        }
    }

    /// Whether remote operations will be attempted
    pub fn is_configured(&self) -> bool {
        self.credentials.is_configured()
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    pub fn local(&self) -> &LocalStore {
        &self.local
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Current push status
    pub fn status(&self) -> PushStatus {
        *self.status.borrow()
    }

    /// Subscribe to push status changes
    pub fn subscribe_status(&self) -> watch::Receiver<PushStatus> {
        self.status.subscribe()
    }

    /// Establish the initial collection. Never fails.
    ///
    /// 1. If the local cache holds unpushed edits, return it without
    ///    touching the remote.
    /// 2. If configured, fetch and decode the remote document; on success
    ///    cache it locally and return it.
    /// 3. Otherwise, or on any remote failure, return the local cache.
    /// 4. If there is no local cache, seed it with the default dataset.
    pub async fn load(&self) -> LoadOutcome {
        if self.local.has_pending() {
            if let Some(components) = self.local.load() {
                info!(
                    count = components.len(),
                    "local cache has unpushed changes, not loading remote"
                );
                return LoadOutcome {
                    source: LoadSource::Local,
                    components,
                };
            }
            warn!("Unpushed marker set but local cache is unreadable, discarding marker");
            if let Err(e) = self.local.clear_pending() {
                warn!("Could not clear unpushed marker: {}", e);
            }
        }

        if self.is_configured() {
            match self.fetch_remote_collection().await {
                Ok(components) => {
                    if let Err(e) = self.local.save(&components) {
                        warn!("Loaded remote data but could not cache it locally: {}", e);
                    }
                    info!(count = components.len(), "loaded components from remote");
                    return LoadOutcome {
                        source: LoadSource::Remote,
                        components,
                    };
                }
                Err(RemoteError::NotFound) => {
                    info!("remote document does not exist yet, using local data");
                }
                Err(e) => {
                    warn!("Remote load failed, using local data: {}", e);
                }
            }
        } else {
            debug!("remote not configured, using local data");
        }

        if let Some(components) = self.local.load() {
            info!(count = components.len(), "loaded components from local cache");
            return LoadOutcome {
                source: LoadSource::Local,
                components,
            };
        }

        let components = default_components();
        if let Err(e) = self.local.save(&components) {
            warn!("Could not save default dataset locally: {}", e);
        }
        info!("seeded default dataset");
        LoadOutcome {
            source: LoadSource::Default,
            components,
        }
    }

    /// Overwrite the remote document with `components`.
    ///
    /// The collection is saved to the local cache first, whatever happens
    /// next, and stays marked as unpushed until a push succeeds. Then the current version token is fetched and used as the
    /// precondition for the write, so a document changed by someone else
    /// between those two calls yields [`RemoteError::Conflict`].
    ///
    /// There is no merge: on success the remote document is replaced
    /// wholesale, and remote edits that were never loaded here are lost.
    ///
    /// Only one push may be outstanding; a concurrent call fails with
    /// [`SyncError::PushInProgress`]. `components` is never modified.
    pub async fn push(&self, components: &[Component]) -> SyncResult<PushOutcome> {
        let _in_flight = InFlight::acquire(&self.push_in_flight).ok_or(SyncError::PushInProgress)?;

        if let Err(e) = self.local.save_pending(components) {
            warn!("Could not save components locally before push: {}", e);
        }

        if !self.is_configured() {
            info!("remote not configured, push skipped");
            return Ok(PushOutcome::NotConfigured);
        }

        self.status.send_replace(PushStatus::Pushing);
        let result = self.push_remote(components).await;
        match &result {
            Ok(PushOutcome::Pushed { version, created }) => {
                info!(version = %version, created, count = components.len(), "push complete");
                if let Err(e) = self.local.clear_pending() {
                    warn!("Pushed, but could not clear unpushed marker: {}", e);
                }
                self.status.send_replace(PushStatus::Succeeded);
            }
            Ok(PushOutcome::NotConfigured) => {
                self.status.send_replace(PushStatus::Idle);
            }
            Err(e) => {
                warn!("Push failed: {}", e);
                self.status.send_replace(PushStatus::Failed);
            }
        }
        result
    }

    /// Replace the local cache with the remote document.
    ///
    /// Unpushed local edits are discarded. Unlike [`Self::load`] nothing is
    /// swallowed: a missing or malformed document is an error, and the
    /// cache is left as it was.
    pub async fn pull(&self) -> SyncResult<Vec<Component>> {
        if !self.is_configured() {
            return Err(SyncError::NotConfigured);
        }

        let components = self.fetch_remote_collection().await?;
        self.local.save(&components)?;
        if let Err(e) = self.local.clear_pending() {
            warn!("Could not clear unpushed marker: {}", e);
        }
        info!(count = components.len(), "pulled components from remote");
        Ok(components)
    }

    async fn push_remote(&self, components: &[Component]) -> SyncResult<PushOutcome> {
        let path = self.settings.document_path.as_str();

        let expected = match self.timed("fetch", self.remote.fetch(path)).await {
            Ok(doc) => Some(doc.version),
            Err(RemoteError::NotFound) => None,
            Err(e) => return Err(e.into()),
        };
        debug!(expected = ?expected, "fetched current version");

        let content = codec::encode_collection(components)?;
        let message = commit_message();
        let version = self
            .timed(
                "put",
                self.remote.put(path, &content, expected.as_ref(), &message),
            )
            .await?;

        Ok(PushOutcome::Pushed {
            version,
            created: expected.is_none(),
        })
    }

    async fn fetch_remote_collection(&self) -> RemoteResult<Vec<Component>> {
        let doc = self
            .timed("fetch", self.remote.fetch(&self.settings.document_path))
            .await?;
        codec::decode_collection(&doc.content).map_err(|e| RemoteError::Decode(e.to_string()))
    }

    async fn timed<T>(
        &self,
        operation: &str,
        call: impl Future<Output = RemoteResult<T>>,
    ) -> RemoteResult<T> {
        let limit = self.settings.request_timeout;
        match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => Err(RemoteError::Network(format!(
                "{} timed out after {:?}",
                operation, limit
            ))),
        }
    }
}

fn commit_message() -> String {
    format!(
        "Update component inventory - {}",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )
}

/// Held while a push is running; clears the flag when dropped
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
