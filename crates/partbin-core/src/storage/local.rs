//! Local component cache
//!
//! Holds the last known full collection. This is the fallback of last
//! resort: reads never fail, and content that cannot be decoded is treated
//! as if nothing had been saved.
//!
//! Edits made through the CLI are saved with [`LocalStore::save_pending`],
//! which also drops a marker file. While the marker exists the cache holds
//! changes the remote has not seen, and a load must not overwrite it.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::error::StorageResult;
use super::kv::KeyValueStore;
use crate::codec;
use crate::models::Component;

/// Key holding the serialized collection
pub const COMPONENTS_KEY: &str = "components.json";

/// Key a malformed cache is copied to before it can be overwritten
pub const CORRUPT_BACKUP_KEY: &str = "components.json.corrupt";

/// Marker for local edits not yet pushed; holds the time of the first one
pub const PENDING_KEY: &str = "components.pending";

/// Synchronous cache of the whole collection
#[derive(Debug, Clone)]
pub struct LocalStore {
    kv: KeyValueStore,
}

impl LocalStore {
    pub fn new(kv: KeyValueStore) -> Self {
        Self { kv }
    }

    /// Load the previously saved collection.
    ///
    /// Returns `None` when nothing was saved, or when the stored content
    /// is unreadable or malformed. Malformed content is copied to
    /// [`CORRUPT_BACKUP_KEY`] first so a later save does not destroy it.
    pub fn load(&self) -> Option<Vec<Component>> {
        let content = match self.kv.get_bytes(COMPONENTS_KEY) {
            Ok(Some(content)) => content,
            Ok(None) => {
                debug!("no local cache");
                return None;
            }
            Err(e) => {
                warn!("Local cache unreadable, ignoring it: {}", e);
                return None;
            }
        };

        match codec::decode_collection(&content) {
            Ok(components) => {
                debug!(count = components.len(), "loaded local cache");
                Some(components)
            }
            Err(e) => {
                warn!("Local cache is malformed, ignoring it: {}", e);
                if let Err(backup_err) = self.kv.set_bytes(CORRUPT_BACKUP_KEY, &content) {
                    warn!("Could not back up malformed cache: {}", backup_err);
                }
                None
            }
        }
    }

    /// Replace the stored collection
    pub fn save(&self, components: &[Component]) -> StorageResult<()> {
        let bytes = codec::encode_collection(components)?;
        self.kv.set_bytes(COMPONENTS_KEY, &bytes)?;
        debug!(count = components.len(), "saved local cache");
        Ok(())
    }

    /// Save a locally edited collection and mark it as not yet pushed.
    ///
    /// The marker goes down before the data, so a crash in between leaves
    /// at worst a marker over an unchanged cache.
    pub fn save_pending(&self, components: &[Component]) -> StorageResult<()> {
        if !self.has_pending() {
            self.kv.set(PENDING_KEY, &Utc::now().to_rfc3339())?;
        }
        self.save(components)
    }

    /// Whether the cache holds edits the remote has not seen
    pub fn has_pending(&self) -> bool {
        self.kv.contains(PENDING_KEY)
    }

    /// When the oldest unpushed edit was made, if any
    pub fn pending_since(&self) -> Option<DateTime<Utc>> {
        let stamp = self.kv.get(PENDING_KEY).ok().flatten()?;
        DateTime::parse_from_rfc3339(stamp.trim())
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }

    /// Forget the unpushed marker once the remote matches the cache
    pub fn clear_pending(&self) -> StorageResult<()> {
        self.kv.remove(PENDING_KEY)
    }

    /// Check if a collection has ever been saved
    pub fn exists(&self) -> bool {
        self.kv.contains(COMPONENTS_KEY)
    }

    /// The underlying key-value store
    pub fn kv(&self) -> &KeyValueStore {
        &self.kv
    }
}
