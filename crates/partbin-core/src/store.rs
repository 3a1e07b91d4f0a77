//! Unified storage interface
//!
//! The `Store` owns the in-memory [`Inventory`] and keeps the local cache
//! in step with it: every mutation writes the whole collection before
//! returning and marks it as unpushed. Pushing to the remote document only
//! happens when asked.
//!
//! ## Usage
//!
//! ```ignore
//! let sync = SyncCoordinator::new(credentials, remote, local, settings);
//! let mut store = Store::open(&sync).await;
//!
//! store.add(Component::new("NE555", "C7593"))?;
//! store.push(&sync).await?;
//! ```

use anyhow::{Context, Result};
use uuid::Uuid;

use crate::inventory::{Inventory, InventoryStats, LookupError};
use crate::models::{Component, ComponentPatch};
use crate::remote::RemoteStore;
use crate::storage::LocalStore;
use crate::sync::{LoadSource, PushOutcome, SyncCoordinator, SyncResult};

/// In-memory collection backed by the local cache
pub struct Store {
    inventory: Inventory,
    local: LocalStore,
    source: LoadSource,
}

impl Store {
    /// Open the store, loading the collection through `sync`.
    ///
    /// Never fails: see [`SyncCoordinator::load`] for the fallback order.
    pub async fn open<R: RemoteStore>(sync: &SyncCoordinator<R>) -> Self {
        let outcome = sync.load().await;
        Self {
            inventory: Inventory::new(outcome.components),
            local: sync.local().clone(),
            source: outcome.source,
        }
    }

    /// Open over an already-known collection without consulting any source
    pub fn with_components(local: LocalStore, components: Vec<Component>) -> Self {
        Self {
            inventory: Inventory::new(components),
            local,
            source: LoadSource::Local,
        }
    }

    /// Where the collection came from when the store was opened
    pub fn source(&self) -> LoadSource {
        self.source
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn components(&self) -> &[Component] {
        self.inventory.components()
    }

    // ==================== Queries ====================

    pub fn get(&self, id: Uuid) -> Option<&Component> {
        self.inventory.get(id)
    }

    /// Resolve a full id or unique id prefix
    pub fn resolve(&self, prefix: &str) -> Result<&Component, LookupError> {
        self.inventory.find_by_id_prefix(prefix)
    }

    pub fn search(&self, query: &str) -> Vec<&Component> {
        self.inventory.search(query)
    }

    pub fn low_stock(&self) -> Vec<&Component> {
        self.inventory.low_stock()
    }

    pub fn stats(&self) -> InventoryStats {
        self.inventory.stats()
    }

    // ==================== Mutations ====================

    /// Add a new component
    pub fn add(&mut self, component: Component) -> Result<()> {
        self.inventory.add(component);
        self.save()
    }

    /// Replace an existing component, keeping its id
    pub fn update(&mut self, id: Uuid, component: Component) -> Result<()> {
        self.inventory.update(id, component)?;
        self.save()
    }

    /// Apply a partial update and return the result
    pub fn edit(&mut self, id: Uuid, patch: ComponentPatch) -> Result<Component> {
        let updated = self.inventory.apply(id, patch)?.clone();
        self.save()?;
        Ok(updated)
    }

    /// Delete a component
    pub fn delete(&mut self, id: Uuid) -> Result<Component> {
        let removed = self.inventory.remove(id)?;
        self.save()?;
        Ok(removed)
    }

    // ==================== Sync ====================

    /// Push the current collection; the collection is left untouched
    /// whatever the outcome
    pub async fn push<R: RemoteStore>(&self, sync: &SyncCoordinator<R>) -> SyncResult<PushOutcome> {
        sync.push(self.inventory.components()).await
    }

    /// Whether the collection has edits the remote has not seen
    pub fn has_unpushed_changes(&self) -> bool {
        self.local.has_pending()
    }

    /// Replace the collection with the remote document, dropping unpushed
    /// edits. On failure the collection is left untouched.
    pub async fn pull<R: RemoteStore>(&mut self, sync: &SyncCoordinator<R>) -> SyncResult<usize> {
        let components = sync.pull().await?;
        let count = components.len();
        self.inventory = Inventory::new(components);
        self.source = LoadSource::Remote;
        Ok(count)
    }

    fn save(&self) -> Result<()> {
        self.local
            .save_pending(self.inventory.components())
            .context("Failed to save components locally")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::Credentials;
    use crate::remote::InMemoryRemote;
    use crate::storage::KeyValueStore;
    use crate::sync::SyncSettings;
    use tempfile::TempDir;

    fn coordinator(temp_dir: &TempDir) -> SyncCoordinator<InMemoryRemote> {
        let local = LocalStore::new(KeyValueStore::new(temp_dir.path()));
        SyncCoordinator::new(
            Credentials::default(),
            InMemoryRemote::new(),
            local,
            SyncSettings::default(),
        )
    }

    #[tokio::test]
    async fn test_open_seeds_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let sync = coordinator(&temp_dir);

        let store = Store::open(&sync).await;
        assert_eq!(store.source(), LoadSource::Default);
        assert_eq!(store.components().len(), 2);
        assert!(!store.has_unpushed_changes());
    }

    #[tokio::test]
    async fn test_mutations_persist_immediately() {
        let temp_dir = TempDir::new().unwrap();
        let sync = coordinator(&temp_dir);
        let mut store = Store::open(&sync).await;

        let component = Component::new("NE555", "C7593");
        let id = component.id;
        store.add(component).unwrap();
        assert_eq!(sync.local().load().unwrap().len(), 3);
        assert!(store.has_unpushed_changes());

        let patch = ComponentPatch {
            stock: Some(7),
            ..ComponentPatch::default()
        };
        let edited = store.edit(id, patch).unwrap();
        assert_eq!(edited.stock, 7);
        assert_eq!(sync.local().load().unwrap()[2].stock, 7);

        store.delete(id).unwrap();
        assert_eq!(sync.local().load().unwrap().len(), 2);

        // A fresh open sees the saved state
        let reopened = Store::open(&sync).await;
        assert_eq!(reopened.source(), LoadSource::Local);
        assert_eq!(reopened.components(), store.components());
    }

    #[tokio::test]
    async fn test_missing_id_does_not_save() {
        let temp_dir = TempDir::new().unwrap();
        let sync = coordinator(&temp_dir);
        let mut store = Store::open(&sync).await;

        assert!(store.delete(Uuid::new_v4()).is_err());
        assert!(store
            .update(Uuid::new_v4(), Component::new("x", "y"))
            .is_err());
        assert_eq!(store.components().len(), 2);
    }

    #[tokio::test]
    async fn test_push_unconfigured_is_informational() {
        let temp_dir = TempDir::new().unwrap();
        let sync = coordinator(&temp_dir);
        let store = Store::open(&sync).await;

        let outcome = store.push(&sync).await.unwrap();
        assert_eq!(outcome, PushOutcome::NotConfigured);
        assert_eq!(sync.remote().call_count(), 0);
    }

    #[tokio::test]
    async fn test_pull_replaces_unpushed_edits() {
        let temp_dir = TempDir::new().unwrap();
        let remote = InMemoryRemote::new();
        let remote_components = vec![Component::new("LM358", "C7950")];
        remote.external_write(
            "data.json",
            &crate::codec::encode_collection(&remote_components).unwrap(),
        );
        let local = LocalStore::new(KeyValueStore::new(temp_dir.path()));
        let sync = SyncCoordinator::new(
            Credentials::new("ghp_test", "octo/parts"),
            remote,
            local,
            SyncSettings::default(),
        );
        let mut store = Store::with_components(sync.local().clone(), Vec::new());
        store.add(Component::new("NE555", "C7593")).unwrap();
        assert!(store.has_unpushed_changes());

        assert_eq!(store.pull(&sync).await.unwrap(), 1);
        assert_eq!(store.components(), remote_components.as_slice());
        assert_eq!(store.source(), LoadSource::Remote);
        assert!(!store.has_unpushed_changes());
        assert_eq!(sync.local().load().unwrap(), remote_components);
    }

    #[tokio::test]
    async fn test_pull_unconfigured_keeps_collection() {
        let temp_dir = TempDir::new().unwrap();
        let sync = coordinator(&temp_dir);
        let mut store = Store::open(&sync).await;
        store.add(Component::new("NE555", "C7593")).unwrap();

        let err = store.pull(&sync).await.unwrap_err();
        assert!(matches!(err, crate::sync::SyncError::NotConfigured));
        assert_eq!(store.components().len(), 3);
        assert!(store.has_unpushed_changes());
    }

    #[tokio::test]
    async fn test_resolve_prefix() {
        let temp_dir = TempDir::new().unwrap();
        let sync = coordinator(&temp_dir);
        let store = Store::open(&sync).await;
        let first = store.components()[0].clone();

        let prefix = &first.id.to_string()[..8];
        assert_eq!(store.resolve(prefix).unwrap().id, first.id);
    }
}
