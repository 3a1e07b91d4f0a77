//! partbin core library
//!
//! This crate provides the core functionality for partbin, an electronic
//! component inventory kept in sync with a JSON document stored in a
//! GitHub repository.
//!
//! # Architecture
//!
//! - **Local cache**: the whole collection as one JSON file, written after
//!   every change; it wins over the remote until local edits are pushed,
//!   and is used whenever the remote is unavailable
//! - **Remote document**: the same JSON array committed through the GitHub
//!   Contents API, overwritten on explicit sync with optimistic concurrency
//!
//! # Quick Start
//!
//! ```text
//! let sync = SyncCoordinator::new(credentials, remote, local, settings);
//! let mut store = Store::open(&sync).await;
//!
//! store.add(Component::new("NE555", "C7593"))?;
//! store.push(&sync).await?;
//! ```
//!
//! # Modules
//!
//! - `store`: Unified storage interface (main entry point)
//! - `models`: Component record and starter dataset
//! - `inventory`: In-memory collection with id-based addressing
//! - `codec`: Document encoding and base64 transport
//! - `storage`: Local key-value files and component cache
//! - `credentials`: GitHub token and repository
//! - `remote`: Remote document stores (GitHub, in-memory)
//! - `sync`: Load precedence, push and pull
//! - `config`: Application configuration

pub mod codec;
pub mod config;
pub mod credentials;
pub mod inventory;
pub mod models;
pub mod remote;
pub mod storage;
pub mod store;
pub mod sync;

pub use codec::CodecError;
pub use config::Config;
pub use credentials::{CredentialError, CredentialStore, Credentials};
pub use inventory::{Inventory, InventoryStats, LookupError};
pub use models::{Component, ComponentPatch};
pub use remote::{GitHubClient, InMemoryRemote, RemoteError, RemoteStore, VersionToken};
pub use storage::{KeyValueStore, LocalStore, StorageError};
pub use store::Store;
pub use sync::{
    LoadOutcome, LoadSource, PushOutcome, PushStatus, SyncCoordinator, SyncError, SyncSettings,
};
