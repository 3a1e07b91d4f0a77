//! Storage layer
//!
//! Local, synchronous persistence.
//!
//! ## Layout
//!
//! - **KeyValueStore**: one file per key under the data directory, written
//!   atomically
//! - **LocalStore**: the cached component collection (`components.json`)
//!   and the marker for edits not yet pushed
//!
//! The credential pair lives in the same key-value store; see
//! [`crate::credentials`].

pub mod error;
pub mod kv;
pub mod local;

pub use error::{Operation, StorageError, StorageResult};
pub use kv::KeyValueStore;
pub use local::{LocalStore, COMPONENTS_KEY, PENDING_KEY};
