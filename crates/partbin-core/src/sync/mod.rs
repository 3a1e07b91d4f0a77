//! Synchronization with the remote document
//!
//! [`SyncCoordinator`] decides where the collection comes from at startup
//! and pushes local changes back when the user asks for it. Nothing is
//! synced automatically.

mod coordinator;
mod error;

pub use coordinator::{
    LoadOutcome, LoadSource, PushOutcome, PushStatus, SyncCoordinator, SyncSettings,
};
pub use error::{SyncError, SyncResult};
