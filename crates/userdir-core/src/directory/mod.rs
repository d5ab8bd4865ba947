//! Synchronization between the remote source and the local store.
//!
//! The work is split in two so the same rules drive both the interactive UI
//! and headless callers:
//!
//! - `DirectoryService` performs the I/O (read cache, fetch + replace, delete)
//!   and can be cloned into spawned tasks.
//! - `DirectoryState` holds `{loading, error, users}` and applies results.
//!
//! `Directory` glues the two together for callers that simply await each
//! operation in turn.
//!
//! Overlapping refreshes are ordered by `RefreshTicket`: only the most
//! recently started refresh may write the store or update the state.

pub mod controller;
pub mod service;
pub mod state;

pub use controller::Directory;
pub use service::{DirectoryService, RefreshOutcome, RefreshTicket};
pub use state::{DirectoryState, DELETE_ERROR_MESSAGE, LOAD_ERROR_MESSAGE};
