//! Core library for userdir.
//!
//! Provides everything except the terminal front end:
//!
//! - `api`: the remote user source (randomuser.me client)
//! - `store`: the local persistent user table
//! - `directory`: refresh/delete orchestration and the view state machine
//! - `models`: `UserRecord` and the wire types it is mapped from
//! - `config`: application configuration
//! - `utils`: display formatting helpers

pub mod api;
pub mod config;
pub mod directory;
pub mod models;
pub mod store;
pub mod utils;

pub use api::{ApiClient, ApiError, UserSource};
pub use config::Config;
pub use directory::{Directory, DirectoryService, DirectoryState, RefreshOutcome, RefreshTicket};
pub use models::UserRecord;
pub use store::{JsonUserStore, MemoryUserStore, UserStore};
