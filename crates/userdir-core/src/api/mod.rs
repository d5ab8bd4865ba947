//! Remote user source.
//!
//! `UserSource` is the seam the directory fetches through; `ApiClient`
//! implements it against the randomuser.me API, requesting one fixed-size
//! batch per call and flattening each record into a `UserRecord`.

pub mod client;
pub mod error;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::UserRecord;

pub use client::ApiClient;
pub use error::ApiError;

/// Something that can produce a fresh batch of users.
///
/// A fetch is all-or-nothing: either the whole mapped batch or an error.
#[async_trait]
pub trait UserSource: Send + Sync {
    async fn fetch_users(&self) -> Result<Vec<UserRecord>>;
}
