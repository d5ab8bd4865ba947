use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::api::UserSource;
use crate::models::UserRecord;
use crate::store::UserStore;

/// Generation token handed out when a refresh starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

impl RefreshTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// What a completed refresh did.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// The store now holds exactly these users
    Applied(Vec<UserRecord>),
    /// A newer refresh started while this one was fetching; nothing was written
    Superseded,
}

/// Cloneable handle over the injected source and store.
#[derive(Clone)]
pub struct DirectoryService {
    source: Arc<dyn UserSource>,
    store: Arc<dyn UserStore>,
    generation: Arc<AtomicU64>,
    /// Held while checking the generation and replacing the table
    write_lock: Arc<Mutex<()>>,
}

impl DirectoryService {
    pub fn new(source: Arc<dyn UserSource>, store: Arc<dyn UserStore>) -> Self {
        Self {
            source,
            store,
            generation: Arc::new(AtomicU64::new(0)),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn store(&self) -> &Arc<dyn UserStore> {
        &self.store
    }

    /// Read whatever the local store currently holds
    pub async fn load_cached(&self) -> Result<Vec<UserRecord>> {
        let users = self.store.read_all().await?;
        debug!(count = users.len(), "Loaded users from local store");
        Ok(users)
    }

    /// Claim a new refresh generation. Any refresh holding an older ticket
    /// will no longer write the store.
    pub fn begin_refresh(&self) -> RefreshTicket {
        RefreshTicket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: RefreshTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }

    /// Fetch a fresh batch and replace the stored table with it.
    ///
    /// The store is cleared and then bulk-inserted; there is no transaction
    /// around the pair, so a failure in between leaves the store empty.
    pub async fn refresh(&self, ticket: RefreshTicket) -> Result<RefreshOutcome> {
        info!(generation = ticket.0, "Refreshing users from remote source");

        let users = self.source.fetch_users().await?;

        let _guard = self.write_lock.lock().await;
        if !self.is_current(ticket) {
            warn!(
                generation = ticket.0,
                latest = self.generation.load(Ordering::SeqCst),
                "Discarding superseded refresh result"
            );
            return Ok(RefreshOutcome::Superseded);
        }

        self.store
            .clear()
            .await
            .context("Failed to clear stored users")?;
        self.store
            .bulk_insert(&users)
            .await
            .context("Failed to save users")?;

        info!(count = users.len(), "Replaced stored users with fresh batch");
        Ok(RefreshOutcome::Applied(users))
    }

    /// Remove one user from the store. Deleting an absent id succeeds and
    /// returns false.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let removed = self.store.delete(id).await?;
        if removed {
            debug!(id, "Deleted user from local store");
        } else {
            debug!(id, "Delete requested for user not in local store");
        }

        match self.store.count().await {
            Ok(remaining) => debug!(remaining, "Users remaining in local store"),
            Err(e) => debug!(error = %e, "Could not count remaining users"),
        }

        Ok(removed)
    }
}
