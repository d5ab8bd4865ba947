use anyhow::Result;
use tracing::{debug, error, warn};

use crate::models::UserRecord;

use super::service::{RefreshOutcome, RefreshTicket};

/// Shown when the local store cannot be read at startup
pub const LOAD_ERROR_MESSAGE: &str = "Failed to load users from storage";

/// Shown when removing a user from the local store fails
pub const DELETE_ERROR_MESSAGE: &str = "Failed to delete user";

/// Fallback when an error carries no message of its own
const GENERIC_ERROR_MESSAGE: &str = "An error occurred";

/// View state of the directory. The screen is a pure function of this.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectoryState {
    pub loading: bool,
    pub error: Option<String>,
    pub users: Vec<UserRecord>,
    /// Most recently started refresh; results for older tickets are ignored
    latest_refresh: Option<RefreshTicket>,
}

impl DirectoryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Whether any refresh has been started against this state
    pub fn refresh_started(&self) -> bool {
        self.latest_refresh.is_some()
    }

    /// Apply the result of reading the local store at startup.
    /// Returns true when a refresh should follow (store empty or unreadable).
    pub fn finish_initial_load(&mut self, result: Result<Vec<UserRecord>>) -> bool {
        match result {
            Ok(users) if !users.is_empty() => {
                debug!(count = users.len(), "Showing users from local store");
                self.users = users;
                false
            }
            Ok(_) => {
                debug!("Local store empty, refresh needed");
                true
            }
            Err(e) => {
                error!(error = %e, "Failed to read local store");
                self.error = Some(LOAD_ERROR_MESSAGE.to_string());
                true
            }
        }
    }

    /// Mark a refresh as in flight
    pub fn start_refresh(&mut self, ticket: RefreshTicket) {
        self.loading = true;
        self.error = None;
        self.latest_refresh = Some(ticket);
    }

    /// Apply a finished refresh. Results for anything but the latest ticket
    /// are dropped without touching the state.
    pub fn finish_refresh(&mut self, ticket: RefreshTicket, result: Result<RefreshOutcome>) {
        if self.latest_refresh != Some(ticket) {
            warn!(generation = ticket.generation(), "Ignoring stale refresh result");
            return;
        }

        match result {
            Ok(RefreshOutcome::Applied(users)) => {
                self.users = users;
            }
            Ok(RefreshOutcome::Superseded) => {
                // Only reachable if the service saw a newer ticket this state never started
                debug!(generation = ticket.generation(), "Refresh superseded");
            }
            Err(e) => {
                error!(error = %e, "Refresh failed");
                self.error = Some(error_message(&e));
            }
        }
        self.loading = false;
    }

    /// Apply the result of deleting `id` from the store
    pub fn finish_delete(&mut self, id: &str, result: Result<bool>) {
        match result {
            Ok(_) => self.users.retain(|user| user.id != id),
            Err(e) => {
                error!(id, error = %e, "Failed to delete user");
                self.error = Some(DELETE_ERROR_MESSAGE.to_string());
            }
        }
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }
}

fn error_message(e: &anyhow::Error) -> String {
    let message = e.to_string();
    if message.trim().is_empty() {
        GENERIC_ERROR_MESSAGE.to_string()
    } else {
        message
    }
}
