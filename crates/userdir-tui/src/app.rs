//! Application state management for userdir.
//!
//! `App` owns the directory view state, UI state (selection, overlays, status
//! line) and the channel that background I/O tasks report back on. All I/O
//! runs in spawned tasks so the UI keeps drawing while a refresh is in flight.

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use userdir_core::directory::{DirectoryService, DirectoryState, RefreshOutcome, RefreshTicket};
use userdir_core::{ApiClient, Config, JsonUserStore, UserRecord};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// At most one load, one refresh and a handful of deletes are ever in flight.
const CHANNEL_BUFFER_SIZE: usize = 16;

/// Number of card rows to move on page up/down
pub const PAGE_SCROLL_ROWS: usize = 3;

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent back from spawned I/O tasks.
enum DirectoryEvent {
    /// Local store read at startup
    CacheLoaded(Result<Vec<UserRecord>>),
    /// A refresh finished (or failed) for the given generation
    Refreshed(RefreshTicket, Result<RefreshOutcome>),
    /// A delete finished for the given id
    Deleted(String, Result<bool>),
}

/// Open the on-disk user table configured for this run
pub fn open_store(config: &Config) -> Result<Arc<JsonUserStore>> {
    let data_dir = config.data_dir()?;
    debug!(?data_dir, "Data directory configured");
    Ok(Arc::new(JsonUserStore::open(data_dir)?))
}

/// Wire the randomuser.me client and the given store into a service
pub fn build_service(config: &Config, store: Arc<JsonUserStore>) -> Result<DirectoryService> {
    let api = ApiClient::from_config(config)?;
    Ok(DirectoryService::new(Arc::new(api), store))
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    service: DirectoryService,

    /// Loading flag, error banner and users shown on screen
    pub directory: DirectoryState,

    // UI State
    pub state: AppState,
    pub selection: usize,
    /// Cards per row at the last draw
    pub grid_columns: usize,
    pub status_message: Option<String>,
    pub last_synced: Option<DateTime<Utc>>,
    /// Frame counter, drives the loading spinner
    pub tick: usize,

    // Background task channel
    event_rx: mpsc::Receiver<DirectoryEvent>,
    event_tx: mpsc::Sender<DirectoryEvent>,
}

impl App {
    /// Create the application against the configured API and on-disk store
    pub async fn new(config: &Config) -> Result<Self> {
        let store = open_store(config)?;
        let last_synced = match store.saved_at().await {
            Ok(at) => at,
            Err(e) => {
                warn!(error = %e, "Could not read user table timestamp");
                None
            }
        };
        let service = build_service(config, store)?;

        let mut app = Self::with_service(service);
        app.last_synced = last_synced;
        Ok(app)
    }

    /// Create the application around an already-built service
    pub fn with_service(service: DirectoryService) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        Self {
            service,
            directory: DirectoryState::new(),
            state: AppState::Normal,
            selection: 0,
            grid_columns: 1,
            status_message: None,
            last_synced: None,
            tick: 0,
            event_rx: rx,
            event_tx: tx,
        }
    }

    // =========================================================================
    // Background Operations
    // =========================================================================

    /// Helper to send task results, logging any channel errors
    async fn send_event(tx: &mpsc::Sender<DirectoryEvent>, event: DirectoryEvent) {
        if let Err(e) = tx.send(event).await {
            error!(error = %e, "Failed to send directory event - channel closed");
        }
    }

    /// Read the local store in the background. A refresh follows if it is
    /// empty or unreadable.
    pub fn start_initial_load(&mut self) {
        info!("Checking local store for users");
        let service = self.service.clone();
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            let result = service.load_cached().await;
            Self::send_event(&tx, DirectoryEvent::CacheLoaded(result)).await;
        });

        self.status_message = Some("Loading users...".to_string());
    }

    /// Replace the stored users with a fresh batch. Ignored while a refresh
    /// is already running.
    pub fn refresh(&mut self) {
        if self.directory.loading {
            debug!("Refresh requested while loading, ignoring");
            return;
        }

        let ticket = self.service.begin_refresh();
        self.directory.start_refresh(ticket);

        let service = self.service.clone();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = service.refresh(ticket).await;
            Self::send_event(&tx, DirectoryEvent::Refreshed(ticket, result)).await;
        });

        self.status_message = Some("Fetching users...".to_string());
    }

    /// Delete the selected user from the store and the view
    pub fn delete_selected(&mut self) {
        if self.directory.loading {
            return;
        }
        let Some(user) = self.selected_user() else {
            return;
        };
        let id = user.id.clone();
        info!(id = %id, name = %user.full_name(), "Deleting user");

        let service = self.service.clone();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = service.delete(&id).await;
            Self::send_event(&tx, DirectoryEvent::Deleted(id, result)).await;
        });
    }

    /// Check for completed background tasks and process results
    pub fn check_background_tasks(&mut self) {
        // Collect all pending results first to avoid borrow conflicts
        let mut events = Vec::new();
        while let Ok(event) = self.event_rx.try_recv() {
            events.push(event);
        }

        for event in events {
            self.process_event(event);
        }
    }

    /// Wait for the next background result and apply it
    #[cfg(test)]
    pub async fn wait_for_background_task(&mut self) {
        if let Some(event) = self.event_rx.recv().await {
            self.process_event(event);
        }
    }

    fn process_event(&mut self, event: DirectoryEvent) {
        match event {
            DirectoryEvent::CacheLoaded(result) => {
                // A refresh already owns the users and error state
                if self.directory.refresh_started() {
                    debug!("Refresh started before the local store was read, ignoring cached users");
                    return;
                }
                let needs_refresh = self.directory.finish_initial_load(result);
                if needs_refresh {
                    self.refresh();
                } else {
                    self.status_message = None;
                }
            }
            DirectoryEvent::Refreshed(ticket, result) => {
                let applied = matches!(result, Ok(RefreshOutcome::Applied(_)));
                self.directory.finish_refresh(ticket, result);
                if self.directory.loading {
                    // A newer refresh is still running
                    return;
                }
                if applied && self.directory.error.is_none() {
                    self.last_synced = Some(Utc::now());
                    self.selection = 0;
                    self.status_message =
                        Some(format!("Loaded {} users", self.directory.users.len()));
                } else {
                    self.status_message = None;
                }
            }
            DirectoryEvent::Deleted(id, result) => {
                let name = self
                    .directory
                    .users
                    .iter()
                    .find(|u| u.id == id)
                    .map(|u| u.full_name());
                let succeeded = result.is_ok();
                self.directory.finish_delete(&id, result);
                if succeeded {
                    if let Some(name) = name {
                        self.status_message = Some(format!("Deleted {}", name));
                    }
                }
            }
        }
        self.clamp_selection();
    }

    // =========================================================================
    // Selection
    // =========================================================================

    pub fn selected_user(&self) -> Option<&UserRecord> {
        self.directory.users.get(self.selection)
    }

    fn clamp_selection(&mut self) {
        let len = self.directory.users.len();
        if len == 0 {
            self.selection = 0;
        } else if self.selection >= len {
            self.selection = len - 1;
        }
    }

    fn last_index(&self) -> usize {
        self.directory.users.len().saturating_sub(1)
    }

    pub fn select_next(&mut self) {
        self.selection = (self.selection + 1).min(self.last_index());
    }

    pub fn select_prev(&mut self) {
        self.selection = self.selection.saturating_sub(1);
    }

    /// Move one card row down, staying in the same column where possible
    pub fn select_down(&mut self) {
        self.move_down(self.grid_columns.max(1));
    }

    pub fn select_up(&mut self) {
        self.selection = self.selection.saturating_sub(self.grid_columns.max(1));
    }

    pub fn page_down(&mut self) {
        self.move_down(self.grid_columns.max(1) * PAGE_SCROLL_ROWS);
    }

    pub fn page_up(&mut self) {
        self.selection = self
            .selection
            .saturating_sub(self.grid_columns.max(1) * PAGE_SCROLL_ROWS);
    }

    pub fn select_first(&mut self) {
        self.selection = 0;
    }

    pub fn select_last(&mut self) {
        self.selection = self.last_index();
    }

    fn move_down(&mut self, step: usize) {
        let target = self.selection + step;
        if target <= self.last_index() {
            self.selection = target;
        } else {
            self.selection = self.last_index();
        }
    }

    /// Left text for the status bar
    pub fn status_text(&self) -> String {
        if let Some(ref msg) = self.status_message {
            return msg.clone();
        }
        match self.last_synced {
            Some(at) => format!("Synced {}", userdir_core::utils::format_age(at, Utc::now())),
            None => "Not synced yet".to_string(),
        }
    }
}
