use tracing::info;

use super::service::DirectoryService;
use super::state::DirectoryState;

/// Directory controller that awaits each operation inline.
///
/// Holds the service and the view state together; every operation ends with
/// the state updated and never returns an error: failures land in
/// `state().error`.
pub struct Directory {
    service: DirectoryService,
    state: DirectoryState,
}

impl Directory {
    pub fn new(service: DirectoryService) -> Self {
        Self {
            service,
            state: DirectoryState::new(),
        }
    }

    pub fn state(&self) -> &DirectoryState {
        &self.state
    }

    pub fn service(&self) -> &DirectoryService {
        &self.service
    }

    /// Show cached users, or fetch a batch if there are none (or the store
    /// could not be read).
    pub async fn initial_load(&mut self) {
        let cached = self.service.load_cached().await;
        if self.state.finish_initial_load(cached) {
            info!("No usable cached users, fetching a fresh batch");
            self.refresh().await;
        }
    }

    /// Discard cached users and replace them with a fresh batch
    pub async fn refresh(&mut self) {
        let ticket = self.service.begin_refresh();
        self.state.start_refresh(ticket);
        let result = self.service.refresh(ticket).await;
        self.state.finish_refresh(ticket, result);
    }

    /// Remove one user from the store and the view
    pub async fn delete(&mut self, id: &str) {
        let result = self.service.delete(id).await;
        self.state.finish_delete(id, result);
    }
}
