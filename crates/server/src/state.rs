//! Shared application state for the HTTP server.

use services::AppServices;

/// Services handed to every handler. Built once by the composition root.
#[derive(Clone)]
pub struct AppState {
    pub services: AppServices,
}

impl AppState {
    #[must_use]
    pub fn new(services: AppServices) -> Self {
        Self { services }
    }
}
