//! Shared application state for axum handlers.

use std::sync::Arc;

use switchyard_app::hub::Hub;

/// Source tag attached to every message built from an HTTP call.
pub const WEB_SOURCE: &str = "web_api";

/// Application state shared across all axum handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub hub: Arc<Hub>,
}

impl AppState {
    pub fn new(hub: Arc<Hub>) -> Self {
        Self { hub }
    }
}
