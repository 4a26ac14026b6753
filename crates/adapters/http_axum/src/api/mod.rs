//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod components;
#[allow(clippy::missing_errors_doc)]
pub mod sse;
pub mod status;
pub mod subscriptions;

use axum::Router;
use axum::routing::get;

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Discovery
        .route("/rest/components", get(components::list_devices))
        .route("/rest/rooms", get(components::list_rooms))
        .route("/rest/routines", get(components::list_routines))
        // Single component
        .route("/rest/ff_id/{id}", get(components::get))
        .route("/rest/ff_id/{id}/action", get(components::action))
        .route("/rest/ff_id/{id}/sensors", get(components::sensors))
        // Hub-wide views
        .route("/status", get(status::get))
        .route("/status/all_components", get(status::all_components))
        .route("/alexa_home_devices", get(status::alexa_devices))
        // Bus
        .route("/subscriptions", get(subscriptions::list))
        .route("/events/stream", get(sse::stream))
}
