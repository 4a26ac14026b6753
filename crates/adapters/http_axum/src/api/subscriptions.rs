//! Live subscription listing.

use axum::Json;
use axum::extract::State;

use switchyard_domain::subscription::SubscriptionDescriptor;

use crate::state::AppState;

/// `GET /api/subscriptions`
pub async fn list(State(state): State<AppState>) -> Json<Vec<SubscriptionDescriptor>> {
    Json(state.hub.list_subscriptions())
}
