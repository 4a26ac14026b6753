//! Hub-wide views: status, every component's view, voice-assistant devices.

use std::collections::BTreeSet;

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;

use switchyard_app::hub::HubStatus;
use switchyard_domain::component::ComponentKind;
use switchyard_domain::message::{Payload, Query as RequestQuery};

use crate::state::{AppState, WEB_SOURCE};

#[derive(Debug, Deserialize)]
pub struct SourceParam {
    pub source: Option<String>,
}

impl SourceParam {
    fn source(&self) -> &str {
        self.source.as_deref().unwrap_or(WEB_SOURCE)
    }
}

/// `GET /api/status`
pub async fn get(
    State(state): State<AppState>,
    Query(param): Query<SourceParam>,
) -> Json<HubStatus> {
    Json(state.hub.status(param.source()).await)
}

/// `GET /api/status/all_components` — `INFO` view of every component.
pub async fn all_components(
    State(state): State<AppState>,
    Query(param): Query<SourceParam>,
) -> Json<Vec<Payload>> {
    Json(
        state
            .hub
            .collect_payloads(param.source(), &RequestQuery::Info, None)
            .await,
    )
}

/// `GET /api/alexa_home_devices` — devices that expose an alexa view.
pub async fn alexa_devices(
    State(state): State<AppState>,
    Query(param): Query<SourceParam>,
) -> Json<Vec<Payload>> {
    let kinds = BTreeSet::from([ComponentKind::Device]);
    Json(
        state
            .hub
            .collect_payloads(param.source(), &RequestQuery::AlexaView, Some(&kinds))
            .await,
    )
}
