//! JSON REST handlers for single components and discovery listings.

use std::collections::BTreeSet;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::http::header::HOST;
use serde::Serialize;

use switchyard_domain::component::{ComponentKind, ComponentSummary};
use switchyard_domain::id::ComponentId;
use switchyard_domain::message::{Params, Payload, Query as RequestQuery};

use crate::error::ApiError;
use crate::state::{AppState, WEB_SOURCE};

/// Discovery entry with a link back to the component's REST page.
#[derive(Debug, Serialize)]
pub struct ComponentLink {
    pub ff_id: ComponentId,
    pub alias: String,
    pub title: String,
    pub rest_url: String,
}

fn rest_url(headers: &HeaderMap, id: &ComponentId) -> String {
    let host = headers
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("localhost");
    format!("http://{host}/api/rest/ff_id/{id}")
}

fn links(headers: &HeaderMap, summaries: Vec<ComponentSummary>) -> Json<Vec<ComponentLink>> {
    Json(
        summaries
            .into_iter()
            .map(|summary| ComponentLink {
                rest_url: rest_url(headers, &summary.id),
                ff_id: summary.id,
                alias: summary.alias,
                title: summary.title,
            })
            .collect(),
    )
}

fn with_rest_url(headers: &HeaderMap, id: &ComponentId, mut view: Payload) -> Json<Payload> {
    view.insert("rest_url", rest_url(headers, id));
    Json(view)
}

/// `GET /api/rest/components`
pub async fn list_devices(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<Vec<ComponentLink>> {
    let kinds = BTreeSet::from([ComponentKind::Device]);
    links(&headers, state.hub.list_components(Some(&kinds)))
}

/// `GET /api/rest/rooms`
pub async fn list_rooms(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<Vec<ComponentLink>> {
    let kinds = BTreeSet::from([ComponentKind::Room]);
    links(&headers, state.hub.list_components(Some(&kinds)))
}

/// `GET /api/rest/routines`
pub async fn list_routines(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<Vec<ComponentLink>> {
    links(&headers, state.hub.list_routines())
}

/// `GET /api/rest/ff_id/{id}` — the component's `INFO` view.
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Payload>, ApiError> {
    let id = ComponentId::from(id);
    let view = state
        .hub
        .submit_request(id.clone(), WEB_SOURCE, RequestQuery::Info, Params::new(), None)
        .await?;
    Ok(with_rest_url(&headers, &id, view))
}

/// `GET /api/rest/ff_id/{id}/action?command=ON&level=40` or
/// `?request=STATE`.
///
/// A command answers with the component's refreshed `INFO` view; a request
/// answers with its payload. Remaining query pairs become parameters.
pub async fn action(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> Result<Json<Payload>, ApiError> {
    let id = ComponentId::from(id);
    let mut command = None;
    let mut request = None;
    let mut source = None;
    let mut rest = Vec::new();
    for (key, value) in pairs {
        match key.as_str() {
            "command" => command = Some(value),
            "request" => request = Some(value),
            "source" => source = Some(value),
            _ => rest.push((key, value)),
        }
    }
    let source = source.as_deref().unwrap_or(WEB_SOURCE);
    let params = Params::from_query_pairs(rest);

    if let Some(action) = command {
        state
            .hub
            .submit_command(id.clone(), source, action, params)
            .await?;
        let view = state
            .hub
            .submit_request(id.clone(), source, RequestQuery::Info, Params::new(), None)
            .await?;
        return Ok(with_rest_url(&headers, &id, view));
    }
    if let Some(query) = request {
        let payload = state
            .hub
            .submit_request(id, source, query, params, None)
            .await?;
        return Ok(Json(payload));
    }
    Err(ApiError::BadRequest(
        "expected a `command` or `request` query parameter".to_string(),
    ))
}

/// `GET /api/rest/ff_id/{id}/sensors`
pub async fn sensors(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Payload>, ApiError> {
    let payload = state
        .hub
        .submit_request(
            id,
            WEB_SOURCE,
            RequestQuery::Sensors,
            Params::from_query_pairs(pairs),
            None,
        )
        .await?;
    Ok(Json(payload))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::test_support::{get, hub_with_lamps};

    #[tokio::test]
    async fn should_list_devices_with_rest_url() {
        let (status, body) = get(hub_with_lamps(), "/api/rest/components").await;
        assert_eq!(status, StatusCode::OK);
        let devices = body.as_array().unwrap();
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0]["ff_id"], "lamp.one");
        assert_eq!(
            devices[0]["rest_url"],
            "http://hub.test/api/rest/ff_id/lamp.one"
        );
    }

    #[tokio::test]
    async fn should_return_info_view_for_component() {
        let (status, body) = get(hub_with_lamps(), "/api/rest/ff_id/lamp.one").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"], "off");
        assert!(body["rest_url"].is_string());
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_component() {
        let (status, body) = get(hub_with_lamps(), "/api/rest/ff_id/ghost").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("ghost"));
    }

    #[tokio::test]
    async fn should_run_command_and_return_refreshed_view() {
        let hub = hub_with_lamps();
        let (status, body) = get(hub.clone(), "/api/rest/ff_id/lamp.one/action?command=toggle").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"], "on");

        let (_, state) = get(hub, "/api/rest/ff_id/lamp.one/action?request=STATE").await;
        assert_eq!(state, json!({"state": "on"}));
    }

    #[tokio::test]
    async fn should_reject_unsupported_command() {
        let (status, _) = get(hub_with_lamps(), "/api/rest/ff_id/lamp.one/action?command=DIM").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn should_require_command_or_request() {
        let (status, body) = get(hub_with_lamps(), "/api/rest/ff_id/lamp.one/action").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn should_map_handler_failure_to_bad_gateway() {
        let (status, _) = get(hub_with_lamps(), "/api/rest/ff_id/lamp.one/sensors").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn should_list_empty_rooms_and_routines() {
        let (_, rooms) = get(hub_with_lamps(), "/api/rest/rooms").await;
        assert_eq!(rooms, Value::Array(Vec::new()));
        let (_, routines) = get(hub_with_lamps(), "/api/rest/routines").await;
        assert_eq!(routines, Value::Array(Vec::new()));
    }
}
