//! Fixtures shared by the handler tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request as HttpRequest, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use switchyard_app::dispatcher::DispatcherConfig;
use switchyard_app::hub::Hub;
use switchyard_app::location::LocationContext;
use switchyard_app::ports::Component;
use switchyard_domain::component::{ComponentKind, ComponentMetadata};
use switchyard_domain::error::HandlerError;
use switchyard_domain::message::{Ack, Action, Command, Payload, Query, Request};

use crate::state::AppState;

/// On/off lamp; only `lamp.one` has an alexa view, sensors always fail.
struct Lamp {
    id: &'static str,
    on: Mutex<bool>,
}

#[async_trait]
impl Component for Lamp {
    async fn handle_command(&self, command: &Command) -> Result<Ack, HandlerError> {
        let mut on = self.on.lock().unwrap();
        match command.action() {
            Action::On => *on = true,
            Action::Off => *on = false,
            Action::Toggle => *on = !*on,
            other => return Err(HandlerError::UnsupportedAction(other.to_string())),
        }
        Ok(Ack::for_command(command))
    }

    async fn handle_request(&self, request: &Request) -> Result<Payload, HandlerError> {
        let state = if *self.on.lock().unwrap() { "on" } else { "off" };
        match request.query() {
            Query::Info => Ok(Payload::object().with("ff_id", self.id).with("state", state)),
            Query::State => Ok(Payload::object().with("state", state)),
            Query::AlexaView if self.id == "lamp.one" => {
                Ok(Payload::object().with("name", self.id))
            }
            Query::AlexaView => Err(HandlerError::NoData),
            Query::Sensors => Err(HandlerError::Failed("no sensors attached".to_string())),
            other => Err(HandlerError::UnsupportedAction(other.to_string())),
        }
    }
}

pub fn hub_with_lamps() -> Arc<Hub> {
    let hub = Hub::new(DispatcherConfig::default(), Arc::new(LocationContext::utc()));
    for id in ["lamp.one", "lamp.two"] {
        let metadata = ComponentMetadata::builder()
            .id(id)
            .alias(id)
            .kind(ComponentKind::Device)
            .commands([Action::On, Action::Off, Action::Toggle])
            .requests([Query::Info, Query::State, Query::AlexaView, Query::Sensors])
            .build()
            .unwrap();
        let lamp = Lamp {
            id,
            on: Mutex::new(false),
        };
        hub.install(metadata, Arc::new(lamp)).unwrap();
    }
    Arc::new(hub)
}

/// Issue `GET uri` against a fresh router and decode the JSON body.
pub async fn get(hub: Arc<Hub>, uri: &str) -> (StatusCode, serde_json::Value) {
    let app = crate::router::build(AppState::new(hub));
    let response = app
        .oneshot(
            HttpRequest::builder()
                .uri(uri)
                .header("host", "hub.test")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, body)
}
