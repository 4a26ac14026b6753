//! Room — groups components by location and switches them together.

use async_trait::async_trait;

use switchyard_app::dispatcher::Dispatcher;
use switchyard_app::ports::Component;
use switchyard_domain::component::{ComponentKind, ComponentMetadata, ComponentSummary};
use switchyard_domain::error::{HandlerError, ValidationError};
use switchyard_domain::id::ComponentId;
use switchyard_domain::message::{Ack, Action, Command, Payload, Query, Request};

use crate::fan_out::fan_out;
use crate::view::component_view;

pub struct Room {
    summary: ComponentSummary,
    dispatcher: Dispatcher,
    members: Vec<ComponentId>,
}

impl Room {
    pub const PACKAGE: &'static str = "virtual.room";

    /// # Errors
    ///
    /// Returns [`ValidationError`] when `id` or `alias` is empty.
    pub fn metadata(id: &str, alias: &str) -> Result<ComponentMetadata, ValidationError> {
        ComponentMetadata::builder()
            .id(id)
            .alias(alias)
            .title("Room")
            .kind(ComponentKind::Room)
            .package(Self::PACKAGE)
            .commands([Action::On, Action::Off])
            .request(Query::Info)
            .build()
    }

    pub fn new(summary: ComponentSummary, dispatcher: Dispatcher, members: Vec<ComponentId>) -> Self {
        Self {
            summary,
            dispatcher,
            members,
        }
    }
}

#[async_trait]
impl Component for Room {
    async fn handle_command(&self, command: &Command) -> Result<Ack, HandlerError> {
        match command.action() {
            action @ (Action::On | Action::Off) => {
                fan_out(
                    &self.dispatcher,
                    &self.summary.id,
                    &self.members,
                    action,
                    command.params(),
                )
                .await?;
                Ok(Ack::for_command(command))
            }
            other => Err(HandlerError::UnsupportedAction(other.to_string())),
        }
    }

    async fn handle_request(&self, request: &Request) -> Result<Payload, HandlerError> {
        match request.query() {
            Query::Info => {
                let members: Vec<&str> = self.members.iter().map(ComponentId::as_str).collect();
                Ok(component_view(
                    &self.summary,
                    Payload::object().with("members", members),
                ))
            }
            other => Err(HandlerError::UnsupportedAction(other.to_string())),
        }
    }
}
