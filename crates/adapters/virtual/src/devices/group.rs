//! Light group — one switchable, dimmable device backed by member lights.
//!
//! Every command is forwarded to the members through the dispatcher, so the
//! group works with any component that accepts the same vocabulary. The
//! state lock is held across the forwarding, so commands to one group run
//! one at a time.

use async_trait::async_trait;
use tokio::sync::Mutex;

use switchyard_app::dispatcher::Dispatcher;
use switchyard_app::hub::EventEmitter;
use switchyard_app::ports::Component;
use switchyard_domain::component::{ComponentKind, ComponentMetadata, ComponentSummary};
use switchyard_domain::error::{HandlerError, ValidationError};
use switchyard_domain::event::EventKind;
use switchyard_domain::id::ComponentId;
use switchyard_domain::message::{Ack, Action, Command, Params, Payload, Query, Request};

use crate::fan_out::fan_out;
use crate::view::{alexa_view, component_view, state_name};

#[derive(Debug, Clone, Copy)]
struct GroupState {
    on: bool,
    level: i64,
}

pub struct LightGroup {
    summary: ComponentSummary,
    events: EventEmitter,
    dispatcher: Dispatcher,
    members: Vec<ComponentId>,
    state: Mutex<GroupState>,
}

impl LightGroup {
    pub const PACKAGE: &'static str = "virtual.light_group";

    /// # Errors
    ///
    /// Returns [`ValidationError`] when `id` or `alias` is empty.
    pub fn metadata(id: &str, alias: &str) -> Result<ComponentMetadata, ValidationError> {
        ComponentMetadata::builder()
            .id(id)
            .alias(alias)
            .title("Light Group")
            .kind(ComponentKind::Device)
            .package(Self::PACKAGE)
            .commands([Action::On, Action::Off, Action::Toggle, Action::Level])
            .requests([Query::Info, Query::State, Query::Level, Query::AlexaView])
            .build()
    }

    pub fn new(
        summary: ComponentSummary,
        events: EventEmitter,
        dispatcher: Dispatcher,
        members: Vec<ComponentId>,
    ) -> Self {
        Self {
            summary,
            events,
            dispatcher,
            members,
            state: Mutex::new(GroupState {
                on: false,
                level: 100,
            }),
        }
    }

}

#[async_trait]
impl Component for LightGroup {
    async fn handle_command(&self, command: &Command) -> Result<Ack, HandlerError> {
        let mut state = self.state.lock().await;
        let before = *state;
        // TOGGLE is resolved against the group's own state so members that
        // drifted apart end up in sync.
        let (forwarded, params, after) = match command.action() {
            Action::On => (Action::On, Params::new(), GroupState { on: true, ..before }),
            Action::Off => (Action::Off, Params::new(), GroupState { on: false, ..before }),
            Action::Toggle => {
                let on = !before.on;
                let action = if on { Action::On } else { Action::Off };
                (action, Params::new(), GroupState { on, ..before })
            }
            Action::Level => {
                let level = command.params().require_i64("level")?;
                (
                    Action::Level,
                    command.params().clone(),
                    GroupState {
                        on: level > 0,
                        level,
                    },
                )
            }
            other => return Err(HandlerError::UnsupportedAction(other.to_string())),
        };

        fan_out(
            &self.dispatcher,
            &self.summary.id,
            &self.members,
            &forwarded,
            &params,
        )
        .await?;

        *state = after;
        if before.on != after.on {
            self.events.publish_event(
                EventKind::state_changed(),
                Payload::object().with("state", state_name(after.on)),
            );
        }
        if before.level != after.level {
            self.events.publish_event(
                EventKind::level_changed(),
                Payload::object().with("level", after.level),
            );
        }
        Ok(Ack::for_command(command))
    }

    async fn handle_request(&self, request: &Request) -> Result<Payload, HandlerError> {
        let state = *self.state.lock().await;
        match request.query() {
            Query::Info => {
                let members: Vec<&str> = self.members.iter().map(ComponentId::as_str).collect();
                Ok(component_view(
                    &self.summary,
                    Payload::object()
                        .with("state", state_name(state.on))
                        .with("level", state.level)
                        .with("members", members),
                ))
            }
            Query::State => Ok(Payload::object().with("state", state_name(state.on))),
            Query::Level => Ok(Payload::object().with("level", state.level)),
            Query::AlexaView => Ok(alexa_view(&self.summary, "LIGHT", state.on)),
            other => Err(HandlerError::UnsupportedAction(other.to_string())),
        }
    }
}
