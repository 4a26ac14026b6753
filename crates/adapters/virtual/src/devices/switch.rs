//! Virtual smart switch with a simulated power meter.
//!
//! Reports `watts`, `voltage` and `power_current` either together through
//! `SENSORS` or one at a time through the matching query name.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use switchyard_app::hub::EventEmitter;
use switchyard_app::ports::Component;
use switchyard_domain::component::{ComponentKind, ComponentMetadata, ComponentSummary};
use switchyard_domain::error::{HandlerError, ValidationError};
use switchyard_domain::event::EventKind;
use switchyard_domain::message::{Ack, Action, Command, Payload, Query, Request};

use crate::view::{alexa_view, component_view, state_name};

pub const WATTS: &str = "watts";
pub const VOLTAGE: &str = "voltage";
pub const POWER_CURRENT: &str = "power_current";

const LINE_VOLTAGE: f64 = 120.0;

/// A simulated smart plug drawing `load_watts` while on.
pub struct VirtualSmartSwitch {
    summary: ComponentSummary,
    events: EventEmitter,
    load_watts: f64,
    on: Mutex<bool>,
}

impl VirtualSmartSwitch {
    pub const PACKAGE: &'static str = "virtual.smart_switch";

    /// # Errors
    ///
    /// Returns [`ValidationError`] when `id` or `alias` is empty.
    pub fn metadata(id: &str, alias: &str) -> Result<ComponentMetadata, ValidationError> {
        ComponentMetadata::builder()
            .id(id)
            .alias(alias)
            .title("Virtual Smart Switch")
            .kind(ComponentKind::Device)
            .package(Self::PACKAGE)
            .commands([Action::On, Action::Off, Action::Toggle])
            .requests([
                Query::Info,
                Query::State,
                Query::Sensors,
                Query::AlexaView,
                Query::from(WATTS),
                Query::from(VOLTAGE),
                Query::from(POWER_CURRENT),
            ])
            .build()
    }

    pub fn new(summary: ComponentSummary, events: EventEmitter, load_watts: f64) -> Self {
        Self {
            summary,
            events,
            load_watts,
            on: Mutex::new(false),
        }
    }

    fn is_on(&self) -> bool {
        *self.on.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn watts(&self) -> f64 {
        if self.is_on() { self.load_watts } else { 0.0 }
    }

    /// Switch and announce under the same lock, so events reach subscribers
    /// in the order the changes were made.
    fn apply(&self, command: &Command) -> Result<(), HandlerError> {
        let mut on = self.on.lock().unwrap_or_else(PoisonError::into_inner);
        let before = *on;
        match command.action() {
            Action::On => *on = true,
            Action::Off => *on = false,
            Action::Toggle => *on = !*on,
            other => return Err(HandlerError::UnsupportedAction(other.to_string())),
        }
        if before != *on {
            self.events.publish_event(
                EventKind::state_changed(),
                Payload::object().with("state", state_name(*on)),
            );
        }
        Ok(())
    }

    fn readings(&self) -> Payload {
        let watts = self.watts();
        Payload::object()
            .with(WATTS, watts)
            .with(VOLTAGE, LINE_VOLTAGE)
            .with(POWER_CURRENT, watts / LINE_VOLTAGE)
    }
}

#[async_trait]
impl Component for VirtualSmartSwitch {
    async fn handle_command(&self, command: &Command) -> Result<Ack, HandlerError> {
        self.apply(command)?;
        Ok(Ack::for_command(command))
    }

    async fn handle_request(&self, request: &Request) -> Result<Payload, HandlerError> {
        match request.query() {
            Query::Info => {
                let mut fields = self.readings();
                fields.insert("state", state_name(self.is_on()));
                Ok(component_view(&self.summary, fields))
            }
            Query::State => Ok(Payload::object().with("state", state_name(self.is_on()))),
            Query::Sensors => Ok(self.readings()),
            Query::AlexaView => Ok(alexa_view(&self.summary, "SMARTPLUG", self.is_on())),
            Query::Custom(name) => match self.readings().get(name) {
                Some(value) => Ok(Payload::object().with(name.as_str(), value.clone())),
                None => Err(HandlerError::UnsupportedAction(name.clone())),
            },
            other => Err(HandlerError::UnsupportedAction(other.to_string())),
        }
    }
}
