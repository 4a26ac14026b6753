//! Virtual multisensor — temperature, humidity and motion.
//!
//! Readings are pushed in with the custom `REPORT` command (any subset of
//! `temperature`, `humidity`, `motion`), which publishes `sensor_reading`.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use switchyard_app::hub::EventEmitter;
use switchyard_app::ports::Component;
use switchyard_domain::component::{ComponentKind, ComponentMetadata, ComponentSummary};
use switchyard_domain::error::{HandlerError, ValidationError};
use switchyard_domain::event::EventKind;
use switchyard_domain::message::{Ack, Action, Command, Payload, Query, Request};

use crate::view::component_view;

pub const REPORT: &str = "REPORT";

#[derive(Debug, Clone, Copy, PartialEq)]
struct Readings {
    temperature: f64,
    humidity: f64,
    motion: bool,
}

impl Readings {
    fn to_payload(self) -> Payload {
        Payload::object()
            .with("temperature", self.temperature)
            .with("humidity", self.humidity)
            .with("motion", self.motion)
    }
}

/// A simulated sensor that only changes when told to.
pub struct VirtualSensor {
    summary: ComponentSummary,
    events: EventEmitter,
    readings: Mutex<Readings>,
}

impl VirtualSensor {
    pub const PACKAGE: &'static str = "virtual.sensor";

    /// # Errors
    ///
    /// Returns [`ValidationError`] when `id` or `alias` is empty.
    pub fn metadata(id: &str, alias: &str) -> Result<ComponentMetadata, ValidationError> {
        ComponentMetadata::builder()
            .id(id)
            .alias(alias)
            .title("Virtual Multisensor")
            .kind(ComponentKind::Device)
            .package(Self::PACKAGE)
            .command(REPORT)
            .requests([Query::Info, Query::State, Query::Sensors])
            .build()
    }

    pub fn new(summary: ComponentSummary, events: EventEmitter) -> Self {
        Self {
            summary,
            events,
            readings: Mutex::new(Readings {
                temperature: 21.5,
                humidity: 40.0,
                motion: false,
            }),
        }
    }

    fn lock_readings(&self) -> MutexGuard<'_, Readings> {
        self.readings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn report(&self, command: &Command) -> Result<Readings, HandlerError> {
        let params = command.params();
        // Validate everything before touching state.
        let temperature = params
            .contains_key("temperature")
            .then(|| params.require_f64("temperature"))
            .transpose()?;
        let humidity = params
            .contains_key("humidity")
            .then(|| params.require_f64("humidity"))
            .transpose()?;
        let motion = params
            .contains_key("motion")
            .then(|| params.require_bool("motion"))
            .transpose()?;

        let mut readings = self.lock_readings();
        if let Some(temperature) = temperature {
            readings.temperature = temperature;
        }
        if let Some(humidity) = humidity {
            readings.humidity = humidity;
        }
        if let Some(motion) = motion {
            readings.motion = motion;
        }
        Ok(*readings)
    }
}

#[async_trait]
impl Component for VirtualSensor {
    async fn handle_command(&self, command: &Command) -> Result<Ack, HandlerError> {
        match command.action() {
            Action::Custom(name) if name == REPORT => {
                let readings = self.report(command)?;
                self.events
                    .publish_event(EventKind::sensor_reading(), readings.to_payload());
                Ok(Ack::for_command(command))
            }
            other => Err(HandlerError::UnsupportedAction(other.to_string())),
        }
    }

    async fn handle_request(&self, request: &Request) -> Result<Payload, HandlerError> {
        let readings = *self.lock_readings();
        match request.query() {
            Query::Info => Ok(component_view(&self.summary, readings.to_payload())),
            Query::State => Ok(Payload::object().with("motion", readings.motion)),
            Query::Sensors => Ok(readings.to_payload()),
            other => Err(HandlerError::UnsupportedAction(other.to_string())),
        }
    }
}
