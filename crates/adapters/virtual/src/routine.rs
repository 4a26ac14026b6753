//! Routine — a named list of commands run on `ON`.
//!
//! Steps run in order through the dispatcher. A failing step is logged and
//! counted; the remaining steps still run. Each run publishes
//! `routine_executed` with the step and failure counts.

use async_trait::async_trait;

use switchyard_app::dispatcher::Dispatcher;
use switchyard_app::hub::EventEmitter;
use switchyard_app::ports::Component;
use switchyard_domain::component::{ComponentKind, ComponentMetadata, ComponentSummary};
use switchyard_domain::error::{HandlerError, ValidationError};
use switchyard_domain::event::EventKind;
use switchyard_domain::message::{Ack, Action, Command, Payload, Query, Request};

use crate::view::component_view;

pub struct Routine {
    summary: ComponentSummary,
    events: EventEmitter,
    dispatcher: Dispatcher,
    steps: Vec<Command>,
}

impl Routine {
    /// Package prefix; listings treat automations under it as routines.
    pub const PACKAGE: &'static str = "routine.virtual";

    /// # Errors
    ///
    /// Returns [`ValidationError`] when `id` or `alias` is empty.
    pub fn metadata(id: &str, alias: &str) -> Result<ComponentMetadata, ValidationError> {
        ComponentMetadata::builder()
            .id(id)
            .alias(alias)
            .title("Routine")
            .kind(ComponentKind::Automation)
            .package(Self::PACKAGE)
            .command(Action::On)
            .request(Query::Info)
            .build()
    }

    pub fn new(
        summary: ComponentSummary,
        events: EventEmitter,
        dispatcher: Dispatcher,
        steps: Vec<Command>,
    ) -> Self {
        Self {
            summary,
            events,
            dispatcher,
            steps,
        }
    }

    async fn run(&self) -> usize {
        let mut failed = 0;
        for step in &self.steps {
            let command = Command::new(
                step.target().clone(),
                self.summary.id.as_str(),
                step.action().clone(),
            )
            .with_params(step.params().clone());
            if let Err(error) = self.dispatcher.send_command(command).await {
                failed += 1;
                tracing::warn!(
                    routine = %self.summary.id,
                    target = %step.target(),
                    action = %step.action(),
                    error = %error,
                    "routine step failed"
                );
            }
        }
        failed
    }
}

#[async_trait]
impl Component for Routine {
    async fn handle_command(&self, command: &Command) -> Result<Ack, HandlerError> {
        match command.action() {
            Action::On => {
                let failed = self.run().await;
                tracing::info!(
                    routine = %self.summary.id,
                    steps = self.steps.len(),
                    failed,
                    "routine executed"
                );
                self.events.publish_event(
                    EventKind::routine_executed(),
                    Payload::object()
                        .with("steps", self.steps.len())
                        .with("failed", failed),
                );
                Ok(Ack::for_command(command))
            }
            other => Err(HandlerError::UnsupportedAction(other.to_string())),
        }
    }

    async fn handle_request(&self, request: &Request) -> Result<Payload, HandlerError> {
        match request.query() {
            Query::Info => {
                let steps: Vec<serde_json::Value> = self
                    .steps
                    .iter()
                    .map(|step| {
                        serde_json::json!({
                            "target": step.target(),
                            "action": step.action(),
                        })
                    })
                    .collect();
                Ok(component_view(
                    &self.summary,
                    Payload::object().with("steps", steps),
                ))
            }
            other => Err(HandlerError::UnsupportedAction(other.to_string())),
        }
    }
}
