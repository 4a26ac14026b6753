//! Virtual light — `ON`, `OFF`, `TOGGLE` and `LEVEL` (0..=100).

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use switchyard_app::hub::EventEmitter;
use switchyard_app::ports::Component;
use switchyard_domain::component::{ComponentKind, ComponentMetadata, ComponentSummary};
use switchyard_domain::error::{HandlerError, ValidationError};
use switchyard_domain::event::EventKind;
use switchyard_domain::message::{Ack, Action, Command, Payload, Query, Request};

use crate::view::{alexa_view, component_view, state_name};

const FULL_LEVEL: i64 = 100;

#[derive(Debug, Clone, Copy)]
struct LightState {
    on: bool,
    level: i64,
}

/// A simulated dimmable light.
pub struct VirtualLight {
    summary: ComponentSummary,
    events: EventEmitter,
    state: Mutex<LightState>,
}

impl VirtualLight {
    pub const PACKAGE: &'static str = "virtual.light";

    /// # Errors
    ///
    /// Returns [`ValidationError`] when `id` or `alias` is empty.
    pub fn metadata(id: &str, alias: &str) -> Result<ComponentMetadata, ValidationError> {
        ComponentMetadata::builder()
            .id(id)
            .alias(alias)
            .title("Virtual Light")
            .kind(ComponentKind::Device)
            .package(Self::PACKAGE)
            .commands([Action::On, Action::Off, Action::Toggle, Action::Level])
            .requests([Query::Info, Query::State, Query::Level, Query::AlexaView])
            .build()
    }

    pub fn new(summary: ComponentSummary, events: EventEmitter) -> Self {
        Self {
            summary,
            events,
            state: Mutex::new(LightState {
                on: false,
                level: FULL_LEVEL,
            }),
        }
    }

    /// Change the state and announce it under the same lock, so events
    /// reach subscribers in the order the changes were made.
    fn apply(&self, command: &Command) -> Result<(), HandlerError> {
        let mut state = self.lock_state();
        let before = *state;
        match command.action() {
            Action::On => state.on = true,
            Action::Off => state.on = false,
            Action::Toggle => state.on = !state.on,
            Action::Level => {
                let level = command.params().require_i64("level")?;
                if !(0..=FULL_LEVEL).contains(&level) {
                    return Err(HandlerError::InvalidParam {
                        key: "level".to_string(),
                        expected: "an integer between 0 and 100",
                    });
                }
                state.level = level;
                state.on = level > 0;
            }
            other => return Err(HandlerError::UnsupportedAction(other.to_string())),
        }
        if before.on != state.on {
            self.events.publish_event(
                EventKind::state_changed(),
                Payload::object().with("state", state_name(state.on)),
            );
        }
        if before.level != state.level {
            self.events.publish_event(
                EventKind::level_changed(),
                Payload::object().with("level", state.level),
            );
        }
        Ok(())
    }

    fn lock_state(&self) -> MutexGuard<'_, LightState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Component for VirtualLight {
    async fn handle_command(&self, command: &Command) -> Result<Ack, HandlerError> {
        self.apply(command)?;
        Ok(Ack::for_command(command))
    }

    async fn handle_request(&self, request: &Request) -> Result<Payload, HandlerError> {
        let state = *self.lock_state();
        match request.query() {
            Query::Info => Ok(component_view(
                &self.summary,
                Payload::object()
                    .with("state", state_name(state.on))
                    .with("level", state.level),
            )),
            Query::State => Ok(Payload::object().with("state", state_name(state.on))),
            Query::Level => Ok(Payload::object().with("level", state.level)),
            Query::AlexaView => Ok(alexa_view(&self.summary, "LIGHT", state.on)
                .with("level", state.level)),
            other => Err(HandlerError::UnsupportedAction(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingPublisher;

    fn light() -> (VirtualLight, RecordingPublisher) {
        let recorder = RecordingPublisher::default();
        let metadata = VirtualLight::metadata("light.kitchen", "Kitchen Light").unwrap();
        let light = VirtualLight::new(metadata.summary(), recorder.emitter(&metadata));
        (light, recorder)
    }

    fn command(action: impl Into<Action>) -> Command {
        Command::new("light.kitchen", "test", action)
    }

    async fn state(light: &VirtualLight) -> serde_json::Value {
        light
            .handle_request(&Request::new("light.kitchen", "test", Query::State))
            .await
            .unwrap()
            .get("state")
            .cloned()
            .unwrap()
    }

    #[tokio::test]
    async fn should_default_to_off() {
        let (light, _) = light();
        assert_eq!(state(&light).await, "off");
    }

    #[tokio::test]
    async fn should_turn_on_and_publish_state_changed() {
        let (light, recorder) = light();
        light.handle_command(&command(Action::On)).await.unwrap();

        assert_eq!(state(&light).await, "on");
        let events = recorder.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::state_changed());
        assert_eq!(events[0].source.as_str(), "light.kitchen");
    }

    #[tokio::test]
    async fn should_not_publish_when_state_is_unchanged() {
        let (light, recorder) = light();
        light.handle_command(&command(Action::Off)).await.unwrap();
        assert!(recorder.events().is_empty());
    }

    #[tokio::test]
    async fn should_toggle_from_on_to_off() {
        let (light, _) = light();
        light.handle_command(&command(Action::On)).await.unwrap();
        light.handle_command(&command(Action::Toggle)).await.unwrap();
        assert_eq!(state(&light).await, "off");
    }

    #[tokio::test]
    async fn should_set_level_and_switch_on() {
        let (light, recorder) = light();
        light
            .handle_command(&command(Action::Level).with_param("level", 40_i64))
            .await
            .unwrap();

        let level = light
            .handle_request(&Request::new("light.kitchen", "test", Query::Level))
            .await
            .unwrap();
        assert_eq!(level.get("level"), Some(&serde_json::json!(40)));
        assert_eq!(state(&light).await, "on");
        assert_eq!(recorder.events().len(), 2);
    }

    #[tokio::test]
    async fn should_reject_level_out_of_range() {
        let (light, _) = light();
        let result = light
            .handle_command(&command(Action::Level).with_param("level", 140_i64))
            .await;
        assert!(matches!(result, Err(HandlerError::InvalidParam { .. })));
    }

    #[tokio::test]
    async fn should_require_level_param() {
        let (light, _) = light();
        let result = light.handle_command(&command(Action::Level)).await;
        assert_eq!(result, Err(HandlerError::MissingParam("level".to_string())));
    }

    #[tokio::test]
    async fn should_reject_unknown_action() {
        let (light, recorder) = light();
        let result = light.handle_command(&command("DIM")).await;
        assert_eq!(result, Err(HandlerError::UnsupportedAction("DIM".to_string())));
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn should_publish_state_changes_in_the_order_they_happen() {
        let (light, recorder) = light();
        let light = std::sync::Arc::new(light);

        let workers: Vec<_> = [Action::On, Action::Off, Action::On, Action::Off]
            .into_iter()
            .map(|action| {
                let light = std::sync::Arc::clone(&light);
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        futures::executor::block_on(light.handle_command(&command(action.clone())))
                            .unwrap();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let current = futures::executor::block_on(state(&light));
        let events = recorder.events();
        let announced: Vec<_> = events
            .iter()
            .filter(|event| event.kind == EventKind::state_changed())
            .map(|event| event.payload.get("state").cloned().unwrap())
            .collect();
        assert!(announced.windows(2).all(|pair| pair[0] != pair[1]));
        assert_eq!(announced.last(), Some(&current));
    }

    #[tokio::test]
    async fn should_describe_itself_in_info_view() {
        let (light, _) = light();
        let info = light
            .handle_request(&Request::new("light.kitchen", "test", Query::Info))
            .await
            .unwrap();
        assert_eq!(info.get("ff_id"), Some(&serde_json::json!("light.kitchen")));
        assert_eq!(info.get("alias"), Some(&serde_json::json!("Kitchen Light")));
        assert_eq!(info.get("type"), Some(&serde_json::json!("DEVICE")));
        assert_eq!(info.get("state"), Some(&serde_json::json!("off")));
    }
}
