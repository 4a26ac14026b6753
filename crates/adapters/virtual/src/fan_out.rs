//! Forwarding a command to several members through the dispatcher.

use futures::future::join_all;

use switchyard_app::dispatcher::Dispatcher;
use switchyard_domain::error::HandlerError;
use switchyard_domain::id::ComponentId;
use switchyard_domain::message::{Action, Command, Params};

/// Send `action` to every member concurrently.
///
/// All members are tried; the first failure (in member order) is returned
/// as [`HandlerError::Downstream`].
pub(crate) async fn fan_out(
    dispatcher: &Dispatcher,
    source: &ComponentId,
    members: &[ComponentId],
    action: &Action,
    params: &Params,
) -> Result<(), HandlerError> {
    let calls = members.iter().map(|member| {
        let command = Command::new(member.clone(), source.as_str(), action.clone())
            .with_params(params.clone());
        dispatcher.send_command(command)
    });

    let mut first_failure = None;
    for (member, result) in members.iter().zip(join_all(calls).await) {
        if let Err(error) = result {
            tracing::warn!(
                component_id = %source,
                member = %member,
                error = %error,
                "member rejected forwarded command"
            );
            first_failure.get_or_insert(HandlerError::Downstream {
                target: member.clone(),
                source: Box::new(error),
            });
        }
    }
    first_failure.map_or(Ok(()), Err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex, PoisonError};

    use async_trait::async_trait;
    use switchyard_app::ports::Component;
    use switchyard_app::registry::ComponentHandle;
    use switchyard_domain::component::{ComponentKind, ComponentMetadata};
    use switchyard_domain::message::{Ack, Payload, Request};

    use crate::testing::hub;

    /// Keeps every command it receives.
    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<Command>>,
    }

    #[async_trait]
    impl Component for Recorder {
        async fn handle_command(&self, command: &Command) -> Result<Ack, HandlerError> {
            self.seen
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(command.clone());
            Ok(Ack::for_command(command))
        }

        async fn handle_request(&self, _request: &Request) -> Result<Payload, HandlerError> {
            Err(HandlerError::NoData)
        }
    }

    #[tokio::test]
    async fn should_forward_action_and_params_from_the_group() {
        let hub = hub();
        let recorders: Vec<_> = ["m.1", "m.2"]
            .into_iter()
            .map(|id| {
                let recorder = Arc::new(Recorder::default());
                let metadata = ComponentMetadata::builder()
                    .id(id)
                    .alias(id)
                    .kind(ComponentKind::Device)
                    .commands([Action::Level])
                    .build()
                    .unwrap();
                hub.dispatcher()
                    .registry()
                    .register(ComponentHandle::new(metadata, recorder.clone()))
                    .unwrap();
                recorder
            })
            .collect();

        fan_out(
            hub.dispatcher(),
            &ComponentId::from("group.g"),
            &[ComponentId::from("m.1"), ComponentId::from("m.2")],
            &Action::Level,
            &Params::new().with("level", 40_i64),
        )
        .await
        .unwrap();

        for (recorder, id) in recorders.iter().zip(["m.1", "m.2"]) {
            let seen = recorder.seen.lock().unwrap().clone();
            assert_eq!(seen.len(), 1);
            assert_eq!(seen[0].target().as_str(), id);
            assert_eq!(seen[0].source(), "group.g");
            assert_eq!(seen[0].action(), &Action::Level);
            assert_eq!(seen[0].params().get_i64("level"), Some(40));
        }
    }
}
