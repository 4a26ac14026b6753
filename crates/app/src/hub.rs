//! Hub — the kernel's public surface.
//!
//! Bundles the registry, dispatcher, subscription bus and context feed
//! behind one handle that adapters (HTTP, voice, integrations) share.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::Stream;
use serde::Serialize;

use switchyard_domain::component::{ComponentKind, ComponentMetadata, ComponentSummary};
use switchyard_domain::context::{ContextSnapshot, Mode};
use switchyard_domain::error::{DispatchError, RegistryError, SwitchyardError};
use switchyard_domain::event::{Event, EventKind};
use switchyard_domain::id::{ComponentId, SubscriptionId};
use switchyard_domain::message::{Ack, Action, Command, Params, Payload, Query, Request};
use switchyard_domain::subscription::{SubscriptionDescriptor, SubscriptionFilter};
use switchyard_domain::time::TimeView;

use crate::dispatcher::{BroadcastPolicy, BroadcastReply, Dispatcher, DispatcherConfig};
use crate::event_bus::SubscriptionBus;
use crate::ports::{Component, ContextProvider, EventCallback, EventPublisher};
use crate::registry::{ComponentHandle, ComponentRegistry};

/// Publishing handle bound to one component's id and kind.
///
/// Handed out at install time; components keep it to announce state changes.
#[derive(Clone)]
pub struct EventEmitter {
    source: ComponentId,
    kind: ComponentKind,
    publisher: Arc<dyn EventPublisher>,
}

impl EventEmitter {
    pub fn new(source: ComponentId, kind: ComponentKind, publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            source,
            kind,
            publisher,
        }
    }

    #[must_use]
    pub fn source(&self) -> &ComponentId {
        &self.source
    }

    /// Publish an event from this component. Returns the number of
    /// subscriptions it was queued for.
    pub fn publish_event(&self, kind: EventKind, payload: impl Into<Payload>) -> usize {
        let event = Event::new(self.source.clone(), self.kind, kind, payload.into());
        self.publisher.publish(event)
    }
}

impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("source", &self.source)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Hub-wide status report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HubStatus {
    /// `INFO` payload of every device that answered.
    pub devices: Vec<Payload>,
    pub time: TimeView,
    pub is_dark: bool,
    pub mode: Mode,
    pub last_mode: Option<Mode>,
}

pub struct Hub {
    registry: Arc<ComponentRegistry>,
    dispatcher: Dispatcher,
    bus: Arc<SubscriptionBus>,
    context: Arc<dyn ContextProvider>,
}

impl Hub {
    pub fn new(config: DispatcherConfig, context: Arc<dyn ContextProvider>) -> Self {
        Self::with_bus(config, Arc::new(SubscriptionBus::new()), context)
    }

    pub fn with_bus(
        config: DispatcherConfig,
        bus: Arc<SubscriptionBus>,
        context: Arc<dyn ContextProvider>,
    ) -> Self {
        let registry = Arc::new(ComponentRegistry::new());
        Self {
            dispatcher: Dispatcher::new(Arc::clone(&registry), config),
            registry,
            bus,
            context,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<ComponentRegistry> {
        &self.registry
    }

    /// Dispatcher for components that talk to other components.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    #[must_use]
    pub fn bus(&self) -> &Arc<SubscriptionBus> {
        &self.bus
    }

    /// Register a component and return the emitter bound to it.
    ///
    /// # Errors
    ///
    /// Fails when the metadata is invalid or its id is already registered.
    pub fn install(
        &self,
        metadata: ComponentMetadata,
        component: Arc<dyn Component>,
    ) -> Result<EventEmitter, SwitchyardError> {
        metadata.validate()?;
        let emitter = self.emitter(&metadata);
        self.registry
            .register(ComponentHandle::new(metadata, component))?;
        Ok(emitter)
    }

    /// Build a component around its emitter and register it.
    ///
    /// # Errors
    ///
    /// Same as [`install`](Self::install).
    pub fn install_with<C, F>(
        &self,
        metadata: ComponentMetadata,
        build: F,
    ) -> Result<ComponentId, SwitchyardError>
    where
        C: Component + 'static,
        F: FnOnce(EventEmitter) -> C,
    {
        metadata.validate()?;
        let id = metadata.id.clone();
        let component = build(self.emitter(&metadata));
        self.registry
            .register(ComponentHandle::new(metadata, Arc::new(component)))?;
        Ok(id)
    }

    /// Emitter for an already registered component.
    #[must_use]
    pub fn emitter_for(&self, id: &ComponentId) -> Option<EventEmitter> {
        self.registry
            .lookup(id)
            .map(|handle| self.emitter(handle.metadata()))
    }

    /// Unregister a component.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when the id is not live.
    pub fn remove(&self, id: &ComponentId) -> Result<(), RegistryError> {
        self.registry.unregister(id).map(|_| ())
    }

    /// Build and deliver a command.
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::send_command`].
    pub async fn submit_command(
        &self,
        target: impl Into<ComponentId>,
        source: &str,
        action: impl Into<Action>,
        params: Params,
    ) -> Result<Ack, DispatchError> {
        let command = Command::new(target, source, action).with_params(params);
        self.dispatcher.send_command(command).await
    }

    /// Build and deliver a request; `timeout` overrides the dispatcher default.
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::send_request_with_timeout`].
    pub async fn submit_request(
        &self,
        target: impl Into<ComponentId>,
        source: &str,
        query: impl Into<Query>,
        params: Params,
        timeout: Option<Duration>,
    ) -> Result<Payload, DispatchError> {
        let request = Request::new(target, source, query).with_params(params);
        let timeout = timeout.unwrap_or_else(|| self.dispatcher.request_timeout());
        self.dispatcher
            .send_request_with_timeout(request, timeout)
            .await
    }

    pub fn broadcast_request(
        &self,
        source: &str,
        query: &Query,
        kinds: Option<&BTreeSet<ComponentKind>>,
        policy: BroadcastPolicy,
    ) -> impl Stream<Item = BroadcastReply> + Send + use<> {
        self.dispatcher
            .broadcast_request(source, query, kinds, policy)
    }

    /// Payloads of every successful reply, in completion order.
    pub async fn collect_payloads(
        &self,
        source: &str,
        query: &Query,
        kinds: Option<&BTreeSet<ComponentKind>>,
    ) -> Vec<Payload> {
        self.dispatcher
            .collect_broadcast(source, query, kinds, BroadcastPolicy::SkipFailures)
            .await
            .into_iter()
            .filter_map(|reply| reply.result.ok())
            .collect()
    }

    #[must_use]
    pub fn list_components(&self, kinds: Option<&BTreeSet<ComponentKind>>) -> Vec<ComponentSummary> {
        self.registry.list(kinds)
    }

    /// Automation components packaged as routines.
    #[must_use]
    pub fn list_routines(&self) -> Vec<ComponentSummary> {
        self.registry
            .handles_where(|handle| handle.metadata().is_routine())
            .iter()
            .map(|handle| handle.metadata().summary())
            .collect()
    }

    pub fn subscribe(
        &self,
        subscriber: impl Into<String>,
        filter: SubscriptionFilter,
        callback: impl EventCallback + 'static,
    ) -> SubscriptionId {
        self.bus.subscribe(subscriber, filter, callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    #[must_use]
    pub fn list_subscriptions(&self) -> Vec<SubscriptionDescriptor> {
        self.bus.list_subscriptions()
    }

    #[must_use]
    pub fn snapshot(&self) -> ContextSnapshot {
        self.context.snapshot()
    }

    /// Device views plus the current context.
    pub async fn status(&self, source: &str) -> HubStatus {
        let devices = BTreeSet::from([ComponentKind::Device]);
        let views = self.collect_payloads(source, &Query::Info, Some(&devices)).await;
        let snapshot = self.snapshot();
        HubStatus {
            devices: views,
            time: snapshot.time,
            is_dark: snapshot.is_dark,
            mode: snapshot.mode,
            last_mode: snapshot.last_mode,
        }
    }

    fn emitter(&self, metadata: &ComponentMetadata) -> EventEmitter {
        let publisher: Arc<dyn EventPublisher> = self.bus.clone();
        EventEmitter::new(metadata.id.clone(), metadata.kind, publisher)
    }
}

impl fmt::Debug for Hub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hub")
            .field("registry", &self.registry)
            .field("dispatcher", &self.dispatcher)
            .field("bus", &self.bus)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::LocationContext;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use switchyard_domain::error::{HandlerError, SubscriberError, ValidationError};

    struct Lamp {
        on: Mutex<bool>,
        events: EventEmitter,
    }

    #[async_trait]
    impl Component for Lamp {
        async fn handle_command(&self, command: &Command) -> Result<Ack, HandlerError> {
            let on = {
                let mut on = self.on.lock().unwrap();
                match command.action() {
                    Action::On => *on = true,
                    Action::Off => *on = false,
                    Action::Toggle => *on = !*on,
                    other => return Err(HandlerError::UnsupportedAction(other.to_string())),
                }
                *on
            };
            self.events.publish_event(
                EventKind::state_changed(),
                Payload::object().with("on", on),
            );
            Ok(Ack::for_command(command))
        }

        async fn handle_request(&self, request: &Request) -> Result<Payload, HandlerError> {
            match request.query() {
                Query::Info | Query::State => Ok(Payload::object()
                    .with("id", self.events.source().as_str())
                    .with("on", *self.on.lock().unwrap())),
                other => Err(HandlerError::UnsupportedAction(other.to_string())),
            }
        }
    }

    fn hub() -> Hub {
        let context = Arc::new(LocationContext::utc());
        context.set_mode("Night");
        Hub::new(DispatcherConfig::default(), context)
    }

    fn lamp(id: &str) -> ComponentMetadata {
        ComponentMetadata::builder()
            .id(id)
            .alias(id)
            .kind(ComponentKind::Device)
            .package("virtual.lamp")
            .commands([Action::On, Action::Off, Action::Toggle])
            .requests([Query::Info, Query::State])
            .build()
            .unwrap()
    }

    fn install_lamp(hub: &Hub, id: &str) {
        hub.install_with(lamp(id), |events| Lamp {
            on: Mutex::new(false),
            events,
        })
        .unwrap();
    }

    #[tokio::test]
    async fn should_toggle_then_reject_unknown_action() {
        let hub = hub();
        install_lamp(&hub, "A");

        let ack = hub
            .submit_command("A", "test", "TOGGLE", Params::new())
            .await
            .unwrap();
        assert_eq!(ack.target.as_str(), "A");
        let state = hub
            .submit_request("A", "test", Query::State, Params::new(), None)
            .await
            .unwrap();
        assert_eq!(state.get("on"), Some(&serde_json::json!(true)));

        let result = hub.submit_command("A", "test", "DIM", Params::new()).await;
        assert!(matches!(
            result,
            Err(DispatchError::UnsupportedAction { .. })
        ));
        let state = hub
            .submit_request("A", "test", Query::State, Params::new(), None)
            .await
            .unwrap();
        assert_eq!(state.get("on"), Some(&serde_json::json!(true)));
    }

    #[tokio::test]
    async fn should_deliver_component_events_to_subscribers() {
        let hub = hub();
        install_lamp(&hub, "A");
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        hub.subscribe(
            "test",
            SubscriptionFilter::all()
                .component_kind(ComponentKind::Device)
                .event_kind(EventKind::state_changed()),
            move |event: &Event| -> Result<(), SubscriberError> {
                tx.send(event.clone())
                    .map_err(|_| SubscriberError::new("closed"))
            },
        );

        hub.submit_command("A", "test", Action::On, Params::new())
            .await
            .unwrap();

        let event = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.source.as_str(), "A");
        assert_eq!(event.payload.get("on"), Some(&serde_json::json!(true)));
    }

    #[tokio::test]
    async fn should_report_status_with_device_views_and_context() {
        let hub = hub();
        install_lamp(&hub, "A");
        install_lamp(&hub, "B");

        let status = hub.status("test").await;

        assert_eq!(status.devices.len(), 2);
        assert_eq!(status.mode, "Night");
        assert_eq!(status.last_mode.as_deref(), Some("Day"));
        let json = serde_json::to_value(&status).unwrap();
        assert!(json["time"]["str"].is_string());
    }

    #[tokio::test]
    async fn should_list_routines_by_package() {
        let hub = hub();
        install_lamp(&hub, "A");
        let routine = ComponentMetadata::builder()
            .id("movie-night")
            .alias("Movie Night")
            .kind(ComponentKind::Automation)
            .package("routine.scene")
            .command(Action::On)
            .build()
            .unwrap();
        hub.install_with(routine, |events| Lamp {
            on: Mutex::new(false),
            events,
        })
        .unwrap();

        let routines = hub.list_routines();
        assert_eq!(routines.len(), 1);
        assert_eq!(routines[0].id.as_str(), "movie-night");
        let devices = BTreeSet::from([ComponentKind::Device]);
        assert_eq!(hub.list_components(Some(&devices)).len(), 1);
    }

    #[tokio::test]
    async fn should_fail_install_when_alias_is_empty() {
        let hub = hub();
        let mut metadata = lamp("A");
        metadata.alias = String::new();

        let result = hub.install_with(metadata, |events| Lamp {
            on: Mutex::new(false),
            events,
        });
        assert!(matches!(
            result,
            Err(SwitchyardError::Validation(ValidationError::EmptyAlias))
        ));
    }

    #[tokio::test]
    async fn should_fail_with_unknown_target_after_remove() {
        let hub = hub();
        install_lamp(&hub, "A");
        hub.remove(&ComponentId::from("A")).unwrap();

        let result = hub.submit_command("A", "test", Action::On, Params::new()).await;
        assert_eq!(
            result,
            Err(DispatchError::UnknownTarget(ComponentId::from("A")))
        );
        assert!(hub.emitter_for(&ComponentId::from("A")).is_none());
    }
}
