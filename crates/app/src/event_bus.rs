//! In-process subscription bus.
//!
//! Every subscription owns an unbounded queue drained by its own tokio task,
//! so `publish` only evaluates filters and enqueues. A slow subscriber delays
//! nobody but itself, and one publisher's events reach a given subscriber in
//! publish order.
//!
//! Callback errors and panics are contained in the subscription's task: they
//! are logged, counted, handed to the optional failure hook, and the
//! subscription stays active.

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use futures::FutureExt;
use tokio::sync::mpsc;

use switchyard_domain::error::SubscriberFailure;
use switchyard_domain::event::Event;
use switchyard_domain::id::SubscriptionId;
use switchyard_domain::subscription::{SubscriptionDescriptor, SubscriptionFilter};

use crate::ports::{EventCallback, EventPublisher};

/// Observer for subscriber failures.
pub type FailureHook = Arc<dyn Fn(&SubscriberFailure) + Send + Sync>;

#[derive(Default)]
struct FailureReporter {
    count: AtomicU64,
    hook: RwLock<Option<FailureHook>>,
}

impl FailureReporter {
    fn report(&self, failure: &SubscriberFailure) {
        self.count.fetch_add(1, Ordering::Relaxed);
        tracing::warn!(
            subscription_id = %failure.subscription,
            subscriber = %failure.subscriber,
            event_id = %failure.event,
            reason = %failure.reason,
            "subscriber callback failed"
        );
        let hook = self
            .hook
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(hook) = hook {
            hook(failure);
        }
    }
}

struct Entry {
    descriptor: SubscriptionDescriptor,
    sender: mpsc::UnboundedSender<Event>,
    active: Arc<AtomicBool>,
}

/// Filtered, asynchronous fan-out of [`Event`]s to subscriber callbacks.
#[derive(Default)]
pub struct SubscriptionBus {
    entries: RwLock<Vec<Entry>>,
    reporter: Arc<FailureReporter>,
}

impl SubscriptionBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a failure observer, replacing any previous one.
    #[must_use]
    pub fn with_failure_hook(self, hook: FailureHook) -> Self {
        self.set_failure_hook(hook);
        self
    }

    pub fn set_failure_hook(&self, hook: FailureHook) {
        *self
            .reporter
            .hook
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(hook);
    }

    /// Register interest in the events `filter` matches.
    ///
    /// Must be called from within a tokio runtime: the subscription's
    /// delivery task is spawned here.
    pub fn subscribe(
        &self,
        subscriber: impl Into<String>,
        filter: SubscriptionFilter,
        callback: impl EventCallback + 'static,
    ) -> SubscriptionId {
        let descriptor = SubscriptionDescriptor {
            id: SubscriptionId::new(),
            subscriber: subscriber.into(),
            filter,
        };
        let id = descriptor.id;
        let (sender, receiver) = mpsc::unbounded_channel();
        let active = Arc::new(AtomicBool::new(true));

        tokio::spawn(deliver(
            id,
            descriptor.subscriber.clone(),
            receiver,
            Arc::new(callback),
            Arc::clone(&active),
            Arc::clone(&self.reporter),
        ));

        tracing::debug!(
            subscription_id = %id,
            subscriber = %descriptor.subscriber,
            "subscription added"
        );
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Entry {
                descriptor,
                sender,
                active,
            });
        id
    }

    /// Remove a subscription. Events still queued for it are discarded; a
    /// callback already running is allowed to finish.
    ///
    /// Returns `false` when the subscription was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let Some(position) = entries.iter().position(|entry| entry.descriptor.id == id) else {
            return false;
        };
        let entry = entries.remove(position);
        entry.active.store(false, Ordering::SeqCst);
        tracing::debug!(subscription_id = %id, "subscription removed");
        true
    }

    /// Live subscriptions, in subscription order.
    #[must_use]
    pub fn list_subscriptions(&self) -> Vec<SubscriptionDescriptor> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|entry| entry.descriptor.clone())
            .collect()
    }

    /// Number of callback failures observed since the bus was created.
    #[must_use]
    pub fn failure_count(&self) -> u64 {
        self.reporter.count.load(Ordering::Relaxed)
    }
}

impl EventPublisher for SubscriptionBus {
    fn publish(&self, event: Event) -> usize {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut queued = 0;
        for entry in entries
            .iter()
            .filter(|entry| entry.descriptor.filter.matches(&event))
        {
            if entry.sender.send(event.clone()).is_ok() {
                queued += 1;
            }
        }
        tracing::trace!(
            event_id = %event.id,
            source = %event.source,
            kind = %event.kind,
            queued,
            "event published"
        );
        queued
    }
}

impl fmt::Debug for SubscriptionBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionBus")
            .field("subscriptions", &self.list_subscriptions().len())
            .field("failures", &self.failure_count())
            .finish()
    }
}

async fn deliver(
    subscription: SubscriptionId,
    subscriber: String,
    mut receiver: mpsc::UnboundedReceiver<Event>,
    callback: Arc<dyn EventCallback>,
    active: Arc<AtomicBool>,
    reporter: Arc<FailureReporter>,
) {
    while let Some(event) = receiver.recv().await {
        if !active.load(Ordering::SeqCst) {
            break;
        }
        let outcome = AssertUnwindSafe(callback.on_event(&event))
            .catch_unwind()
            .await;
        let reason = match outcome {
            Ok(Ok(())) => continue,
            Ok(Err(error)) => error.to_string(),
            Err(_) => "callback panicked".to_string(),
        };
        reporter.report(&SubscriberFailure {
            subscription,
            subscriber: subscriber.clone(),
            event: event.id,
            reason,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use switchyard_domain::component::ComponentKind;
    use switchyard_domain::error::SubscriberError;
    use switchyard_domain::event::EventKind;
    use switchyard_domain::id::ComponentId;
    use switchyard_domain::message::Payload;

    fn event(source: &str, kind: ComponentKind, event_kind: EventKind, seq: i64) -> Event {
        Event::new(
            ComponentId::from(source),
            kind,
            event_kind,
            Payload::object().with("seq", seq),
        )
    }

    fn seq(event: &Event) -> i64 {
        event
            .payload
            .get("seq")
            .and_then(serde_json::Value::as_i64)
            .unwrap()
    }

    fn recorder() -> (
        impl EventCallback + 'static,
        mpsc::UnboundedReceiver<Event>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let callback = move |event: &Event| -> Result<(), SubscriberError> {
            tx.send(event.clone())
                .map_err(|_| SubscriberError::new("receiver closed"))
        };
        (callback, rx)
    }

    async fn next(rx: &mut mpsc::UnboundedReceiver<Event>) -> Event {
        tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn should_deliver_in_publish_order() {
        let bus = SubscriptionBus::new();
        let (callback, mut rx) = recorder();
        bus.subscribe("test", SubscriptionFilter::all(), callback);

        for i in 0..100 {
            bus.publish(event("light", ComponentKind::Device, EventKind::state_changed(), i));
        }

        for i in 0..100 {
            assert_eq!(seq(&next(&mut rx).await), i);
        }
    }

    #[tokio::test]
    async fn should_route_by_filter() {
        let bus = SubscriptionBus::new();
        let (devices_cb, mut devices) = recorder();
        let (rooms_cb, mut rooms) = recorder();
        bus.subscribe(
            "device-watcher",
            SubscriptionFilter::all()
                .component_kind(ComponentKind::Device)
                .event_kind(EventKind::state_changed()),
            devices_cb,
        );
        bus.subscribe(
            "room-watcher",
            SubscriptionFilter::all().component_kind(ComponentKind::Room),
            rooms_cb,
        );

        let queued = bus.publish(event("light", ComponentKind::Device, EventKind::state_changed(), 1));
        assert_eq!(queued, 1);

        assert_eq!(next(&mut devices).await.source.as_str(), "light");
        tokio::task::yield_now().await;
        assert!(rooms.try_recv().is_err());
    }

    #[tokio::test]
    async fn should_keep_delivering_after_callback_error() {
        let failures = Arc::new(std::sync::Mutex::new(Vec::new()));
        let hook_failures = Arc::clone(&failures);
        let bus = SubscriptionBus::new().with_failure_hook(Arc::new(move |failure| {
            hook_failures.lock().unwrap().push(failure.clone());
        }));

        let (tx, mut rx) = mpsc::unbounded_channel();
        bus.subscribe(
            "flaky",
            SubscriptionFilter::all(),
            move |event: &Event| -> Result<(), SubscriberError> {
                let n = seq(event);
                tx.send(n).unwrap();
                if n == 2 {
                    return Err(SubscriberError::new("cannot handle 2"));
                }
                Ok(())
            },
        );

        for i in 1..=3 {
            bus.publish(event("light", ComponentKind::Device, EventKind::state_changed(), i));
        }

        for expected in 1..=3 {
            let got = tokio::time::timeout(Duration::from_secs(1), rx.recv())
                .await
                .unwrap()
                .unwrap();
            assert_eq!(got, expected);
        }
        tokio::task::yield_now().await;
        assert_eq!(bus.failure_count(), 1);
        assert_eq!(bus.list_subscriptions().len(), 1);
        let failures = failures.lock().unwrap();
        assert_eq!(failures[0].subscriber, "flaky");
        assert_eq!(failures[0].reason, "cannot handle 2");
    }

    #[tokio::test]
    async fn should_isolate_panicking_subscriber() {
        let bus = SubscriptionBus::new();
        bus.subscribe(
            "panicky",
            SubscriptionFilter::all(),
            |_: &Event| -> Result<(), SubscriberError> { panic!("subscriber exploded") },
        );
        let (callback, mut rx) = recorder();
        bus.subscribe("steady", SubscriptionFilter::all(), callback);

        let queued = bus.publish(event("light", ComponentKind::Device, EventKind::state_changed(), 1));
        assert_eq!(queued, 2);

        assert_eq!(seq(&next(&mut rx).await), 1);
        for _ in 0..10 {
            if bus.failure_count() == 1 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(bus.failure_count(), 1);
    }

    #[tokio::test]
    async fn should_treat_repeated_unsubscribe_as_noop() {
        let bus = SubscriptionBus::new();
        let (callback, mut rx) = recorder();
        let id = bus.subscribe("test", SubscriptionFilter::all(), callback);

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert!(bus.list_subscriptions().is_empty());

        let queued = bus.publish(event("light", ComponentKind::Device, EventKind::state_changed(), 1));
        assert_eq!(queued, 0);
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn should_cover_components_registered_after_subscribing() {
        let bus = SubscriptionBus::new();
        let (callback, mut rx) = recorder();
        bus.subscribe(
            "test",
            SubscriptionFilter::all().id("late-light"),
            callback,
        );

        bus.publish(event("late-light", ComponentKind::Device, EventKind::level_changed(), 7));

        assert_eq!(seq(&next(&mut rx).await), 7);
    }

    #[test]
    fn should_list_subscriptions_in_order() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let _guard = runtime.enter();
        let bus = SubscriptionBus::new();
        let first = bus.subscribe("a", SubscriptionFilter::all(), |_: &Event| -> Result<(), SubscriberError> { Ok(()) });
        let second = bus.subscribe(
            "b",
            SubscriptionFilter::all().component_kind(ComponentKind::Room),
            |_: &Event| -> Result<(), SubscriberError> { Ok(()) },
        );

        let listed: Vec<SubscriptionId> = bus
            .list_subscriptions()
            .into_iter()
            .map(|descriptor| descriptor.id)
            .collect();
        assert_eq!(listed, [first, second]);
    }
}
