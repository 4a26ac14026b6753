//! Event bus ports — publishing side and subscriber callbacks.

use async_trait::async_trait;

use switchyard_domain::error::SubscriberError;
use switchyard_domain::event::Event;

/// Publishes events to interested subscribers.
///
/// Publishing never blocks on subscriber processing.
pub trait EventPublisher: Send + Sync {
    /// Hand an event to every matching subscription.
    ///
    /// Returns the number of subscriptions the event was queued for.
    fn publish(&self, event: Event) -> usize;
}

impl<T: EventPublisher + ?Sized> EventPublisher for std::sync::Arc<T> {
    fn publish(&self, event: Event) -> usize {
        (**self).publish(event)
    }
}

/// Receives the events a subscription matched, one at a time, in order.
#[async_trait]
pub trait EventCallback: Send + Sync {
    /// Handle one event. An error is reported by the bus and otherwise
    /// ignored; the subscription stays active.
    async fn on_event(&self, event: &Event) -> Result<(), SubscriberError>;
}

#[async_trait]
impl<F> EventCallback for F
where
    F: Fn(&Event) -> Result<(), SubscriberError> + Send + Sync,
{
    async fn on_event(&self, event: &Event) -> Result<(), SubscriberError> {
        self(event)
    }
}
