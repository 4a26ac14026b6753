//! Server-Sent Events (SSE) stream of bus events.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::{Stream, StreamExt};

use switchyard_app::hub::Hub;
use switchyard_domain::component::ComponentKind;
use switchyard_domain::error::SubscriberError;
use switchyard_domain::event::{Event as DomainEvent, EventKind};
use switchyard_domain::id::SubscriptionId;
use switchyard_domain::subscription::SubscriptionFilter;

use crate::error::ApiError;
use crate::state::AppState;

/// Optional narrowing of the stream, one value per dimension.
#[derive(Debug, Default, Deserialize)]
pub struct StreamFilter {
    pub id: Option<String>,
    pub component_kind: Option<ComponentKind>,
    pub event_kind: Option<String>,
}

impl StreamFilter {
    fn into_subscription_filter(self) -> Result<SubscriptionFilter, ApiError> {
        let mut filter = SubscriptionFilter::all();
        if let Some(id) = self.id {
            filter = filter.id(id);
        }
        if let Some(kind) = self.component_kind {
            filter = filter.component_kind(kind);
        }
        if let Some(kind) = self.event_kind {
            filter = filter.event_kind(EventKind::new(kind)?);
        }
        Ok(filter)
    }
}

/// Removes the stream's subscription once the client goes away.
struct SubscriptionGuard {
    hub: Arc<Hub>,
    id: SubscriptionId,
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.hub.unsubscribe(self.id);
    }
}

/// `GET /api/events/stream` — SSE stream of hub events.
///
/// Each matching event is sent as a JSON `data:` frame. The subscription
/// lives as long as the response stream.
pub async fn stream(
    State(state): State<AppState>,
    Query(filter): Query<StreamFilter>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let filter = filter.into_subscription_filter()?;
    let (sender, receiver) = mpsc::unbounded_channel();
    let id = state.hub.subscribe(
        "sse",
        filter,
        move |event: &DomainEvent| -> Result<(), SubscriberError> {
            // A closed receiver means the client left; the guard unsubscribes.
            let _ = sender.send(event.clone());
            Ok(())
        },
    );
    let guard = SubscriptionGuard {
        hub: Arc::clone(&state.hub),
        id,
    };

    let events = UnboundedReceiverStream::new(receiver).filter_map(move |event| {
        let _guard = &guard;
        match serde_json::to_string(&event) {
            Ok(json) => Some(Ok(Event::default().event(event.kind.as_str()).data(json))),
            Err(err) => {
                tracing::warn!(%err, "failed to serialize event to JSON for SSE stream");
                None
            }
        }
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_build_filter_from_query() {
        let filter = StreamFilter {
            id: Some("lamp.one".to_string()),
            component_kind: Some(ComponentKind::Device),
            event_kind: Some("state_changed".to_string()),
        }
        .into_subscription_filter()
        .unwrap();

        assert_eq!(
            filter,
            SubscriptionFilter::all()
                .id("lamp.one")
                .component_kind(ComponentKind::Device)
                .event_kind(EventKind::state_changed())
        );
    }

    #[test]
    fn should_reject_empty_event_kind() {
        let result = StreamFilter {
            event_kind: Some(String::new()),
            ..StreamFilter::default()
        }
        .into_subscription_filter();
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn should_unsubscribe_when_stream_is_dropped() {
        let hub = crate::test_support::hub_with_lamps();
        let state = AppState::new(Arc::clone(&hub));

        let response = stream(State(state), Query(StreamFilter::default()))
            .await
            .unwrap();
        assert_eq!(hub.list_subscriptions().len(), 1);

        drop(response);
        assert!(hub.list_subscriptions().is_empty());
    }
}
