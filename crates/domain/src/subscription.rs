//! Subscription filters — which events a subscriber wants.
//!
//! A filter has three dimensions: component ids, component kinds and event
//! kinds. An empty dimension matches anything. Dimensions combine with AND,
//! values inside a dimension with OR. Filters are evaluated against the
//! event itself, never against a registry snapshot, so components registered
//! after the subscription are covered.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::component::ComponentKind;
use crate::event::{Event, EventKind};
use crate::id::{ComponentId, SubscriptionId};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionFilter {
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub ids: BTreeSet<ComponentId>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub component_kinds: BTreeSet<ComponentKind>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub event_kinds: BTreeSet<EventKind>,
}

impl SubscriptionFilter {
    /// A filter accepting every event.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn id(mut self, id: impl Into<ComponentId>) -> Self {
        self.ids.insert(id.into());
        self
    }

    #[must_use]
    pub fn component_kind(mut self, kind: ComponentKind) -> Self {
        self.component_kinds.insert(kind);
        self
    }

    #[must_use]
    pub fn event_kind(mut self, kind: EventKind) -> Self {
        self.event_kinds.insert(kind);
        self
    }

    #[must_use]
    pub fn matches(&self, event: &Event) -> bool {
        let id_match = self.ids.is_empty() || self.ids.contains(&event.source);
        let component_match = self.component_kinds.is_empty()
            || self.component_kinds.contains(&event.component_kind);
        let kind_match = self.event_kinds.is_empty() || self.event_kinds.contains(&event.kind);
        id_match && component_match && kind_match
    }
}

/// Listing view of a live subscription entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionDescriptor {
    pub id: SubscriptionId,
    pub subscriber: String,
    pub filter: SubscriptionFilter,
}
