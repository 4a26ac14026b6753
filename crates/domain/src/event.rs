//! Event — an ephemeral fact published by a component.
//!
//! Events are never persisted. Each publish is delivered at most once to
//! every subscription whose filter matches.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::component::ComponentKind;
use crate::error::ValidationError;
use crate::id::{ComponentId, EventId};
use crate::message::Payload;
use crate::time::{Timestamp, now};

/// Free-form event kind tag (e.g. `state_changed`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventKind(String);

impl EventKind {
    pub const STATE_CHANGED: &'static str = "state_changed";
    pub const LEVEL_CHANGED: &'static str = "level_changed";
    pub const SENSOR_READING: &'static str = "sensor_reading";
    pub const ROUTINE_EXECUTED: &'static str = "routine_executed";

    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyEventKind`] for an empty tag.
    pub fn new(kind: impl Into<String>) -> Result<Self, ValidationError> {
        let kind = kind.into();
        if kind.is_empty() {
            return Err(ValidationError::EmptyEventKind);
        }
        Ok(Self(kind))
    }

    #[must_use]
    pub fn state_changed() -> Self {
        Self(Self::STATE_CHANGED.to_string())
    }

    #[must_use]
    pub fn level_changed() -> Self {
        Self(Self::LEVEL_CHANGED.to_string())
    }

    #[must_use]
    pub fn sensor_reading() -> Self {
        Self(Self::SENSOR_READING.to_string())
    }

    #[must_use]
    pub fn routine_executed() -> Self {
        Self(Self::ROUTINE_EXECUTED.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A fact published by a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    /// Component that published the event.
    pub source: ComponentId,
    /// Type tag of the publishing component.
    pub component_kind: ComponentKind,
    pub kind: EventKind,
    pub payload: Payload,
    pub timestamp: Timestamp,
}

impl Event {
    /// Create a new event stamped with the current time.
    #[must_use]
    pub fn new(
        source: ComponentId,
        component_kind: ComponentKind,
        kind: EventKind,
        payload: Payload,
    ) -> Self {
        Self {
            id: EventId::new(),
            source,
            component_kind,
            kind,
            payload,
            timestamp: now(),
        }
    }
}
