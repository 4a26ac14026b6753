//! Error taxonomy shared across the workspace.
//!
//! Each concern owns a typed error; [`SwitchyardError`] wraps them via
//! `#[from]` for callers that handle everything in one place. None of these
//! are fatal to the hub process.

use std::time::Duration;

use crate::id::{ComponentId, EventId, SubscriptionId};

/// Top-level error for code that touches several kernel services at once.
#[derive(Debug, thiserror::Error)]
pub enum SwitchyardError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("registry error")]
    Registry(#[from] RegistryError),

    #[error("dispatch error")]
    Dispatch(#[from] DispatchError),
}

/// Domain invariant violations detected by builders.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("component id must not be empty")]
    EmptyComponentId,

    #[error("component alias must not be empty")]
    EmptyAlias,

    #[error("event kind must not be empty")]
    EmptyEventKind,
}

/// Failures of registry mutation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// `register` was called with an id that is already live.
    #[error("component `{0}` is already registered")]
    DuplicateId(ComponentId),

    /// `unregister` was called with an id that is not live.
    #[error("component `{0}` is not registered")]
    NotFound(ComponentId),
}

/// What a component handler returns when it refuses or fails a call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HandlerError {
    #[error("`{0}` is not in this component's vocabulary")]
    UnsupportedAction(String),

    #[error("missing required parameter `{0}`")]
    MissingParam(String),

    #[error("parameter `{key}` must be {expected}")]
    InvalidParam { key: String, expected: &'static str },

    /// The component has nothing to report (e.g. no alexa view).
    #[error("component has no data for this request")]
    NoData,

    /// A call the component made to another component failed.
    #[error("downstream call to `{target}` failed")]
    Downstream {
        target: ComponentId,
        #[source]
        source: Box<DispatchError>,
    },

    #[error("handler failed: {0}")]
    Failed(String),
}

/// Failures reported by the dispatcher to the immediate caller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DispatchError {
    #[error("no component registered under `{0}`")]
    UnknownTarget(ComponentId),

    #[error("component `{target}` does not accept `{action}`")]
    UnsupportedAction { target: ComponentId, action: String },

    #[error("component `{target}` failed to handle the call")]
    HandlerError {
        target: ComponentId,
        #[source]
        source: HandlerError,
    },

    #[error("component `{target}` did not answer within {after:?}")]
    Timeout { target: ComponentId, after: Duration },
}

impl DispatchError {
    /// The component the failed call was addressed to.
    #[must_use]
    pub fn target(&self) -> &ComponentId {
        match self {
            Self::UnknownTarget(target)
            | Self::UnsupportedAction { target, .. }
            | Self::HandlerError { target, .. }
            | Self::Timeout { target, .. } => target,
        }
    }
}

/// Error a subscriber callback returns to the bus.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct SubscriberError(String);

impl SubscriberError {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Report emitted by the bus when a subscriber callback fails or panics.
///
/// Never propagated to the publisher; handed to the bus's failure hook.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("subscriber `{subscriber}` failed on event {event}: {reason}")]
pub struct SubscriberFailure {
    pub subscription: SubscriptionId,
    pub subscriber: String,
    pub event: EventId,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_expose_target_for_every_dispatch_error() {
        let id = ComponentId::from("a");
        let errors = [
            DispatchError::UnknownTarget(id.clone()),
            DispatchError::UnsupportedAction {
                target: id.clone(),
                action: "DIM".to_string(),
            },
            DispatchError::HandlerError {
                target: id.clone(),
                source: HandlerError::NoData,
            },
            DispatchError::Timeout {
                target: id.clone(),
                after: Duration::from_millis(10),
            },
        ];
        for err in &errors {
            assert_eq!(err.target(), &id);
        }
    }

    #[test]
    fn should_convert_registry_error_into_top_level_error() {
        let err: SwitchyardError = RegistryError::NotFound(ComponentId::from("x")).into();
        assert!(matches!(err, SwitchyardError::Registry(_)));
    }

    #[test]
    fn should_render_subscriber_failure_message() {
        let failure = SubscriberFailure {
            subscription: SubscriptionId::new(),
            subscriber: "motion-automation".to_string(),
            event: EventId::new(),
            reason: "boom".to_string(),
        };
        let text = failure.to_string();
        assert!(text.contains("motion-automation"));
        assert!(text.ends_with("boom"));
    }
}
