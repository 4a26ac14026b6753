//! Message model — the two things an adapter can hand to the kernel.
//!
//! A [`Command`] is an imperative, fire-and-forget instruction; a [`Request`]
//! is a query expecting exactly one [`Payload`]. Both address exactly one
//! component and carry the originator (`source`, e.g. `"web_api"`) and an
//! open [`Params`] bag. Fields are private: once built, a message is not
//! mutated on its way through the kernel.

mod params;
mod payload;
mod vocabulary;

pub use params::{ParamValue, Params};
pub use payload::Payload;
pub use vocabulary::{Action, Query};

use serde::{Deserialize, Serialize};

use crate::id::ComponentId;

/// Imperative instruction for exactly one component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    target: ComponentId,
    source: String,
    action: Action,
    #[serde(default)]
    params: Params,
}

impl Command {
    pub fn new(
        target: impl Into<ComponentId>,
        source: impl Into<String>,
        action: impl Into<Action>,
    ) -> Self {
        Self {
            target: target.into(),
            source: source.into(),
            action: action.into(),
            params: Params::new(),
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key, value);
        self
    }

    #[must_use]
    pub fn target(&self) -> &ComponentId {
        &self.target
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn action(&self) -> &Action {
        &self.action
    }

    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }
}

/// Query for exactly one component, answered by exactly one [`Payload`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    target: ComponentId,
    source: String,
    query: Query,
    #[serde(default)]
    params: Params,
}

impl Request {
    pub fn new(
        target: impl Into<ComponentId>,
        source: impl Into<String>,
        query: impl Into<Query>,
    ) -> Self {
        Self {
            target: target.into(),
            source: source.into(),
            query: query.into(),
            params: Params::new(),
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key, value);
        self
    }

    #[must_use]
    pub fn target(&self) -> &ComponentId {
        &self.target
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn query(&self) -> &Query {
        &self.query
    }

    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }
}

/// Acknowledgement that a component accepted a [`Command`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub target: ComponentId,
    pub action: Action,
}

impl Ack {
    #[must_use]
    pub fn for_command(command: &Command) -> Self {
        Self {
            target: command.target.clone(),
            action: command.action.clone(),
        }
    }
}
