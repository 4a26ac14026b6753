//! Command and request vocabularies.
//!
//! Known names parse case-insensitively. Unknown command names are kept
//! upper-cased, unknown query names lower-cased, so that a component's
//! declared capability and an incoming message compare equal regardless of
//! how the adapter spelled them.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Imperative action a [`Command`](super::Command) asks a component to perform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Action {
    On,
    Off,
    Toggle,
    /// Set a level; the target expects a `level` parameter.
    Level,
    Custom(String),
}

impl Action {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::On => "ON",
            Self::Off => "OFF",
            Self::Toggle => "TOGGLE",
            Self::Level => "LEVEL",
            Self::Custom(name) => name,
        }
    }
}

impl FromStr for Action {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Ok(match upper.as_str() {
            "ON" => Self::On,
            "OFF" => Self::Off,
            "TOGGLE" => Self::Toggle,
            "LEVEL" => Self::Level,
            _ => Self::Custom(upper),
        })
    }
}

impl From<&str> for Action {
    fn from(value: &str) -> Self {
        match value.parse() {
            Ok(action) => action,
            Err(never) => match never {},
        }
    }
}

impl From<String> for Action {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<Action> for String {
    fn from(value: Action) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query a [`Request`](super::Request) asks a component to answer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Query {
    /// Full component view (metadata plus current state).
    Info,
    State,
    Level,
    Sensors,
    /// Voice-assistant discovery view.
    AlexaView,
    Custom(String),
}

impl Query {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Info => "INFO",
            Self::State => "STATE",
            Self::Level => "LEVEL",
            Self::Sensors => "SENSORS",
            Self::AlexaView => "alexa-view",
            Self::Custom(name) => name,
        }
    }
}

impl FromStr for Query {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Ok(match lower.as_str() {
            "info" => Self::Info,
            "state" => Self::State,
            "level" => Self::Level,
            "sensors" => Self::Sensors,
            "alexa-view" | "alexa_view" => Self::AlexaView,
            _ => Self::Custom(lower),
        })
    }
}

impl From<&str> for Query {
    fn from(value: &str) -> Self {
        match value.parse() {
            Ok(query) => query,
            Err(never) => match never {},
        }
    }
}

impl From<String> for Query {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<Query> for String {
    fn from(value: Query) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
