//! Component metadata — what the kernel knows about a registered component.
//!
//! The kernel never sees a component's internal state. It sees a
//! [`ComponentMetadata`] (identity, labels, accepted vocabulary) and calls the
//! component's handlers.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::ComponentId;
use crate::message::{Action, Query};

/// Coarse type tag used for discovery and subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComponentKind {
    Device,
    Room,
    Automation,
    Service,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Device => "DEVICE",
            Self::Room => "ROOM",
            Self::Automation => "AUTOMATION",
            Self::Service => "SERVICE",
        })
    }
}

/// The commands and requests a component accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub commands: BTreeSet<Action>,
    pub requests: BTreeSet<Query>,
}

impl Capabilities {
    #[must_use]
    pub fn accepts_command(&self, action: &Action) -> bool {
        self.commands.contains(action)
    }

    #[must_use]
    pub fn accepts_request(&self, query: &Query) -> bool {
        self.requests.contains(query)
    }
}

/// Registered description of one component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentMetadata {
    pub id: ComponentId,
    pub kind: ComponentKind,
    pub alias: String,
    pub title: String,
    /// Package that installed the component (e.g. `virtual.light`, `routine.morning`).
    pub package: String,
    pub capabilities: Capabilities,
}

impl ComponentMetadata {
    #[must_use]
    pub fn builder() -> ComponentMetadataBuilder {
        ComponentMetadataBuilder::default()
    }

    /// # Errors
    ///
    /// Returns [`ValidationError`] when the id or alias is empty.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::EmptyComponentId);
        }
        if self.alias.is_empty() {
            return Err(ValidationError::EmptyAlias);
        }
        Ok(())
    }

    #[must_use]
    pub fn summary(&self) -> ComponentSummary {
        ComponentSummary {
            id: self.id.clone(),
            alias: self.alias.clone(),
            title: self.title.clone(),
            kind: self.kind,
            package: self.package.clone(),
        }
    }

    /// Automations installed from a routine package.
    #[must_use]
    pub fn is_routine(&self) -> bool {
        self.kind == ComponentKind::Automation && self.package.contains("routine")
    }
}

/// Listing view of a component, as returned by discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentSummary {
    pub id: ComponentId,
    pub alias: String,
    pub title: String,
    pub kind: ComponentKind,
    pub package: String,
}

/// Step-by-step builder for [`ComponentMetadata`].
#[derive(Debug, Default)]
pub struct ComponentMetadataBuilder {
    id: Option<ComponentId>,
    kind: Option<ComponentKind>,
    alias: Option<String>,
    title: Option<String>,
    package: Option<String>,
    capabilities: Capabilities,
}

impl ComponentMetadataBuilder {
    #[must_use]
    pub fn id(mut self, id: impl Into<ComponentId>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: ComponentKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    #[must_use]
    pub fn command(mut self, action: impl Into<Action>) -> Self {
        self.capabilities.commands.insert(action.into());
        self
    }

    #[must_use]
    pub fn commands<I, A>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Action>,
    {
        self.capabilities
            .commands
            .extend(actions.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn request(mut self, query: impl Into<Query>) -> Self {
        self.capabilities.requests.insert(query.into());
        self
    }

    #[must_use]
    pub fn requests<I, Q>(mut self, queries: I) -> Self
    where
        I: IntoIterator<Item = Q>,
        Q: Into<Query>,
    {
        self.capabilities
            .requests
            .extend(queries.into_iter().map(Into::into));
        self
    }

    /// Consume the builder, validate, and return the metadata.
    ///
    /// A missing id is generated; a missing title falls back to the alias;
    /// a missing kind defaults to [`ComponentKind::Device`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyAlias`] if `alias` is missing or empty.
    pub fn build(self) -> Result<ComponentMetadata, ValidationError> {
        let alias = self.alias.unwrap_or_default();
        let metadata = ComponentMetadata {
            id: self.id.unwrap_or_else(ComponentId::generate),
            kind: self.kind.unwrap_or(ComponentKind::Device),
            title: self.title.unwrap_or_else(|| alias.clone()),
            alias,
            package: self.package.unwrap_or_default(),
            capabilities: self.capabilities,
        };
        metadata.validate()?;
        Ok(metadata)
    }
}
