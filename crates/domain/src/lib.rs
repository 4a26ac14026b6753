//! # switchyard-domain
//!
//! Pure domain model for the switchyard home automation hub.
//!
//! ## Responsibilities
//! - Foundational types: identifiers, error taxonomy, timestamps
//! - Define the **message model**: [`Command`](message::Command) and
//!   [`Request`](message::Request), their vocabularies and parameter bag
//! - Define **component metadata** (type tag, alias, package, capabilities)
//! - Define **events** and the **subscription filters** that select them
//! - Define the read-only **context snapshot** (time, daylight, mode)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies** and does no IO.
//! The routing kernel lives in `switchyard-app`.

pub mod error;
pub mod id;
pub mod time;

pub mod component;
pub mod context;
pub mod event;
pub mod message;
pub mod subscription;
