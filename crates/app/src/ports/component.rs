//! Component port — the handler contract every registered component satisfies.
//!
//! Hardware drivers, rooms, groups and routines all implement the same two
//! handlers. Vendor-specific behaviour is composed behind this trait rather
//! than layered through it.

use async_trait::async_trait;

use switchyard_domain::error::HandlerError;
use switchyard_domain::message::{Ack, Command, Payload, Request};

/// A component the kernel can route messages to.
///
/// Each call is an independent invocation. A component that needs to
/// serialize its own calls does so internally; the kernel imposes no
/// per-target ordering.
#[async_trait]
pub trait Component: Send + Sync {
    /// Execute an imperative command.
    ///
    /// Must reject actions outside the component's vocabulary with
    /// [`HandlerError::UnsupportedAction`] rather than ignoring them.
    async fn handle_command(&self, command: &Command) -> Result<Ack, HandlerError>;

    /// Answer a query with exactly one payload.
    ///
    /// Should return within a time appropriate to the hardware behind it;
    /// the dispatcher's timeout is only the outer backstop.
    async fn handle_request(&self, request: &Request) -> Result<Payload, HandlerError>;
}
