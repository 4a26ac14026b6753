//! Dispatcher — resolves a target id and invokes the component's handler.
//!
//! Every invocation runs on its own tokio task, so a handler that panics is
//! reported as [`DispatchError::HandlerError`] instead of unwinding into the
//! caller, and concurrent callers never share an invocation.
//!
//! # Timeouts
//!
//! Requests carry an effective deadline (the configured default or an explicit
//! one). When it elapses the task is aborted, the caller gets
//! [`DispatchError::Timeout`] and nothing is delivered afterwards.
//!
//! Commands are bounded by the same deadline for the *caller* only: once a
//! handler has accepted a command it is treated as delivered, so the task is
//! left to finish in the background.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use futures::Stream;
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use serde::Serialize;
use tokio::task::{JoinError, JoinHandle};

use switchyard_domain::component::ComponentKind;
use switchyard_domain::error::{DispatchError, HandlerError};
use switchyard_domain::id::ComponentId;
use switchyard_domain::message::{Ack, Command, Payload, Query, Request};

use crate::registry::{ComponentHandle, ComponentRegistry};

/// Default deadline applied to every request and command.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Dispatcher settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatcherConfig {
    pub request_timeout: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// What to do with targets that fail during a broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BroadcastPolicy {
    /// Drop failed targets and targets answering with an empty payload.
    #[default]
    SkipFailures,
    /// Yield one reply per target, failures included.
    Annotate,
}

impl BroadcastPolicy {
    fn keeps(self, reply: &BroadcastReply) -> bool {
        match self {
            Self::SkipFailures => matches!(&reply.result, Ok(payload) if !payload.is_empty()),
            Self::Annotate => true,
        }
    }
}

/// One target's answer to a broadcast request.
#[derive(Debug, Clone, PartialEq)]
pub struct BroadcastReply {
    pub target: ComponentId,
    pub result: Result<Payload, DispatchError>,
}

/// JSON view of a [`BroadcastReply`] for adapters.
#[derive(Debug, Serialize)]
pub struct BroadcastReplyView<'a> {
    pub target: &'a ComponentId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<&'a Payload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BroadcastReply {
    #[must_use]
    pub fn view(&self) -> BroadcastReplyView<'_> {
        BroadcastReplyView {
            target: &self.target,
            payload: self.result.as_ref().ok(),
            error: self.result.as_ref().err().map(ToString::to_string),
        }
    }
}

/// Routes commands and requests to registered components.
///
/// Cheap to clone; clones share the registry.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<ComponentRegistry>,
    config: DispatcherConfig,
}

impl Dispatcher {
    pub fn new(registry: Arc<ComponentRegistry>, config: DispatcherConfig) -> Self {
        Self { registry, config }
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<ComponentRegistry> {
        &self.registry
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.config.request_timeout
    }

    /// Deliver a command to its target and wait for the handler's verdict.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::UnknownTarget`] when nothing is registered under the
    ///   target id (no handler is invoked)
    /// - [`DispatchError::UnsupportedAction`] when the action is not in the
    ///   target's declared vocabulary or the handler rejects it
    /// - [`DispatchError::HandlerError`] when the handler fails or panics
    /// - [`DispatchError::Timeout`] when the handler has not answered within
    ///   the configured deadline
    pub async fn send_command(&self, command: Command) -> Result<Ack, DispatchError> {
        let handle = self.resolve(command.target())?;
        let target = handle.id().clone();
        if !handle.metadata().capabilities.accepts_command(command.action()) {
            return Err(DispatchError::UnsupportedAction {
                target,
                action: command.action().to_string(),
            });
        }

        tracing::debug!(
            component_id = %target,
            source = command.source(),
            action = %command.action(),
            "dispatching command"
        );

        let component = handle.component();
        let task = tokio::spawn(async move { component.handle_command(&command).await });

        // Dropping the join handle on timeout detaches the task: an accepted
        // command is never cancelled.
        match tokio::time::timeout(self.config.request_timeout, task).await {
            Ok(joined) => flatten(&target, joined),
            Err(_) => {
                tracing::warn!(component_id = %target, "command timed out");
                Err(DispatchError::Timeout {
                    target,
                    after: self.config.request_timeout,
                })
            }
        }
    }

    /// Ask a target for exactly one payload, using the configured deadline.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`send_request_with_timeout`](Self::send_request_with_timeout).
    pub async fn send_request(&self, request: Request) -> Result<Payload, DispatchError> {
        self.send_request_with_timeout(request, self.config.request_timeout)
            .await
    }

    /// Ask a target for exactly one payload within `timeout`.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::UnknownTarget`] when nothing is registered under the
    ///   target id
    /// - [`DispatchError::UnsupportedAction`] when the query is not in the
    ///   target's declared vocabulary or the handler rejects it
    /// - [`DispatchError::HandlerError`] when the handler fails or panics
    /// - [`DispatchError::Timeout`] when `timeout` elapses; the handler task
    ///   is aborted
    pub async fn send_request_with_timeout(
        &self,
        request: Request,
        timeout: Duration,
    ) -> Result<Payload, DispatchError> {
        let handle = self.resolve(request.target())?;
        let target = handle.id().clone();
        if !handle.metadata().capabilities.accepts_request(request.query()) {
            return Err(DispatchError::UnsupportedAction {
                target,
                action: request.query().to_string(),
            });
        }

        tracing::debug!(
            component_id = %target,
            source = request.source(),
            query = %request.query(),
            "dispatching request"
        );

        let component = handle.component();
        let mut task: JoinHandle<Result<Payload, HandlerError>> =
            tokio::spawn(async move { component.handle_request(&request).await });

        match tokio::time::timeout(timeout, &mut task).await {
            Ok(joined) => flatten(&target, joined),
            Err(_) => {
                task.abort();
                tracing::warn!(component_id = %target, ?timeout, "request timed out");
                Err(DispatchError::Timeout {
                    target,
                    after: timeout,
                })
            }
        }
    }

    /// Send `query` to every component whose kind is in `kinds` (all
    /// components when `None`).
    ///
    /// The target set is fixed when this is called; requests are issued when
    /// the stream is first polled and replies are yielded as they complete.
    /// One target failing never stops the others.
    pub fn broadcast_request(
        &self,
        source: &str,
        query: &Query,
        kinds: Option<&BTreeSet<ComponentKind>>,
        policy: BroadcastPolicy,
    ) -> impl Stream<Item = BroadcastReply> + Send + use<> {
        let pending: FuturesUnordered<_> = self
            .registry
            .handles(kinds)
            .into_iter()
            .map(|handle| {
                let dispatcher = self.clone();
                let request = Request::new(handle.id().clone(), source, query.clone());
                async move {
                    let target = request.target().clone();
                    let result = dispatcher.send_request(request).await;
                    BroadcastReply { target, result }
                }
            })
            .collect();

        pending.filter(move |reply| futures::future::ready(policy.keeps(reply)))
    }

    /// Drive [`broadcast_request`](Self::broadcast_request) to completion.
    pub async fn collect_broadcast(
        &self,
        source: &str,
        query: &Query,
        kinds: Option<&BTreeSet<ComponentKind>>,
        policy: BroadcastPolicy,
    ) -> Vec<BroadcastReply> {
        self.broadcast_request(source, query, kinds, policy)
            .collect()
            .await
    }

    fn resolve(&self, target: &ComponentId) -> Result<Arc<ComponentHandle>, DispatchError> {
        self.registry
            .lookup(target)
            .ok_or_else(|| DispatchError::UnknownTarget(target.clone()))
    }
}

fn flatten<T>(
    target: &ComponentId,
    joined: Result<Result<T, HandlerError>, JoinError>,
) -> Result<T, DispatchError> {
    match joined {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(HandlerError::UnsupportedAction(action))) => Err(DispatchError::UnsupportedAction {
            target: target.clone(),
            action,
        }),
        Ok(Err(source)) => Err(DispatchError::HandlerError {
            target: target.clone(),
            source,
        }),
        Err(join_error) => {
            let reason = if join_error.is_panic() {
                tracing::error!(component_id = %target, "component handler panicked");
                "handler panicked"
            } else {
                "handler cancelled"
            };
            Err(DispatchError::HandlerError {
                target: target.clone(),
                source: HandlerError::Failed(reason.to_string()),
            })
        }
    }
}
