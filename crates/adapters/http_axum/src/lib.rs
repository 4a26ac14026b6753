//! # switchyard-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the REST routes (`/api/rest/...`, `/api/status`, ...) that turn
//!   HTTP calls into hub commands and requests
//! - Stream bus events to browsers over SSE (`/api/events/stream`)
//! - Map [`DispatchError`](switchyard_domain::error::DispatchError)s to HTTP
//!   status codes
//!
//! ## Dependency rule
//! Depends on `switchyard-app` (for the hub) and `switchyard-domain`
//! (for request/response mapping). Never leaks axum types into the kernel.

pub mod api;
pub mod error;
pub mod router;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;
