//! # switchyard-app
//!
//! Routing kernel and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define the **ports** the kernel talks through:
//!   - `Component` — command and request handlers every component implements
//!   - `EventPublisher` / `EventCallback` — the two sides of the event bus
//!   - `ContextProvider` — read-only time, daylight and mode
//! - Own the live component set (`ComponentRegistry`)
//! - Route commands and requests to it (`Dispatcher`), including timeouts
//!   and broadcast requests
//! - Fan events out to filtered subscriptions (`SubscriptionBus`)
//! - Expose all of it to adapters through one `Hub`
//!
//! ## Dependency rule
//! Depends on `switchyard-domain` only (plus `tokio` for tasks and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod dispatcher;
pub mod event_bus;
pub mod hub;
pub mod location;
pub mod ports;
pub mod registry;
