//! Port definitions — traits that components, subscribers and context feeds
//! implement.
//!
//! Ports are the boundaries between the routing kernel and the outside world.
//! They are defined here (in `app`) so that both the kernel and the adapter
//! crates can depend on them without creating circular dependencies.

pub mod component;
pub mod context;
pub mod event_bus;

pub use component::Component;
pub use context::ContextProvider;
pub use event_bus::{EventCallback, EventPublisher};
