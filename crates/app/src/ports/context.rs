//! Context port — read-only access to time, daylight and mode.

use switchyard_domain::context::ContextSnapshot;

/// Source of [`ContextSnapshot`]s.
///
/// Recomputed on every call; safe to read concurrently. Nothing in the
/// kernel writes through this port.
pub trait ContextProvider: Send + Sync {
    fn snapshot(&self) -> ContextSnapshot;
}

impl<T: ContextProvider + ?Sized> ContextProvider for std::sync::Arc<T> {
    fn snapshot(&self) -> ContextSnapshot {
        (**self).snapshot()
    }
}
