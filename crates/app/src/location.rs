//! Location context — the process-wide time/daylight/mode feed.
//!
//! The kernel only reads it through [`ContextProvider`]. Whatever drives
//! daylight and mode changes (a scheduler, a light sensor, the daemon's
//! config) holds the concrete [`LocationContext`] and calls the setters.

use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, FixedOffset, Offset, Utc};

use switchyard_domain::context::{ContextSnapshot, Mode};
use switchyard_domain::time::{TimeView, now};

use crate::ports::ContextProvider;

/// Mode the hub starts in when none is configured.
pub const DEFAULT_MODE: &str = "Day";

#[derive(Debug)]
struct State {
    mode: Mode,
    last_mode: Option<Mode>,
    is_dark: bool,
}

/// Mutable source behind the read-only [`ContextSnapshot`].
#[derive(Debug)]
pub struct LocationContext {
    offset: FixedOffset,
    state: RwLock<State>,
}

impl LocationContext {
    pub fn new(offset: FixedOffset, initial_mode: impl Into<Mode>) -> Self {
        Self {
            offset,
            state: RwLock::new(State {
                mode: initial_mode.into(),
                last_mode: None,
                is_dark: false,
            }),
        }
    }

    /// Context at UTC in the default mode.
    #[must_use]
    pub fn utc() -> Self {
        Self::new(Utc.fix(), DEFAULT_MODE)
    }

    #[must_use]
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Switch mode; the current one becomes `last_mode`.
    ///
    /// Setting the mode already in effect changes nothing.
    pub fn set_mode(&self, mode: impl Into<Mode>) {
        let mode = mode.into();
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.mode == mode {
            return;
        }
        tracing::info!(from = %state.mode, to = %mode, "location mode changed");
        let previous = std::mem::replace(&mut state.mode, mode);
        state.last_mode = Some(previous);
    }

    pub fn set_dark(&self, is_dark: bool) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .is_dark = is_dark;
    }

    /// Snapshot as of `instant`.
    #[must_use]
    pub fn snapshot_at(&self, instant: DateTime<Utc>) -> ContextSnapshot {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        ContextSnapshot {
            time: TimeView::from_local(instant.with_timezone(&self.offset)),
            is_dark: state.is_dark,
            mode: state.mode.clone(),
            last_mode: state.last_mode.clone(),
        }
    }
}

impl Default for LocationContext {
    fn default() -> Self {
        Self::utc()
    }
}

impl ContextProvider for LocationContext {
    fn snapshot(&self) -> ContextSnapshot {
        self.snapshot_at(now())
    }
}
