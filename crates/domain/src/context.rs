//! Read-only location context — time, daylight and operating mode.
//!
//! A [`ContextSnapshot`] is a point-in-time copy; handlers consult it but can
//! never write through it.

use serde::{Deserialize, Serialize};

use crate::time::TimeView;

/// Operating mode tag used by automations (`"Day"`, `"Night"`, `"Away"`, …).
pub type Mode = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextSnapshot {
    pub time: TimeView,
    pub is_dark: bool,
    pub mode: Mode,
    pub last_mode: Option<Mode>,
}
