//! Time and timestamp helpers.

use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// UTC timestamp used for event times.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Calendar breakdown of a local time, as shown in the hub status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeView {
    pub epoch: i64,
    pub day: u32,
    pub month: u32,
    pub year: i32,
    pub hour: u32,
    pub minute: u32,
    #[serde(rename = "str")]
    pub text: String,
}

impl TimeView {
    #[must_use]
    pub fn from_local(local: DateTime<FixedOffset>) -> Self {
        Self {
            epoch: local.timestamp(),
            day: local.day(),
            month: local.month(),
            year: local.year(),
            hour: local.hour(),
            minute: local.minute(),
            text: local.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn should_return_current_utc_time() {
        let before = Utc::now();
        let ts = now();
        let after = Utc::now();
        assert!(ts >= before);
        assert!(ts <= after);
    }

    #[test]
    fn should_break_local_time_into_calendar_fields() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let local = offset.with_ymd_and_hms(2024, 6, 21, 22, 15, 0).unwrap();
        let view = TimeView::from_local(local);
        assert_eq!(view.year, 2024);
        assert_eq!(view.month, 6);
        assert_eq!(view.day, 21);
        assert_eq!(view.hour, 22);
        assert_eq!(view.minute, 15);
        assert_eq!(view.epoch, local.timestamp());
        assert!(view.text.starts_with("2024-06-21 22:15:00"));
    }
}
