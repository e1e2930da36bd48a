//! Frozen wall clock for stats and admin-log timestamps.

use chrono::{DateTime, TimeZone, Utc};
use rumble_core::clock::Clock;

/// Always reports the same instant, so hourly stats land in one bucket.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Frozen at the top of `hour` on the given UTC day.
    ///
    /// # Panics
    ///
    /// Panics if the date or hour is out of range.
    #[must_use]
    pub fn at_hour(year: i32, month: u32, day: u32, hour: u32) -> Self {
        Self(Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
