//! Hourly unique-player statistics.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use rumble_core::participant::ParticipantId;

const HOURS_PER_DAY: usize = 24;

#[derive(Debug, Default, Clone)]
struct HourBucket {
    date: Option<NaiveDate>,
    identities: HashSet<ParticipantId>,
}

/// Unique identities seen per hour of day (UTC), over a rolling 24 hours.
#[derive(Debug, Clone)]
pub struct HourlyPlayerStats {
    buckets: Vec<HourBucket>,
}

impl Default for HourlyPlayerStats {
    fn default() -> Self {
        Self {
            buckets: vec![HourBucket::default(); HOURS_PER_DAY],
        }
    }
}

impl HourlyPlayerStats {
    /// Creates empty statistics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a connection at `at`. A bucket last used on an earlier date
    /// is emptied first.
    pub fn record(&mut self, id: ParticipantId, at: DateTime<Utc>) {
        let date = at.date_naive();
        let bucket = &mut self.buckets[at.hour() as usize];
        if bucket.date != Some(date) {
            bucket.identities.clear();
            bucket.date = Some(date);
        }
        bucket.identities.insert(id);
    }

    /// Unique counts per hour of day. Buckets older than 24 hours relative
    /// to `now` report zero.
    #[must_use]
    pub fn hourly_counts(&self, now: DateTime<Utc>) -> Vec<usize> {
        let today = now.date_naive();
        let yesterday = today.pred_opt();
        let current_hour = now.hour() as usize;

        self.buckets
            .iter()
            .enumerate()
            .map(|(hour, bucket)| {
                let fresh = match bucket.date {
                    Some(date) if date == today => hour <= current_hour,
                    Some(date) if Some(date) == yesterday => hour > current_hour,
                    _ => false,
                };
                if fresh { bucket.identities.len() } else { 0 }
            })
            .collect()
    }
}
