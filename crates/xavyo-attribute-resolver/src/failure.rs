//! Data connector failure tracking
//!
//! The only engine-owned state that requests write to. Slots are created for
//! every connector when the resolver is built; afterwards only the atomics
//! change, so concurrent requests never need a lock.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

const NO_FAILURE: i64 = i64::MIN;

/// Last failure instant per data connector, in epoch milliseconds.
#[derive(Debug, Default)]
pub struct FailureTracker {
    instants: HashMap<String, AtomicI64>,
}

impl FailureTracker {
    /// Create a tracker with a slot for each connector id.
    pub fn new<I, S>(connector_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            instants: connector_ids
                .into_iter()
                .map(|id| (id.into(), AtomicI64::new(NO_FAILURE)))
                .collect(),
        }
    }

    /// Record a failure. Concurrent reports keep the latest instant.
    pub fn record(&self, connector_id: &str, at: DateTime<Utc>) {
        if let Some(slot) = self.instants.get(connector_id) {
            slot.fetch_max(at.timestamp_millis(), Ordering::SeqCst);
        }
    }

    /// Get the last failure instant.
    pub fn last(&self, connector_id: &str) -> Option<DateTime<Utc>> {
        let millis = self.instants.get(connector_id)?.load(Ordering::SeqCst);
        if millis == NO_FAILURE {
            return None;
        }
        DateTime::from_timestamp_millis(millis)
    }

    /// Forget the last failure.
    pub fn reset(&self, connector_id: &str) {
        if let Some(slot) = self.instants.get(connector_id) {
            slot.store(NO_FAILURE, Ordering::SeqCst);
        }
    }

    /// Check whether `now` falls inside the no-retry window after the last failure.
    pub fn in_no_retry_window(
        &self,
        connector_id: &str,
        no_retry_delay: Duration,
        now: DateTime<Utc>,
    ) -> bool {
        if no_retry_delay.is_zero() {
            return false;
        }
        let Some(last) = self.last(connector_id) else {
            return false;
        };
        let Ok(delay) = ChronoDuration::from_std(no_retry_delay) else {
            return true;
        };
        last.checked_add_signed(delay)
            .map_or(true, |until| until > now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_no_failure_recorded() {
        let tracker = FailureTracker::new(["ldap"]);
        assert!(tracker.last("ldap").is_none());
        assert!(!tracker.in_no_retry_window("ldap", Duration::from_secs(60), Utc::now()));
    }

    #[test]
    fn test_window() {
        let tracker = FailureTracker::new(["ldap"]);
        let failed_at = Utc::now();
        tracker.record("ldap", failed_at);

        let delay = Duration::from_secs(60);
        assert!(tracker.in_no_retry_window("ldap", delay, failed_at + ChronoDuration::seconds(1)));
        assert!(!tracker.in_no_retry_window("ldap", delay, failed_at + ChronoDuration::seconds(61)));
        assert!(!tracker.in_no_retry_window("ldap", Duration::ZERO, failed_at));
    }

    #[test]
    fn test_window_past_max_instant() {
        let tracker = FailureTracker::new(["ldap"]);
        let failed_at = Utc::now();
        tracker.record("ldap", failed_at);

        let delay = Duration::from_millis(100_000_000_000_000_000);
        assert!(ChronoDuration::from_std(delay).is_ok());
        assert!(tracker.in_no_retry_window("ldap", delay, failed_at + ChronoDuration::days(365)));
    }

    #[test]
    fn test_latest_instant_wins() {
        let tracker = FailureTracker::new(["ldap"]);
        let later = Utc::now();
        let earlier = later - ChronoDuration::seconds(30);

        tracker.record("ldap", later);
        tracker.record("ldap", earlier);
        assert_eq!(
            tracker.last("ldap").map(|t| t.timestamp_millis()),
            Some(later.timestamp_millis())
        );

        tracker.reset("ldap");
        assert!(tracker.last("ldap").is_none());
    }

    #[test]
    fn test_unknown_connector_ignored() {
        let tracker = FailureTracker::new(["ldap"]);
        tracker.record("other", Utc::now());
        assert!(tracker.last("other").is_none());
    }

    #[test]
    fn test_concurrent_records() {
        let tracker = Arc::new(FailureTracker::new(["ldap"]));
        let base = Utc::now();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let tracker = Arc::clone(&tracker);
                std::thread::spawn(move || {
                    tracker.record("ldap", base + ChronoDuration::milliseconds(i));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(
            tracker.last("ldap").map(|t| t.timestamp_millis()),
            Some(base.timestamp_millis() + 7)
        );
    }
}
