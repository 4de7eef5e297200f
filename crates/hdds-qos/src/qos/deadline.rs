// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! DEADLINE QoS policy (DDS v1.4 Sec.2.2.3.7)
//!
//! Specifies the expected sample publication/reception rate.
//! If no sample is published/received within the deadline period,
//! a deadline missed event is triggered. Every further period without a
//! sample counts as another miss.
//!
//! # QoS Compatibility (Request vs Offered)
//!
//! **Rule:** Writer offers <= Reader requests (RxO semantics)
//!
//! - Writer offers 100ms deadline -> Reader requests 200ms -> Compatible \[OK\]
//! - Writer offers 200ms deadline -> Reader requests 100ms -> Incompatible \[X\]
//!
//! # Examples
//!
//! ```
//! use hdds_qos::qos::deadline::{Deadline, DeadlineTracker};
//! use std::time::{Duration, Instant};
//!
//! let deadline = Deadline::from_millis(100);
//! let mut tracker = DeadlineTracker::new(deadline.period);
//!
//! let t0 = Instant::now();
//! tracker.on_write(t0);
//! assert_eq!(tracker.check(t0 + Duration::from_millis(50)), 0);
//! assert_eq!(tracker.check(t0 + Duration::from_millis(250)), 2);
//! ```

use std::time::{Duration, Instant};

/// DEADLINE QoS policy
///
/// Specifies the maximum time between samples.
/// Default: Infinite (no deadline enforcement).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    /// Maximum time between samples
    pub period: Duration,
}

impl Default for Deadline {
    /// Default: Infinite deadline (no enforcement)
    fn default() -> Self {
        Self {
            period: Duration::MAX,
        }
    }
}

impl Deadline {
    /// Create new deadline policy with specified period
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    /// Create deadline with infinite period (no enforcement)
    pub fn infinite() -> Self {
        Self::default()
    }

    /// Check if deadline is infinite (no enforcement)
    pub fn is_infinite(&self) -> bool {
        self.period == Duration::MAX
    }

    /// Create deadline from milliseconds
    ///
    /// ```
    /// use hdds_qos::qos::deadline::Deadline;
    ///
    /// let deadline = Deadline::from_millis(100);
    /// assert_eq!(deadline.period.as_millis(), 100);
    /// ```
    pub fn from_millis(ms: u64) -> Self {
        Self {
            period: Duration::from_millis(ms),
        }
    }

    /// Create deadline from seconds
    pub fn from_secs(secs: u64) -> Self {
        Self {
            period: Duration::from_secs(secs),
        }
    }

    /// Check QoS compatibility between offered (writer) and requested (reader)
    ///
    /// **Rule (RxO):** Writer offers <= Reader requests
    ///
    /// ```
    /// use hdds_qos::qos::deadline::Deadline;
    ///
    /// let writer = Deadline::from_millis(100);
    /// let reader = Deadline::from_millis(200);
    ///
    /// assert!(writer.is_compatible_with(&reader)); // 100ms <= 200ms \[OK\]
    /// assert!(!reader.is_compatible_with(&writer)); // 200ms > 100ms \[X\]
    /// ```
    pub fn is_compatible_with(&self, requested: &Deadline) -> bool {
        self.period <= requested.period
    }
}

/// Generates the writer and reader deadline trackers, which differ only in
/// the name of the recorded event.
macro_rules! impl_deadline_tracker {
    (
        $struct_name:ident,
        $doc:expr,
        $on_event:ident,
        $event_doc:expr
    ) => {
        #[doc = $doc]
        #[derive(Debug)]
        pub struct $struct_name {
            period: Duration,
            last_event: Option<Instant>,
            next_deadline: Option<Instant>,
            missed_count: u64,
        }

        impl $struct_name {
            /// Create new deadline tracker for the given period.
            pub fn new(period: Duration) -> Self {
                Self {
                    period,
                    last_event: None,
                    next_deadline: None,
                    missed_count: 0,
                }
            }

            fn enforced(&self) -> bool {
                self.period != Duration::MAX && !self.period.is_zero()
            }

            #[doc = $event_doc]
            pub fn $on_event(&mut self, now: Instant) {
                self.last_event = Some(now);
                self.next_deadline = if self.enforced() {
                    now.checked_add(self.period)
                } else {
                    None
                };
            }

            /// Account for every period that elapsed without an event.
            ///
            /// Returns the number of newly missed periods (0 if none). The
            /// next deadline is advanced past `now`.
            pub fn check(&mut self, now: Instant) -> u64 {
                let Some(due) = self.next_deadline else {
                    return 0;
                };
                if now < due {
                    return 0;
                }
                let period = self.period.as_nanos().max(1);
                let missed = now.duration_since(due).as_nanos() / period + 1;
                // Past the representable range the deadline is no longer tracked.
                self.next_deadline = u64::try_from(missed * period)
                    .ok()
                    .and_then(|ahead| due.checked_add(Duration::from_nanos(ahead)));
                let missed = u64::try_from(missed).unwrap_or(u64::MAX);
                self.missed_count = self.missed_count.saturating_add(missed);
                missed
            }

            /// Check if the current period is already overdue.
            pub fn is_missed(&self, now: Instant) -> bool {
                self.next_deadline.is_some_and(|due| now >= due)
            }

            /// Instant at which the current period expires.
            ///
            /// `None` before the first event or with an infinite period.
            pub fn next_deadline(&self) -> Option<Instant> {
                self.next_deadline
            }

            /// Timestamp of the last recorded event.
            pub fn last_event(&self) -> Option<Instant> {
                self.last_event
            }

            /// Get total number of deadline misses
            pub fn missed_count(&self) -> u64 {
                self.missed_count
            }

            /// Time remaining until the current period expires.
            pub fn time_until_deadline(&self, now: Instant) -> Option<Duration> {
                self.next_deadline
                    .map(|due| due.saturating_duration_since(now))
            }
        }
    };
}

impl_deadline_tracker!(
    DeadlineTracker,
    "Deadline tracker for publishers\n\nMonitors the offered deadline: time between consecutive writes.",
    on_write,
    "Record a write at `now` and start a new period."
);

impl_deadline_tracker!(
    ReaderDeadlineTracker,
    "Deadline tracker for subscriptions\n\nMonitors the requested deadline: time between received samples.",
    on_sample,
    "Record a sample reception at `now` and start a new period."
);

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_deadline_default() {
        let deadline = Deadline::default();
        assert_eq!(deadline.period, Duration::MAX);
        assert!(deadline.is_infinite());
    }

    #[test]
    fn test_compatibility_writer_faster() {
        let writer = Deadline::new(ms(100));
        let reader = Deadline::new(ms(200));
        assert!(writer.is_compatible_with(&reader));
    }

    #[test]
    fn test_compatibility_writer_slower() {
        let writer = Deadline::new(ms(200));
        let reader = Deadline::new(ms(100));
        assert!(!writer.is_compatible_with(&reader));
    }

    #[test]
    fn test_compatibility_infinite() {
        let infinite = Deadline::infinite();
        let finite = Deadline::new(ms(100));

        assert!(!infinite.is_compatible_with(&finite));
        assert!(infinite.is_compatible_with(&infinite));
        assert!(finite.is_compatible_with(&infinite));
    }

    #[test]
    fn test_writer_tracker_no_write_not_missed() {
        let mut tracker = DeadlineTracker::new(ms(100));
        let now = Instant::now();
        assert!(!tracker.is_missed(now + ms(1000)));
        assert_eq!(tracker.check(now + ms(1000)), 0);
        assert_eq!(tracker.next_deadline(), None);
    }

    #[test]
    fn test_writer_tracker_counts_each_period() {
        let mut tracker = DeadlineTracker::new(ms(100));
        let t0 = Instant::now();
        tracker.on_write(t0);

        assert_eq!(tracker.check(t0 + ms(99)), 0);
        assert_eq!(tracker.check(t0 + ms(100)), 1);
        assert_eq!(tracker.check(t0 + ms(150)), 0);
        assert_eq!(tracker.check(t0 + ms(320)), 2);
        assert_eq!(tracker.missed_count(), 3);
        assert_eq!(tracker.next_deadline(), Some(t0 + ms(400)));
    }

    #[test]
    fn test_write_restarts_period() {
        let mut tracker = DeadlineTracker::new(ms(100));
        let t0 = Instant::now();
        tracker.on_write(t0);
        tracker.on_write(t0 + ms(90));
        assert_eq!(tracker.check(t0 + ms(150)), 0);
        assert_eq!(tracker.time_until_deadline(t0 + ms(150)), Some(ms(40)));
    }

    #[test]
    fn test_infinite_tracker_never_fires() {
        let mut tracker = ReaderDeadlineTracker::new(Duration::MAX);
        let t0 = Instant::now();
        tracker.on_sample(t0);
        assert_eq!(tracker.check(t0 + Duration::from_secs(3600)), 0);
        assert_eq!(tracker.next_deadline(), None);
        assert_eq!(tracker.last_event(), Some(t0));
    }

    #[test]
    fn test_reader_tracker() {
        let mut tracker = ReaderDeadlineTracker::new(ms(50));
        let t0 = Instant::now();
        tracker.on_sample(t0);
        assert!(tracker.is_missed(t0 + ms(60)));
        assert_eq!(tracker.check(t0 + ms(60)), 1);
        assert!(!tracker.is_missed(t0 + ms(60)));
    }

    #[test]
    fn test_tiny_period_counted_in_one_step() {
        let mut tracker = DeadlineTracker::new(Duration::from_nanos(1));
        let t0 = Instant::now();
        tracker.on_write(t0);
        assert_eq!(tracker.check(t0 + Duration::from_secs(5)), 5_000_000_000);
        assert_eq!(
            tracker.next_deadline(),
            Some(t0 + Duration::from_secs(5) + Duration::from_nanos(1))
        );
        assert_eq!(tracker.check(t0 + Duration::from_secs(5)), 0);
    }
}
