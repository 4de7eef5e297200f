// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! LIFESPAN QoS policy (DDS v1.4 Sec.2.2.3.9)
//!
//! Specifies the maximum duration a sample remains valid.
//! Samples older than the lifespan are considered expired: they are purged
//! from the publisher's transient-local cache and never handed to a
//! subscription callback.
//!
//! # Difference from DEADLINE
//!
//! - **DEADLINE**: Time BETWEEN samples (publication rate)
//! - **LIFESPAN**: Time FOR a sample (validity duration)
//!
//! Lifespan is a publisher-side policy: the expiry time is stamped on each
//! sample when it is written, so it does not take part in matching.

use std::time::{Duration, Instant};

/// LIFESPAN QoS policy
///
/// Default: Infinite (samples never expire).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lifespan {
    /// Maximum sample validity duration
    pub duration: Duration,
}

impl Default for Lifespan {
    fn default() -> Self {
        Self {
            duration: Duration::MAX,
        }
    }
}

impl Lifespan {
    /// Create new lifespan policy with specified duration
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }

    /// Create lifespan with infinite duration (no expiration)
    pub fn infinite() -> Self {
        Self::default()
    }

    /// Check if lifespan is infinite (no expiration)
    pub fn is_infinite(&self) -> bool {
        self.duration == Duration::MAX
    }

    /// Create lifespan from milliseconds
    ///
    /// ```
    /// use hdds_qos::qos::lifespan::Lifespan;
    ///
    /// let lifespan = Lifespan::from_millis(500);
    /// assert_eq!(lifespan.duration.as_millis(), 500);
    /// ```
    pub fn from_millis(ms: u64) -> Self {
        Self {
            duration: Duration::from_millis(ms),
        }
    }

    /// Create lifespan from seconds
    pub fn from_secs(secs: u64) -> Self {
        Self {
            duration: Duration::from_secs(secs),
        }
    }
}

/// Lifespan checker for tracking sample expiration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifespanChecker {
    lifespan: Lifespan,
}

impl LifespanChecker {
    /// Create new lifespan checker
    pub fn new(lifespan: Lifespan) -> Self {
        Self { lifespan }
    }

    /// Check if a sample has expired at `now`
    ///
    /// ```
    /// use hdds_qos::qos::lifespan::{Lifespan, LifespanChecker};
    /// use std::time::{Duration, Instant};
    ///
    /// let checker = LifespanChecker::new(Lifespan::from_millis(100));
    /// let written = Instant::now();
    ///
    /// assert!(!checker.is_expired(written, written + Duration::from_millis(100)));
    /// assert!(checker.is_expired(written, written + Duration::from_millis(101)));
    /// ```
    pub fn is_expired(&self, sample_timestamp: Instant, now: Instant) -> bool {
        if self.lifespan.is_infinite() {
            return false;
        }
        now.saturating_duration_since(sample_timestamp) > self.lifespan.duration
    }

    /// Remaining validity, or `None` if already expired or infinite.
    pub fn remaining_time(&self, sample_timestamp: Instant, now: Instant) -> Option<Duration> {
        if self.lifespan.is_infinite() {
            return None;
        }
        let age = now.saturating_duration_since(sample_timestamp);
        self.lifespan.duration.checked_sub(age)
    }
}
