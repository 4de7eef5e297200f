// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::{Liveliness, LivelinessKind};
use std::time::{Duration, Instant};

/// Liveliness monitor for tracking a publisher's lease.
///
/// The lease starts when the monitor is created; every assertion renews it.
#[derive(Debug)]
pub struct LivelinessMonitor {
    kind: LivelinessKind,
    lease_duration: Duration,
    last_assert: Instant,
    alive: bool,
}

impl LivelinessMonitor {
    #[must_use]
    pub fn new(kind: LivelinessKind, lease_duration: Duration, now: Instant) -> Self {
        Self {
            kind,
            lease_duration,
            last_assert: now,
            alive: true,
        }
    }

    #[must_use]
    pub fn from_policy(policy: &Liveliness, now: Instant) -> Self {
        Self::new(policy.kind, policy.lease_duration, now)
    }

    /// Renew the lease. Returns `true` if this revived a lost lease.
    pub fn assert(&mut self, now: Instant) -> bool {
        self.last_assert = now;
        let revived = !self.alive;
        self.alive = true;
        revived
    }

    /// Latch the lease state at `now` and return whether it is still alive.
    pub fn check(&mut self, now: Instant) -> bool {
        if self.alive && !self.is_alive(now) {
            self.alive = false;
        }
        self.alive
    }

    /// Lease state at `now` without latching it.
    #[must_use]
    pub fn is_alive(&self, now: Instant) -> bool {
        match self.expiry() {
            None => true,
            Some(expiry) => now <= expiry,
        }
    }

    /// Whether the last `check` saw the lease alive.
    #[must_use]
    pub fn was_alive(&self) -> bool {
        self.alive
    }

    #[must_use]
    pub fn last_assert(&self) -> Instant {
        self.last_assert
    }

    #[must_use]
    pub fn kind(&self) -> LivelinessKind {
        self.kind
    }

    /// Instant at which the lease runs out, `None` for an infinite lease.
    #[must_use]
    pub fn expiry(&self) -> Option<Instant> {
        if self.lease_duration == Duration::MAX {
            return None;
        }
        self.last_assert.checked_add(self.lease_duration)
    }

    #[must_use]
    pub fn time_until_expiry(&self, now: Instant) -> Option<Duration> {
        self.expiry()
            .map(|expiry| expiry.saturating_duration_since(now))
    }
}
