// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! QoS profile aggregation and builder pattern.

use super::{Deadline, Durability, History, Lifespan, Liveliness, LivelinessKind, Reliability};
use std::fmt;
use std::time::Duration;

/// Identifies a QoS policy, with the DDS `QosPolicyId_t` numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QosPolicyKind {
    #[default]
    Invalid,
    Durability,
    Deadline,
    Liveliness,
    Reliability,
    History,
    Lifespan,
}

impl QosPolicyKind {
    /// DDS policy id (DDS v1.4 Sec.2.3.3).
    pub fn id(self) -> u32 {
        match self {
            QosPolicyKind::Invalid => 0,
            QosPolicyKind::Durability => 2,
            QosPolicyKind::Deadline => 4,
            QosPolicyKind::Liveliness => 8,
            QosPolicyKind::Reliability => 11,
            QosPolicyKind::History => 13,
            QosPolicyKind::Lifespan => 21,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            QosPolicyKind::Invalid => "INVALID",
            QosPolicyKind::Durability => "DURABILITY",
            QosPolicyKind::Deadline => "DEADLINE",
            QosPolicyKind::Liveliness => "LIVELINESS",
            QosPolicyKind::Reliability => "RELIABILITY",
            QosPolicyKind::History => "HISTORY",
            QosPolicyKind::Lifespan => "LIFESPAN",
        }
    }
}

impl fmt::Display for QosPolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Aggregated QoS profile for publishers and subscriptions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QoS {
    pub reliability: Reliability,
    pub history: History,
    pub durability: Durability,
    pub deadline: Deadline,
    pub lifespan: Lifespan,
    pub liveliness: Liveliness,
}

impl Default for QoS {
    fn default() -> Self {
        Self::reliable()
    }
}

impl QoS {
    /// Reliable, volatile, keep-last(10), no timing constraints.
    pub fn reliable() -> Self {
        Self {
            reliability: Reliability::Reliable,
            history: History::KeepLast(10),
            durability: Durability::Volatile,
            deadline: Deadline::infinite(),
            lifespan: Lifespan::infinite(),
            liveliness: Liveliness::infinite(),
        }
    }

    /// Best-effort variant of [`QoS::reliable`].
    pub fn best_effort() -> Self {
        Self {
            reliability: Reliability::BestEffort,
            ..Self::reliable()
        }
    }

    pub fn keep_last(mut self, depth: u32) -> Self {
        self.history = History::KeepLast(depth);
        self
    }

    pub fn keep_all(mut self) -> Self {
        self.history = History::KeepAll;
        self
    }

    pub fn transient_local(mut self) -> Self {
        self.durability = Durability::TransientLocal;
        self
    }

    pub fn volatile(mut self) -> Self {
        self.durability = Durability::Volatile;
        self
    }

    pub fn deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = deadline;
        self
    }

    /// Set deadline from milliseconds.
    ///
    /// ```
    /// use hdds_qos::QoS;
    ///
    /// let qos = QoS::reliable().deadline_millis(100);
    /// assert_eq!(qos.deadline.period.as_millis(), 100);
    /// ```
    pub fn deadline_millis(mut self, ms: u64) -> Self {
        self.deadline = Deadline::from_millis(ms);
        self
    }

    pub fn lifespan(mut self, lifespan: Lifespan) -> Self {
        self.lifespan = lifespan;
        self
    }

    /// Set lifespan from milliseconds.
    pub fn lifespan_millis(mut self, ms: u64) -> Self {
        self.lifespan = Lifespan::from_millis(ms);
        self
    }

    pub fn liveliness(mut self, liveliness: Liveliness) -> Self {
        self.liveliness = liveliness;
        self
    }

    pub fn liveliness_automatic_millis(mut self, lease_ms: u64) -> Self {
        self.liveliness = Liveliness::automatic_millis(lease_ms);
        self
    }

    pub fn liveliness_manual_topic_millis(mut self, lease_ms: u64) -> Self {
        self.liveliness = Liveliness::manual_topic_millis(lease_ms);
        self
    }

    pub fn liveliness_manual_participant_millis(mut self, lease_ms: u64) -> Self {
        self.liveliness = Liveliness::manual_participant_millis(lease_ms);
        self
    }

    /// Validate QoS configuration
    ///
    /// - `History::KeepLast(n)` requires n > 0
    /// - deadline, lifespan and lease durations must be non-zero
    /// - a manual liveliness kind requires a finite lease
    pub fn validate(&self) -> Result<(), String> {
        if self.history == History::KeepLast(0) {
            return Err("History::KeepLast requires depth > 0".to_string());
        }
        if self.deadline.period.is_zero() {
            return Err("Deadline period must be > 0".to_string());
        }
        if self.lifespan.duration.is_zero() {
            return Err("Lifespan duration must be > 0".to_string());
        }
        if self.liveliness.lease_duration.is_zero() {
            return Err("Liveliness lease_duration must be > 0".to_string());
        }
        if self.liveliness.kind != LivelinessKind::Automatic && self.liveliness.is_infinite() {
            return Err(format!(
                "Liveliness {} requires a finite lease_duration",
                self.liveliness.kind
            ));
        }
        Ok(())
    }

    /// Check requested-vs-offered compatibility.
    ///
    /// `offered` is the publisher's QoS, `requested` the subscription's.
    /// Returns the first incompatible policy.
    ///
    /// ```
    /// use hdds_qos::{QoS, QosPolicyKind};
    ///
    /// let offered = QoS::best_effort();
    /// let requested = QoS::reliable();
    /// assert_eq!(QoS::compatibility(&offered, &requested), Err(QosPolicyKind::Reliability));
    /// ```
    pub fn compatibility(offered: &QoS, requested: &QoS) -> Result<(), QosPolicyKind> {
        if offered.reliability < requested.reliability {
            return Err(QosPolicyKind::Reliability);
        }
        if offered.durability < requested.durability {
            return Err(QosPolicyKind::Durability);
        }
        if !offered.deadline.is_compatible_with(&requested.deadline) {
            return Err(QosPolicyKind::Deadline);
        }
        if !offered.liveliness.is_compatible_with(&requested.liveliness) {
            return Err(QosPolicyKind::Liveliness);
        }
        Ok(())
    }

    /// Human-readable summary used in log lines.
    pub fn summary(&self) -> String {
        let mut parts = vec![
            self.reliability.to_string(),
            self.durability.to_string(),
            match self.history {
                History::KeepLast(depth) => format!("KEEP_LAST({})", depth),
                History::KeepAll => "KEEP_ALL".to_string(),
            },
        ];
        if !self.deadline.is_infinite() {
            parts.push(format!("deadline={}", fmt_duration(self.deadline.period)));
        }
        if !self.lifespan.is_infinite() {
            parts.push(format!("lifespan={}", fmt_duration(self.lifespan.duration)));
        }
        if !self.liveliness.is_infinite() || self.liveliness.kind.is_manual() {
            parts.push(format!(
                "liveliness={}/{}",
                self.liveliness.kind,
                fmt_duration(self.liveliness.lease_duration)
            ));
        }
        parts.join(", ")
    }
}

fn fmt_duration(d: Duration) -> String {
    if d == Duration::MAX {
        "infinite".to_string()
    } else {
        format!("{}ms", d.as_millis())
    }
}
