// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! QoS (Quality of Service) policies for publishers and subscriptions.
//!
//! The structural policies (reliability, history, durability) live here;
//! the timing policies each have their own module with a runtime tracker.

/// Deadline QoS policy - expected publication period.
pub mod deadline;
/// Lifespan QoS policy - sample expiration time.
pub mod lifespan;
/// Liveliness QoS policy - writer aliveness assertions.
pub mod liveliness;
mod profile;

pub use deadline::Deadline;
pub use lifespan::Lifespan;
pub use liveliness::{Liveliness, LivelinessKind};
pub use profile::{QoS, QosPolicyKind};

use std::fmt;

/// Reliability policy
///
/// Intra-process delivery never drops samples, so both kinds behave the
/// same on the data path. The kind still takes part in endpoint matching.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Reliability {
    /// Fire-and-forget.
    BestEffort,
    /// Delivery is guaranteed.
    #[default]
    Reliable,
}

impl fmt::Display for Reliability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reliability::BestEffort => write!(f, "BEST_EFFORT"),
            Reliability::Reliable => write!(f, "RELIABLE"),
        }
    }
}

/// History policy
///
/// Bounds the publisher's transient-local cache and the subscription queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum History {
    /// Keep last N samples (bounded queue, drops oldest)
    KeepLast(u32),
    /// Keep every sample until it is taken or expires.
    KeepAll,
}

impl Default for History {
    fn default() -> Self {
        Self::KeepLast(10)
    }
}

impl History {
    /// Queue capacity, `None` for `KeepAll`.
    pub fn depth(&self) -> Option<usize> {
        match self {
            History::KeepLast(depth) => Some(*depth as usize),
            History::KeepAll => None,
        }
    }
}

/// Durability policy
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Durability {
    /// Samples are only delivered to subscriptions matched at publish time.
    #[default]
    Volatile,
    /// Publisher caches samples for late-joiners.
    ///
    /// Late-joining transient-local subscriptions receive the cached samples
    /// (up to History depth) that have not yet expired.
    TransientLocal,
}

impl fmt::Display for Durability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Durability::Volatile => write!(f, "VOLATILE"),
            Durability::TransientLocal => write!(f, "TRANSIENT_LOCAL"),
        }
    }
}
