// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! QoS event statuses and event callbacks.
//!
//! Statuses follow DDS v1.4 Section 2.2.4.1 (communication status): every
//! status carries cumulative counters plus the change since the last time it
//! was delivered to a callback.
//!
//! # Usage
//!
//! ```
//! use hdds_qos::dds::{PublisherEventCallbacks, SubscriptionEventCallbacks};
//!
//! let pub_callbacks = PublisherEventCallbacks::default()
//!     .on_deadline(|status| println!("{}", status));
//! let sub_callbacks = SubscriptionEventCallbacks::default()
//!     .on_liveliness(|status| println!("{}", status));
//! # let _ = (pub_callbacks, sub_callbacks);
//! ```
//!
//! # Thread Safety
//!
//! Callbacks run on the thread spinning the executor that owns the node.
//! They must be `Send` and should not block.

use crate::dds::Guid;
use crate::qos::QosPolicyKind;
use std::fmt;

/// Publisher failed to publish within its offered deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OfferedDeadlineMissedStatus {
    /// Total cumulative count of missed deadline periods.
    pub total_count: u32,
    /// Change in total_count since last callback.
    pub total_count_change: u32,
}

/// Subscription did not receive a sample within its requested deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestedDeadlineMissedStatus {
    /// Total cumulative count of missed deadline periods.
    pub total_count: u32,
    /// Change in total_count since last callback.
    pub total_count_change: u32,
}

/// Publisher let its liveliness lease expire (MANUAL_BY_* only).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LivelinessLostStatus {
    /// Total cumulative count of alive -> not-alive transitions.
    pub total_count: u32,
    /// Change in total_count since last callback.
    pub total_count_change: u32,
}

/// Liveliness of the publishers matched with a subscription changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LivelinessChangedStatus {
    /// Number of matched publications currently alive.
    pub alive_count: u32,
    /// Number of matched publications that have lost liveliness.
    pub not_alive_count: u32,
    /// Change in alive_count since last callback.
    pub alive_count_change: i32,
    /// Change in not_alive_count since last callback.
    pub not_alive_count_change: i32,
    /// Publication that changed liveliness last.
    pub last_publication_handle: Option<Guid>,
}

/// A remote endpoint was discovered but its QoS is incompatible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IncompatibleQosStatus {
    /// Total cumulative count of incompatible endpoints.
    pub total_count: u32,
    /// Change in total_count since last callback.
    pub total_count_change: u32,
    /// The last policy found incompatible.
    pub last_policy_kind: QosPolicyKind,
}

impl fmt::Display for OfferedDeadlineMissedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Offered deadline missed - total {} (delta {})",
            self.total_count, self.total_count_change
        )
    }
}

impl fmt::Display for RequestedDeadlineMissedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Requested deadline missed - total {} (delta {})",
            self.total_count, self.total_count_change
        )
    }
}

impl fmt::Display for LivelinessLostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Liveliness lost - total {} (delta {})",
            self.total_count, self.total_count_change
        )
    }
}

impl fmt::Display for LivelinessChangedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Liveliness changed - alive {} (delta {}), not alive {} (delta {})",
            self.alive_count,
            self.alive_count_change,
            self.not_alive_count,
            self.not_alive_count_change
        )
    }
}

impl fmt::Display for IncompatibleQosStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Incompatible QoS - total {} (delta {}), last policy {}",
            self.total_count, self.total_count_change, self.last_policy_kind
        )
    }
}

/// Boxed QoS event callback.
pub type EventCallback<S> = Box<dyn FnMut(S) + Send>;

/// Optional QoS event callbacks attached to a publisher.
#[derive(Default)]
pub struct PublisherEventCallbacks {
    pub deadline: Option<EventCallback<OfferedDeadlineMissedStatus>>,
    pub liveliness: Option<EventCallback<LivelinessLostStatus>>,
    pub incompatible_qos: Option<EventCallback<IncompatibleQosStatus>>,
}

impl PublisherEventCallbacks {
    pub fn on_deadline<F>(mut self, callback: F) -> Self
    where
        F: FnMut(OfferedDeadlineMissedStatus) + Send + 'static,
    {
        self.deadline = Some(Box::new(callback));
        self
    }

    pub fn on_liveliness<F>(mut self, callback: F) -> Self
    where
        F: FnMut(LivelinessLostStatus) + Send + 'static,
    {
        self.liveliness = Some(Box::new(callback));
        self
    }

    pub fn on_incompatible_qos<F>(mut self, callback: F) -> Self
    where
        F: FnMut(IncompatibleQosStatus) + Send + 'static,
    {
        self.incompatible_qos = Some(Box::new(callback));
        self
    }
}

/// Optional QoS event callbacks attached to a subscription.
#[derive(Default)]
pub struct SubscriptionEventCallbacks {
    pub deadline: Option<EventCallback<RequestedDeadlineMissedStatus>>,
    pub liveliness: Option<EventCallback<LivelinessChangedStatus>>,
    pub incompatible_qos: Option<EventCallback<IncompatibleQosStatus>>,
}

impl SubscriptionEventCallbacks {
    pub fn on_deadline<F>(mut self, callback: F) -> Self
    where
        F: FnMut(RequestedDeadlineMissedStatus) + Send + 'static,
    {
        self.deadline = Some(Box::new(callback));
        self
    }

    pub fn on_liveliness<F>(mut self, callback: F) -> Self
    where
        F: FnMut(LivelinessChangedStatus) + Send + 'static,
    {
        self.liveliness = Some(Box::new(callback));
        self
    }

    pub fn on_incompatible_qos<F>(mut self, callback: F) -> Self
    where
        F: FnMut(IncompatibleQosStatus) + Send + 'static,
    {
        self.incompatible_qos = Some(Box::new(callback));
        self
    }
}

/// Invoke `callback` with `status` when both are present.
pub(crate) fn deliver<S: Copy>(
    callback: &mut Option<EventCallback<S>>,
    status: Option<S>,
) -> bool {
    match (callback.as_mut(), status) {
        (Some(callback), Some(status)) => {
            callback(status);
            true
        }
        _ => false,
    }
}
