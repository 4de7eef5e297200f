// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! QoS event logging shared by the demos.
//!
//! Every demo hooks the same callbacks: the event is written to the owning
//! node's logger and appended to an [`EventLog`] that tests can inspect.

use hdds_qos::dds::{
    IncompatibleQosStatus, LivelinessChangedStatus, LivelinessLostStatus,
    OfferedDeadlineMissedStatus, PublisherEventCallbacks, RequestedDeadlineMissedStatus,
    SubscriptionEventCallbacks,
};
use hdds_qos::NodeLogger;
use parking_lot::Mutex;
use std::sync::Arc;

/// A QoS event as seen by one of the demo nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QosEvent {
    OfferedDeadlineMissed(OfferedDeadlineMissedStatus),
    RequestedDeadlineMissed(RequestedDeadlineMissedStatus),
    LivelinessLost(LivelinessLostStatus),
    LivelinessChanged(LivelinessChangedStatus),
    OfferedIncompatibleQos(IncompatibleQosStatus),
    RequestedIncompatibleQos(IncompatibleQosStatus),
}

/// Shared, append-only record of QoS events. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<QosEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: QosEvent) {
        self.events.lock().push(event);
    }

    pub fn snapshot(&self) -> Vec<QosEvent> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn offered_deadline_missed(&self) -> Vec<OfferedDeadlineMissedStatus> {
        self.filter(|e| match e {
            QosEvent::OfferedDeadlineMissed(s) => Some(*s),
            _ => None,
        })
    }

    pub fn requested_deadline_missed(&self) -> Vec<RequestedDeadlineMissedStatus> {
        self.filter(|e| match e {
            QosEvent::RequestedDeadlineMissed(s) => Some(*s),
            _ => None,
        })
    }

    pub fn liveliness_lost(&self) -> Vec<LivelinessLostStatus> {
        self.filter(|e| match e {
            QosEvent::LivelinessLost(s) => Some(*s),
            _ => None,
        })
    }

    pub fn liveliness_changed(&self) -> Vec<LivelinessChangedStatus> {
        self.filter(|e| match e {
            QosEvent::LivelinessChanged(s) => Some(*s),
            _ => None,
        })
    }

    fn filter<S>(&self, select: impl Fn(&QosEvent) -> Option<S>) -> Vec<S> {
        self.events.lock().iter().filter_map(select).collect()
    }
}

/// Publisher callbacks logging deadline, liveliness and incompatible QoS
/// events through `logger`.
pub fn publisher_callbacks(logger: &NodeLogger, log: &EventLog) -> PublisherEventCallbacks {
    let (deadline_logger, deadline_log) = (logger.clone(), log.clone());
    let (liveliness_logger, liveliness_log) = (logger.clone(), log.clone());
    let (qos_logger, qos_log) = (logger.clone(), log.clone());
    PublisherEventCallbacks::default()
        .on_deadline(move |status| {
            deadline_logger.info(status);
            deadline_log.record(QosEvent::OfferedDeadlineMissed(status));
        })
        .on_liveliness(move |status| {
            liveliness_logger.info(status);
            liveliness_log.record(QosEvent::LivelinessLost(status));
        })
        .on_incompatible_qos(move |status| {
            qos_logger.warn(status);
            qos_log.record(QosEvent::OfferedIncompatibleQos(status));
        })
}

/// Subscription counterpart of [`publisher_callbacks`].
pub fn subscription_callbacks(logger: &NodeLogger, log: &EventLog) -> SubscriptionEventCallbacks {
    let (deadline_logger, deadline_log) = (logger.clone(), log.clone());
    let (liveliness_logger, liveliness_log) = (logger.clone(), log.clone());
    let (qos_logger, qos_log) = (logger.clone(), log.clone());
    SubscriptionEventCallbacks::default()
        .on_deadline(move |status| {
            deadline_logger.info(status);
            deadline_log.record(QosEvent::RequestedDeadlineMissed(status));
        })
        .on_liveliness(move |status| {
            liveliness_logger.info(status);
            liveliness_log.record(QosEvent::LivelinessChanged(status));
        })
        .on_incompatible_qos(move |status| {
            qos_logger.warn(status);
            qos_log.record(QosEvent::RequestedIncompatibleQos(status));
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callbacks_record_events() {
        let log = EventLog::new();
        let logger = NodeLogger::new("qos_talker");
        let mut callbacks = publisher_callbacks(&logger, &log);
        let status = OfferedDeadlineMissedStatus {
            total_count: 2,
            total_count_change: 1,
        };
        if let Some(callback) = callbacks.deadline.as_mut() {
            callback(status);
        }
        assert_eq!(log.offered_deadline_missed(), vec![status]);
        assert!(log.liveliness_lost().is_empty());
        assert_eq!(log.len(), 1);
    }
}
