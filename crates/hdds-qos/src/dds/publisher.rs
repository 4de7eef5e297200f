// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Publisher (DataWriter) endpoint.
//!
//! A publisher stamps each sample with its source timestamp and lifespan
//! expiry, keeps a transient-local history for late joiners, tracks its
//! offered deadline and its liveliness lease, and fans samples out to the
//! matched subscriptions.

use super::listener::{
    deliver, IncompatibleQosStatus, LivelinessLostStatus, OfferedDeadlineMissedStatus,
    PublisherEventCallbacks,
};
use super::node::{ParticipantLiveliness, Waitable};
use super::subscription::ReaderEndpoint;
use super::topic::{Sample, TopicState};
use super::{Context, Error, Guid, Message, Result};
use crate::qos::deadline::DeadlineTracker;
use crate::qos::lifespan::LifespanChecker;
use crate::qos::liveliness::LivelinessMonitor;
use crate::qos::{Durability, LivelinessKind, QoS, QosPolicyKind};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::{Arc, Weak};
use std::time::Instant;

/// Statuses changed since the last callback dispatch.
#[derive(Default)]
struct Dirty {
    deadline: bool,
    liveliness: bool,
    incompatible: bool,
}

#[derive(Default)]
struct PendingEvents {
    deadline: Option<OfferedDeadlineMissedStatus>,
    liveliness: Option<LivelinessLostStatus>,
    incompatible: Option<IncompatibleQosStatus>,
}

struct WriterState<T> {
    history: VecDeque<Sample<T>>,
    next_sequence: u64,
    deadline: DeadlineTracker,
    liveliness: LivelinessMonitor,
    matched: Vec<Weak<ReaderEndpoint<T>>>,
    offered_deadline: OfferedDeadlineMissedStatus,
    liveliness_lost: LivelinessLostStatus,
    incompatible: IncompatibleQosStatus,
    dirty: Dirty,
    destroyed: bool,
}

pub(crate) struct WriterEndpoint<T> {
    guid: Guid,
    topic: Arc<str>,
    qos: QoS,
    context: Context,
    topic_state: Weak<Mutex<TopicState<T>>>,
    participant: Arc<ParticipantLiveliness>,
    state: Mutex<WriterState<T>>,
    callbacks: Mutex<PublisherEventCallbacks>,
}

impl<T: Message> WriterEndpoint<T> {
    pub fn create(
        context: &Context,
        topic_state: &Arc<Mutex<TopicState<T>>>,
        qos: QoS,
        participant: Arc<ParticipantLiveliness>,
        callbacks: PublisherEventCallbacks,
        now: Instant,
    ) -> Arc<Self> {
        let topic = topic_state.lock().name();
        let endpoint = Arc::new(Self {
            guid: context.next_guid(),
            topic,
            context: context.clone(),
            topic_state: Arc::downgrade(topic_state),
            participant,
            state: Mutex::new(WriterState {
                history: VecDeque::new(),
                next_sequence: 1,
                deadline: DeadlineTracker::new(qos.deadline.period),
                liveliness: LivelinessMonitor::from_policy(&qos.liveliness, now),
                matched: Vec::new(),
                offered_deadline: OfferedDeadlineMissedStatus::default(),
                liveliness_lost: LivelinessLostStatus::default(),
                incompatible: IncompatibleQosStatus::default(),
                dirty: Dirty::default(),
                destroyed: false,
            }),
            callbacks: Mutex::new(callbacks),
            qos,
        });
        topic_state.lock().add_writer(Arc::clone(&endpoint), now);
        endpoint
    }

    pub fn guid(&self) -> Guid {
        self.guid
    }

    pub fn qos(&self) -> &QoS {
        &self.qos
    }

    /// Register a matched subscription and return the samples to replay.
    pub fn add_matched_reader(
        &self,
        reader: &Arc<ReaderEndpoint<T>>,
        reader_qos: &QoS,
        now: Instant,
    ) -> Vec<Sample<T>> {
        let mut st = self.state.lock();
        st.matched.push(Arc::downgrade(reader));
        if self.qos.durability == Durability::TransientLocal
            && reader_qos.durability == Durability::TransientLocal
        {
            purge_expired(&mut st.history, now);
            st.history.iter().cloned().collect()
        } else {
            Vec::new()
        }
    }

    pub fn remove_matched_reader(&self, guid: Guid) {
        self.state
            .lock()
            .matched
            .retain(|r| r.upgrade().is_some_and(|r| r.guid() != guid));
    }

    pub fn on_incompatible_qos(&self, policy: QosPolicyKind) {
        let mut st = self.state.lock();
        st.incompatible.total_count += 1;
        st.incompatible.total_count_change += 1;
        st.incompatible.last_policy_kind = policy;
        st.dirty.incompatible = true;
        drop(st);
        self.context.wake();
    }

    pub fn publish(&self, message: &T, now: Instant) -> Result<()> {
        let (sample, readers) = {
            let mut st = self.state.lock();
            if st.destroyed {
                return Err(Error::AlreadyDestroyed);
            }
            let sample = Sample {
                data: Arc::new(message.clone()),
                source_timestamp: now,
                lifespan: LifespanChecker::new(self.qos.lifespan),
                sequence: st.next_sequence,
                writer: self.guid,
            };
            st.next_sequence += 1;
            st.deadline.on_write(now);
            st.liveliness.assert(now);

            if self.qos.durability == Durability::TransientLocal {
                st.history.push_back(sample.clone());
                if let Some(depth) = self.qos.history.depth() {
                    while st.history.len() > depth {
                        st.history.pop_front();
                    }
                }
                purge_expired(&mut st.history, now);
            }

            st.matched.retain(|r| r.strong_count() > 0);
            let readers: Vec<Arc<ReaderEndpoint<T>>> =
                st.matched.iter().filter_map(Weak::upgrade).collect();
            (sample, readers)
        };

        self.participant.assert(now);
        for reader in readers {
            reader.deliver(sample.clone(), now);
        }
        self.context.wake();
        Ok(())
    }

    pub fn assert_liveliness(&self, now: Instant) -> Result<()> {
        let mut st = self.state.lock();
        if st.destroyed {
            return Err(Error::AlreadyDestroyed);
        }
        st.liveliness.assert(now);
        drop(st);
        if self.qos.liveliness.kind == LivelinessKind::ManualByParticipant {
            self.participant.assert(now);
        }
        self.context.wake();
        Ok(())
    }

    /// Pull a node-level assertion into this publisher's lease.
    fn sync_participant_lease(&self, st: &mut WriterState<T>) {
        if self.qos.liveliness.kind != LivelinessKind::ManualByParticipant {
            return;
        }
        let last = self.participant.last_assert();
        if last > st.liveliness.last_assert() {
            st.liveliness.assert(last);
        }
    }

    /// Liveliness as seen by matched subscriptions.
    pub fn is_alive(&self, now: Instant) -> bool {
        let mut st = self.state.lock();
        if st.destroyed {
            return false;
        }
        if !self.qos.liveliness.kind.is_manual() {
            return true;
        }
        self.sync_participant_lease(&mut st);
        st.liveliness.is_alive(now)
    }

    /// Instant at which the lease runs out (manual kinds only).
    pub fn lease_expiry(&self) -> Option<Instant> {
        if !self.qos.liveliness.kind.is_manual() {
            return None;
        }
        let mut st = self.state.lock();
        if st.destroyed {
            return None;
        }
        self.sync_participant_lease(&mut st);
        st.liveliness.expiry()
    }

    pub fn is_destroyed(&self) -> bool {
        self.state.lock().destroyed
    }

    fn collect_events(&self, now: Instant) -> PendingEvents {
        let mut st = self.state.lock();
        if st.destroyed {
            return PendingEvents::default();
        }

        let missed = st.deadline.check(now);
        if missed > 0 {
            let missed = u32::try_from(missed).unwrap_or(u32::MAX);
            st.offered_deadline.total_count = st.offered_deadline.total_count.saturating_add(missed);
            st.offered_deadline.total_count_change += missed;
            st.dirty.deadline = true;
        }

        if self.qos.liveliness.kind.is_manual() {
            self.sync_participant_lease(&mut st);
            let was_alive = st.liveliness.was_alive();
            if was_alive && !st.liveliness.check(now) {
                st.liveliness_lost.total_count += 1;
                st.liveliness_lost.total_count_change += 1;
                st.dirty.liveliness = true;
                log::debug!(
                    "[publisher] {} on '{}' lost liveliness",
                    self.guid,
                    self.topic
                );
            }
        }

        let dirty = std::mem::take(&mut st.dirty);
        let mut events = PendingEvents::default();
        if dirty.deadline {
            events.deadline = Some(st.offered_deadline);
            st.offered_deadline.total_count_change = 0;
        }
        if dirty.liveliness {
            events.liveliness = Some(st.liveliness_lost);
            st.liveliness_lost.total_count_change = 0;
        }
        if dirty.incompatible {
            events.incompatible = Some(st.incompatible);
            st.incompatible.total_count_change = 0;
        }
        events
    }

    pub fn offered_deadline_missed_status(&self) -> OfferedDeadlineMissedStatus {
        self.state.lock().offered_deadline
    }

    pub fn liveliness_lost_status(&self) -> LivelinessLostStatus {
        self.state.lock().liveliness_lost
    }

    pub fn incompatible_qos_status(&self) -> IncompatibleQosStatus {
        self.state.lock().incompatible
    }

    pub fn matched_count(&self) -> usize {
        self.state
            .lock()
            .matched
            .iter()
            .filter(|r| r.upgrade().is_some_and(|r| !r.is_destroyed()))
            .count()
    }
}

fn purge_expired<T>(history: &mut VecDeque<Sample<T>>, now: Instant) {
    history.retain(|sample| !sample.is_expired(now));
}

impl<T: Message> Waitable for WriterEndpoint<T> {
    fn guid(&self) -> Guid {
        self.guid
    }

    fn is_destroyed(&self) -> bool {
        self.state.lock().destroyed
    }

    fn execute(&self, now: Instant) -> bool {
        let events = self.collect_events(now);
        let mut callbacks = self.callbacks.lock();
        let mut fired = deliver(&mut callbacks.deadline, events.deadline);
        fired |= deliver(&mut callbacks.liveliness, events.liveliness);
        fired |= deliver(&mut callbacks.incompatible_qos, events.incompatible);
        fired
    }

    fn next_wake(&self, _now: Instant) -> Option<Instant> {
        let st = self.state.lock();
        if st.destroyed {
            return None;
        }
        let lease = if self.qos.liveliness.kind.is_manual() && st.liveliness.was_alive() {
            // Wake just after the lease has run out; `is_alive` is inclusive.
            st.liveliness
                .expiry()
                .and_then(|e| e.checked_add(std::time::Duration::from_millis(1)))
        } else {
            None
        };
        [st.deadline.next_deadline(), lease].into_iter().flatten().min()
    }

    fn destroy(&self) {
        {
            let mut st = self.state.lock();
            if st.destroyed {
                return;
            }
            st.destroyed = true;
            st.history.clear();
            st.matched.clear();
        }
        if let Some(topic) = self.topic_state.upgrade() {
            topic.lock().remove_writer(self.guid);
        }
        log::debug!("[publisher] {} on '{}' destroyed", self.guid, self.topic);
        self.context.wake();
    }
}

/// Typed publisher handle. Cheap to clone.
///
/// Created by [`Node::create_publisher`](super::Node::create_publisher).
pub struct Publisher<T: Message> {
    endpoint: Arc<WriterEndpoint<T>>,
}

impl<T: Message> Clone for Publisher<T> {
    fn clone(&self) -> Self {
        Self {
            endpoint: Arc::clone(&self.endpoint),
        }
    }
}

impl<T: Message> Publisher<T> {
    pub(crate) fn new(endpoint: Arc<WriterEndpoint<T>>) -> Self {
        Self { endpoint }
    }

    /// Publish a sample to every matched subscription.
    ///
    /// Publishing also asserts this publisher's liveliness.
    pub fn publish(&self, message: &T) -> Result<()> {
        self.endpoint.publish(message, Instant::now())
    }

    /// Manually assert liveliness without publishing.
    pub fn assert_liveliness(&self) -> Result<()> {
        self.endpoint.assert_liveliness(Instant::now())
    }

    pub fn guid(&self) -> Guid {
        self.endpoint.guid
    }

    pub fn topic_name(&self) -> &str {
        &self.endpoint.topic
    }

    pub fn qos(&self) -> &QoS {
        &self.endpoint.qos
    }

    /// Number of live, compatible subscriptions currently matched.
    pub fn matched_subscriptions(&self) -> usize {
        self.endpoint.matched_count()
    }

    pub fn offered_deadline_missed_status(&self) -> OfferedDeadlineMissedStatus {
        self.endpoint.offered_deadline_missed_status()
    }

    pub fn liveliness_lost_status(&self) -> LivelinessLostStatus {
        self.endpoint.liveliness_lost_status()
    }

    pub fn incompatible_qos_status(&self) -> IncompatibleQosStatus {
        self.endpoint.incompatible_qos_status()
    }

    /// Unregister from the topic. Further publishes fail.
    pub fn destroy(&self) {
        self.endpoint.destroy();
    }

    pub fn is_destroyed(&self) -> bool {
        self.endpoint.is_destroyed()
    }
}
