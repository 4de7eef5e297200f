// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Subscription (DataReader) endpoint.
//!
//! Incoming samples are queued (bounded by the History policy) and handed
//! to the message callback on the next executor pass. Samples whose lifespan
//! ran out while queued are dropped. The subscription also tracks its
//! requested deadline and the liveliness of every matched publisher.

use super::listener::{
    deliver, IncompatibleQosStatus, LivelinessChangedStatus, RequestedDeadlineMissedStatus,
    SubscriptionEventCallbacks,
};
use super::node::Waitable;
use super::publisher::WriterEndpoint;
use super::topic::{Sample, TopicState};
use super::{Context, Guid, Message};
use crate::qos::deadline::ReaderDeadlineTracker;
use crate::qos::{QoS, QosPolicyKind};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

/// Boxed message callback.
pub(crate) type MessageCallback<T> = Box<dyn FnMut(&T) + Send>;

struct MatchedWriter<T> {
    guid: Guid,
    endpoint: Weak<WriterEndpoint<T>>,
    alive: bool,
}

#[derive(Default)]
struct Dirty {
    deadline: bool,
    liveliness: bool,
    incompatible: bool,
}

#[derive(Default)]
struct PendingEvents {
    deadline: Option<RequestedDeadlineMissedStatus>,
    liveliness: Option<LivelinessChangedStatus>,
    incompatible: Option<IncompatibleQosStatus>,
}

struct ReaderState<T> {
    queue: VecDeque<Sample<T>>,
    deadline: ReaderDeadlineTracker,
    matched: Vec<MatchedWriter<T>>,
    requested_deadline: RequestedDeadlineMissedStatus,
    liveliness: LivelinessChangedStatus,
    incompatible: IncompatibleQosStatus,
    dirty: Dirty,
    taken: u64,
    expired: u64,
    destroyed: bool,
}

impl<T> ReaderState<T> {
    fn enqueue(&mut self, sample: Sample<T>, depth: Option<usize>, now: Instant) {
        if sample.is_expired(now) {
            self.expired += 1;
            return;
        }
        self.queue.push_back(sample);
        if let Some(depth) = depth {
            while self.queue.len() > depth {
                self.queue.pop_front();
            }
        }
        self.deadline.on_sample(now);
    }
}

pub(crate) struct ReaderEndpoint<T> {
    guid: Guid,
    topic: Arc<str>,
    qos: QoS,
    context: Context,
    topic_state: Weak<Mutex<TopicState<T>>>,
    state: Mutex<ReaderState<T>>,
    on_message: Mutex<MessageCallback<T>>,
    callbacks: Mutex<SubscriptionEventCallbacks>,
}

impl<T: Message> ReaderEndpoint<T> {
    pub fn create(
        context: &Context,
        topic_state: &Arc<Mutex<TopicState<T>>>,
        qos: QoS,
        on_message: MessageCallback<T>,
        callbacks: SubscriptionEventCallbacks,
        now: Instant,
    ) -> Arc<Self> {
        let topic = topic_state.lock().name();
        let endpoint = Arc::new(Self {
            guid: context.next_guid(),
            topic,
            context: context.clone(),
            topic_state: Arc::downgrade(topic_state),
            state: Mutex::new(ReaderState {
                queue: VecDeque::new(),
                deadline: ReaderDeadlineTracker::new(qos.deadline.period),
                matched: Vec::new(),
                requested_deadline: RequestedDeadlineMissedStatus::default(),
                liveliness: LivelinessChangedStatus::default(),
                incompatible: IncompatibleQosStatus::default(),
                dirty: Dirty::default(),
                taken: 0,
                expired: 0,
                destroyed: false,
            }),
            on_message: Mutex::new(on_message),
            callbacks: Mutex::new(callbacks),
            qos,
        });
        topic_state.lock().add_reader(Arc::clone(&endpoint), now);
        endpoint
    }

    pub fn guid(&self) -> Guid {
        self.guid
    }

    pub fn qos(&self) -> &QoS {
        &self.qos
    }

    pub fn is_destroyed(&self) -> bool {
        self.state.lock().destroyed
    }

    /// Register a matched publisher; `replay` is its transient-local history.
    pub fn add_matched_writer(
        &self,
        writer: &Arc<WriterEndpoint<T>>,
        replay: Vec<Sample<T>>,
        now: Instant,
    ) {
        let mut st = self.state.lock();
        if st.destroyed {
            return;
        }
        st.matched.push(MatchedWriter {
            guid: writer.guid(),
            endpoint: Arc::downgrade(writer),
            alive: true,
        });
        st.liveliness.alive_count += 1;
        st.liveliness.alive_count_change += 1;
        st.liveliness.last_publication_handle = Some(writer.guid());
        st.dirty.liveliness = true;

        if !replay.is_empty() {
            log::debug!(
                "[subscription] {} on '{}' replaying {} cached sample(s) from {}",
                self.guid,
                self.topic,
                replay.len(),
                writer.guid()
            );
        }
        let depth = self.qos.history.depth();
        for sample in replay {
            st.enqueue(sample, depth, now);
        }
        drop(st);
        self.context.wake();
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

    pub fn deliver(&self, sample: Sample<T>, now: Instant) {
        let mut st = self.state.lock();
        if st.destroyed {
            return;
        }
        st.enqueue(sample, self.qos.history.depth(), now);
    }

    /// Re-evaluate the liveliness of matched publishers.
    ///
    /// Publishers are queried without holding the subscription lock.
    fn refresh_liveliness(&self, now: Instant) {
        let snapshot: Vec<(Guid, Weak<WriterEndpoint<T>>)> = {
            let st = self.state.lock();
            st.matched
                .iter()
                .map(|m| (m.guid, Weak::clone(&m.endpoint)))
                .collect()
        };

        let current: Vec<(Guid, Option<bool>)> = snapshot
            .into_iter()
            .map(|(guid, weak)| {
                let state = weak
                    .upgrade()
                    .filter(|w| !w.is_destroyed())
                    .map(|w| w.is_alive(now));
                (guid, state)
            })
            .collect();

        let mut st = self.state.lock();
        for (guid, state) in current {
            let Some(index) = st.matched.iter().position(|m| m.guid == guid) else {
                continue;
            };
            let was_alive = st.matched[index].alive;
            let status = &mut st.liveliness;
            match (was_alive, state) {
                (true, None) => {
                    status.alive_count = status.alive_count.saturating_sub(1);
                    status.alive_count_change -= 1;
                }
                (false, None) => {
                    status.not_alive_count = status.not_alive_count.saturating_sub(1);
                    status.not_alive_count_change -= 1;
                }
                (true, Some(false)) => {
                    status.alive_count = status.alive_count.saturating_sub(1);
                    status.alive_count_change -= 1;
                    status.not_alive_count += 1;
                    status.not_alive_count_change += 1;
                }
                (false, Some(true)) => {
                    status.not_alive_count = status.not_alive_count.saturating_sub(1);
                    status.not_alive_count_change -= 1;
                    status.alive_count += 1;
                    status.alive_count_change += 1;
                }
                (true, Some(true)) | (false, Some(false)) => continue,
            }
            status.last_publication_handle = Some(guid);
            st.dirty.liveliness = true;
            match state {
                None => {
                    st.matched.remove(index);
                }
                Some(alive) => st.matched[index].alive = alive,
            }
        }
    }

    fn collect(&self, now: Instant) -> (Vec<Sample<T>>, PendingEvents) {
        self.refresh_liveliness(now);

        let mut st = self.state.lock();
        if st.destroyed {
            return (Vec::new(), PendingEvents::default());
        }

        let missed = st.deadline.check(now);
        if missed > 0 {
            let missed = u32::try_from(missed).unwrap_or(u32::MAX);
            st.requested_deadline.total_count =
                st.requested_deadline.total_count.saturating_add(missed);
            st.requested_deadline.total_count_change += missed;
            st.dirty.deadline = true;
        }

        let mut samples = Vec::with_capacity(st.queue.len());
        while let Some(sample) = st.queue.pop_front() {
            if sample.is_expired(now) {
                st.expired += 1;
            } else {
                samples.push(sample);
            }
        }
        st.taken += samples.len() as u64;

        let dirty = std::mem::take(&mut st.dirty);
        let mut events = PendingEvents::default();
        if dirty.deadline {
            events.deadline = Some(st.requested_deadline);
            st.requested_deadline.total_count_change = 0;
        }
        if dirty.liveliness {
            events.liveliness = Some(st.liveliness);
            st.liveliness.alive_count_change = 0;
            st.liveliness.not_alive_count_change = 0;
        }
        if dirty.incompatible {
            events.incompatible = Some(st.incompatible);
            st.incompatible.total_count_change = 0;
        }
        (samples, events)
    }

    pub fn requested_deadline_missed_status(&self) -> RequestedDeadlineMissedStatus {
        self.state.lock().requested_deadline
    }

    pub fn liveliness_changed_status(&self) -> LivelinessChangedStatus {
        self.state.lock().liveliness
    }

    pub fn incompatible_qos_status(&self) -> IncompatibleQosStatus {
        self.state.lock().incompatible
    }

    pub fn matched_count(&self) -> usize {
        self.state.lock().matched.len()
    }

    pub fn counters(&self) -> (u64, u64) {
        let st = self.state.lock();
        (st.taken, st.expired)
    }
}

impl<T: Message> Waitable for ReaderEndpoint<T> {
    fn guid(&self) -> Guid {
        self.guid
    }

    fn is_destroyed(&self) -> bool {
        self.state.lock().destroyed
    }

    fn execute(&self, now: Instant) -> bool {
        let (samples, events) = self.collect(now);

        let mut fired = {
            let mut callbacks = self.callbacks.lock();
            let mut fired = deliver(&mut callbacks.liveliness, events.liveliness);
            fired |= deliver(&mut callbacks.deadline, events.deadline);
            fired |= deliver(&mut callbacks.incompatible_qos, events.incompatible);
            fired
        };

        if !samples.is_empty() {
            let mut on_message = self.on_message.lock();
            for sample in &samples {
                (*on_message)(&*sample.data);
            }
            fired = true;
        }
        fired
    }

    fn next_wake(&self, now: Instant) -> Option<Instant> {
        let (deadline, writers, has_data, liveliness_dirty) = {
            let st = self.state.lock();
            if st.destroyed {
                return None;
            }
            let writers: Vec<Weak<WriterEndpoint<T>>> = st
                .matched
                .iter()
                .filter(|m| m.alive)
                .map(|m| Weak::clone(&m.endpoint))
                .collect();
            (
                st.deadline.next_deadline(),
                writers,
                !st.queue.is_empty(),
                st.dirty.liveliness || st.dirty.incompatible,
            )
        };
        if has_data || liveliness_dirty {
            return Some(now);
        }

        let mut wake = deadline;
        for weak in writers {
            let Some(writer) = weak.upgrade() else {
                // Gone since the last pass: report it right away.
                return Some(now);
            };
            if writer.is_destroyed() {
                return Some(now);
            }
            if let Some(expiry) = writer
                .lease_expiry()
                .and_then(|e| e.checked_add(Duration::from_millis(1)))
            {
                wake = Some(wake.map_or(expiry, |w| w.min(expiry)));
            }
        }
        wake
    }

    fn destroy(&self) {
        {
            let mut st = self.state.lock();
            if st.destroyed {
                return;
            }
            st.destroyed = true;
            st.queue.clear();
            st.matched.clear();
        }
        if let Some(topic) = self.topic_state.upgrade() {
            topic.lock().remove_reader(self.guid);
        }
        log::debug!("[subscription] {} on '{}' destroyed", self.guid, self.topic);
    }
}

/// Typed subscription handle. Cheap to clone.
///
/// Created by [`Node::create_subscription`](super::Node::create_subscription).
pub struct Subscription<T: Message> {
    endpoint: Arc<ReaderEndpoint<T>>,
}

impl<T: Message> Clone for Subscription<T> {
    fn clone(&self) -> Self {
        Self {
            endpoint: Arc::clone(&self.endpoint),
        }
    }
}

impl<T: Message> Subscription<T> {
    pub(crate) fn new(endpoint: Arc<ReaderEndpoint<T>>) -> Self {
        Self { endpoint }
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

    /// Number of compatible publishers currently matched.
    pub fn matched_publications(&self) -> usize {
        self.endpoint.matched_count()
    }

    /// Messages handed to the callback so far.
    pub fn taken_count(&self) -> u64 {
        self.endpoint.counters().0
    }

    /// Samples dropped because their lifespan ran out before delivery.
    pub fn expired_count(&self) -> u64 {
        self.endpoint.counters().1
    }

    pub fn requested_deadline_missed_status(&self) -> RequestedDeadlineMissedStatus {
        self.endpoint.requested_deadline_missed_status()
    }

    pub fn liveliness_changed_status(&self) -> LivelinessChangedStatus {
        self.endpoint.liveliness_changed_status()
    }

    pub fn incompatible_qos_status(&self) -> IncompatibleQosStatus {
        self.endpoint.incompatible_qos_status()
    }

    /// Unregister from the topic. No further messages are delivered.
    pub fn destroy(&self) {
        self.endpoint.destroy();
    }

    pub fn is_destroyed(&self) -> bool {
        self.endpoint.is_destroyed()
    }
}
