// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-topic endpoint registry and matching.
//!
//! Matching flow:
//!
//! 1. Publisher created -> registered, matched against existing subscriptions
//! 2. Subscription created -> registered, matched against existing publishers
//!    (transient-local history is replayed at this point)
//! 3. Endpoint destroyed -> unregistered; peers notice on their next poll
//!
//! Lock order: topic -> writer, topic -> reader. Writer and reader locks are
//! never held at the same time.

use super::publisher::WriterEndpoint;
use super::subscription::ReaderEndpoint;
use super::{Guid, Message};
use crate::qos::lifespan::LifespanChecker;
use crate::qos::QoS;
use std::sync::Arc;
use std::time::Instant;

/// A published sample as stored in caches and queues.
pub(crate) struct Sample<T> {
    pub data: Arc<T>,
    pub source_timestamp: Instant,
    /// Publisher's lifespan, stamped at write time.
    pub lifespan: LifespanChecker,
    pub sequence: u64,
    pub writer: Guid,
}

impl<T> Clone for Sample<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            source_timestamp: self.source_timestamp,
            lifespan: self.lifespan,
            sequence: self.sequence,
            writer: self.writer,
        }
    }
}

impl<T> Sample<T> {
    pub fn is_expired(&self, now: Instant) -> bool {
        self.lifespan.is_expired(self.source_timestamp, now)
    }
}

pub(crate) struct TopicState<T> {
    name: Arc<str>,
    writers: Vec<Arc<WriterEndpoint<T>>>,
    readers: Vec<Arc<ReaderEndpoint<T>>>,
}

impl<T: Message> TopicState<T> {
    pub fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            writers: Vec::new(),
            readers: Vec::new(),
        }
    }

    pub fn name(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    pub fn add_writer(&mut self, writer: Arc<WriterEndpoint<T>>, now: Instant) {
        for reader in &self.readers {
            match_endpoints(&self.name, &writer, reader, now);
        }
        self.writers.push(writer);
    }

    pub fn add_reader(&mut self, reader: Arc<ReaderEndpoint<T>>, now: Instant) {
        for writer in &self.writers {
            match_endpoints(&self.name, writer, &reader, now);
        }
        self.readers.push(reader);
    }

    pub fn remove_writer(&mut self, guid: Guid) -> bool {
        let before = self.writers.len();
        self.writers.retain(|w| w.guid() != guid);
        before != self.writers.len()
    }

    pub fn remove_reader(&mut self, guid: Guid) -> bool {
        let before = self.readers.len();
        self.readers.retain(|r| r.guid() != guid);
        for writer in &self.writers {
            writer.remove_matched_reader(guid);
        }
        before != self.readers.len()
    }

    #[cfg(test)]
    pub fn endpoint_counts(&self) -> (usize, usize) {
        (self.writers.len(), self.readers.len())
    }
}

fn match_endpoints<T: Message>(
    topic: &str,
    writer: &Arc<WriterEndpoint<T>>,
    reader: &Arc<ReaderEndpoint<T>>,
    now: Instant,
) {
    match QoS::compatibility(writer.qos(), reader.qos()) {
        Ok(()) => {
            let replay = writer.add_matched_reader(reader, reader.qos(), now);
            reader.add_matched_writer(writer, replay, now);
            log::debug!(
                "[topic] '{}': matched publisher {} with subscription {}",
                topic,
                writer.guid(),
                reader.guid()
            );
        }
        Err(policy) => {
            log::warn!(
                "[topic] '{}': subscription {} requests incompatible QoS from publisher {}. No messages will be delivered. Last incompatible policy: {}",
                topic,
                reader.guid(),
                writer.guid(),
                policy
            );
            writer.on_incompatible_qos(policy);
            reader.on_incompatible_qos(policy);
        }
    }
}
