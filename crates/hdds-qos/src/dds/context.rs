// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Process-wide domain state.
//!
//! A `Context` owns the topic registry shared by every node created from it,
//! the channel used to wake executors, and the shutdown flag.

use super::topic::TopicState;
use super::{Error, Guid, Message, Result};
use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Maximum domain ID (DDS domain_id valid range: 0..=232)
pub const MAX_DOMAIN_ID: u32 = 232;

struct TopicEntry {
    type_name: &'static str,
    state: Arc<dyn Any + Send + Sync>,
}

struct ContextInner {
    domain_id: u32,
    topics: Mutex<HashMap<String, TopicEntry>>,
    wake_tx: Sender<()>,
    wake_rx: Receiver<()>,
    shutdown: AtomicBool,
    next_entity: AtomicU64,
}

/// Handle to a domain. Cheap to clone.
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("domain_id", &self.inner.domain_id)
            .field("shutdown", &self.is_shutdown())
            .finish()
    }
}

impl Context {
    /// Create a context for `domain_id`.
    ///
    /// ```
    /// use hdds_qos::{Context, Error};
    ///
    /// assert!(Context::new(0).is_ok());
    /// assert!(matches!(Context::new(233), Err(Error::InvalidDomainId(233))));
    /// ```
    pub fn new(domain_id: u32) -> Result<Self> {
        if domain_id > MAX_DOMAIN_ID {
            return Err(Error::InvalidDomainId(domain_id));
        }
        // A single pending wake-up is enough: executors drain all ready work
        // every time they wake.
        let (wake_tx, wake_rx) = channel::bounded(1);
        log::debug!("[context] domain {} created", domain_id);
        Ok(Self {
            inner: Arc::new(ContextInner {
                domain_id,
                topics: Mutex::new(HashMap::new()),
                wake_tx,
                wake_rx,
                shutdown: AtomicBool::new(false),
                next_entity: AtomicU64::new(1),
            }),
        })
    }

    pub fn domain_id(&self) -> u32 {
        self.inner.domain_id
    }

    /// `true` until [`Context::shutdown`] is called.
    pub fn ok(&self) -> bool {
        !self.is_shutdown()
    }

    pub fn is_shutdown(&self) -> bool {
        self.inner.shutdown.load(Ordering::SeqCst)
    }

    /// Stop every executor spinning on this context. Idempotent.
    pub fn shutdown(&self) {
        if !self.inner.shutdown.swap(true, Ordering::SeqCst) {
            log::debug!("[context] domain {} shutting down", self.inner.domain_id);
        }
        self.wake();
    }

    /// Topics currently registered, sorted by name.
    pub fn topic_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.topics.lock().keys().cloned().collect();
        names.sort();
        names
    }

    pub(crate) fn wake(&self) {
        // Full channel means a wake-up is already pending.
        let _ = self.inner.wake_tx.try_send(());
    }

    pub(crate) fn wake_receiver(&self) -> Receiver<()> {
        self.inner.wake_rx.clone()
    }

    pub(crate) fn next_guid(&self) -> Guid {
        Guid {
            domain_id: self.inner.domain_id,
            entity_id: self.inner.next_entity.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Look up (or register) the topic `name` for message type `T`.
    pub(crate) fn topic<T: Message>(&self, name: &str) -> Result<Arc<Mutex<TopicState<T>>>> {
        let requested = std::any::type_name::<T>();
        let mut topics = self.inner.topics.lock();
        let entry = topics.entry(name.to_string()).or_insert_with(|| {
            log::debug!("[context] registered topic '{}' ({})", name, requested);
            TopicEntry {
                type_name: requested,
                state: Arc::new(Mutex::new(TopicState::<T>::new(name))),
            }
        });
        let registered = entry.type_name;
        entry
            .state
            .clone()
            .downcast::<Mutex<TopicState<T>>>()
            .map_err(|_| Error::TypeMismatch {
                topic: name.to_string(),
                registered,
                requested,
            })
    }

    pub(crate) fn ptr_eq(&self, other: &Context) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shutdown_is_idempotent() {
        let context = Context::new(3).expect("valid domain");
        assert!(context.ok());
        context.shutdown();
        context.shutdown();
        assert!(context.is_shutdown());
        assert_eq!(context.domain_id(), 3);
    }

    #[test]
    fn test_topic_type_mismatch() {
        let context = Context::new(0).expect("valid domain");
        assert!(context.topic::<u32>("chatter").is_ok());
        assert!(context.topic::<u32>("chatter").is_ok());
        assert!(matches!(
            context.topic::<String>("chatter"),
            Err(Error::TypeMismatch { .. })
        ));
        assert_eq!(context.topic_names(), vec!["chatter".to_string()]);
    }

    #[test]
    fn test_guids_are_unique() {
        let context = Context::new(0).expect("valid domain");
        let a = context.next_guid();
        let b = context.next_guid();
        assert_ne!(a, b);
        assert_eq!(a.domain_id, 0);
    }

    #[test]
    fn test_wake_does_not_block_when_full() {
        let context = Context::new(0).expect("valid domain");
        context.wake();
        context.wake();
        assert!(context.wake_receiver().try_recv().is_ok());
        assert!(context.wake_receiver().try_recv().is_err());
    }
}
