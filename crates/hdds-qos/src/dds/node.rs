// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Nodes own publishers, subscriptions and timers.
//!
//! A node is also the participant for MANUAL_BY_PARTICIPANT liveliness:
//! asserting the node (or publishing from any of its publishers) renews
//! every such publisher's lease.

use super::listener::{PublisherEventCallbacks, SubscriptionEventCallbacks};
use super::publisher::{Publisher, WriterEndpoint};
use super::subscription::{ReaderEndpoint, Subscription};
use super::timer::Timer;
use super::{validate_name, Context, Error, Guid, Message, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Work the executor polls: publishers, subscriptions and timers.
pub(crate) trait Waitable: Send + Sync {
    fn guid(&self) -> Guid;

    /// Run whatever is ready at `now`. Returns `true` if a callback ran.
    fn execute(&self, now: Instant) -> bool;

    /// Earliest instant at which `execute` may have work to do.
    fn next_wake(&self, now: Instant) -> Option<Instant>;

    fn is_destroyed(&self) -> bool;

    fn destroy(&self);
}

/// Node-wide liveliness assertion time.
pub(crate) struct ParticipantLiveliness {
    last_assert: Mutex<Instant>,
}

impl ParticipantLiveliness {
    fn new(now: Instant) -> Self {
        Self {
            last_assert: Mutex::new(now),
        }
    }

    pub fn assert(&self, now: Instant) {
        let mut last = self.last_assert.lock();
        if now > *last {
            *last = now;
        }
    }

    pub fn last_assert(&self) -> Instant {
        *self.last_assert.lock()
    }
}

/// Logger bound to a node name.
///
/// Records go through the `log` facade with the node name as target, so
/// they can be filtered per node (`RUST_LOG=qos_listener=info`).
#[derive(Debug, Clone)]
pub struct NodeLogger {
    name: Arc<str>,
}

impl NodeLogger {
    pub fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn debug(&self, message: impl std::fmt::Display) {
        log::debug!(target: self.name(), "{}", message);
    }

    pub fn info(&self, message: impl std::fmt::Display) {
        log::info!(target: self.name(), "{}", message);
    }

    pub fn warn(&self, message: impl std::fmt::Display) {
        log::warn!(target: self.name(), "{}", message);
    }

    pub fn error(&self, message: impl std::fmt::Display) {
        log::error!(target: self.name(), "{}", message);
    }
}

struct NodeInner {
    name: String,
    guid: Guid,
    context: Context,
    waitables: Mutex<Vec<Arc<dyn Waitable>>>,
    participant: Arc<ParticipantLiveliness>,
    destroyed: AtomicBool,
    logger: NodeLogger,
}

/// A named group of entities. Cheap to clone.
#[derive(Clone)]
pub struct Node {
    inner: Arc<NodeInner>,
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.inner.name)
            .field("guid", &self.inner.guid)
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}

/// Topic names are resolved to absolute names: `chatter` -> `/chatter`.
fn resolve_topic(name: &str) -> String {
    if name.starts_with('/') {
        name.to_string()
    } else {
        format!("/{}", name)
    }
}

impl Node {
    pub fn new(context: &Context, name: &str) -> Result<Self> {
        if context.is_shutdown() {
            return Err(Error::Shutdown);
        }
        validate_name(name, false)?;
        let guid = context.next_guid();
        log::debug!("[node] '{}' created ({})", name, guid);
        Ok(Self {
            inner: Arc::new(NodeInner {
                name: name.to_string(),
                guid,
                context: context.clone(),
                waitables: Mutex::new(Vec::new()),
                participant: Arc::new(ParticipantLiveliness::new(Instant::now())),
                destroyed: AtomicBool::new(false),
                logger: NodeLogger::new(name),
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn guid(&self) -> Guid {
        self.inner.guid
    }

    pub fn logger(&self) -> &NodeLogger {
        &self.inner.logger
    }

    pub fn context(&self) -> &Context {
        &self.inner.context
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.load(Ordering::SeqCst)
    }

    fn ensure_usable(&self) -> Result<()> {
        if self.is_destroyed() {
            return Err(Error::AlreadyDestroyed);
        }
        if self.inner.context.is_shutdown() {
            return Err(Error::Shutdown);
        }
        Ok(())
    }

    fn register(&self, waitable: Arc<dyn Waitable>) {
        self.inner.waitables.lock().push(waitable);
        self.inner.context.wake();
    }

    /// Create a publisher on `topic`.
    ///
    /// Fails with [`Error::InvalidQos`] if the profile does not validate and
    /// with [`Error::TypeMismatch`] if the topic carries another type.
    pub fn create_publisher<T: Message>(
        &self,
        topic: &str,
        qos: crate::qos::QoS,
        callbacks: PublisherEventCallbacks,
    ) -> Result<Publisher<T>> {
        self.ensure_usable()?;
        qos.validate().map_err(Error::InvalidQos)?;
        validate_name(topic, true)?;
        let resolved = resolve_topic(topic);
        let topic_state = self.inner.context.topic::<T>(&resolved)?;
        let summary = qos.summary();
        let endpoint = WriterEndpoint::create(
            &self.inner.context,
            &topic_state,
            qos,
            Arc::clone(&self.inner.participant),
            callbacks,
            Instant::now(),
        );
        log::debug!(
            "[node] '{}' publisher {} on '{}' [{}]",
            self.inner.name,
            endpoint.guid(),
            resolved,
            summary
        );
        self.register(Arc::clone(&endpoint) as Arc<dyn Waitable>);
        Ok(Publisher::new(endpoint))
    }

    /// Create a subscription on `topic`; `callback` runs on the executor
    /// thread for every received message.
    pub fn create_subscription<T, F>(
        &self,
        topic: &str,
        qos: crate::qos::QoS,
        callback: F,
        callbacks: SubscriptionEventCallbacks,
    ) -> Result<Subscription<T>>
    where
        T: Message,
        F: FnMut(&T) + Send + 'static,
    {
        self.ensure_usable()?;
        qos.validate().map_err(Error::InvalidQos)?;
        validate_name(topic, true)?;
        let resolved = resolve_topic(topic);
        let topic_state = self.inner.context.topic::<T>(&resolved)?;
        let summary = qos.summary();
        let endpoint = ReaderEndpoint::create(
            &self.inner.context,
            &topic_state,
            qos,
            Box::new(callback),
            callbacks,
            Instant::now(),
        );
        log::debug!(
            "[node] '{}' subscription {} on '{}' [{}]",
            self.inner.name,
            endpoint.guid(),
            resolved,
            summary
        );
        self.register(Arc::clone(&endpoint) as Arc<dyn Waitable>);
        Ok(Subscription::new(endpoint))
    }

    /// Create a timer firing every `period`, first one period from now.
    pub fn create_timer<F>(&self, period: Duration, callback: F) -> Result<Timer>
    where
        F: FnMut() + Send + 'static,
    {
        self.ensure_usable()?;
        let timer = Timer::create(
            &self.inner.context,
            period,
            Box::new(callback),
            Instant::now(),
        );
        self.register(timer.waitable() as Arc<dyn Waitable>);
        Ok(timer)
    }

    /// Destroy a timer created by this node. Returns `false` if it is not
    /// owned by this node.
    pub fn destroy_timer(&self, timer: &Timer) -> bool {
        let guid = timer.guid();
        let removed = {
            let mut waitables = self.inner.waitables.lock();
            let before = waitables.len();
            waitables.retain(|w| w.guid() != guid);
            before != waitables.len()
        };
        if removed {
            timer.waitable().destroy();
        }
        removed
    }

    /// Assert liveliness for every MANUAL_BY_PARTICIPANT publisher of this node.
    pub fn assert_liveliness(&self) -> Result<()> {
        self.ensure_usable()?;
        self.inner.participant.assert(Instant::now());
        self.inner.context.wake();
        Ok(())
    }

    /// Destroy every entity owned by this node. Idempotent.
    pub fn destroy(&self) {
        if self.inner.destroyed.swap(true, Ordering::SeqCst) {
            return;
        }
        let waitables = std::mem::take(&mut *self.inner.waitables.lock());
        for waitable in &waitables {
            waitable.destroy();
        }
        log::debug!(
            "[node] '{}' destroyed ({} entities)",
            self.inner.name,
            waitables.len()
        );
        self.inner.context.wake();
    }

    /// Live entities, pruning the ones destroyed through their own handle.
    pub(crate) fn waitables(&self) -> Vec<Arc<dyn Waitable>> {
        let mut waitables = self.inner.waitables.lock();
        waitables.retain(|w| !w.is_destroyed());
        waitables.clone()
    }

    pub fn ptr_eq(&self, other: &Node) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qos::QoS;

    fn node(context: &Context, name: &str) -> Node {
        Node::new(context, name).expect("valid node")
    }

    #[test]
    fn test_node_name_validation() {
        let context = Context::new(0).expect("valid domain");
        assert!(Node::new(&context, "qos_talker").is_ok());
        assert!(matches!(
            Node::new(&context, "qos talker"),
            Err(Error::InvalidName(_))
        ));
    }

    #[test]
    fn test_topics_are_resolved_to_absolute_names() {
        let context = Context::new(0).expect("valid domain");
        let talker = node(&context, "talker");
        let publisher = talker
            .create_publisher::<u32>("chatter", QoS::default(), PublisherEventCallbacks::default())
            .expect("publisher");
        assert_eq!(publisher.topic_name(), "/chatter");

        let listener = node(&context, "listener");
        let subscription = listener
            .create_subscription::<u32, _>(
                "/chatter",
                QoS::default(),
                |_| {},
                SubscriptionEventCallbacks::default(),
            )
            .expect("subscription");
        assert_eq!(subscription.matched_publications(), 1);
        assert_eq!(publisher.matched_subscriptions(), 1);
    }

    #[test]
    fn test_invalid_qos_is_rejected() {
        let context = Context::new(0).expect("valid domain");
        let talker = node(&context, "talker");
        let result = talker.create_publisher::<u32>(
            "chatter",
            QoS::reliable().keep_last(0),
            PublisherEventCallbacks::default(),
        );
        assert!(matches!(result, Err(Error::InvalidQos(_))));
    }

    #[test]
    fn test_destroy_unregisters_endpoints() {
        let context = Context::new(0).expect("valid domain");
        let talker = node(&context, "talker");
        let _publisher = talker
            .create_publisher::<u32>("chatter", QoS::default(), PublisherEventCallbacks::default())
            .expect("publisher");
        let _timer = talker
            .create_timer(Duration::from_millis(10), || {})
            .expect("timer");
        assert_eq!(talker.waitables().len(), 2);

        let topic = context.topic::<u32>("/chatter").expect("topic");
        assert_eq!(topic.lock().endpoint_counts(), (1, 0));

        talker.destroy();
        talker.destroy();
        assert!(talker.is_destroyed());
        assert!(talker.waitables().is_empty());
        assert_eq!(topic.lock().endpoint_counts(), (0, 0));
        assert!(matches!(
            talker.create_timer(Duration::from_millis(10), || {}),
            Err(Error::AlreadyDestroyed)
        ));
    }

    #[test]
    fn test_destroy_timer() {
        let context = Context::new(0).expect("valid domain");
        let a = node(&context, "a");
        let b = node(&context, "b");
        let timer = a.create_timer(Duration::from_millis(10), || {}).expect("timer");
        assert!(!b.destroy_timer(&timer));
        assert!(a.destroy_timer(&timer));
        assert!(timer.is_destroyed());
        assert!(a.waitables().is_empty());
    }

    #[test]
    fn test_destroyed_publisher_is_pruned() {
        let context = Context::new(0).expect("valid domain");
        let talker = node(&context, "talker");
        let publisher = talker
            .create_publisher::<u32>("chatter", QoS::default(), PublisherEventCallbacks::default())
            .expect("publisher");
        publisher.destroy();
        assert!(talker.waitables().is_empty());
        assert!(matches!(publisher.publish(&1), Err(Error::AlreadyDestroyed)));
    }

    #[test]
    fn test_participant_assert_is_monotonic() {
        let t0 = Instant::now();
        let participant = ParticipantLiveliness::new(t0);
        participant.assert(t0 + Duration::from_millis(10));
        participant.assert(t0 + Duration::from_millis(5));
        assert_eq!(participant.last_assert(), t0 + Duration::from_millis(10));
    }

    #[test]
    fn test_shutdown_context_refuses_new_entities() {
        let context = Context::new(0).expect("valid domain");
        let talker = node(&context, "talker");
        context.shutdown();
        assert!(matches!(Node::new(&context, "late"), Err(Error::Shutdown)));
        assert!(matches!(talker.assert_liveliness(), Err(Error::Shutdown)));
    }
}
