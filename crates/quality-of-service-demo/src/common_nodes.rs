// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Talker and listener nodes shared by the demos.

use crate::messages::StringMsg;
use hdds_qos::dds::{PublisherEventCallbacks, SubscriptionEventCallbacks};
use hdds_qos::{Context, Node, NodeLogger, Publisher, QoS, Result, Subscription, Timer};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;

pub const TALKER_NODE_NAME: &str = "qos_talker";
pub const LISTENER_NODE_NAME: &str = "qos_listener";

/// Interval between two published messages.
pub const PUBLISH_PERIOD: Duration = Duration::from_millis(500);

/// Talker settings.
#[derive(Debug, Clone)]
pub struct TalkerOptions {
    pub topic: String,
    pub qos: QoS,
    /// Stop publishing once this many messages were sent (0 = never).
    pub stop_at_count: u32,
    /// Assert the publisher's liveliness at this period.
    pub assert_topic_period: Option<Duration>,
}

impl TalkerOptions {
    pub fn new(topic: &str, qos: QoS) -> Self {
        Self {
            topic: topic.to_string(),
            qos,
            stop_at_count: 0,
            assert_topic_period: None,
        }
    }
}

#[derive(Default)]
struct TalkerState {
    publish_count: u32,
    publish_timer: Option<Timer>,
    pause_timer: Option<Timer>,
    assert_timer: Option<Timer>,
}

struct TalkerShared {
    node: Node,
    publisher: Publisher<StringMsg>,
    stop_at_count: u32,
    state: Mutex<TalkerState>,
}

impl TalkerShared {
    fn publish(&self) {
        let (message, publish_timer) = {
            let mut st = self.state.lock();
            let message = StringMsg::new(format!("Talker says {}", st.publish_count));
            st.publish_count += 1;
            let finished = self.stop_at_count > 0 && st.publish_count >= self.stop_at_count;
            (message, st.publish_timer.clone().filter(|_| finished))
        };
        if let Some(timer) = publish_timer {
            timer.cancel();
        }
        self.node
            .logger()
            .info(format!("Publishing: \"{}\"", message.data));
        if let Err(e) = self.publisher.publish(&message) {
            self.node.logger().error(format!("Publish failed: {}", e));
        }
    }

    fn resume(&self) {
        let (pause_timer, publish_timer) = {
            let mut st = self.state.lock();
            (st.pause_timer.take(), st.publish_timer.clone())
        };
        self.publish();
        if let Some(timer) = publish_timer {
            timer.reset();
        }
        if let Some(timer) = pause_timer {
            self.node.destroy_timer(&timer);
        }
    }
}

/// Node publishing `Talker says <n>` every [`PUBLISH_PERIOD`]. Cheap to clone.
#[derive(Clone)]
pub struct Talker {
    shared: Arc<TalkerShared>,
}

impl Talker {
    pub fn new(
        context: &Context,
        options: TalkerOptions,
        callbacks: PublisherEventCallbacks,
    ) -> Result<Self> {
        let node = Node::new(context, TALKER_NODE_NAME)?;
        node.logger().info("Talker starting up");
        let publisher = node.create_publisher::<StringMsg>(&options.topic, options.qos, callbacks)?;
        let shared = Arc::new(TalkerShared {
            node,
            publisher,
            stop_at_count: options.stop_at_count,
            state: Mutex::new(TalkerState::default()),
        });

        let weak = Arc::downgrade(&shared);
        let publish_timer = shared.node.create_timer(PUBLISH_PERIOD, move || {
            if let Some(shared) = Weak::upgrade(&weak) {
                shared.publish();
            }
        })?;
        shared.state.lock().publish_timer = Some(publish_timer);

        if let Some(period) = options.assert_topic_period {
            let weak = Arc::downgrade(&shared);
            let assert_timer = shared.node.create_timer(period, move || {
                if let Some(shared) = Weak::upgrade(&weak) {
                    if let Err(e) = shared.publisher.assert_liveliness() {
                        shared
                            .node
                            .logger()
                            .warn(format!("Liveliness assertion failed: {}", e));
                    }
                }
            })?;
            shared.state.lock().assert_timer = Some(assert_timer);
        }

        Ok(Self { shared })
    }

    pub fn node(&self) -> &Node {
        &self.shared.node
    }

    pub fn logger(&self) -> &NodeLogger {
        self.shared.node.logger()
    }

    pub fn publisher(&self) -> &Publisher<StringMsg> {
        &self.shared.publisher
    }

    /// Messages published so far.
    pub fn publish_count(&self) -> u32 {
        self.shared.state.lock().publish_count
    }

    /// Publish the next message right away.
    pub fn publish(&self) {
        self.shared.publish();
    }

    pub fn is_paused(&self) -> bool {
        self.shared.state.lock().pause_timer.is_some()
    }

    /// Stop publishing for `pause`, then publish once and resume the
    /// regular period. Ignored while already paused.
    pub fn pause_for(&self, pause: Duration) -> Result<()> {
        let publish_timer = {
            let st = self.shared.state.lock();
            if st.pause_timer.is_some() {
                return Ok(());
            }
            st.publish_timer.clone()
        };
        if let Some(timer) = &publish_timer {
            timer.cancel();
        }

        let weak = Arc::downgrade(&self.shared);
        let pause_timer = self.shared.node.create_timer(pause, move || {
            if let Some(shared) = Weak::upgrade(&weak) {
                shared.resume();
            }
        })?;
        self.shared.state.lock().pause_timer = Some(pause_timer);
        Ok(())
    }

    /// Cancel publishing and liveliness assertions, and drop a pending
    /// resume. The node stays alive.
    pub fn stop(&self) {
        let pause_timer = {
            let mut st = self.shared.state.lock();
            for timer in [&st.publish_timer, &st.assert_timer].into_iter().flatten() {
                timer.cancel();
            }
            st.pause_timer.take()
        };
        if let Some(timer) = pause_timer {
            self.shared.node.destroy_timer(&timer);
        }
    }

    /// Destroy the node together with its publisher.
    pub fn destroy(&self) {
        self.shared.node.destroy();
    }
}

type Heard = Arc<Mutex<Vec<String>>>;

struct ListenerShared {
    node: Node,
    topic: String,
    qos: QoS,
    callbacks: Mutex<Option<SubscriptionEventCallbacks>>,
    subscription: Mutex<Option<Subscription<StringMsg>>>,
    heard: Heard,
}

/// Node logging every message received on its topic. Cheap to clone.
#[derive(Clone)]
pub struct Listener {
    shared: Arc<ListenerShared>,
}

impl Listener {
    /// Create the listener. With `defer_subscribe` the subscription is only
    /// created by [`Listener::start_listening`].
    pub fn new(
        context: &Context,
        topic: &str,
        qos: QoS,
        callbacks: SubscriptionEventCallbacks,
        defer_subscribe: bool,
    ) -> Result<Self> {
        let listener = Self {
            shared: Arc::new(ListenerShared {
                node: Node::new(context, LISTENER_NODE_NAME)?,
                topic: topic.to_string(),
                qos,
                callbacks: Mutex::new(Some(callbacks)),
                subscription: Mutex::new(None),
                heard: Heard::default(),
            }),
        };
        if !defer_subscribe {
            listener.start_listening()?;
        }
        Ok(listener)
    }

    /// Create the subscription. Idempotent.
    pub fn start_listening(&self) -> Result<()> {
        let mut subscription = self.shared.subscription.lock();
        if subscription.is_some() {
            return Ok(());
        }
        let callbacks = self.shared.callbacks.lock().take().unwrap_or_default();
        let logger = self.shared.node.logger().clone();
        let heard = Arc::clone(&self.shared.heard);
        *subscription = Some(self.shared.node.create_subscription::<StringMsg, _>(
            &self.shared.topic,
            self.shared.qos.clone(),
            move |message: &StringMsg| {
                logger.info(format!("I heard: [{}]", message.data));
                heard.lock().push(message.data.clone());
            },
            callbacks,
        )?);
        self.shared.node.logger().info("Subscription created");
        Ok(())
    }

    pub fn is_listening(&self) -> bool {
        self.shared.subscription.lock().is_some()
    }

    pub fn node(&self) -> &Node {
        &self.shared.node
    }

    pub fn subscription(&self) -> Option<Subscription<StringMsg>> {
        self.shared.subscription.lock().clone()
    }

    /// Payloads received so far, in delivery order.
    pub fn heard(&self) -> Vec<String> {
        self.shared.heard.lock().clone()
    }

    pub fn destroy(&self) {
        self.shared.node.destroy();
    }
}
