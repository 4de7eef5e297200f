// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # hdds-qos - In-process DDS runtime for QoS demonstrations
//!
//! A small publish/subscribe runtime that follows the HDDS entity model
//! (context, node, publisher, subscription) and enforces the timing-related
//! DDS QoS policies inside a single process:
//!
//! - **DEADLINE**: offered/requested deadline missed events
//! - **LIVELINESS**: liveliness lost/changed events (automatic and manual kinds)
//! - **LIFESPAN**: expiry of samples in writer history and reader queues
//! - **DURABILITY**: transient-local history replay for late-joining readers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hdds_qos::{Context, Node, QoS, SingleThreadedExecutor};
//! use hdds_qos::dds::{PublisherEventCallbacks, SubscriptionEventCallbacks};
//! use std::time::Duration;
//!
//! # fn main() -> hdds_qos::Result<()> {
//! let context = Context::new(0)?;
//! let node = Node::new(&context, "talker")?;
//! let qos = QoS::reliable().keep_last(10).deadline_millis(500);
//!
//! let publisher = node.create_publisher::<u32>("chatter", qos.clone(), PublisherEventCallbacks::default())?;
//! let _sub = node.create_subscription::<u32, _>(
//!     "chatter",
//!     qos,
//!     |value| println!("got {}", value),
//!     SubscriptionEventCallbacks::default(),
//! )?;
//! publisher.publish(&7)?;
//!
//! let mut executor = SingleThreadedExecutor::new(&context);
//! executor.add_node(&node);
//! executor.spin_for(Duration::from_millis(100));
//! # Ok(())
//! # }
//! ```
//!
//! ## Threading model
//!
//! Publishing may happen from any thread. Message callbacks, timer callbacks
//! and QoS event callbacks all run on the thread spinning the executor.

/// DDS entities: context, nodes, publishers, subscriptions, timers, listeners.
pub mod dds;
/// Single-threaded executor driving timers, subscriptions and QoS events.
pub mod executor;
/// QoS policies and their runtime trackers.
pub mod qos;

pub use dds::{
    Context, Error, Guid, Node, NodeLogger, Publisher, Result, Subscription, Timer, MAX_DOMAIN_ID,
};
pub use executor::SingleThreadedExecutor;
pub use qos::{
    Deadline, Durability, History, Lifespan, Liveliness, LivelinessKind, QoS, QosPolicyKind,
    Reliability,
};
