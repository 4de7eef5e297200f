// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::missing_panics_doc)] // Tests/examples panic on failure

//! Endpoint matching: request-vs-offered QoS checks and topic typing.

use hdds_qos::dds::{IncompatibleQosStatus, PublisherEventCallbacks, SubscriptionEventCallbacks};
use hdds_qos::{Context, Error, Node, QoS, QosPolicyKind, SingleThreadedExecutor};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_incompatible_reliability_blocks_delivery() {
    let context = Context::new(0).expect("valid domain");
    let node = Node::new(&context, "node").expect("node");

    let events: Arc<Mutex<Vec<IncompatibleQosStatus>>> = Arc::default();
    let sink = Arc::clone(&events);
    let publisher = node
        .create_publisher::<u32>(
            "mismatch",
            QoS::best_effort(),
            PublisherEventCallbacks::default()
                .on_incompatible_qos(move |status| sink.lock().push(status)),
        )
        .expect("publisher");

    let received = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&received);
    let subscription = node
        .create_subscription::<u32, _>(
            "mismatch",
            QoS::reliable(),
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
            SubscriptionEventCallbacks::default(),
        )
        .expect("subscription");

    publisher.publish(&1).expect("publish");
    let mut executor = SingleThreadedExecutor::new(&context);
    executor.add_node(&node);
    executor.spin_for(Duration::from_millis(20));

    assert_eq!(received.load(Ordering::SeqCst), 0);
    assert_eq!(publisher.matched_subscriptions(), 0);
    assert_eq!(subscription.matched_publications(), 0);

    let status = subscription.incompatible_qos_status();
    assert_eq!(status.total_count, 1);
    assert_eq!(status.last_policy_kind, QosPolicyKind::Reliability);

    let events = events.lock();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].total_count_change, 1);
}

#[test]
fn test_requested_deadline_shorter_than_offered() {
    let context = Context::new(0).expect("valid domain");
    let node = Node::new(&context, "node").expect("node");
    let publisher = node
        .create_publisher::<u32>(
            "deadline_mismatch",
            QoS::reliable().deadline_millis(200),
            PublisherEventCallbacks::default(),
        )
        .expect("publisher");
    let _subscription = node
        .create_subscription::<u32, _>(
            "deadline_mismatch",
            QoS::reliable().deadline_millis(100),
            |_| {},
            SubscriptionEventCallbacks::default(),
        )
        .expect("subscription");

    let status = publisher.incompatible_qos_status();
    assert_eq!(status.total_count, 1);
    assert_eq!(status.last_policy_kind, QosPolicyKind::Deadline);
}

#[test]
fn test_topic_type_is_enforced() {
    let context = Context::new(0).expect("valid domain");
    let node = Node::new(&context, "node").expect("node");
    let _publisher = node
        .create_publisher::<u32>("typed", QoS::default(), PublisherEventCallbacks::default())
        .expect("publisher");
    let result = node.create_subscription::<String, _>(
        "typed",
        QoS::default(),
        |_| {},
        SubscriptionEventCallbacks::default(),
    );
    assert!(matches!(result, Err(Error::TypeMismatch { .. })));
}

#[test]
fn test_publishing_from_another_thread() {
    let context = Context::new(0).expect("valid domain");
    let node = Node::new(&context, "node").expect("node");
    let received = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&received);
    let _subscription = node
        .create_subscription::<u32, _>(
            "threads",
            QoS::reliable().keep_all(),
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
            SubscriptionEventCallbacks::default(),
        )
        .expect("subscription");
    let publisher = node
        .create_publisher::<u32>("threads", QoS::reliable().keep_all(), PublisherEventCallbacks::default())
        .expect("publisher");

    let worker = std::thread::spawn(move || {
        for n in 0..50 {
            publisher.publish(&n).expect("publish");
        }
    });

    let mut executor = SingleThreadedExecutor::new(&context);
    executor.add_node(&node);
    worker.join().expect("publisher thread");
    executor.spin_for(Duration::from_millis(50));
    assert_eq!(received.load(Ordering::SeqCst), 50);
}
