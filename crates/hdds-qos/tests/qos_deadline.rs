// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test/bench code readability over pedantic
#![allow(clippy::missing_panics_doc)] // Tests/examples panic on failure

//! DEADLINE QoS policy integration tests
//!
//! Drives publishers and subscriptions through the executor and checks the
//! offered/requested deadline missed events.

use hdds_qos::dds::{
    OfferedDeadlineMissedStatus, PublisherEventCallbacks, RequestedDeadlineMissedStatus,
    SubscriptionEventCallbacks,
};
use hdds_qos::{Context, Node, QoS, SingleThreadedExecutor};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_deadline_missed_on_both_sides() {
    let context = Context::new(0).expect("valid domain");
    let talker = Node::new(&context, "talker").expect("node");
    let listener = Node::new(&context, "listener").expect("node");
    let qos = QoS::reliable().keep_last(10).deadline_millis(50);

    let offered: Arc<Mutex<Vec<OfferedDeadlineMissedStatus>>> = Arc::default();
    let requested: Arc<Mutex<Vec<RequestedDeadlineMissedStatus>>> = Arc::default();
    let offered_sink = Arc::clone(&offered);
    let requested_sink = Arc::clone(&requested);

    let publisher = talker
        .create_publisher::<String>(
            "deadline_chatter",
            qos.clone(),
            PublisherEventCallbacks::default()
                .on_deadline(move |status| offered_sink.lock().push(status)),
        )
        .expect("publisher");
    let subscription = listener
        .create_subscription::<String, _>(
            "deadline_chatter",
            qos,
            |_| {},
            SubscriptionEventCallbacks::default()
                .on_deadline(move |status| requested_sink.lock().push(status)),
        )
        .expect("subscription");

    let mut executor = SingleThreadedExecutor::new(&context);
    executor.add_node(&talker);
    executor.add_node(&listener);

    publisher.publish(&"hello".to_string()).expect("publish");
    executor.spin_for(Duration::from_millis(230));

    let offered_total = publisher.offered_deadline_missed_status().total_count;
    let requested_total = subscription.requested_deadline_missed_status().total_count;
    assert!(offered_total >= 3, "offered total {}", offered_total);
    assert!(requested_total >= 3, "requested total {}", requested_total);

    // Every callback reports the running total and a positive delta.
    let offered = offered.lock();
    assert!(!offered.is_empty());
    assert!(offered.iter().all(|s| s.total_count_change > 0));
    assert_eq!(
        offered.iter().map(|s| s.total_count_change).sum::<u32>(),
        offered_total
    );
    let last = offered.last().expect("at least one event");
    assert_eq!(last.total_count, offered_total);

    let requested = requested.lock();
    assert!(!requested.is_empty());
    assert!(requested
        .windows(2)
        .all(|pair| pair[0].total_count < pair[1].total_count));
}

#[test]
fn test_no_deadline_missed_while_publishing_in_time() {
    let context = Context::new(0).expect("valid domain");
    let node = Node::new(&context, "talker").expect("node");
    let qos = QoS::reliable().deadline_millis(200);

    let publisher = node
        .create_publisher::<u32>("steady", qos.clone(), PublisherEventCallbacks::default())
        .expect("publisher");
    let subscription = node
        .create_subscription::<u32, _>("steady", qos, |_| {}, SubscriptionEventCallbacks::default())
        .expect("subscription");

    let timer_publisher = publisher.clone();
    let _timer = node
        .create_timer(Duration::from_millis(20), move || {
            let _ = timer_publisher.publish(&1);
        })
        .expect("timer");

    publisher.publish(&0).expect("publish");
    let mut executor = SingleThreadedExecutor::new(&context);
    executor.add_node(&node);
    executor.spin_for(Duration::from_millis(300));

    assert_eq!(publisher.offered_deadline_missed_status().total_count, 0);
    assert_eq!(subscription.requested_deadline_missed_status().total_count, 0);
    assert!(subscription.taken_count() >= 10);
}

#[test]
fn test_deadline_not_enforced_before_first_sample() {
    let context = Context::new(0).expect("valid domain");
    let node = Node::new(&context, "talker").expect("node");
    let qos = QoS::reliable().deadline_millis(20);

    let publisher = node
        .create_publisher::<u32>("idle", qos.clone(), PublisherEventCallbacks::default())
        .expect("publisher");
    let subscription = node
        .create_subscription::<u32, _>("idle", qos, |_| {}, SubscriptionEventCallbacks::default())
        .expect("subscription");

    let mut executor = SingleThreadedExecutor::new(&context);
    executor.add_node(&node);
    executor.spin_for(Duration::from_millis(100));

    assert_eq!(publisher.offered_deadline_missed_status().total_count, 0);
    assert_eq!(subscription.requested_deadline_missed_status().total_count, 0);
}
