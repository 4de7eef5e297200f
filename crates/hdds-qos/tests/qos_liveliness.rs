// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test/bench code readability over pedantic
#![allow(clippy::missing_panics_doc)] // Tests/examples panic on failure

//! LIVELINESS QoS policy integration tests
//!
//! Liveliness lost on the publisher side, liveliness changed on the
//! subscription side, for the automatic and manual kinds.

use hdds_qos::dds::{
    LivelinessChangedStatus, LivelinessLostStatus, PublisherEventCallbacks,
    SubscriptionEventCallbacks,
};
use hdds_qos::{Context, Node, QoS, SingleThreadedExecutor};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

type Changes = Arc<Mutex<Vec<LivelinessChangedStatus>>>;

fn subscribe(node: &Node, topic: &str, qos: QoS) -> (hdds_qos::Subscription<u32>, Changes) {
    let changes: Changes = Arc::default();
    let sink = Arc::clone(&changes);
    let subscription = node
        .create_subscription::<u32, _>(
            topic,
            qos,
            |_| {},
            SubscriptionEventCallbacks::default()
                .on_liveliness(move |status| sink.lock().push(status)),
        )
        .expect("subscription");
    (subscription, changes)
}

#[test]
fn test_manual_by_topic_lost_and_regained() {
    let context = Context::new(0).expect("valid domain");
    let talker = Node::new(&context, "talker").expect("node");
    let listener = Node::new(&context, "listener").expect("node");
    let qos = QoS::reliable().liveliness_manual_topic_millis(80);

    let lost: Arc<Mutex<Vec<LivelinessLostStatus>>> = Arc::default();
    let lost_sink = Arc::clone(&lost);
    let publisher = talker
        .create_publisher::<u32>(
            "liveliness_chatter",
            qos.clone(),
            PublisherEventCallbacks::default()
                .on_liveliness(move |status| lost_sink.lock().push(status)),
        )
        .expect("publisher");
    let (subscription, changes) = subscribe(&listener, "liveliness_chatter", qos);

    let mut executor = SingleThreadedExecutor::new(&context);
    executor.add_node(&talker);
    executor.add_node(&listener);

    publisher.publish(&1).expect("publish");
    executor.spin_for(Duration::from_millis(250));

    assert_eq!(publisher.liveliness_lost_status().total_count, 1);
    assert_eq!(lost.lock().len(), 1);
    let status = subscription.liveliness_changed_status();
    assert_eq!(status.alive_count, 0);
    assert_eq!(status.not_alive_count, 1);
    assert_eq!(status.last_publication_handle, Some(publisher.guid()));

    {
        let changes = changes.lock();
        assert_eq!(changes.first().map(|s| s.alive_count_change), Some(1));
        let last = changes.last().expect("liveliness changed");
        assert_eq!(last.alive_count_change, -1);
        assert_eq!(last.not_alive_count_change, 1);
    }

    publisher.assert_liveliness().expect("assert");
    executor.spin_for(Duration::from_millis(20));
    let status = subscription.liveliness_changed_status();
    assert_eq!(status.alive_count, 1);
    assert_eq!(status.not_alive_count, 0);
    let last = *changes.lock().last().expect("liveliness changed");
    assert_eq!(last.alive_count_change, 1);
    assert_eq!(last.not_alive_count_change, -1);
}

#[test]
fn test_automatic_publisher_alive_until_destroyed() {
    let context = Context::new(0).expect("valid domain");
    let talker = Node::new(&context, "talker").expect("node");
    let listener = Node::new(&context, "listener").expect("node");
    let qos = QoS::reliable().liveliness_automatic_millis(50);

    let publisher = talker
        .create_publisher::<u32>("auto_chatter", qos.clone(), PublisherEventCallbacks::default())
        .expect("publisher");
    let (subscription, changes) = subscribe(&listener, "auto_chatter", qos);

    let mut executor = SingleThreadedExecutor::new(&context);
    executor.add_node(&listener);
    executor.spin_for(Duration::from_millis(150));

    // No publish and no assertion: the process keeps an automatic lease alive.
    assert_eq!(subscription.liveliness_changed_status().alive_count, 1);
    assert_eq!(publisher.liveliness_lost_status().total_count, 0);

    talker.destroy();
    executor.spin_for(Duration::from_millis(20));

    let status = subscription.liveliness_changed_status();
    assert_eq!(status.alive_count, 0);
    assert_eq!(status.not_alive_count, 0);
    assert_eq!(subscription.matched_publications(), 0);
    let last = *changes.lock().last().expect("liveliness changed");
    assert_eq!(last.alive_count_change, -1);
}

#[test]
fn test_manual_by_participant_renewed_by_node() {
    let context = Context::new(0).expect("valid domain");
    let talker = Node::new(&context, "talker").expect("node");
    let qos = QoS::reliable().liveliness_manual_participant_millis(60);

    let publisher = talker
        .create_publisher::<u32>("participant_chatter", qos.clone(), PublisherEventCallbacks::default())
        .expect("publisher");
    let (subscription, _changes) = subscribe(&talker, "participant_chatter", qos);

    let asserting = talker.clone();
    let _timer = talker
        .create_timer(Duration::from_millis(20), move || {
            let _ = asserting.assert_liveliness();
        })
        .expect("timer");

    let mut executor = SingleThreadedExecutor::new(&context);
    executor.add_node(&talker);
    executor.spin_for(Duration::from_millis(200));

    assert_eq!(publisher.liveliness_lost_status().total_count, 0);
    assert_eq!(subscription.liveliness_changed_status().alive_count, 1);
}

#[test]
fn test_liveliness_lost_counted_once_per_expiry() {
    let context = Context::new(0).expect("valid domain");
    let talker = Node::new(&context, "talker").expect("node");
    let qos = QoS::reliable().liveliness_manual_topic_millis(30);
    let publisher = talker
        .create_publisher::<u32>("quiet", qos, PublisherEventCallbacks::default())
        .expect("publisher");

    let mut executor = SingleThreadedExecutor::new(&context);
    executor.add_node(&talker);
    executor.spin_for(Duration::from_millis(150));
    assert_eq!(publisher.liveliness_lost_status().total_count, 1);

    publisher.publish(&1).expect("publish");
    executor.spin_for(Duration::from_millis(100));
    assert_eq!(publisher.liveliness_lost_status().total_count, 2);
}
