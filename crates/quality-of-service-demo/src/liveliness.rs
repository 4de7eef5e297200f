// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! LIVELINESS demo.
//!
//! The talker's liveliness is tracked by the listener. After a while the
//! talker is killed (AUTOMATIC: the node is destroyed) or stopped
//! (MANUAL_BY_TOPIC: it stops publishing and asserting), and the listener
//! reports the change:
//!
//! ```bash
//! liveliness 1000 --policy MANUAL_BY_TOPIC --topic-assert-period 600
//! ```

use crate::common_nodes::{Listener, Talker, TalkerOptions, LISTENER_NODE_NAME, TALKER_NODE_NAME};
use crate::demo::{self, one_shot, optional_millis, parse_positive_millis, Demo};
use crate::error::Result;
use crate::events::{self, EventLog};
use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use hdds_qos::{Context, Liveliness, LivelinessKind, NodeLogger, QoS};
use std::time::Duration;

pub const TOPIC: &str = "qos_liveliness_chatter";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Policy {
    #[value(name = "AUTOMATIC")]
    Automatic,
    #[value(name = "MANUAL_BY_TOPIC")]
    ManualByTopic,
}

impl From<Policy> for LivelinessKind {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Automatic => LivelinessKind::Automatic,
            Policy::ManualByTopic => LivelinessKind::ManualByTopic,
        }
    }
}

/// Quality of Service demo for the LIVELINESS policy
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "liveliness")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Quality of Service demo for the LIVELINESS policy")]
pub struct Args {
    /// Duration in positive integer milliseconds after which the talker is considered not alive
    #[arg(value_parser = parse_positive_millis)]
    pub liveliness_lease_duration: u64,

    /// The Liveliness policy type
    #[arg(long, value_enum, default_value = "AUTOMATIC")]
    pub policy: Policy,

    /// How often the talker will assert its liveliness (0 = never)
    #[arg(long, default_value_t = 0)]
    pub topic_assert_period: u64,

    /// Kill the publisher after this many milliseconds (0 = never)
    #[arg(long, default_value_t = 3000)]
    pub kill_publisher_after: u64,
}

impl Args {
    pub fn qos(&self) -> QoS {
        QoS::reliable().keep_last(10).liveliness(Liveliness::new(
            self.policy.into(),
            Duration::from_millis(self.liveliness_lease_duration),
        ))
    }
}

pub fn build(context: &Context, args: &Args) -> Result<Demo> {
    let qos = args.qos();
    let log = EventLog::new();

    let mut options = TalkerOptions::new(TOPIC, qos.clone());
    options.assert_topic_period = optional_millis(args.topic_assert_period);
    let talker = Talker::new(
        context,
        options,
        events::publisher_callbacks(&NodeLogger::new(TALKER_NODE_NAME), &log),
    )?;
    let listener = Listener::new(
        context,
        TOPIC,
        qos,
        events::subscription_callbacks(&NodeLogger::new(LISTENER_NODE_NAME), &log),
        false,
    )?;

    let mut timers = Vec::new();
    if let Some(after) = optional_millis(args.kill_publisher_after) {
        let victim = talker.clone();
        let policy = args.policy;
        // Created on the listener node so it survives the talker's destruction.
        timers.push(one_shot(listener.node(), after, move || match policy {
            Policy::Automatic => {
                // The executor drops destroyed nodes on its next pass.
                victim.logger().info("Destroying the talker node");
                victim.destroy();
            }
            Policy::ManualByTopic => {
                victim.logger().info("Stopping the talker");
                victim.stop();
            }
        })?);
    }

    let mut demo = Demo::new(context, talker, listener, log);
    demo.timers = timers;
    Ok(demo)
}

pub fn run(args: Args) -> Result<()> {
    let context = demo::setup()?;
    tracing::info!(
        lease_ms = args.liveliness_lease_duration,
        policy = ?args.policy,
        topic_assert_period_ms = args.topic_assert_period,
        kill_publisher_after_ms = args.kill_publisher_after,
        "Starting liveliness demo"
    );
    let mut demo = build(&context, &args)?;
    demo.spin()
}

/// Entry point of the `liveliness` command.
pub fn main() -> anyhow::Result<()> {
    run(Args::parse()).context("liveliness demo failed")
}
