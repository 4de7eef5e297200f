// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! LIFESPAN demo.
//!
//! The talker publishes a fixed number of transient-local messages with a
//! lifespan; the listener subscribes late and only receives the messages
//! that have not expired yet:
//!
//! ```bash
//! lifespan 1000 --publish-count 10 --subscribe-after 3000
//! ```

use crate::common_nodes::{Listener, Talker, TalkerOptions, LISTENER_NODE_NAME, TALKER_NODE_NAME};
use crate::demo::{self, one_shot, parse_positive_millis, Demo};
use crate::error::Result;
use crate::events::{self, EventLog};
use anyhow::Context as _;
use clap::Parser;
use hdds_qos::{Context, NodeLogger, QoS};
use std::time::Duration;

pub const TOPIC: &str = "qos_lifespan_chatter";

/// Quality of Service demo for the LIFESPAN policy
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "lifespan")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Quality of Service demo for the LIFESPAN policy")]
pub struct Args {
    /// Duration in positive integer milliseconds of the Lifespan QoS setting
    #[arg(value_parser = parse_positive_millis)]
    pub lifespan: u64,

    /// The depth of the Publisher's history queue - the maximum number of messages it will store for late-joining subscriptions
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    pub history: u32,

    /// How many messages to publish before stopping
    #[arg(long, default_value_t = 10)]
    pub publish_count: u32,

    /// The Subscriber will be created this long (in positive integer milliseconds) after application startup
    #[arg(long, default_value_t = 2500, value_parser = parse_positive_millis)]
    pub subscribe_after: u64,
}

impl Args {
    pub fn qos(&self) -> QoS {
        QoS::reliable()
            .keep_last(self.history)
            .transient_local()
            .lifespan_millis(self.lifespan)
    }
}

pub fn build(context: &Context, args: &Args) -> Result<Demo> {
    let qos = args.qos();
    let log = EventLog::new();

    let mut options = TalkerOptions::new(TOPIC, qos.clone());
    options.stop_at_count = args.publish_count;
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
        true,
    )?;

    let late = listener.clone();
    let subscribe_timer = one_shot(
        listener.node(),
        Duration::from_millis(args.subscribe_after),
        move || {
            if let Err(e) = late.start_listening() {
                late.node()
                    .logger()
                    .error(format!("Failed to subscribe: {}", e));
            }
        },
    )?;

    let mut demo = Demo::new(context, talker, listener, log);
    demo.timers.push(subscribe_timer);
    Ok(demo)
}

pub fn run(args: Args) -> Result<()> {
    let context = demo::setup()?;
    tracing::info!(
        lifespan_ms = args.lifespan,
        history = args.history,
        publish_count = args.publish_count,
        subscribe_after_ms = args.subscribe_after,
        "Starting lifespan demo"
    );
    let mut demo = build(&context, &args)?;
    demo.spin()
}

/// Entry point of the `lifespan` command.
pub fn main() -> anyhow::Result<()> {
    run(Args::parse()).context("lifespan demo failed")
}
