// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! DEADLINE demo.
//!
//! Talker and listener share a deadline period. The talker publishes every
//! 500 ms and periodically pauses; while paused, both sides report missed
//! deadlines:
//!
//! ```bash
//! deadline 600 --publish-for 5000 --pause-for 1000
//! ```

use crate::common_nodes::{Listener, Talker, TalkerOptions, LISTENER_NODE_NAME, TALKER_NODE_NAME};
use crate::demo::{self, parse_positive_millis, Demo};
use crate::error::Result;
use crate::events::{self, EventLog};
use anyhow::Context as _;
use clap::Parser;
use hdds_qos::{Context, NodeLogger, QoS};
use std::time::Duration;

pub const TOPIC: &str = "qos_deadline_chatter";

/// Quality of Service demo for the DEADLINE policy
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "deadline")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Quality of Service demo for the DEADLINE policy")]
pub struct Args {
    /// Duration in positive integer milliseconds of the Deadline QoS setting
    #[arg(value_parser = parse_positive_millis)]
    pub deadline: u64,

    /// Duration in positive integer milliseconds to publish until pausing the talker
    #[arg(long, default_value_t = 5000, value_parser = parse_positive_millis)]
    pub publish_for: u64,

    /// Duration in positive integer milliseconds to pause the talker before beginning to publish again
    #[arg(long, default_value_t = 1000, value_parser = parse_positive_millis)]
    pub pause_for: u64,
}

impl Args {
    pub fn qos(&self) -> QoS {
        QoS::reliable().keep_last(10).deadline_millis(self.deadline)
    }
}

/// Wire talker, listener and the pause timer on `context`.
pub fn build(context: &Context, args: &Args) -> Result<Demo> {
    let qos = args.qos();
    let log = EventLog::new();

    let talker = Talker::new(
        context,
        TalkerOptions::new(TOPIC, qos.clone()),
        events::publisher_callbacks(&NodeLogger::new(TALKER_NODE_NAME), &log),
    )?;
    let listener = Listener::new(
        context,
        TOPIC,
        qos,
        events::subscription_callbacks(&NodeLogger::new(LISTENER_NODE_NAME), &log),
        false,
    )?;

    let pause_for = Duration::from_millis(args.pause_for);
    let pausing = talker.clone();
    let pause_timer = talker
        .node()
        .create_timer(Duration::from_millis(args.publish_for), move || {
            if let Err(e) = pausing.pause_for(pause_for) {
                pausing.logger().error(format!("Failed to pause: {}", e));
            }
        })?;

    let mut demo = Demo::new(context, talker, listener, log);
    demo.timers.push(pause_timer);
    Ok(demo)
}

pub fn run(args: Args) -> Result<()> {
    let context = demo::setup()?;
    tracing::info!(
        deadline_ms = args.deadline,
        publish_for_ms = args.publish_for,
        pause_for_ms = args.pause_for,
        "Starting deadline demo"
    );
    let mut demo = build(&context, &args)?;
    demo.spin()
}

/// Entry point of the `deadline` command.
pub fn main() -> anyhow::Result<()> {
    run(Args::parse()).context("deadline demo failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["deadline", "600"]).expect("valid args");
        assert_eq!(
            args,
            Args {
                deadline: 600,
                publish_for: 5000,
                pause_for: 1000,
            }
        );
        assert_eq!(args.qos().deadline.period, Duration::from_millis(600));
    }

    #[test]
    fn test_args_reject_non_positive() {
        assert!(Args::try_parse_from(["deadline"]).is_err());
        assert!(Args::try_parse_from(["deadline", "0"]).is_err());
        assert!(Args::try_parse_from(["deadline", "600", "--pause-for", "0"]).is_err());
    }

    #[test]
    fn test_pause_raises_deadline_events() {
        let context = Context::new(0).expect("valid domain");
        let args = Args {
            deadline: 100,
            publish_for: 20,
            pause_for: 300,
        };
        let mut demo = build(&context, &args).expect("demo");
        demo.talker.publish();
        demo.spin_for(Duration::from_millis(280));

        assert!(demo.talker.is_paused());
        let offered = demo.events.offered_deadline_missed();
        let requested = demo.events.requested_deadline_missed();
        assert!(!offered.is_empty());
        assert!(!requested.is_empty());
        assert!(offered.iter().all(|s| s.total_count_change > 0));
    }
}
