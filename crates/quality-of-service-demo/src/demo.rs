// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wiring shared by the three commands.

use crate::common_nodes::{Listener, Talker};
use crate::config::EnvConfig;
use crate::error::DemoError;
use crate::events::EventLog;
use crate::logging;
use hdds_qos::{Context, Node, SingleThreadedExecutor, Timer};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Parse a strictly positive millisecond count (clap value parser).
pub fn parse_positive_millis(value: &str) -> Result<u64, String> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err("must be a positive integer number of milliseconds".to_string()),
        Ok(ms) => Ok(ms),
        Err(e) => Err(format!("'{}' is not a number of milliseconds: {}", value, e)),
    }
}

/// `Some(period)` for a positive millisecond count, `None` for 0.
pub fn optional_millis(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

/// Create a timer on `node` that runs `callback` once, `delay` from now,
/// and then cancels itself.
pub fn one_shot<F>(node: &Node, delay: Duration, callback: F) -> hdds_qos::Result<Timer>
where
    F: FnOnce() + Send + 'static,
{
    let slot: Arc<Mutex<Option<Timer>>> = Arc::default();
    let mut callback = Some(callback);
    let own = Arc::clone(&slot);
    let timer = node.create_timer(delay, move || {
        if let Some(callback) = callback.take() {
            callback();
        }
        // Dropping the handle here breaks the timer -> closure -> timer cycle.
        if let Some(timer) = own.lock().take() {
            timer.cancel();
        }
    })?;
    *slot.lock() = Some(timer.clone());
    Ok(timer)
}

/// A wired demo: both nodes, the executor spinning them, and the QoS
/// events they raised.
pub struct Demo {
    pub context: Context,
    pub executor: SingleThreadedExecutor,
    pub talker: Talker,
    pub listener: Listener,
    pub events: EventLog,
    pub timers: Vec<Timer>,
}

impl Demo {
    pub(crate) fn new(
        context: &Context,
        talker: Talker,
        listener: Listener,
        events: EventLog,
    ) -> Self {
        let mut executor = SingleThreadedExecutor::new(context);
        executor.add_node(listener.node());
        executor.add_node(talker.node());
        Self {
            context: context.clone(),
            executor,
            talker,
            listener,
            events,
            timers: Vec::new(),
        }
    }

    pub fn spin_for(&mut self, duration: Duration) {
        self.executor.spin_for(duration);
    }

    /// Spin until Ctrl+C (or any other shutdown of the context).
    pub fn spin(&mut self) -> Result<(), DemoError> {
        let context = self.context.clone();
        ctrlc::set_handler(move || context.shutdown())?;
        self.executor.spin();
        Ok(())
    }
}

impl Drop for Demo {
    fn drop(&mut self) {
        // Timers on the nodes hold clones of the talker and listener.
        self.talker.destroy();
        self.listener.destroy();
    }
}

/// Load the environment, initialize logging and open the domain.
pub fn setup() -> Result<Context, DemoError> {
    let config = EnvConfig::from_env();
    logging::init(&config)?;
    tracing::debug!(domain = config.domain_id, "joining domain");
    Ok(Context::new(config.domain_id)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_parse_positive_millis() {
        assert_eq!(parse_positive_millis("250"), Ok(250));
        assert!(parse_positive_millis("0").is_err());
        assert!(parse_positive_millis("-5").is_err());
        assert!(parse_positive_millis("fast").is_err());
    }

    #[test]
    fn test_optional_millis() {
        assert_eq!(optional_millis(0), None);
        assert_eq!(optional_millis(600), Some(Duration::from_millis(600)));
    }

    #[test]
    fn test_one_shot_runs_once() {
        let context = Context::new(0).expect("valid domain");
        let node = Node::new(&context, "one_shot").expect("node");
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let timer = one_shot(&node, Duration::from_millis(10), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .expect("timer");

        let mut executor = SingleThreadedExecutor::new(&context);
        executor.add_node(&node);
        executor.spin_for(Duration::from_millis(60));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(timer.is_canceled());
    }
}
