// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Single-threaded executor.
//!
//! Every pass polls all entities of the added nodes: timers that are due
//! fire, subscriptions hand queued messages to their callbacks, and
//! pending QoS events are dispatched. Between passes the executor sleeps
//! until the earliest timer, deadline or lease expiry, or until a publisher
//! (or [`Context::shutdown`]) wakes it.

use crate::dds::{Context, Node, Waitable};
use crossbeam::channel::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub struct SingleThreadedExecutor {
    context: Context,
    nodes: Vec<Node>,
    wake_rx: Receiver<()>,
}

impl SingleThreadedExecutor {
    pub fn new(context: &Context) -> Self {
        Self {
            context: context.clone(),
            nodes: Vec::new(),
            wake_rx: context.wake_receiver(),
        }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Add `node`. Returns `false` if it was already added.
    pub fn add_node(&mut self, node: &Node) -> bool {
        if !node.context().ptr_eq(&self.context) {
            log::warn!(
                "[executor] node '{}' belongs to another context, ignoring",
                node.name()
            );
            return false;
        }
        if self.nodes.iter().any(|n| n.ptr_eq(node)) {
            return false;
        }
        self.nodes.push(node.clone());
        true
    }

    /// Remove `node`. Its entities stay alive but are no longer polled.
    pub fn remove_node(&mut self, node: &Node) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|n| !n.ptr_eq(node));
        before != self.nodes.len()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    fn waitables(&mut self) -> Vec<Arc<dyn Waitable>> {
        self.nodes.retain(|n| !n.is_destroyed());
        self.nodes.iter().flat_map(Node::waitables).collect()
    }

    /// One polling pass. Returns whether any callback ran and the next
    /// instant something may become ready.
    fn poll(&mut self, now: Instant) -> (bool, Option<Instant>) {
        // Drain before executing so wake-ups raised by the callbacks below
        // are not lost.
        while self.wake_rx.try_recv().is_ok() {}

        let waitables = self.waitables();
        let mut fired = false;
        for waitable in &waitables {
            if self.context.is_shutdown() {
                break;
            }
            fired |= waitable.execute(now);
        }

        let after = Instant::now();
        let next = waitables
            .iter()
            .filter_map(|w| w.next_wake(after))
            .min();
        (fired, next)
    }

    /// Run ready work, waiting at most `timeout` for some to appear
    /// (`None` waits indefinitely). Returns `true` if a callback ran.
    pub fn spin_once(&mut self, timeout: Option<Duration>) -> bool {
        let limit = timeout.and_then(|t| Instant::now().checked_add(t));
        loop {
            if self.context.is_shutdown() {
                return false;
            }
            let (fired, next) = self.poll(Instant::now());
            if fired {
                return true;
            }
            if self.context.is_shutdown() {
                return false;
            }

            let now = Instant::now();
            if limit.is_some_and(|limit| now >= limit) {
                return false;
            }
            let wake_at = match (next, limit) {
                (Some(next), Some(limit)) => Some(next.min(limit)),
                (next, limit) => next.or(limit),
            };
            match wake_at {
                Some(at) if at <= now => continue,
                Some(at) => match self.wake_rx.recv_deadline(at) {
                    Ok(()) | Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => return false,
                },
                None => {
                    if self.wake_rx.recv().is_err() {
                        return false;
                    }
                }
            }
        }
    }

    /// Spin until `deadline` or shutdown.
    pub fn spin_until(&mut self, deadline: Instant) {
        while self.context.ok() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            self.spin_once(Some(deadline - now));
        }
    }

    /// Spin for `duration` or until shutdown.
    pub fn spin_for(&mut self, duration: Duration) {
        match Instant::now().checked_add(duration) {
            Some(deadline) => self.spin_until(deadline),
            None => self.spin(),
        }
    }

    /// Spin until the context is shut down.
    pub fn spin(&mut self) {
        log::debug!(
            "[executor] spinning {} node(s) on domain {}",
            self.nodes.len(),
            self.context.domain_id()
        );
        while self.context.ok() {
            self.spin_once(None);
        }
    }
}
