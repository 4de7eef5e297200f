// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Periodic timers driven by the executor.

use super::node::Waitable;
use super::{Context, Guid};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Boxed timer callback.
pub(crate) type TimerCallback = Box<dyn FnMut() + Send>;

struct TimerState {
    next_call: Instant,
    canceled: bool,
    destroyed: bool,
}

pub(crate) struct TimerInner {
    guid: Guid,
    period: Duration,
    context: Context,
    state: Mutex<TimerState>,
    callback: Mutex<TimerCallback>,
}

impl TimerInner {
    fn schedule_after(&self, now: Instant) -> Instant {
        now.checked_add(self.period).unwrap_or(now)
    }
}

impl Waitable for TimerInner {
    fn guid(&self) -> Guid {
        self.guid
    }

    fn execute(&self, now: Instant) -> bool {
        {
            let mut st = self.state.lock();
            if st.canceled || st.destroyed || now < st.next_call {
                return false;
            }
            if self.period.is_zero() {
                st.next_call = now;
            } else {
                // Skip periods missed while the executor was busy.
                while st.next_call <= now {
                    st.next_call = match st.next_call.checked_add(self.period) {
                        Some(next) => next,
                        None => break,
                    };
                }
            }
        }
        // The state lock is released so the callback may cancel or reset
        // this very timer.
        let mut callback = self.callback.lock();
        (*callback)();
        true
    }

    fn next_wake(&self, _now: Instant) -> Option<Instant> {
        let st = self.state.lock();
        if st.canceled || st.destroyed {
            None
        } else {
            Some(st.next_call)
        }
    }

    fn is_destroyed(&self) -> bool {
        self.state.lock().destroyed
    }

    fn destroy(&self) {
        let mut st = self.state.lock();
        st.destroyed = true;
        st.canceled = true;
    }
}

/// Handle to a periodic timer. Cheap to clone.
///
/// Created by [`Node::create_timer`](super::Node::create_timer). The callback
/// first fires one period after creation.
#[derive(Clone)]
pub struct Timer {
    inner: Arc<TimerInner>,
}

impl std::fmt::Debug for Timer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timer")
            .field("guid", &self.inner.guid)
            .field("period", &self.inner.period)
            .field("canceled", &self.is_canceled())
            .finish()
    }
}

impl Timer {
    pub(crate) fn create(
        context: &Context,
        period: Duration,
        callback: TimerCallback,
        now: Instant,
    ) -> Self {
        let inner = Arc::new(TimerInner {
            guid: context.next_guid(),
            period,
            context: context.clone(),
            state: Mutex::new(TimerState {
                next_call: now,
                canceled: false,
                destroyed: false,
            }),
            callback: Mutex::new(callback),
        });
        inner.state.lock().next_call = inner.schedule_after(now);
        Self { inner }
    }

    pub(crate) fn waitable(&self) -> Arc<TimerInner> {
        Arc::clone(&self.inner)
    }

    pub fn guid(&self) -> Guid {
        self.inner.guid
    }

    pub fn period(&self) -> Duration {
        self.inner.period
    }

    /// Stop firing until [`Timer::reset`] is called.
    pub fn cancel(&self) {
        self.inner.state.lock().canceled = true;
    }

    /// Restart the period from now. Also un-cancels the timer.
    pub fn reset(&self) {
        let now = Instant::now();
        {
            let mut st = self.inner.state.lock();
            if st.destroyed {
                return;
            }
            st.canceled = false;
            st.next_call = self.inner.schedule_after(now);
        }
        self.inner.context.wake();
    }

    pub fn is_canceled(&self) -> bool {
        self.inner.state.lock().canceled
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.is_destroyed()
    }

    /// Time left before the next call, `None` while canceled.
    pub fn time_until_next_call(&self) -> Option<Duration> {
        self.inner
            .next_wake(Instant::now())
            .map(|next| next.saturating_duration_since(Instant::now()))
    }
}
