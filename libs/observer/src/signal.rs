//! Creation-event signal shared between the watch thread and the wait loop.
//!
//! One producer (the watch service's delivery thread) and one consumer (the
//! thread inside `validate_output`) share a [`ChangeSignal`]. The wake
//! condition is persistent state guarded by the same mutex the condvar
//! uses, so an event firing between "check condition" and "begin waiting"
//! is still observed on the next wait.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tracing::trace;

/// Outcome of a bounded wait on a [`ChangeSignal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The wake condition was set before the deadline.
    Notified,

    /// The deadline passed with the wake condition still clear.
    TimedOut,
}

impl WaitOutcome {
    /// Returns true if the wait ended because the condition was set.
    pub fn is_notified(&self) -> bool {
        matches!(self, Self::Notified)
    }
}

#[derive(Debug, Default)]
struct SignalInner {
    /// Edge flag: "at least one unconsumed event since last cleared".
    signaled: Mutex<bool>,
    wake: Condvar,
    /// Monotonic creation counter for the lifetime of the watch session.
    files_created: AtomicU64,
}

/// Cloneable handle to the shared event state.
///
/// Clones share one underlying counter and wake condition; the watch
/// callback holds one clone, the wait loop another.
#[derive(Debug, Clone, Default)]
pub struct ChangeSignal {
    inner: Arc<SignalInner>,
}

impl ChangeSignal {
    /// Create a fresh signal with a zero count and a clear wake condition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one creation event: bump the counter, set the wake condition,
    /// and release any blocked waiter.
    ///
    /// Called from the watch service's delivery thread.
    pub fn on_file_created(&self) {
        let created = self.inner.files_created.fetch_add(1, Ordering::SeqCst) + 1;
        trace!(files_created = created, "creation event recorded");

        let mut signaled = self
            .inner
            .signaled
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *signaled = true;
        // Waiter may be blocked on the condvar; flag alone is not enough.
        self.inner.wake.notify_all();
    }

    /// Block until the wake condition is set or `remaining` elapses.
    ///
    /// A zero `remaining` returns immediately: `Notified` if the condition
    /// is already set, `TimedOut` otherwise. Spurious condvar wakes are
    /// absorbed internally and never reported as `Notified`.
    pub fn wait(&self, remaining: Duration) -> WaitOutcome {
        let deadline = Instant::now() + remaining;
        let mut signaled = self
            .inner
            .signaled
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        loop {
            if *signaled {
                return WaitOutcome::Notified;
            }
            let now = Instant::now();
            if now >= deadline {
                return WaitOutcome::TimedOut;
            }
            let (guard, _) = self
                .inner
                .wake
                .wait_timeout(signaled, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            signaled = guard;
        }
    }

    /// Clear the wake condition after a wake-up has been handled, so a
    /// later re-check does not re-trigger validation for the same event.
    pub fn consume(&self) {
        let mut signaled = self
            .inner
            .signaled
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *signaled = false;
    }

    /// Current creation count. Never blocks.
    pub fn count(&self) -> u64 {
        self.inner.files_created.load(Ordering::SeqCst)
    }
}
