//! # flowtest-observer
//!
//! Output-wait coordination for data-flow agent integration tests.
//!
//! Integration scenarios deploy the agent and its dependencies in
//! containers, then need a synchronous answer to "has the expected output
//! appeared in the shared directory yet?" within a bounded time. This crate
//! bridges the asynchronous filesystem watch into that synchronous check:
//!
//! - [`ChangeSignal`] counts creation events and exposes a wakeable
//!   condition shared between the watch delivery thread and the wait loop.
//! - [`OutputObserver`] owns the watch session lifecycle (arm, detect
//!   death, re-arm) and runs the bounded wait/validate loop.
//! - [`OutputValidator`] is the caller-supplied predicate deciding whether
//!   the output on disk satisfies the scenario.
//!
//! ## Guarantees
//!
//! - Events delivered before the loop re-enters its wait are never lost;
//!   the wake condition is persistent state, not a rendezvous.
//! - The validator gets one final chance at the deadline, so output landing
//!   between the last wake and the timeout is still observed.
//! - The watch session is stopped and joined on every exit path, including
//!   validator error propagation; no watch thread outlives the call.
//! - A dead watch is routine: the next call re-arms a fresh session.

mod error;
mod observer;
mod signal;
mod validators;
mod watch;

pub use error::{ObserveError, ValidatorError, WatchError};
pub use observer::OutputObserver;
pub use signal::{ChangeSignal, WaitOutcome};
pub use validators::{NoOutputValidator, OutputValidator, SingleFileOutputValidator};
pub use watch::{FsWatchBackend, FsWatchSession, WatchBackend, WatchSession};
