//! The output-wait coordinator.
//!
//! [`OutputObserver`] owns one watch session over the agent's output
//! directory and answers "did the expected output appear within the
//! timeout?" for sequential test code. See the crate docs for the
//! guarantees.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::{ObserveError, ValidatorError, WatchError};
use crate::signal::ChangeSignal;
use crate::validators::OutputValidator;
use crate::watch::{FsWatchBackend, WatchBackend, WatchSession};

/// Watches an output directory and coordinates bounded wait/validate
/// cycles against it.
///
/// The observer arms a recursive watch at construction. Every
/// [`validate_output`] call stops and joins the watch on exit, so the next
/// call re-arms a fresh session; a session that dies mid-flight is likewise
/// replaced, never resurrected.
///
/// [`validate_output`]: OutputObserver::validate_output
pub struct OutputObserver<B: WatchBackend = FsWatchBackend> {
    output_dir: PathBuf,
    backend: B,
    session: Option<(B::Session, ChangeSignal)>,
}

impl OutputObserver<FsWatchBackend> {
    /// Start observing `output_dir` with the native filesystem watch.
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self, ObserveError> {
        Self::with_backend(output_dir, FsWatchBackend)
    }
}

impl<B: WatchBackend> OutputObserver<B> {
    /// Start observing `output_dir` with a custom watch backend.
    pub fn with_backend(output_dir: impl Into<PathBuf>, backend: B) -> Result<Self, ObserveError> {
        let mut observer = Self {
            output_dir: output_dir.into(),
            backend,
            session: None,
        };
        observer.ensure_session().map_err(ObserveError::Watch)?;
        Ok(observer)
    }

    /// The observed output directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Wait up to `timeout` for `validator` to accept the output.
    ///
    /// With `max_files > 0`, a creation count at or above the threshold
    /// short-circuits straight to a single `validate()` call — before any
    /// wait if the count is already there, or on the next wake-up once it
    /// is. `max_files == 0` disables the count check.
    ///
    /// Returns `Ok(true)` on validator success before the deadline, and
    /// otherwise the result of one final `validate()` at the deadline;
    /// timing out is not an error. A validator error is propagated, but
    /// only after the watch session has been stopped and joined — that
    /// teardown runs on every exit path.
    pub fn validate_output<V>(
        &mut self,
        timeout: Duration,
        validator: &mut V,
        max_files: u64,
    ) -> Result<bool, ObserveError>
    where
        V: OutputValidator + ?Sized,
    {
        info!(
            timeout_secs = timeout.as_secs_f64(),
            max_files,
            dir = %self.output_dir.display(),
            "waiting for valid agent output"
        );

        // A watch that cannot be armed is routine, not fatal: the call
        // degrades to a single validation at the deadline.
        if let Err(err) = self.ensure_session() {
            warn!(error = %err, "could not arm output watch; deadline-only validation");
        }
        let signal = self
            .session
            .as_ref()
            .map(|(_, signal)| signal.clone())
            .unwrap_or_default();

        let outcome = Self::run_wait_loop(&signal, timeout, validator, max_files);
        self.teardown();
        outcome.map_err(ObserveError::Validator)
    }

    /// Arm a fresh session if the current one is dead or absent.
    ///
    /// The session/signal pair is replaced wholesale; a dead session's
    /// internals are never touched.
    fn ensure_session(&mut self) -> Result<(), WatchError> {
        if self
            .session
            .as_ref()
            .is_some_and(|(session, _)| session.is_alive())
        {
            return Ok(());
        }
        self.session = None;
        let signal = ChangeSignal::new();
        let session = self.backend.start(&self.output_dir, true, signal.clone())?;
        self.session = Some((session, signal));
        Ok(())
    }

    fn run_wait_loop<V>(
        signal: &ChangeSignal,
        timeout: Duration,
        validator: &mut V,
        max_files: u64,
    ) -> Result<bool, ValidatorError>
    where
        V: OutputValidator + ?Sized,
    {
        if max_files > 0 && signal.count() >= max_files {
            debug!(
                count = signal.count(),
                max_files, "output count already satisfied; skipping wait"
            );
            return validator.validate();
        }

        let start = Instant::now();
        loop {
            let remaining = timeout.saturating_sub(start.elapsed());
            if signal.wait(remaining).is_notified() {
                signal.consume();
                if max_files > 0 && signal.count() >= max_files {
                    return validator.validate();
                }
                if validator.validate()? {
                    debug!(
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "output validated before deadline"
                    );
                    return Ok(true);
                }
            }
            if start.elapsed() >= timeout {
                // Output may have landed between the last wake and the
                // deadline; the validator always gets one last look.
                debug!("deadline reached; running final validation");
                return validator.validate();
            }
        }
    }

    /// Stop and join the current session. The next call re-arms.
    fn teardown(&mut self) {
        if let Some((mut session, _)) = self.session.take() {
            session.stop();
            session.join();
        }
    }
}
