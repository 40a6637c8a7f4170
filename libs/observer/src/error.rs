//! Error types for output observation.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from the filesystem watch backend.
#[derive(Debug, Error)]
pub enum WatchError {
    /// The watch could not be started on the target directory.
    #[error("failed to start filesystem watch on {dir}")]
    Start {
        dir: PathBuf,
        #[source]
        source: notify::Error,
    },

    /// The backend is unavailable (used by scripted test backends).
    #[error("watch backend unavailable: {0}")]
    Unavailable(String),
}

/// Error raised by a caller-supplied [`OutputValidator`].
///
/// The observer never interprets this; it tears down the watch session and
/// propagates it unchanged.
///
/// [`OutputValidator`]: crate::OutputValidator
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ValidatorError(#[from] Box<dyn std::error::Error + Send + Sync + 'static>);

impl ValidatorError {
    /// Wrap any error as a validator error.
    pub fn new(err: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>) -> Self {
        Self(err.into())
    }
}

impl From<std::io::Error> for ValidatorError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err)
    }
}

/// Errors surfaced by [`OutputObserver`].
///
/// Timeout without satisfaction is `Ok(false)`, not an error. A watch that
/// dies or fails to start mid-call is recovered internally and never
/// surfaces here; only construction reports watch failures.
///
/// [`OutputObserver`]: crate::OutputObserver
#[derive(Debug, Error)]
pub enum ObserveError {
    /// The initial watch session could not be armed at construction.
    #[error("could not arm output watch")]
    Watch(#[from] WatchError),

    /// The caller's validator failed; propagated after watch teardown.
    #[error("output validator failed")]
    Validator(#[from] ValidatorError),
}
