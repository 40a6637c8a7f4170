//! Filesystem watch sessions.
//!
//! The observer consumes the watch capability through [`WatchBackend`] and
//! [`WatchSession`] so deterministic tests can script session death and
//! event delivery. Production uses [`FsWatchBackend`], a thin layer over
//! `notify::RecommendedWatcher`.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, warn};

use crate::error::WatchError;
use crate::signal::ChangeSignal;

/// A live binding between a directory and an event delivery thread.
///
/// The observer exclusively owns the session: only the foreground thread
/// stops or replaces it, never the delivery thread itself.
pub trait WatchSession: Send {
    /// Whether the session is still delivering events.
    fn is_alive(&self) -> bool;

    /// Stop event delivery. Idempotent.
    fn stop(&mut self);

    /// Wait for the delivery thread to finish. Called after [`stop`].
    ///
    /// [`stop`]: WatchSession::stop
    fn join(&mut self);
}

/// Creates watch sessions bound to a [`ChangeSignal`].
pub trait WatchBackend {
    type Session: WatchSession;

    /// Start watching `dir`, delivering creation events into `signal`.
    fn start(
        &self,
        dir: &Path,
        recursive: bool,
        signal: ChangeSignal,
    ) -> Result<Self::Session, WatchError>;
}

/// Production backend over the platform's native directory notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsWatchBackend;

impl WatchBackend for FsWatchBackend {
    type Session = FsWatchSession;

    fn start(
        &self,
        dir: &Path,
        recursive: bool,
        signal: ChangeSignal,
    ) -> Result<FsWatchSession, WatchError> {
        let alive = Arc::new(AtomicBool::new(true));
        let delivery_alive = alive.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<notify::Event, notify::Error>| match res {
                Ok(event) => {
                    if matches!(event.kind, EventKind::Create(_)) {
                        // One count per created path; an event can carry several.
                        for _ in &event.paths {
                            signal.on_file_created();
                        }
                    }
                }
                Err(err) => {
                    warn!(error = %err, "watch delivery failed; marking session dead");
                    delivery_alive.store(false, Ordering::SeqCst);
                }
            },
            notify::Config::default(),
        )
        .map_err(|source| WatchError::Start {
            dir: dir.to_path_buf(),
            source,
        })?;

        let mode = if recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher
            .watch(dir, mode)
            .map_err(|source| WatchError::Start {
                dir: dir.to_path_buf(),
                source,
            })?;

        debug!(dir = %dir.display(), recursive, "watch session armed");
        Ok(FsWatchSession {
            watcher: Some(watcher),
            alive,
        })
    }
}

/// A running native watch. Dropping the inner watcher shuts down and joins
/// its delivery threads, so `join` has nothing left to wait for once `stop`
/// has run.
pub struct FsWatchSession {
    watcher: Option<RecommendedWatcher>,
    alive: Arc<AtomicBool>,
}

impl WatchSession for FsWatchSession {
    fn is_alive(&self) -> bool {
        self.watcher.is_some() && self.alive.load(Ordering::SeqCst)
    }

    fn stop(&mut self) {
        if self.watcher.take().is_some() {
            self.alive.store(false, Ordering::SeqCst);
            debug!("watch session stopped");
        }
    }

    fn join(&mut self) {
        // Delivery threads are joined when the watcher drops in `stop`.
    }
}
