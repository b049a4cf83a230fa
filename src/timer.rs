//! The once-per-second countdown ticker.
//!
//! The session itself is synchronous; this module owns the only temporal
//! piece. [`SessionTimer::start`] spawns a task that emits one [`Tick`]
//! per second over a channel, and the returned handle guarantees the task
//! stops on every exit path: explicitly via [`SessionTimer::cancel`], or
//! implicitly when the handle is dropped (submit, abandonment, early
//! return). A timer left running past its session is a leak.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// One elapsed second.
#[derive(Debug, Clone, Copy)]
pub struct Tick;

/// Owning handle for the tick task. Dropping it cancels the task.
pub struct SessionTimer {
    handle: JoinHandle<()>,
}

impl SessionTimer {
    /// Spawn the ticker and return the handle plus the tick stream.
    ///
    /// The first tick arrives one second after the call, not immediately.
    pub fn start() -> (Self, mpsc::UnboundedReceiver<Tick>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            // The first interval tick completes at once; swallow it so the
            // countdown starts on a full second.
            interval.tick().await;
            loop {
                interval.tick().await;
                if tx.send(Tick).is_err() {
                    break;
                }
            }
        });
        (Self { handle }, rx)
    }

    /// Stop the ticker. Safe to call more than once.
    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Drop for SessionTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
