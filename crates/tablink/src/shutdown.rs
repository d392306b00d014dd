//! Bounded attempts to stop the model's update process.
//!
//! An attempt interrupts the model, then polls [`Model::is_active`] until it
//! clears or the kill timeout elapses. Attempts are wrapped in a
//! [`KillHandle`]; superseding an attempt cancels its handle, which drops the
//! poll loop and suppresses its continuations.

use std::sync::Arc;
use std::time::Duration;

use tablink_core::{Cancelable, Error, Model, Result};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::debug;

/// Handle to one stop attempt.
#[derive(Debug, Clone)]
pub struct KillHandle(Cancelable<Result<()>>);

impl KillHandle {
    pub(crate) fn spawn<M: Model>(model: Arc<M>, timeout: Duration, poll: Duration) -> Self {
        Self(Cancelable::spawn(stop_update_process(model, timeout, poll)))
    }

    /// Wait for the attempt. A superseded attempt yields [`Error::Superseded`].
    pub async fn wait(&self) -> Result<()> {
        self.0.outcome().await.unwrap_or(Err(Error::Superseded))
    }

    /// Run `continuation` once the attempt settles, unless it is superseded first.
    pub fn then<F>(&self, continuation: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<()>) + Send + 'static,
    {
        self.0.then(continuation)
    }

    /// Drop the attempt and its pending continuations.
    pub fn cancel(&self) {
        self.0.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.is_cancelled()
    }

    pub fn is_settled(&self) -> bool {
        self.0.is_settled()
    }
}

/// Interrupt `model` and wait until it is idle or `timeout` elapses.
async fn stop_update_process<M: Model>(
    model: Arc<M>,
    timeout: Duration,
    poll: Duration,
) -> Result<()> {
    model.interrupt();
    let deadline = Instant::now() + timeout;

    while model.is_active() {
        let now = Instant::now();
        if now >= deadline {
            let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
            debug!(timeout_ms, "Model still active at kill timeout");
            return Err(Error::stop_timed_out(timeout_ms));
        }
        time::sleep(poll.min(deadline - now)).await;
    }

    Ok(())
}
