//! Cancelable asynchronous handles.
//!
//! A [`Cancelable`] runs a future on the tokio runtime and lets any number of
//! observers wait for its outcome. [`Cancelable::cancel`] suppresses every
//! continuation that has not run yet and drops the computation at its next
//! await point.

use std::future::Future;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Handle to a spawned computation whose observers can be detached.
#[derive(Debug)]
pub struct Cancelable<T> {
    cancel: CancellationToken,
    outcome: watch::Receiver<Option<T>>,
}

impl<T> Clone for Cancelable<T> {
    fn clone(&self) -> Self {
        Self {
            cancel: self.cancel.clone(),
            outcome: self.outcome.clone(),
        }
    }
}

impl<T> Cancelable<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Spawn `future` on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let (tx, outcome) = watch::channel(None);

        let token = cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => trace!("Cancelable computation dropped"),
                value = future => {
                    tx.send_replace(Some(value));
                }
            }
        });

        Self { cancel, outcome }
    }

    /// Suppress pending continuations and stop the computation.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether [`cancel`](Self::cancel) was called on this handle or a clone.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Whether the computation produced a value.
    pub fn is_settled(&self) -> bool {
        self.outcome.borrow().is_some()
    }

    /// Wait for the outcome. Returns `None` once the handle is cancelled.
    pub async fn outcome(&self) -> Option<T> {
        if self.cancel.is_cancelled() {
            return None;
        }

        let mut outcome = self.outcome.clone();
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            settled = outcome.wait_for(Option::is_some) => {
                settled.ok().and_then(|value| (*value).clone())
            }
        }
    }

    /// Run `continuation` with the outcome, unless the handle is cancelled first.
    pub fn then<F>(&self, continuation: F) -> JoinHandle<()>
    where
        F: FnOnce(T) + Send + 'static,
    {
        let handle = self.clone();
        tokio::spawn(async move {
            if let Some(value) = handle.outcome().await {
                continuation(value);
            }
        })
    }
}
