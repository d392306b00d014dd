//! The update orchestrator.
//!
//! An [`Orchestrator`] ties one model to the editor:
//!
//! - **live mode** wires the editor's input hook to [`Orchestrator::update_state`]
//! - **update** waits out the model's debounce window, then feeds it the editor text
//! - **stop** interrupts the model and waits, bounded, for it to go idle
//! - **uncache** stops the model and clears its cached state
//! - **kill** ends the instance for good
//!
//! Instances only come from a [`Registry`](crate::Registry), which keeps at
//! most one of them alive.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tablink_core::{EditorSlot, EditorText, Error, InputHandler, LinkConfig, Model, Result};
use tokio::runtime::Handle;
use tokio::time;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::shutdown::KillHandle;

/// Point-in-time view of an orchestrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkStatus {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub live: bool,
    pub dead: bool,
    /// A stop attempt is in flight
    pub stopping: bool,
}

/// Handle to the editor-to-model link. Cheap to clone; clones share state.
pub struct Orchestrator<M: Model> {
    inner: Arc<Inner<M>>,
}

struct Inner<M: Model> {
    id: Uuid,
    created_at: DateTime<Utc>,
    model: Arc<M>,
    text: Arc<dyn EditorText>,
    editor: EditorSlot,
    config: LinkConfig,
    dead: AtomicBool,
    live: AtomicBool,
    /// Held while the input hook or `live` change, and by `kill`
    hook: Mutex<()>,
    current_kill: Mutex<Option<KillHandle>>,
}

/// Non-owning reference held by the registry and the input handler.
pub(crate) struct WeakOrchestrator<M: Model>(Weak<Inner<M>>);

impl<M: Model> WeakOrchestrator<M> {
    pub(crate) fn upgrade(&self) -> Option<Orchestrator<M>> {
        self.0.upgrade().map(|inner| Orchestrator { inner })
    }

    /// Input hook body: run a debounced update in the background.
    fn on_input(&self) {
        let Some(link) = self.upgrade() else {
            return;
        };

        let Ok(runtime) = Handle::try_current() else {
            warn!(link_id = %link.id(), "Editor input outside a tokio runtime, live update skipped");
            return;
        };

        runtime.spawn(async move {
            if let Err(e) = link.update_state().await {
                warn!(link_id = %link.id(), error = %e, "Live update failed");
            }
        });
    }
}

impl<M: Model> Clone for Orchestrator<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<M: Model> fmt::Debug for Orchestrator<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("id", &self.inner.id)
            .field("editor", &self.inner.editor)
            .field("live", &self.inner.live.load(Ordering::Acquire))
            .field("dead", &self.is_dead())
            .finish()
    }
}

impl<M: Model> Orchestrator<M> {
    pub(crate) fn new(
        model: M,
        text: Arc<dyn EditorText>,
        editor: EditorSlot,
        config: LinkConfig,
    ) -> Self {
        let live = config.live;
        Self {
            inner: Arc::new(Inner {
                id: Uuid::new_v4(),
                created_at: Utc::now(),
                model: Arc::new(model),
                text,
                editor,
                config,
                dead: AtomicBool::new(false),
                live: AtomicBool::new(live),
                hook: Mutex::new(()),
                current_kill: Mutex::new(None),
            }),
        }
    }

    pub(crate) fn downgrade(&self) -> WeakOrchestrator<M> {
        WeakOrchestrator(Arc::downgrade(&self.inner))
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Whether [`kill`](Self::kill) was called. Never resets.
    pub fn is_dead(&self) -> bool {
        self.inner.dead.load(Ordering::Acquire)
    }

    pub fn status(&self) -> LinkStatus {
        let stopping = self
            .inner
            .current_kill
            .lock()
            .map(|current| {
                current
                    .as_ref()
                    .is_some_and(|attempt| !attempt.is_settled() && !attempt.is_cancelled())
            })
            .unwrap_or(false);

        LinkStatus {
            id: self.inner.id,
            created_at: self.inner.created_at,
            live: self.inner.live.load(Ordering::Acquire),
            dead: self.is_dead(),
            stopping,
        }
    }

    /// The model this link drives.
    pub fn model(&self) -> Result<&M> {
        self.ensure_alive()?;
        Ok(&self.inner.model)
    }

    /// Whether editor input triggers updates.
    pub fn live(&self) -> Result<bool> {
        self.ensure_alive()?;
        Ok(self.inner.live.load(Ordering::Acquire))
    }

    /// Turn live mode on or off.
    ///
    /// Turning it on (re-)installs the input hook, turning it off clears it.
    /// If the editor cannot be resolved the mode is left unchanged.
    pub fn set_live(&self, live: bool) -> Result<()> {
        let _hook = self.lock_hook()?;
        self.ensure_alive()?;

        if live {
            self.attach_listener()?;
        } else {
            self.detach_listener()?;
        }
        self.inner.live.store(live, Ordering::Release);

        debug!(link_id = %self.inner.id, live, "Live mode changed");
        Ok(())
    }

    /// Debounced model update.
    ///
    /// Waits until the model's update interval has passed since the call,
    /// then parses the current editor text. A kill during the wait abandons
    /// the update. Intervals too large for the clock never elapse.
    pub async fn update_state(&self) -> Result<M::Output> {
        self.ensure_alive()?;

        time::sleep(self.inner.model.update_interval()).await;
        self.ensure_alive()?;

        let text = self.inner.text.get_text();
        debug!(link_id = %self.inner.id, chars = text.len(), "Updating model");
        Ok(self.inner.model.update(text).await?)
    }

    /// Start a bounded attempt to stop the model's update process.
    ///
    /// Supersedes the previous attempt: its handle is cancelled, so its
    /// continuations never run and its poll loop stops.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn kill_update_process(&self) -> Result<KillHandle> {
        self.ensure_alive()?;

        let mut current = self
            .inner
            .current_kill
            .lock()
            .map_err(|_| Error::LockPoisoned)?;

        if let Some(previous) = current.take() {
            if !previous.is_settled() {
                debug!(link_id = %self.inner.id, "Superseding in-flight stop attempt");
            }
            previous.cancel();
        }

        let attempt = KillHandle::spawn(
            Arc::clone(&self.inner.model),
            self.inner.config.process_kill_timeout(),
            self.inner.config.kill_poll_interval(),
        );
        *current = Some(attempt.clone());
        Ok(attempt)
    }

    /// Stop the model and clear its cache.
    ///
    /// The input hook is cleared for the duration and restored afterwards if
    /// the link is still live. Failures are wrapped in [`Error::UnCache`].
    ///
    /// Overlapping calls supersede each other: an earlier call still waiting
    /// for the model to stop fails with [`Error::Superseded`] as its reason.
    pub async fn uncache(&self) -> Result<()> {
        {
            let _hook = self.lock_hook()?;
            self.ensure_alive()?;
            self.detach_listener()?;
        }

        let outcome = self.clear_model().await;

        let restored = {
            let _hook = self.lock_hook()?;
            if !self.is_dead() && self.inner.live.load(Ordering::Acquire) {
                self.attach_listener()
            } else {
                Ok(())
            }
        };

        outcome.and(restored)
    }

    /// End this instance. Every later call except `kill` itself fails.
    pub fn kill(&self) -> Result<()> {
        let _hook = self.lock_hook()?;
        if self.inner.dead.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        info!(link_id = %self.inner.id, "Killed editor link");
        self.detach_listener()
    }

    async fn clear_model(&self) -> Result<()> {
        let attempt = self.kill_update_process()?;
        attempt.wait().await.map_err(Error::uncache)?;
        self.inner.model.uncache().await.map_err(Error::uncache)?;

        debug!(link_id = %self.inner.id, "Cleared model cache");
        Ok(())
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.is_dead() {
            return Err(Error::Killed);
        }
        Ok(())
    }

    fn lock_hook(&self) -> Result<MutexGuard<'_, ()>> {
        self.inner.hook.lock().map_err(|_| Error::LockPoisoned)
    }

    /// Callers hold the hook lock.
    fn attach_listener(&self) -> Result<()> {
        let editor = self.inner.editor.resolve()?;

        let link = self.downgrade();
        let handler: InputHandler = Arc::new(move || link.on_input());
        editor.set_on_input(Some(handler));

        debug!(
            link_id = %self.inner.id,
            editor_id = %self.inner.editor.id(),
            "Attached input listener"
        );
        Ok(())
    }

    fn detach_listener(&self) -> Result<()> {
        if let Some(editor) = self.inner.editor.try_resolve()? {
            editor.set_on_input(None);
            debug!(
                link_id = %self.inner.id,
                editor_id = %self.inner.editor.id(),
                "Detached input listener"
            );
        }
        Ok(())
    }
}
