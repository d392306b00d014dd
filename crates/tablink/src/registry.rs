//! Guarded factory for orchestrators.
//!
//! The registry owns everything needed to build an [`Orchestrator`] and a weak
//! reference to the last one it built. [`Registry::create`] refuses to build a
//! new instance while that one is still alive.

use std::sync::{Arc, Mutex};

use tablink_core::{EditorHost, EditorSlot, EditorText, Error, LinkConfig, Model, Result};
use tracing::{info, warn};

use crate::orchestrator::{Orchestrator, WeakOrchestrator};

/// Factory that keeps at most one live [`Orchestrator`].
pub struct Registry<M: Model> {
    config: LinkConfig,
    host: Arc<dyn EditorHost>,
    text: Arc<dyn EditorText>,
    model_factory: Box<dyn Fn() -> M + Send + Sync>,
    /// Last created instance: used only to enforce the one-live-instance rule
    last: Mutex<Option<WeakOrchestrator<M>>>,
}

impl<M: Model> Registry<M> {
    /// Create a registry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration does not validate.
    pub fn new<F>(
        config: LinkConfig,
        host: Arc<dyn EditorHost>,
        text: Arc<dyn EditorText>,
        model_factory: F,
    ) -> Result<Self>
    where
        F: Fn() -> M + Send + Sync + 'static,
    {
        config.validate()?;

        Ok(Self {
            config,
            host,
            text,
            model_factory: Box::new(model_factory),
            last: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Build a new orchestrator with a fresh model.
    ///
    /// The new instance runs [`Orchestrator::uncache`] before it is returned.
    /// A failed teardown kills the instance, which frees the slot.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyExists`] while the previous instance is alive
    /// - [`Error::EditorUnavailable`] when the config is live and the editor
    ///   cannot be resolved
    /// - [`Error::UnCache`] when the model does not stop within
    ///   `process_kill_timeout` ([`Error::StopTimedOut`] is its reason) or its
    ///   own uncache fails
    /// - [`Error::Killed`] when the instance is killed before the teardown ends
    pub async fn create(&self) -> Result<Orchestrator<M>> {
        let link = self.register()?;
        info!(
            link_id = %link.id(),
            editor_id = %self.config.editor_id,
            "Created editor link"
        );

        if let Err(e) = link.uncache().await {
            warn!(link_id = %link.id(), error = %e, "Initial teardown failed, discarding link");
            link.kill()?;
            return Err(e);
        }

        if link.is_dead() {
            warn!(link_id = %link.id(), "Link killed during initial teardown");
            return Err(Error::Killed);
        }

        Ok(link)
    }

    /// The live instance, if there is one.
    pub fn current(&self) -> Option<Orchestrator<M>> {
        let last = self.last.lock().ok()?;
        last.as_ref()
            .and_then(WeakOrchestrator::upgrade)
            .filter(|link| !link.is_dead())
    }

    /// Check the slot and claim it in one critical section.
    fn register(&self) -> Result<Orchestrator<M>> {
        let mut last = self.last.lock().map_err(|_| Error::LockPoisoned)?;

        let alive = last
            .as_ref()
            .and_then(WeakOrchestrator::upgrade)
            .is_some_and(|link| !link.is_dead());
        if alive {
            return Err(Error::AlreadyExists);
        }

        let link = Orchestrator::new(
            (self.model_factory)(),
            Arc::clone(&self.text),
            EditorSlot::new(self.config.editor_id.clone(), Arc::clone(&self.host)),
            self.config.clone(),
        );
        *last = Some(link.downgrade());
        Ok(link)
    }
}
