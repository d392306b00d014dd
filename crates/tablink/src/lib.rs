//! tablink - Editor-to-model update orchestration
//!
//! Owns the single live pipeline that turns editor text into a parsed model:
//!
//! - **registry**: guarded factory, at most one live orchestrator at a time
//! - **orchestrator**: live mode, debounced updates, teardown and kill
//! - **shutdown**: bounded, cancelable attempts to stop the model's update process
//! - **telemetry**: tracing subscriber setup for host applications
//!
//! ## Lifecycle
//!
//! ```text
//! [constructing] --(registry check passes)--> [alive, live]
//! [alive] --set_live(false)--> [alive, paused] --set_live(true)--> [alive, live]
//! [alive, *] --kill()--> [dead]      (terminal; every later call fails)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use tablink::{LinkConfig, Registry};
//!
//! async fn example(host: Arc<dyn EditorHost>, text: Arc<dyn EditorText>) -> tablink::Result<()> {
//!     let registry = Registry::new(LinkConfig::default(), host, text, MyModel::new)?;
//!     let link = registry.create().await?;
//!
//!     // Typing in the editor now drives debounced updates
//!     link.set_live(false)?;
//!     let state = link.update_state().await?;
//!
//!     link.uncache().await?;
//!     link.kill()?;
//!     Ok(())
//! }
//! ```

pub mod orchestrator;
pub mod registry;
pub mod shutdown;
pub mod telemetry;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use orchestrator::{LinkStatus, Orchestrator};
pub use registry::Registry;
pub use shutdown::KillHandle;
pub use telemetry::{LogFormat, init_tracing};
pub use tablink_core::{
    Cancelable, EditorHost, EditorSlot, EditorText, EditorWidget, Error, InputHandler,
    LinkConfig, Model, ModelError, ModelState, Result,
};
