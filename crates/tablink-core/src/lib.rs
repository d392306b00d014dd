//! tablink-core - Collaborator contracts for the editor-to-model link
//!
//! This crate holds everything the update orchestrator talks to but does not own:
//!
//! - **model**: the parser/model contract driven by the link
//! - **editor**: editor text accessor, widget input hook and widget lookup
//! - **cancel**: cancelable asynchronous handles
//! - **config**: link timing configuration
//! - **error**: shared error taxonomy
//!
//! Enable the `testing` feature for in-memory collaborators usable in tests.

pub mod cancel;
pub mod config;
pub mod editor;
pub mod error;
pub mod model;

#[cfg(feature = "testing")]
pub mod testing;

// Re-export commonly used types
pub use cancel::Cancelable;
pub use config::{ConfigError, LinkConfig};
pub use editor::{EditorHost, EditorSlot, EditorText, EditorWidget, InputHandler};
pub use error::{Error, Result};
pub use model::{Model, ModelError, ModelState};
