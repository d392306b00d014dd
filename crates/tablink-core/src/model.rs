//! Model collaborator contract.
//!
//! The model turns editor text into a parsed tree. The link never looks inside
//! it: it only debounces calls to [`Model::update`], asks it to stop with
//! [`Model::interrupt`], watches [`Model::is_active`] and clears it with
//! [`Model::uncache`].

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by a model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// The running update was interrupted before finishing
    #[error("update interrupted")]
    Interrupted,

    /// The model failed for a model-specific reason
    #[error("{0}")]
    Failed(String),
}

impl ModelError {
    /// Create a model failure
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Trait for the parser/model driven by the link.
///
/// Implementations own their update process. `is_active` must reflect whether
/// that process is still running so a stop attempt can tell when it is done.
#[async_trait]
pub trait Model: Send + Sync + 'static {
    /// What one update produces (usually a [`ModelState`]).
    type Output: Send + 'static;

    /// Debounce window applied before each update.
    fn update_interval(&self) -> Duration;

    /// Whether an update process is currently running.
    fn is_active(&self) -> bool;

    /// Parse `text` into the model.
    async fn update(&self, text: String) -> Result<Self::Output, ModelError>;

    /// Ask the running update process to stop. Must not block.
    fn interrupt(&self);

    /// Drop any cached state.
    async fn uncache(&self) -> Result<(), ModelError>;
}

/// Snapshot of one model update.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModelState<T> {
    /// Text the previous update was computed from.
    pub old_text: String,
    /// Text this update was computed from.
    pub new_text: String,
    /// Tree produced from `new_text`.
    pub tree: T,
}

impl<T> ModelState<T> {
    pub fn new(old_text: impl Into<String>, new_text: impl Into<String>, tree: T) -> Self {
        Self {
            old_text: old_text.into(),
            new_text: new_text.into(),
            tree,
        }
    }

    /// Whether the text changed since the previous update
    pub fn changed(&self) -> bool {
        self.old_text != self.new_text
    }
}
