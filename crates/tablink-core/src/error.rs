//! Error types for tablink-core.

use std::fmt;

use thiserror::Error;

use crate::config::ConfigError;
use crate::model::ModelError;

/// Result type alias using tablink-core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the link and its collaborators.
///
/// `Clone` so one settled shutdown outcome can be read through every handle
/// that observes it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // Lifecycle errors
    #[error("Only one live link instance can exist at a time")]
    AlreadyExists,

    #[error("This link instance has been killed and cannot be used any longer")]
    Killed,

    // Shutdown errors
    #[error("Attempt to stop the current running update process timed out after {timeout_ms}ms")]
    StopTimedOut { timeout_ms: u64 },

    #[error("Stop attempt was superseded by a newer attempt")]
    Superseded,

    #[error("Could not uncache editor object model.\nReason:\n{reason}")]
    UnCache { reason: String },

    // Editor errors
    #[error("Editor widget not available: {0}")]
    EditorUnavailable(String),

    // Collaborator errors
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Link lock poisoned")]
    LockPoisoned,
}

impl Error {
    /// Wrap a teardown failure with the reason it happened
    pub fn uncache(reason: impl fmt::Display) -> Self {
        Self::UnCache {
            reason: reason.to_string(),
        }
    }

    /// Create a stop timeout error
    pub fn stop_timed_out(timeout_ms: u64) -> Self {
        Self::StopTimedOut { timeout_ms }
    }

    /// Check if this error is a lifecycle violation
    pub fn is_lifecycle(&self) -> bool {
        matches!(self, Self::AlreadyExists | Self::Killed)
    }

    /// Check if this error is a shutdown timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::StopTimedOut { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classes() {
        assert!(Error::AlreadyExists.is_lifecycle());
        assert!(Error::Killed.is_lifecycle());
        assert!(!Error::Superseded.is_lifecycle());

        let err = Error::stop_timed_out(2000);
        assert!(err.is_timeout());
        assert!(err.to_string().contains("2000"));
        assert!(!err.is_lifecycle());
    }

    #[test]
    fn test_uncache_keeps_reason() {
        let cause = Error::stop_timed_out(2000);
        let err = Error::uncache(&cause);

        let message = err.to_string();
        assert!(message.starts_with("Could not uncache"));
        assert!(message.contains(&cause.to_string()));
    }

    #[test]
    fn test_model_error_conversion() {
        let err: Error = ModelError::failed("parse failed").into();
        assert_eq!(err, Error::Model(ModelError::Failed("parse failed".into())));
        assert!(err.to_string().contains("parse failed"));
    }
}
