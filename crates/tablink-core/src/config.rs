//! Link configuration.
//!
//! Configuration is loaded with precedence:
//! 1. Config file (`$TABLINK_CONFIG`, else `~/.tablink/config.toml`)
//! 2. Default values

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timing and wiring options for the link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Id the editor widget is looked up by (default: "editor")
    #[serde(default = "default_editor_id")]
    pub editor_id: String,

    /// How long a stop attempt waits for the model to go idle, in ms (default: 2000)
    #[serde(default = "default_process_kill_timeout")]
    pub process_kill_timeout_ms: u64,

    /// Delay between activity checks while stopping, in ms (default: 10)
    #[serde(default = "default_kill_poll_interval")]
    pub kill_poll_interval_ms: u64,

    /// Whether new instances start in live mode (default: true)
    #[serde(default = "default_true")]
    pub live: bool,
}

fn default_editor_id() -> String {
    "editor".to_string()
}

fn default_process_kill_timeout() -> u64 {
    2000
}

fn default_kill_poll_interval() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            editor_id: default_editor_id(),
            process_kill_timeout_ms: default_process_kill_timeout(),
            kill_poll_interval_ms: default_kill_poll_interval(),
            live: default_true(),
        }
    }
}

impl LinkConfig {
    /// Set the editor widget id
    pub fn with_editor_id(mut self, editor_id: impl Into<String>) -> Self {
        self.editor_id = editor_id.into();
        self
    }

    /// Set the stop timeout
    pub fn with_process_kill_timeout(mut self, timeout: Duration) -> Self {
        self.process_kill_timeout_ms = duration_ms(timeout);
        self
    }

    /// Set the delay between activity checks while stopping
    pub fn with_kill_poll_interval(mut self, interval: Duration) -> Self {
        self.kill_poll_interval_ms = duration_ms(interval);
        self
    }

    /// Set the initial live mode
    pub fn with_live(mut self, live: bool) -> Self {
        self.live = live;
        self
    }

    pub fn process_kill_timeout(&self) -> Duration {
        Duration::from_millis(self.process_kill_timeout_ms)
    }

    pub fn kill_poll_interval(&self) -> Duration {
        Duration::from_millis(self.kill_poll_interval_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.editor_id.trim().is_empty() {
            return Err(ConfigError::invalid("editor_id", "must not be empty"));
        }

        if self.process_kill_timeout_ms == 0 {
            return Err(ConfigError::invalid(
                "process_kill_timeout_ms",
                "must be greater than 0",
            ));
        }

        if self.kill_poll_interval_ms == 0 {
            return Err(ConfigError::invalid(
                "kill_poll_interval_ms",
                "must be greater than 0",
            ));
        }

        if self.kill_poll_interval_ms > self.process_kill_timeout_ms {
            return Err(ConfigError::invalid(
                "kill_poll_interval_ms",
                "must not exceed process_kill_timeout_ms",
            ));
        }

        Ok(())
    }

    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `path`, or defaults if the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Load configuration from [`config_path`](Self::config_path).
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load(&Self::config_path())
    }

    /// Get the config file path.
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("TABLINK_CONFIG") {
            PathBuf::from(path)
        } else {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".tablink")
                .join("config.toml")
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl ConfigError {
    fn invalid(field: &str, message: &str) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = LinkConfig::default();
        assert_eq!(config.editor_id, "editor");
        assert_eq!(config.process_kill_timeout(), Duration::from_millis(2000));
        assert_eq!(config.kill_poll_interval(), Duration::from_millis(10));
        assert!(config.live);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = LinkConfig::default()
            .with_editor_id("source")
            .with_process_kill_timeout(Duration::from_secs(5))
            .with_kill_poll_interval(Duration::from_millis(25))
            .with_live(false);

        assert_eq!(config.editor_id, "source");
        assert_eq!(config.process_kill_timeout_ms, 5000);
        assert_eq!(config.kill_poll_interval_ms, 25);
        assert!(!config.live);
    }

    #[test]
    fn test_config_validation() {
        let mut config = LinkConfig::default();
        config.editor_id = "  ".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "editor_id"
        ));

        let config = LinkConfig::default().with_process_kill_timeout(Duration::ZERO);
        assert!(config.validate().is_err());

        let config = LinkConfig::default().with_kill_poll_interval(Duration::ZERO);
        assert!(config.validate().is_err());

        let config = LinkConfig::default()
            .with_process_kill_timeout(Duration::from_millis(50))
            .with_kill_poll_interval(Duration::from_millis(100));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = LinkConfig::from_toml_str("process_kill_timeout_ms = 500\n").unwrap();
        assert_eq!(config.process_kill_timeout_ms, 500);
        assert_eq!(config.editor_id, "editor");
        assert_eq!(config.kill_poll_interval_ms, 10);
        assert!(config.live);
    }

    #[test]
    fn test_invalid_toml() {
        let err = LinkConfig::from_toml_str("live = \"yes\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        let err = LinkConfig::from_toml_str("kill_poll_interval_ms = 0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let temp = tempdir().expect("Failed to create temp dir");
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "editor_id = \"code\"\nlive = false\n").unwrap();

        let config = LinkConfig::load(&path).expect("Failed to load config");
        assert_eq!(config.editor_id, "code");
        assert!(!config.live);
        assert_eq!(config.process_kill_timeout_ms, 2000);
    }

    #[test]
    fn test_load_nonexistent() {
        let temp = tempdir().expect("Failed to create temp dir");

        let config = LinkConfig::load(&temp.path().join("missing.toml"))
            .expect("Failed to load default config");
        assert_eq!(config, LinkConfig::default());
    }
}
