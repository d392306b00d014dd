//! Tracing setup for applications embedding the link.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Output format of the installed subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Install a global tracing subscriber.
///
/// `RUST_LOG` is honoured; `default_directive` (e.g. `"tablink=info"`) is
/// added on top of it.
///
/// # Errors
///
/// Fails if the directive does not parse or a global subscriber is already set.
pub fn init_tracing(format: LogFormat, default_directive: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(default_directive.parse()?);

    match format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .try_init()?,
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .try_init()?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_only_once() {
        assert_eq!(LogFormat::default(), LogFormat::Text);

        init_tracing(LogFormat::Text, "tablink=debug").expect("first init");
        assert!(init_tracing(LogFormat::Json, "tablink=debug").is_err());
    }
}
