//! Logging bootstrap.
//!
//! The beanbox crates only emit `tracing` events. Applications that do not
//! install their own subscriber can call [`init`] once at startup.

use serde::Deserialize;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Single line, abbreviated fields.
    #[default]
    Compact,
    /// Single line with every field.
    Full,
    /// Multi-line, for local development.
    Pretty,
}

/// Subscriber settings, usually read from the `[logging]` table of the
/// application config.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogSettings {
    /// `EnvFilter` directives, e.g. `"info,beanbox_container=debug"`.
    /// `RUST_LOG` wins when it is set.
    pub filter: String,
    pub format: LogFormat,
    pub with_target: bool,
    pub with_thread_names: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::Compact,
            with_target: false,
            with_thread_names: false,
        }
    }
}

/// Errors raised while installing the global subscriber.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Invalid log filter {filter:?}: {source}")]
    InvalidFilter {
        filter: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("Failed to install tracing subscriber: {0}")]
    Install(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Builds the filter: `RUST_LOG` if present and valid, otherwise the
/// configured directives.
pub fn env_filter(settings: &LogSettings) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&settings.filter).map_err(|source| LoggingError::InvalidFilter {
        filter: settings.filter.clone(),
        source,
    })
}

/// Installs a global `fmt` subscriber.
///
/// # Errors
/// [`LoggingError::Install`] if a global subscriber is already set.
pub fn init(settings: &LogSettings) -> Result<(), LoggingError> {
    let filter = env_filter(settings)?;
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(settings.with_target)
        .with_thread_names(settings.with_thread_names);

    let installed = match settings.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Full => builder.try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };

    installed.map_err(LoggingError::Install)?;
    announce(settings);
    Ok(())
}

fn announce(settings: &LogSettings) {
    debug!(filter = %settings.filter, format = ?settings.format, "Tracing subscriber installed");
}
