//! Tracing/logging initialization.
//!
//! Contracts never hold a logger; they emit through `tracing` inside the span
//! their owner hands them. This module only decides where those records go.

use std::str::FromStr;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

pub const LOG_FORMAT_VAR: &str = "CHAINMETRIC_LOG_FORMAT";

/// Output encoding for log records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LogConfigError {
    #[error("unsupported log format {0:?} (expected \"json\" or \"pretty\")")]
    UnsupportedFormat(String),
}

impl FromStr for LogFormat {
    type Err = LogConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" | "text" => Ok(Self::Pretty),
            other => Err(LogConfigError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Where and how log records are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// `EnvFilter` directives; `RUST_LOG` wins when set.
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::Json,
        }
    }
}

impl LogConfig {
    /// Reads `CHAINMETRIC_LOG_FORMAT`; the filter defaults to `info`.
    pub fn from_env() -> Result<Self, LogConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`LogConfig::from_env`] with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LogConfigError> {
        let format = match lookup(LOG_FORMAT_VAR) {
            Some(raw) if !raw.trim().is_empty() => raw.parse()?,
            _ => LogFormat::default(),
        };

        Ok(Self {
            format,
            ..Self::default()
        })
    }
}

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.filter));

    let _ = match config.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_timer(tracing_subscriber::fmt::time::SystemTime)
            .with_target(false)
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_defaults_to_json() {
        let config = LogConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, LogConfig::default());
    }

    #[test]
    fn format_is_case_insensitive() {
        let config = LogConfig::from_lookup(|_| Some("Pretty".to_string())).unwrap();
        assert_eq!(config.format, LogFormat::Pretty);
    }

    #[test]
    fn unknown_format_is_rejected() {
        let err = LogConfig::from_lookup(|_| Some("xml".to_string())).unwrap_err();
        assert_eq!(err, LogConfigError::UnsupportedFormat("xml".to_string()));
    }

    #[test]
    fn init_twice_is_a_no_op() {
        init(&LogConfig::default());
        init(&LogConfig::default());
    }
}
