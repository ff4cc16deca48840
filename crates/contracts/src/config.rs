//! Contract process configuration.

use thiserror::Error;

use chainmetric_observability::{LogConfig, LogConfigError};

use crate::admin::AdminCapability;

pub const ADMIN_OPS_VAR: &str = "CHAINMETRIC_ADMIN_OPS";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: expected a boolean, found {value:?}")]
    InvalidFlag { var: &'static str, value: String },

    #[error(transparent)]
    Log(#[from] LogConfigError),
}

/// Settings read once at process start and shared by every contract.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractConfig {
    /// Enables `RemoveAll`. Off unless explicitly requested.
    pub admin_operations: bool,
    pub log: LogConfig,
}

impl ContractConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let admin_operations = match lookup(ADMIN_OPS_VAR) {
            Some(raw) => parse_flag(ADMIN_OPS_VAR, &raw)?,
            None => false,
        };

        Ok(Self {
            admin_operations,
            log: LogConfig::from_lookup(&lookup)?,
        })
    }

    pub fn admin_capability(&self) -> Option<AdminCapability> {
        self.admin_operations.then(AdminCapability::grant)
    }

    /// Installs the process-wide log subscriber described by `self.log`.
    pub fn init_logging(&self) {
        chainmetric_observability::init(&self.log);
    }
}

/// Process start-up: reads configuration from the environment and installs
/// logging. Hosts call this once before building any repository.
pub fn init_from_env() -> Result<ContractConfig, ConfigError> {
    let config = ContractConfig::from_env()?;
    config.init_logging();
    tracing::info!(
        admin_operations = config.admin_operations,
        log_format = ?config.log.format,
        "contract configuration loaded"
    );
    Ok(config)
}

fn parse_flag(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            var,
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainmetric_observability::LogFormat;

    fn lookup(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |var: &str| {
            pairs
                .iter()
                .find(|(k, _)| *k == var)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn admin_is_disabled_by_default() {
        let config = ContractConfig::from_lookup(lookup(&[])).unwrap();
        assert!(!config.admin_operations);
        assert!(config.admin_capability().is_none());
    }

    #[test]
    fn admin_flag_grants_capability() {
        let config = ContractConfig::from_lookup(lookup(&[(ADMIN_OPS_VAR, "true")])).unwrap();
        assert!(config.admin_capability().is_some());
    }

    #[test]
    fn reads_log_format() {
        let config =
            ContractConfig::from_lookup(lookup(&[("CHAINMETRIC_LOG_FORMAT", "pretty")])).unwrap();
        assert_eq!(config.log.format, LogFormat::Pretty);
    }

    #[test]
    fn init_logging_is_repeatable() {
        let config =
            ContractConfig::from_lookup(lookup(&[("CHAINMETRIC_LOG_FORMAT", "pretty")])).unwrap();
        config.init_logging();
        config.init_logging();
        tracing::info!("logging installed");
    }

    #[test]
    fn rejects_garbage_flag() {
        let err = ContractConfig::from_lookup(lookup(&[(ADMIN_OPS_VAR, "maybe")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFlag { .. }));
    }
}
