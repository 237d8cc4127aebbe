//! Worker configuration models.
//!
//! Configuration is an explicit value handed to constructors; nothing in the
//! crate reads process-wide mutable settings.
use serde::{Deserialize, Serialize};

use crate::core::context::LogLevel;

/// Which environment the worker runs in. Development lowers the default log
/// threshold to debug.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// Top-level worker configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Deployment version; doubles as the default cache key.
    pub version: String,
    /// Origin the worker serves, e.g. `https://www.example.com`. Routes are
    /// compiled against it and reject cross-origin requests.
    pub origin: String,
    /// Runtime environment; defaults to production.
    #[serde(default)]
    pub environment: Environment,
    /// Explicit log threshold; overrides the environment default.
    #[serde(default)]
    pub log_level: Option<LogLevel>,
}

impl WorkerConfig {
    pub fn new(version: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            origin: origin.into(),
            environment: Environment::default(),
            log_level: None,
        }
    }

    /// The threshold below which buffered request log entries are dropped.
    pub fn effective_log_level(&self) -> LogLevel {
        self.log_level.unwrap_or(match self.environment {
            Environment::Development => LogLevel::Debug,
            Environment::Production => LogLevel::Info,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_default_is_production() {
        let config = WorkerConfig::new("v1", "http://example.com");
        assert!(config.environment.is_production());
        assert_eq!(config.effective_log_level(), LogLevel::Info);
    }

    #[test]
    fn test_development_defaults_to_debug_logging() {
        let config = WorkerConfig {
            environment: Environment::Development,
            ..WorkerConfig::new("v1", "http://example.com")
        };
        assert_eq!(config.effective_log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_explicit_log_level_wins() {
        let config = WorkerConfig {
            log_level: Some(LogLevel::Error),
            environment: Environment::Development,
            ..WorkerConfig::new("v1", "http://example.com")
        };
        assert_eq!(config.effective_log_level(), LogLevel::Error);
    }
}
