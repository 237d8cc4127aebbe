//! Worker configuration validation.
use url::Url;

/// Validation result type alias
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validation error types
#[derive(Debug, thiserror::Error, Clone)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid origin '{origin}': {reason}")]
    InvalidOrigin { origin: String, reason: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },
}

/// Worker configuration validator
pub struct WorkerConfigValidator;

impl WorkerConfigValidator {
    /// Validate the entire worker configuration, collecting every problem
    /// before reporting.
    pub fn validate(config: &crate::config::models::WorkerConfig) -> ValidationResult<()> {
        let mut errors = Vec::new();

        if config.version.trim().is_empty() {
            errors.push(ValidationError::MissingField {
                field: "version".to_string(),
            });
        }

        if let Err(e) = Self::validate_origin(&config.origin) {
            errors.push(e);
        }

        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(ValidationError::ValidationFailed {
                message: errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
            }),
        }
    }

    /// The origin must be an absolute URL with a host and nothing beyond the
    /// authority.
    pub fn validate_origin(origin: &str) -> ValidationResult<()> {
        if origin.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "origin".to_string(),
            });
        }

        let url = Url::parse(origin).map_err(|e| ValidationError::InvalidOrigin {
            origin: origin.to_string(),
            reason: e.to_string(),
        })?;

        if url.host_str().is_none() {
            return Err(ValidationError::InvalidOrigin {
                origin: origin.to_string(),
                reason: "origin must include a host".to_string(),
            });
        }

        if url.path() != "/" && !url.path().is_empty() {
            return Err(ValidationError::InvalidOrigin {
                origin: origin.to_string(),
                reason: "origin must not include a path".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::models::WorkerConfig;

    #[test]
    fn test_valid_config_passes() {
        let config = WorkerConfig::new("1.0.0", "https://www.example.com");
        assert!(WorkerConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn test_empty_version_is_rejected() {
        let config = WorkerConfig::new("", "https://www.example.com");
        assert!(matches!(
            WorkerConfigValidator::validate(&config),
            Err(ValidationError::MissingField { .. })
        ));
    }

    #[test]
    fn test_origin_with_path_is_rejected() {
        let config = WorkerConfig::new("1.0.0", "https://www.example.com/app");
        assert!(matches!(
            WorkerConfigValidator::validate(&config),
            Err(ValidationError::InvalidOrigin { .. })
        ));
    }

    #[test]
    fn test_multiple_problems_are_aggregated() {
        let config = WorkerConfig::new("", "not a url");
        let err = WorkerConfigValidator::validate(&config).unwrap_err();
        assert!(matches!(err, ValidationError::ValidationFailed { .. }));
        let message = err.to_string();
        assert!(message.contains("version"));
        assert!(message.contains("not a url"));
    }
}
