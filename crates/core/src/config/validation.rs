use std::path::Path;
use thiserror::Error;

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for field '{field}': '{value}'. Expected: {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    #[error("Environment variable error: {message}")]
    EnvironmentError { message: String },

    #[error("Parsing error in {path}: {message}")]
    ParsingError { path: String, message: String },
}

impl ConfigError {
    /// Create an invalid value error
    pub fn invalid_value(
        field: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }

    /// Create an environment error
    pub fn environment_error(message: impl Into<String>) -> Self {
        Self::EnvironmentError {
            message: message.into(),
        }
    }

    /// Create a parsing error for a configuration file
    pub fn parsing_error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParsingError {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Trait for validating configuration values
pub trait ConfigValidator<T: ?Sized> {
    /// Validate a configuration value
    fn validate(&self, field: &str, value: &T) -> Result<(), ConfigError>;
}

/// Accepts non-empty paths relative to the project root
pub struct RelativeDirValidator;

impl ConfigValidator<str> for RelativeDirValidator {
    fn validate(&self, field: &str, value: &str) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                field,
                value,
                "non-empty directory relative to the project root",
            ));
        }

        if Path::new(value).is_absolute() {
            return Err(ConfigError::invalid_value(
                field,
                value,
                "directory relative to the project root",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_dir_validator() {
        let validator = RelativeDirValidator;

        assert!(validator.validate("views_dir", "templates").is_ok());
        assert!(validator.validate("views_dir", "src/views").is_ok());
        assert!(validator.validate("views_dir", "").is_err());
        assert!(validator.validate("views_dir", "   ").is_err());
        assert!(validator.validate("views_dir", "/etc/templates").is_err());
    }

    #[test]
    fn test_invalid_value_message() {
        let error = RelativeDirValidator.validate("tests_dir", "").unwrap_err();
        assert!(error.to_string().contains("'tests_dir'"));
    }
}
