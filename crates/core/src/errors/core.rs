use crate::config::ConfigError;
use thiserror::Error;

/// Core error type for the crudforge scaffolder
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Entity '{entity}' is not supported: entity classes without a primary key are not supported")]
    UnsupportedEntity { entity: String },

    #[error("Unable to resolve metadata for '{type_name}': {message}")]
    MetadataResolution { type_name: String, message: String },

    #[error("Target file already exists: {path}")]
    TargetAlreadyExists { path: String },

    #[error("Template error: {message}")]
    Template { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),
}

impl CoreError {
    /// Create an unsupported entity error
    pub fn unsupported_entity(entity: impl Into<String>) -> Self {
        Self::UnsupportedEntity {
            entity: entity.into(),
        }
    }

    /// Create a metadata resolution error
    pub fn metadata_resolution(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MetadataResolution {
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    /// Create a target already exists error
    pub fn target_already_exists(path: impl Into<String>) -> Self {
        Self::TargetAlreadyExists { path: path.into() }
    }

    /// Create a new template error
    pub fn template(message: impl Into<String>) -> Self {
        Self::Template {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn is_unsupported_entity(&self) -> bool {
        matches!(self, Self::UnsupportedEntity { .. })
    }

    pub fn is_metadata_resolution(&self) -> bool {
        matches!(self, Self::MetadataResolution { .. })
    }

    pub fn is_target_already_exists(&self) -> bool {
        matches!(self, Self::TargetAlreadyExists { .. })
    }

    /// Stable machine-readable code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "IO_ERROR",
            Self::Yaml(_) => "YAML_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::Toml(_) => "TOML_ERROR",
            Self::UnsupportedEntity { .. } => "UNSUPPORTED_ENTITY",
            Self::MetadataResolution { .. } => "METADATA_RESOLUTION",
            Self::TargetAlreadyExists { .. } => "TARGET_ALREADY_EXISTS",
            Self::Template { .. } => "TEMPLATE_ERROR",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }
}
