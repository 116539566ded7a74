use crate::config::{ConfigError, ConfigValidator, RelativeDirValidator};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::Path;

/// Name of the project-level configuration file
pub const CONFIG_FILE_NAME: &str = "crudforge.toml";

/// How the generated routes are declared
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutingFormat {
    #[default]
    Yaml,
    Toml,
    Json,
    /// Routes live on the controller itself, no routing file is written
    Attribute,
}

impl RoutingFormat {
    /// Parse a format selector, falling back to the default for unknown values
    pub fn parse_or_default(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "yml" | "yaml" => RoutingFormat::Yaml,
            "toml" => RoutingFormat::Toml,
            "json" => RoutingFormat::Json,
            "attribute" | "annotation" => RoutingFormat::Attribute,
            _ => RoutingFormat::default(),
        }
    }

    /// File extension of the routing file, `None` when routes are inline
    pub fn extension(self) -> Option<&'static str> {
        match self {
            RoutingFormat::Yaml => Some("yaml"),
            RoutingFormat::Toml => Some("toml"),
            RoutingFormat::Json => Some("json"),
            RoutingFormat::Attribute => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RoutingFormat::Yaml => "yaml",
            RoutingFormat::Toml => "toml",
            RoutingFormat::Json => "json",
            RoutingFormat::Attribute => "attribute",
        }
    }
}

impl fmt::Display for RoutingFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Project-level generator configuration, read from `crudforge.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub metadata_dir: String,
    pub controllers_dir: String,
    pub views_dir: String,
    pub tests_dir: String,
    pub routing_dir: String,
    pub format: String,
    pub log_level: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            metadata_dir: "metadata".to_string(),
            controllers_dir: "src/controllers".to_string(),
            views_dir: "templates".to_string(),
            tests_dir: "tests/controllers".to_string(),
            routing_dir: "config/routing".to_string(),
            format: RoutingFormat::default().to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Load configuration for a project: file (if present), then environment overrides
    pub fn load(project_root: &Path) -> Result<Self, ConfigError> {
        let path = project_root.join(CONFIG_FILE_NAME);

        let mut config = if path.is_file() {
            let content = fs::read_to_string(&path).map_err(|e| {
                ConfigError::parsing_error(path.display().to_string(), e.to_string())
            })?;
            tracing::debug!("Loading generator configuration from {}", path.display());
            Self::from_toml(&content)
                .map_err(|e| ConfigError::parsing_error(path.display().to_string(), e.to_string()))?
        } else {
            Self::default()
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Apply `CRUDFORGE_*` environment variables on top of the loaded values
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(format) = read_env("CRUDFORGE_FORMAT")? {
            self.format = format;
        }
        if let Some(metadata_dir) = read_env("CRUDFORGE_METADATA_DIR")? {
            self.metadata_dir = metadata_dir;
        }
        if let Some(log_level) = read_env("CRUDFORGE_LOG")? {
            self.log_level = log_level;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let validator = RelativeDirValidator;
        validator.validate("metadata_dir", &self.metadata_dir)?;
        validator.validate("controllers_dir", &self.controllers_dir)?;
        validator.validate("views_dir", &self.views_dir)?;
        validator.validate("tests_dir", &self.tests_dir)?;
        validator.validate("routing_dir", &self.routing_dir)?;
        Ok(())
    }

    /// Configured routing format; unknown values fall back to the default
    pub fn routing_format(&self) -> RoutingFormat {
        RoutingFormat::parse_or_default(&self.format)
    }
}

fn read_env(name: &str) -> Result<Option<String>, ConfigError> {
    match env::var(name) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(ConfigError::environment_error(format!(
            "{} contains invalid unicode",
            name
        ))),
    }
}
