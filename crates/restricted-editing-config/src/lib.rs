use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid setting `{key}` in {config_path}: {reason}")]
    InvalidSetting {
        config_path: PathBuf,
        key: &'static str,
        reason: &'static str,
    },
}

/// `[restricted_editing]` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestrictedEditingSettings {
    /// Element name of exception zones in document markup
    pub element: String,
    /// Class that marks an element as an exception zone
    pub exception_class: String,
    /// Commands that stay enabled outside exception zones
    pub always_enabled: Vec<String>,
    pub highlight_priority: i32,
}

impl Default for RestrictedEditingSettings {
    fn default() -> Self {
        Self {
            element: "span".to_string(),
            exception_class: "exception-marker".to_string(),
            always_enabled: vec!["undo".to_string(), "redo".to_string()],
            highlight_priority: -10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    /// Document opened when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_path: Option<PathBuf>,
    #[serde(default)]
    pub restricted_editing: RestrictedEditingSettings,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        config.validate(config_path)?;

        // Expand shell variables and tilde in the loaded document path
        config.document_path = config
            .document_path
            .map(|path| Self::expand_path(&path).unwrap_or(path));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/restricted-editing");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    fn validate(&self, config_path: &Path) -> Result<(), ConfigError> {
        let invalid = |key, reason| ConfigError::InvalidSetting {
            config_path: config_path.to_path_buf(),
            key,
            reason,
        };
        let settings = &self.restricted_editing;

        if settings.element.trim().is_empty() {
            return Err(invalid("element", "must not be empty"));
        }
        if settings.exception_class.trim().is_empty() {
            return Err(invalid("exception_class", "must not be empty"));
        }
        if settings.exception_class.contains(char::is_whitespace) {
            return Err(invalid("exception_class", "must be a single class name"));
        }
        Ok(())
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
