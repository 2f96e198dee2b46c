//! Compiler configuration
//!
//! Loaded from a JSON file; every field has a default, so `{}` is a valid
//! configuration.
//!
//! ```json
//! {
//!   "wire": { "filter": "$filter", "order": "$orderby", "skip": "$skip", "top": "$top" },
//!   "log_level": "INFO"
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::{log_event_with_fields, Event, Logger, Severity};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Io { .. } => "WQ_CONFIG_IO",
            ConfigError::Parse(_) | ConfigError::Invalid(_) => "WQ_CONFIG_INVALID",
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Names of the query parameters a plan is rendered into
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireParameterNames {
    /// Filter string parameter (default: "filter")
    #[serde(default = "default_filter")]
    pub filter: String,

    /// Ordering parameter (default: "order")
    #[serde(default = "default_order")]
    pub order: String,

    /// Row offset parameter (default: "skip")
    #[serde(default = "default_skip")]
    pub skip: String,

    /// Row limit parameter (default: "top")
    #[serde(default = "default_top")]
    pub top: String,
}

fn default_filter() -> String {
    "filter".to_string()
}

fn default_order() -> String {
    "order".to_string()
}

fn default_skip() -> String {
    "skip".to_string()
}

fn default_top() -> String {
    "top".to_string()
}

impl Default for WireParameterNames {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            order: default_order(),
            skip: default_skip(),
            top: default_top(),
        }
    }
}

impl WireParameterNames {
    fn validate(&self) -> ConfigResult<()> {
        let names = [&self.filter, &self.order, &self.skip, &self.top];
        for (i, name) in names.iter().enumerate() {
            if name.is_empty() {
                return Err(ConfigError::Invalid("wire parameter names must not be empty".into()));
            }
            if names[..i].contains(name) {
                return Err(ConfigError::Invalid(format!("wire parameter name '{}' is used twice", name)));
            }
        }
        Ok(())
    }
}

/// Compiler configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilerConfig {
    #[serde(default)]
    pub wire: WireParameterNames,

    /// Minimum log severity (default: WARN)
    #[serde(default = "default_log_level")]
    pub log_level: Severity,
}

fn default_log_level() -> Severity {
    Severity::Warn
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            wire: WireParameterNames::default(),
            log_level: default_log_level(),
        }
    }
}

impl CompilerConfig {
    /// Parses and validates a JSON configuration
    pub fn from_json(text: &str) -> ConfigResult<Self> {
        let config: CompilerConfig = serde_json::from_str(text)?;
        config.wire.validate()?;
        Ok(config)
    }

    /// Loads a configuration file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json(&text)?;
        log_event_with_fields(
            Event::ConfigLoaded,
            &[
                ("log_level", config.log_level.as_str()),
                ("path", path.display().to_string().as_str()),
            ],
        );
        Ok(config)
    }

    /// Applies process-wide settings
    pub fn apply(&self) {
        Logger::set_min_severity(self.log_level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CompilerConfig::default();
        assert_eq!(config.wire.filter, "filter");
        assert_eq!(config.wire.top, "top");
        assert_eq!(config.log_level, Severity::Warn);
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        assert_eq!(CompilerConfig::from_json("{}").unwrap(), CompilerConfig::default());
    }

    #[test]
    fn test_partial_wire_names() {
        let config = CompilerConfig::from_json(r#"{"wire": {"filter": "$filter"}, "log_level": "TRACE"}"#).unwrap();
        assert_eq!(config.wire.filter, "$filter");
        assert_eq!(config.wire.order, "order");
        assert_eq!(config.log_level, Severity::Trace);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = CompilerConfig::from_json(r#"{"wire": {"skip": "top"}}"#).unwrap_err();
        assert_eq!(err.code(), "WQ_CONFIG_INVALID");
        let err = CompilerConfig::from_json(r#"{"wire": {"order": ""}}"#).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_malformed_json() {
        let err = CompilerConfig::from_json("{").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
