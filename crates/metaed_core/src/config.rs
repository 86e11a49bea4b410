//! Editor session configuration.
//!
//! # Responsibility
//! - Describe tunables of one editor session (status delay, defaults).
//! - Load them from JSON with every field optional.
//!
//! # Invariants
//! - A config accepted by `validate()` never makes session setup fail.

use crate::logging::{default_log_level, normalize_level};
use crate::model::element::is_primitive_type;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Session tunables. Missing JSON fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Delay before a non-error status message clears.
    pub status_clear_delay_ms: u64,
    /// Primitive type given to new Attributes and Parameters.
    pub default_attribute_type: String,
    pub log_level: String,
    pub log_dir: Option<String>,
    /// Expand every node after a full render, not just the root.
    pub expand_on_render: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            status_clear_delay_ms: 3000,
            default_attribute_type: "EString".to_string(),
            log_level: default_log_level().to_string(),
            log_dir: None,
            expand_on_render: false,
        }
    }
}

impl EditorConfig {
    /// Parses and validates a JSON config document.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.status_clear_delay_ms == 0 {
            return Err(ConfigError::ZeroStatusDelay);
        }
        let default_type = self.default_attribute_type.trim();
        if default_type.is_empty() {
            return Err(ConfigError::EmptyDefaultType);
        }
        if !is_primitive_type(default_type) {
            return Err(ConfigError::UnknownPrimitiveType(default_type.to_string()));
        }
        normalize_level(&self.log_level).map_err(ConfigError::InvalidLogLevel)?;
        Ok(())
    }

    pub fn status_clear_delay(&self) -> Duration {
        Duration::from_millis(self.status_clear_delay_ms)
    }
}

/// Errors from config loading and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// JSON text is malformed or has wrong field types.
    Parse(String),
    ZeroStatusDelay,
    EmptyDefaultType,
    UnknownPrimitiveType(String),
    InvalidLogLevel(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(message) => write!(f, "invalid editor config: {message}"),
            Self::ZeroStatusDelay => write!(f, "status_clear_delay_ms must be positive"),
            Self::EmptyDefaultType => write!(f, "default_attribute_type cannot be empty"),
            Self::UnknownPrimitiveType(name) => {
                write!(f, "default_attribute_type `{name}` is not a primitive type")
            }
            Self::InvalidLogLevel(message) => write!(f, "{message}"),
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::{ConfigError, EditorConfig};

    #[test]
    fn empty_object_uses_defaults() {
        let config = EditorConfig::from_json_str("{}").expect("empty config should load");
        assert_eq!(config.status_clear_delay_ms, 3000);
        assert_eq!(config.default_attribute_type, "EString");
        assert!(!config.expand_on_render);
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn partial_object_overrides_fields() {
        let config = EditorConfig::from_json_str(
            r#"{"default_attribute_type": "EInt", "expand_on_render": true}"#,
        )
        .expect("partial config should load");
        assert_eq!(config.default_attribute_type, "EInt");
        assert!(config.expand_on_render);
        assert_eq!(config.status_clear_delay_ms, 3000);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let zero = EditorConfig {
            status_clear_delay_ms: 0,
            ..EditorConfig::default()
        };
        assert_eq!(zero.validate(), Err(ConfigError::ZeroStatusDelay));

        let untyped = EditorConfig {
            default_attribute_type: "  ".to_string(),
            ..EditorConfig::default()
        };
        assert_eq!(untyped.validate(), Err(ConfigError::EmptyDefaultType));

        let loud = EditorConfig {
            log_level: "verbose".to_string(),
            ..EditorConfig::default()
        };
        assert!(matches!(loud.validate(), Err(ConfigError::InvalidLogLevel(_))));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let error = EditorConfig::from_json_str("{\"status_clear_delay_ms\": \"soon\"}")
            .expect_err("wrong field type should fail");
        assert!(matches!(error, ConfigError::Parse(_)));
    }
}
