use serde::Deserialize;
use std::collections::HashMap;

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServiceConfig {
    #[serde(default)]
    pub settings: SettingsConfig,
    /// Application properties, the `applicationConfig` layer of the environment
    #[serde(default)]
    pub properties: HashMap<String, PropertyValue>,
}

/// ================================
/// Global service-wide settings
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SettingsConfig {
    pub logging: Option<LoggingConfig>,
    /// overrides `<home>/.wavefront_token`
    pub cache_path: Option<String>,
}

/// Scalar property value as written in YAML
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum PropertyValue {
    Text(String),
    Bool(bool),
    Number(serde_yaml::Number),
}

impl PropertyValue {
    pub fn as_string(&self) -> String {
        match self {
            PropertyValue::Text(value) => value.to_owned(),
            PropertyValue::Bool(value) => value.to_string(),
            PropertyValue::Number(value) => value.to_string(),
        }
    }
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String, // allowed: trace, debug, info, warn, error
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new (level: String, format: LogFormat) -> Self {
        Self { level: level, format: format }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), format: LogFormat::Compact }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Compact,
}
