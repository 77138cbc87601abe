//! Configuration for the logging system

use super::features::LogFeature;
use crate::constants::DEFAULT_LOG_LEVEL;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Logging configuration, usually embedded in `AccessConfig` as `[logging]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default log level for all modules
    #[serde(default = "default_level")]
    pub default_level: String,
    /// Feature-specific log levels, keyed by `LogFeature::name`
    #[serde(default)]
    pub features: HashMap<String, String>,
}

fn default_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_level: default_level(),
            features: HashMap::new(),
        }
    }
}

impl LogConfig {
    /// Set the level for a single feature
    pub fn with_feature_level(mut self, feature: LogFeature, level: &str) -> Self {
        self.features
            .insert(feature.name().to_string(), level.to_string());
        self
    }
}

/// Parse a level name the way the configuration files spell it
pub fn parse_level(level: &str) -> Option<log::LevelFilter> {
    match level.to_ascii_uppercase().as_str() {
        "TRACE" => Some(log::LevelFilter::Trace),
        "DEBUG" => Some(log::LevelFilter::Debug),
        "INFO" => Some(log::LevelFilter::Info),
        "WARN" => Some(log::LevelFilter::Warn),
        "ERROR" => Some(log::LevelFilter::Error),
        "OFF" => Some(log::LevelFilter::Off),
        _ => None,
    }
}
