//! # Logging
//!
//! The engine logs through the `log` facade under per-feature targets (see
//! [`features::LogFeature`]). Embedding applications may install any logger;
//! [`LoggingSystem`] wires up `env_logger` from a [`LogConfig`] for those that
//! do not have one.

pub mod config;
pub mod features;

pub use config::LogConfig;
pub use features::LogFeature;

use once_cell::sync::OnceCell;

/// Configuration the process logger was initialised with
static LOGGING_CONFIG: OnceCell<LogConfig> = OnceCell::new();

pub struct LoggingSystem;

impl LoggingSystem {
    /// Initialize logging with the default configuration
    pub fn init_default() -> Result<(), LoggingError> {
        Self::init(&LogConfig::default())
    }

    /// Install an `env_logger` backend honouring the default and
    /// per-feature levels. `RUST_LOG` still takes effect on top.
    pub fn init(config: &LogConfig) -> Result<(), LoggingError> {
        let default_level = config::parse_level(&config.default_level).ok_or_else(|| {
            LoggingError::Config(format!("Invalid log level: {}", config.default_level))
        })?;

        let mut builder = env_logger::Builder::new();
        builder.filter_level(default_level);

        for (name, level) in &config.features {
            let feature = LogFeature::from_name(name)
                .ok_or_else(|| LoggingError::Config(format!("Unknown log feature: {}", name)))?;
            let level = config::parse_level(level)
                .ok_or_else(|| LoggingError::Config(format!("Invalid log level: {}", level)))?;
            builder.filter_module(feature.target(), level);
        }

        if let Ok(filters) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filters);
        }

        builder
            .try_init()
            .map_err(|_| LoggingError::AlreadyInitialized)?;
        LOGGING_CONFIG
            .set(config.clone())
            .map_err(|_| LoggingError::AlreadyInitialized)?;

        log::info!("Logging initialised at {}", config.default_level);
        Ok(())
    }

    /// Get the configuration logging was initialised with. `None` when
    /// another logger was installed first.
    pub fn current_config() -> Option<&'static LogConfig> {
        LOGGING_CONFIG.get()
    }
}

/// Logging system errors
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Logging system already initialized")]
    AlreadyInitialized,
    #[error("Configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_unknown_feature() {
        let mut config = LogConfig::default();
        config
            .features
            .insert("transform".to_string(), "DEBUG".to_string());
        assert!(matches!(
            LoggingSystem::init(&config),
            Err(LoggingError::Config(_))
        ));
    }

    #[test]
    fn test_rejects_bad_level() {
        let config = LogConfig {
            default_level: "LOUD".to_string(),
            ..LogConfig::default()
        };
        assert!(matches!(
            LoggingSystem::init(&config),
            Err(LoggingError::Config(_))
        ));
    }
}
