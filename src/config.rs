//! Engine configuration, loaded from TOML with environment overrides.
//!
//! ```toml
//! public_group = "public"
//! registered_group = "registered"
//!
//! [storage]
//! type = "sled"
//! path = "/var/lib/access_lifecycle"
//!
//! [logging]
//! default_level = "INFO"
//! features = { embargo = "DEBUG" }
//! ```

use crate::constants::{DEFAULT_PUBLIC_GROUP, DEFAULT_REGISTERED_GROUP, DEFAULT_STORAGE_DIR};
use crate::error::{AccessError, AccessResult};
use crate::logging::config::parse_level;
use crate::logging::{LogConfig, LogFeature};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where records live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageConfig {
    /// Process-local maps, lost on exit
    Memory,
    /// A sled database at `path`
    Sled {
        #[serde(default = "default_storage_path")]
        path: PathBuf,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Memory
    }
}

/// Local data directory for sled, `./data` when the platform has none
pub fn default_storage_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join(DEFAULT_STORAGE_DIR))
        .unwrap_or_else(|| PathBuf::from("data"))
}

fn default_public_group() -> String {
    DEFAULT_PUBLIC_GROUP.to_string()
}

fn default_registered_group() -> String {
    DEFAULT_REGISTERED_GROUP.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    /// Group agent whose read grant makes a resource open
    #[serde(default = "default_public_group")]
    pub public_group: String,
    /// Group agent whose read grant makes a resource authenticated
    #[serde(default = "default_registered_group")]
    pub registered_group: String,
    #[serde(default)]
    pub logging: LogConfig,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            public_group: default_public_group(),
            registered_group: default_registered_group(),
            logging: LogConfig::default(),
        }
    }
}

impl AccessConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> AccessResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut config: AccessConfig = toml::from_str(&content)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply `ACCESS_LIFECYCLE_*` environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("ACCESS_LIFECYCLE_STORAGE_PATH") {
            self.storage = StorageConfig::Sled {
                path: PathBuf::from(path),
            };
        }
        if let Ok(group) = std::env::var("ACCESS_LIFECYCLE_PUBLIC_GROUP") {
            self.public_group = group;
        }
        if let Ok(group) = std::env::var("ACCESS_LIFECYCLE_REGISTERED_GROUP") {
            self.registered_group = group;
        }
        if let Ok(level) = std::env::var("ACCESS_LIFECYCLE_LOG_LEVEL") {
            self.logging.default_level = level;
        }
    }

    pub fn with_storage(mut self, storage: StorageConfig) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_sled_path<P: Into<PathBuf>>(self, path: P) -> Self {
        self.with_storage(StorageConfig::Sled { path: path.into() })
    }

    pub fn with_groups(mut self, public_group: &str, registered_group: &str) -> Self {
        self.public_group = public_group.to_string();
        self.registered_group = registered_group.to_string();
        self
    }

    pub fn with_logging(mut self, logging: LogConfig) -> Self {
        self.logging = logging;
        self
    }

    pub fn validate(&self) -> AccessResult<()> {
        if self.public_group.trim().is_empty() || self.registered_group.trim().is_empty() {
            return Err(AccessError::config("Group names cannot be empty"));
        }
        if self.public_group == self.registered_group {
            return Err(AccessError::config(format!(
                "public_group and registered_group must differ (both '{}')",
                self.public_group
            )));
        }
        if parse_level(&self.logging.default_level).is_none() {
            return Err(AccessError::config(format!(
                "Invalid log level: {}",
                self.logging.default_level
            )));
        }
        for (name, level) in &self.logging.features {
            if LogFeature::from_name(name).is_none() {
                return Err(AccessError::config(format!("Unknown log feature: {}", name)));
            }
            if parse_level(level).is_none() {
                return Err(AccessError::config(format!("Invalid log level: {}", level)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AccessConfig::default();
        assert_eq!(config.storage, StorageConfig::Memory);
        assert_eq!(config.public_group, "public");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let config: AccessConfig = toml::from_str(
            r#"
            public_group = "world"

            [storage]
            type = "sled"
            path = "/tmp/acl"

            [logging]
            default_level = "DEBUG"
            features = { embargo = "TRACE" }
            "#,
        )
        .unwrap();
        assert_eq!(config.public_group, "world");
        assert_eq!(config.registered_group, "registered");
        assert_eq!(
            config.storage,
            StorageConfig::Sled {
                path: PathBuf::from("/tmp/acl")
            }
        );
        assert_eq!(config.logging.features["embargo"], "TRACE");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sled_path_defaults() {
        let config: AccessConfig = toml::from_str("[storage]\ntype = \"sled\"\n").unwrap();
        assert_eq!(
            config.storage,
            StorageConfig::Sled {
                path: default_storage_path()
            }
        );
    }

    #[test]
    fn test_rejects_identical_groups() {
        let config = AccessConfig::default().with_groups("everyone", "everyone");
        assert!(matches!(config.validate(), Err(AccessError::Config(_))));
    }

    #[test]
    fn test_rejects_unknown_feature() {
        let mut config = AccessConfig::default();
        config
            .logging
            .features
            .insert("schema".to_string(), "DEBUG".to_string());
        assert!(matches!(config.validate(), Err(AccessError::Config(_))));
    }
}
