//! fontdock configuration lifecycle engine
//!
//! Loads the user-editable `config.toml`, validates it strictly against the
//! versioned schema, merges it over compiled-in defaults, and upgrades files
//! written by older releases with a backup taken first.
//!
//! # Architecture
//!
//! - **Strict validation**: the raw document is checked before decoding and
//!   every violation is reported at once
//! - **Presence-based merge**: only keys present in the file override defaults
//! - **Linear migrations**: one step per origin version, backup before the first
//!   transform, automatic restore when a step fails
//! - **Atomic writes**: config files are never left half written
//!
//! # Example
//!
//! ```rust,no_run
//! use fontdock_config::ConfigManager;
//!
//! let manager = ConfigManager::new().expect("Failed to resolve config location");
//! match manager.load() {
//!     Ok(config) => println!("Update channel: {}", config.update.channel),
//!     Err(e) => eprintln!("{}", e),
//! }
//! ```

mod aliases;
mod coerce;
mod error;
mod loader;
mod manager;
mod paths;
mod persistence;
mod section;
mod template;
mod validation;

pub mod backup;
pub mod migration;
pub mod units;

// Config sections
mod general_config;
mod logging_config;
mod network_config;
mod search_config;
mod theme_config;
mod update_config;

pub use aliases::{FieldLocation, FIELD_ALIASES};
pub use coerce::{coerce_bool, coerce_int};
pub use error::{ConfigError, ConfigResult, RestoreOutcome, ValidationError, ValidationErrors};
pub use loader::{decode_document, load_from_bytes, parse_document};
pub use manager::{ConfigManager, LoadOutcome, LoadReport};
pub use paths::ConfigPaths;
pub use persistence::ConfigPersistence;
pub use section::ConfigSection;
pub use template::DEFAULT_CONFIG_TEMPLATE;
pub use validation::validate_document;

pub use general_config::GeneralConfig;
pub use logging_config::LoggingConfig;
pub use network_config::{LimitsConfig, NetworkConfig};
pub use search_config::SearchConfig;
pub use theme_config::{ThemeConfig, ThemeMode};
pub use update_config::{UpdateChannel, UpdateConfig};

use serde::{Deserialize, Serialize};

/// Schema version written by this release
pub const CURRENT_CONFIG_VERSION: &str = "2.0";

/// Version assumed for files that carry no version tag
pub const OLDEST_CONFIG_VERSION: &str = "1.0";

/// Every version this release can read
pub const SUPPORTED_VERSIONS: &[&str] = &["1.0", "2.0"];

/// Backups retained next to the config file after a migration
pub const DEFAULT_MAX_BACKUPS: usize = 3;

/// File name of the config inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Root configuration structure
///
/// Field order matters for serialization: the version tag must precede the
/// tables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Schema version; empty in files written before versioning existed
    pub config_version: String,

    pub general: GeneralConfig,

    pub logging: LoggingConfig,

    pub network: NetworkConfig,

    /// Only present when read from a 1.0 file that still has `[limits]`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limits: Option<LimitsConfig>,

    pub search: SearchConfig,

    pub update: UpdateConfig,

    pub theme: ThemeConfig,
}

impl Config {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// The schema version this config is at, treating an empty tag as the oldest
    pub fn effective_version(&self) -> &str {
        if self.config_version.trim().is_empty() {
            OLDEST_CONFIG_VERSION
        } else {
            &self.config_version
        }
    }

    /// Validates the typed configuration with the same rules applied to files
    ///
    /// Returns all validation errors found across all sections.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let errors = match toml::Value::try_from(self) {
            Ok(toml::Value::Table(doc)) => validate_document(&doc),
            Ok(_) | Err(_) => {
                let mut errors = ValidationErrors::new();
                errors.push(ValidationError::new(
                    "config",
                    "could not be represented as a TOML document",
                ));
                errors
            }
        };

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_version: CURRENT_CONFIG_VERSION.to_string(),
            general: GeneralConfig::default(),
            logging: LoggingConfig::default(),
            network: NetworkConfig::default(),
            limits: None,
            search: SearchConfig::default(),
            update: UpdateConfig::default(),
            theme: ThemeConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_version_is_current() {
        let config = Config::default();
        assert_eq!(config.config_version, CURRENT_CONFIG_VERSION);
        assert_eq!(config.effective_version(), CURRENT_CONFIG_VERSION);
    }

    #[test]
    fn test_empty_version_is_oldest() {
        let config = Config {
            config_version: String::new(),
            ..Default::default()
        };
        assert_eq!(config.effective_version(), OLDEST_CONFIG_VERSION);
    }

    #[test]
    fn test_invalid_typed_config_reports_field() {
        let mut config = Config::default();
        config.logging.max_log_files = 0;
        config.update.check_interval_hours = 0;

        let errors = config.validate().expect_err("should be invalid");
        assert_eq!(errors.len(), 2);
        assert!(errors.contains_field("logging.max_log_files"));
        assert!(errors.contains_field("update.check_interval_hours"));
    }

    #[test]
    fn test_limits_not_serialized_when_absent() {
        let text = toml::to_string(&Config::default()).expect("serializes");
        assert!(!text.contains("[limits]"));
        assert!(text.starts_with("config_version = \"2.0\""));
    }
}
