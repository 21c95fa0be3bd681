//! Log file configuration section

use crate::coerce;
use crate::section::{overlay_present, ConfigSection};
use crate::units;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use toml::Table;

const DEFAULT_MAX_LOG_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Where the application log goes and how it rotates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log file location; `$home` and `~` are expanded on use
    pub log_path: String,

    /// Rotate once the file reaches this size (e.g. "10MB")
    pub max_log_size: String,

    /// Number of rotated files to keep
    #[serde(deserialize_with = "coerce::deserialize_u32")]
    pub max_log_files: u32,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_path: "$home/.fontdock/logs/fontdock.log".to_string(),
            max_log_size: "10MB".to_string(),
            max_log_files: 5,
        }
    }
}

impl LoggingConfig {
    /// Rotation size in bytes, 10MB if the stored value does not parse
    pub fn max_log_size_bytes(&self) -> u64 {
        units::parse_size(&self.max_log_size)
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_MAX_LOG_SIZE_BYTES)
    }

    /// The log path with home-directory placeholders expanded
    pub fn resolved_log_path(&self, home: &Path) -> PathBuf {
        units::expand_home(&self.log_path, home)
    }
}

impl ConfigSection for LoggingConfig {
    const NAME: &'static str = "logging";

    fn overlay(&mut self, decoded: Self, present: &Table) {
        overlay_present!(self, decoded, present; log_path, max_log_size, max_log_files);
    }
}
