//! Network timeouts and the deprecated size limits section

use crate::section::{overlay_present, ConfigSection};
use crate::units;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use toml::Table;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP timeouts used by source sync and downloads
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NetworkConfig {
    /// Timeout for quick requests and checks (e.g. "10s")
    pub request_timeout: String,

    /// Cancel a download if no data arrives for this long
    pub download_timeout: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            request_timeout: "10s".to_string(),
            download_timeout: "30s".to_string(),
        }
    }
}

impl NetworkConfig {
    pub fn request_timeout(&self) -> Duration {
        units::parse_duration(&self.request_timeout).unwrap_or(DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn download_timeout(&self) -> Duration {
        units::parse_duration(&self.download_timeout).unwrap_or(DEFAULT_DOWNLOAD_TIMEOUT)
    }
}

impl ConfigSection for NetworkConfig {
    const NAME: &'static str = "network";

    fn overlay(&mut self, decoded: Self, present: &Table) {
        overlay_present!(self, decoded, present; request_timeout, download_timeout);
    }
}

const DEFAULT_MAX_SOURCE_FILE_SIZE: u64 = 50 * 1024 * 1024;
const DEFAULT_FILE_COPY_BUFFER_SIZE: u64 = 32 * 1024;

/// Size limits from schema 1.0
///
/// Only ever populated from files written by 1.0 releases; the 1.0 → 2.0
/// migration drops it and it is never written by current releases.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_source_file_size: String,
    pub file_copy_buffer_size: String,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_source_file_size: "50MB".to_string(),
            file_copy_buffer_size: "32KB".to_string(),
        }
    }
}

impl LimitsConfig {
    pub fn max_source_file_size_bytes(&self) -> u64 {
        units::parse_size(&self.max_source_file_size).unwrap_or(DEFAULT_MAX_SOURCE_FILE_SIZE)
    }

    pub fn file_copy_buffer_size_bytes(&self) -> u64 {
        units::parse_size(&self.file_copy_buffer_size).unwrap_or(DEFAULT_FILE_COPY_BUFFER_SIZE)
    }
}

impl ConfigSection for LimitsConfig {
    const NAME: &'static str = "limits";

    fn overlay(&mut self, decoded: Self, present: &Table) {
        overlay_present!(self, decoded, present; max_source_file_size, file_copy_buffer_size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeouts_parse() {
        let config = NetworkConfig {
            request_timeout: "5s".to_string(),
            download_timeout: "2m".to_string(),
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.download_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_unparseable_timeout_uses_default() {
        let config = NetworkConfig {
            request_timeout: "soon".to_string(),
            ..Default::default()
        };
        assert_eq!(config.request_timeout(), DEFAULT_REQUEST_TIMEOUT);
    }

    #[test]
    fn test_limits_defaults() {
        let limits = LimitsConfig::default();
        assert_eq!(limits.max_source_file_size_bytes(), DEFAULT_MAX_SOURCE_FILE_SIZE);
        assert_eq!(limits.file_copy_buffer_size_bytes(), DEFAULT_FILE_COPY_BUFFER_SIZE);
    }
}
