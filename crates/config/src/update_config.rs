//! Self-update policy section

use crate::coerce;
use crate::section::{overlay_present, ConfigSection};
use serde::{Deserialize, Serialize};
use toml::Table;

/// Release channel to follow
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UpdateChannel {
    #[default]
    Stable,
    Beta,
    Nightly,
}

impl UpdateChannel {
    /// Accepted spellings, in the order shown to users
    pub const ALLOWED: &'static [&'static str] = &["stable", "beta", "nightly"];
}

impl std::fmt::Display for UpdateChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpdateChannel::Stable => write!(f, "stable"),
            UpdateChannel::Beta => write!(f, "beta"),
            UpdateChannel::Nightly => write!(f, "nightly"),
        }
    }
}

/// When and how to check for new releases
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UpdateConfig {
    /// Check for updates on startup
    #[serde(deserialize_with = "coerce::deserialize_bool")]
    pub auto_check: bool,

    /// Install updates without asking
    #[serde(deserialize_with = "coerce::deserialize_bool")]
    pub auto_update: bool,

    /// Hours between checks
    #[serde(deserialize_with = "coerce::deserialize_u32")]
    pub check_interval_hours: u32,

    /// RFC 3339 timestamp of the last check, empty if never checked
    pub last_update_check: String,

    pub channel: UpdateChannel,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            auto_check: true,
            auto_update: false,
            check_interval_hours: 24,
            last_update_check: String::new(),
            channel: UpdateChannel::Stable,
        }
    }
}

impl UpdateConfig {
    /// Whether a check is due at `now` given the stored last-check time
    pub fn check_due(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        if !self.auto_check {
            return false;
        }
        match chrono::DateTime::parse_from_rfc3339(&self.last_update_check) {
            Ok(last) => {
                let elapsed = now.signed_duration_since(last.with_timezone(&chrono::Utc));
                elapsed >= chrono::Duration::hours(i64::from(self.check_interval_hours))
            }
            Err(_) => true,
        }
    }

    /// Records `now` as the last check time
    pub fn mark_checked(&mut self, now: chrono::DateTime<chrono::Utc>) {
        self.last_update_check = now.to_rfc3339();
    }
}

impl ConfigSection for UpdateConfig {
    const NAME: &'static str = "update";

    fn overlay(&mut self, decoded: Self, present: &Table) {
        overlay_present!(
            self, decoded, present;
            auto_check,
            auto_update,
            check_interval_hours,
            last_update_check,
            channel,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_channel_display_matches_allowed() {
        let shown: Vec<String> = [
            UpdateChannel::Stable,
            UpdateChannel::Beta,
            UpdateChannel::Nightly,
        ]
        .iter()
        .map(|c| c.to_string())
        .collect();
        assert_eq!(shown, UpdateChannel::ALLOWED);
    }

    #[test]
    fn test_check_due_when_never_checked() {
        let config = UpdateConfig::default();
        assert!(config.check_due(Utc::now()));
    }

    #[test]
    fn test_check_not_due_within_interval() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let mut config = UpdateConfig::default();
        config.mark_checked(now - chrono::Duration::hours(2));
        assert!(!config.check_due(now));
        assert!(config.check_due(now + chrono::Duration::hours(23)));
    }

    #[test]
    fn test_auto_check_disabled_is_never_due() {
        let config = UpdateConfig {
            auto_check: false,
            ..Default::default()
        };
        assert!(!config.check_due(Utc::now()));
    }
}
