//! Search result settings section (added in schema 2.0)

use crate::coerce;
use crate::section::{overlay_present, ConfigSection};
use serde::{Deserialize, Serialize};
use toml::Table;

/// Search result settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum results shown; 0 means unlimited
    #[serde(deserialize_with = "coerce::deserialize_u32")]
    pub result_limit: u32,

    /// Rank matches by popularity before alphabetical order
    #[serde(deserialize_with = "coerce::deserialize_bool")]
    pub enable_popularity_sort: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            result_limit: 0,
            enable_popularity_sort: true,
        }
    }
}

impl SearchConfig {
    /// The result limit, or `None` when unlimited
    pub fn limit(&self) -> Option<usize> {
        (self.result_limit > 0).then_some(self.result_limit as usize)
    }
}

impl ConfigSection for SearchConfig {
    const NAME: &'static str = "search";

    fn overlay(&mut self, decoded: Self, present: &Table) {
        overlay_present!(self, decoded, present; result_limit, enable_popularity_sort);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_limit_is_unlimited() {
        assert_eq!(SearchConfig::default().limit(), None);
        let config = SearchConfig {
            result_limit: 25,
            ..Default::default()
        };
        assert_eq!(config.limit(), Some(25));
    }

    #[test]
    fn test_explicit_false_overrides_default() {
        let mut base = SearchConfig::default();
        let decoded = SearchConfig {
            result_limit: 0,
            enable_popularity_sort: false,
        };
        let mut present = Table::new();
        present.insert(
            "enable_popularity_sort".to_string(),
            toml::Value::Boolean(false),
        );

        base.overlay(decoded, &present);
        assert!(!base.enable_popularity_sort);
    }
}
