//! Console theme section

use crate::section::{overlay_present, ConfigSection};
use serde::{Deserialize, Serialize};
use toml::Table;

/// Light/dark selection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    /// Detect from the terminal
    #[default]
    Auto,
    Dark,
    Light,
}

impl ThemeMode {
    pub const ALLOWED: &'static [&'static str] = &["auto", "dark", "light"];
}

impl std::fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThemeMode::Auto => write!(f, "auto"),
            ThemeMode::Dark => write!(f, "dark"),
            ThemeMode::Light => write!(f, "light"),
        }
    }
}

/// Console theme
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct ThemeConfig {
    /// Theme name (e.g. "catppuccin"); empty uses the built-in theme
    pub name: String,

    pub mode: ThemeMode,
}

impl ConfigSection for ThemeConfig {
    const NAME: &'static str = "theme";

    fn overlay(&mut self, decoded: Self, present: &Table) {
        overlay_present!(self, decoded, present; name, mode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_display() {
        assert_eq!(ThemeMode::Auto.to_string(), "auto");
        assert_eq!(ThemeMode::Light.to_string(), "light");
    }

    #[test]
    fn test_default_uses_builtin_theme() {
        let theme = ThemeConfig::default();
        assert!(theme.name.is_empty());
        assert_eq!(theme.mode, ThemeMode::Auto);
    }
}
