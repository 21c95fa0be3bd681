//! General application settings section

use crate::section::{overlay_present, ConfigSection};
use serde::{Deserialize, Serialize};
use toml::Table;

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Editor used by `config edit`; empty means `$EDITOR` or the platform default
    pub default_editor: String,
}

impl GeneralConfig {
    /// Returns the configured editor, then `$EDITOR`, then the platform default
    pub fn editor_with_fallback(&self) -> String {
        if !self.default_editor.trim().is_empty() {
            return self.default_editor.clone();
        }
        match std::env::var("EDITOR") {
            Ok(editor) if !editor.trim().is_empty() => editor,
            _ => platform_editor().to_string(),
        }
    }
}

fn platform_editor() -> &'static str {
    if cfg!(target_os = "windows") {
        "notepad.exe"
    } else if cfg!(target_os = "macos") {
        "open -e"
    } else {
        "nano"
    }
}

impl ConfigSection for GeneralConfig {
    const NAME: &'static str = "general";

    fn overlay(&mut self, decoded: Self, present: &Table) {
        overlay_present!(self, decoded, present; default_editor);
    }
}
