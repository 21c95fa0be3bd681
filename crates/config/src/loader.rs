//! Default-merge loader: raw bytes to a typed `Config`
//!
//! The pipeline is parse → validate → normalize legacy names → decode each
//! section → overlay present fields onto defaults. The raw document is kept
//! alongside the decoded values so that an explicit `false` or `0` can be
//! told apart from a key that was never written.

use crate::aliases;
use crate::error::{ConfigError, ConfigResult};
use crate::section::ConfigSection;
use crate::validation::validate_document;
use crate::{Config, LimitsConfig, CURRENT_CONFIG_VERSION};
use std::path::Path;
use toml::{Table, Value};

/// Parses config bytes into an untyped document
///
/// `origin` is only used in error messages.
pub fn parse_document(bytes: &[u8], origin: &Path) -> ConfigResult<Table> {
    let text = String::from_utf8(bytes.to_vec()).map_err(|source| ConfigError::Encoding {
        path: origin.to_path_buf(),
        source,
    })?;

    toml::from_str::<Table>(&text).map_err(|source| ConfigError::ParseError {
        path: origin.to_path_buf(),
        source,
    })
}

/// Parses, validates and decodes config bytes
///
/// A parse failure or any validation error is fatal; no partial config is
/// returned. The result still carries the file's own version tag, which may
/// be empty or older than current.
pub fn load_from_bytes(bytes: &[u8], origin: &Path) -> ConfigResult<Config> {
    let doc = parse_document(bytes, origin)?;
    validate_document(&doc).into_result()?;
    decode_document(doc)
}

/// Decodes a schema-valid document and merges it over the defaults
pub fn decode_document(mut doc: Table) -> ConfigResult<Config> {
    let moved = aliases::normalize(&mut doc);
    if moved > 0 {
        log::info!("Read {} setting(s) from legacy field names", moved);
    }
    normalize_theme(&mut doc);

    let mut config = Config {
        config_version: doc
            .get("config_version")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        ..Config::default()
    };

    merge_section(&mut config.general, &doc)?;
    merge_section(&mut config.logging, &doc)?;
    merge_section(&mut config.network, &doc)?;
    merge_section(&mut config.search, &doc)?;
    merge_section(&mut config.update, &doc)?;
    merge_section(&mut config.theme, &doc)?;

    if doc.get(LimitsConfig::NAME).is_some_and(Value::is_table) {
        if config.effective_version() == CURRENT_CONFIG_VERSION {
            log::debug!("Ignoring [limits] in a version {} file", CURRENT_CONFIG_VERSION);
            return Ok(config);
        }
        let mut limits = LimitsConfig::default();
        merge_section(&mut limits, &doc)?;
        config.limits = Some(limits);
    }

    Ok(config)
}

/// Overlays the fields of `S`'s table that are present in `doc` onto `target`
fn merge_section<S: ConfigSection>(target: &mut S, doc: &Table) -> ConfigResult<()> {
    let Some(Value::Table(present)) = doc.get(S::NAME) else {
        return Ok(());
    };

    let decoded: S = Value::Table(present.clone())
        .try_into()
        .map_err(|source| ConfigError::Decode {
            section: S::NAME,
            source,
        })?;
    target.overlay(decoded, present);
    Ok(())
}

/// `theme = "name"` is shorthand for `[theme] name = "name"`; an empty mode means unset
fn normalize_theme(doc: &mut Table) {
    if let Some(name) = doc.get("theme").and_then(Value::as_str).map(str::to_string) {
        let mut table = Table::new();
        table.insert("name".to_string(), Value::String(name));
        doc.insert("theme".to_string(), Value::Table(table));
    }

    if let Some(Value::Table(theme)) = doc.get_mut("theme") {
        if theme.get("mode").and_then(Value::as_str) == Some("") {
            theme.remove("mode");
        }
    }
}
