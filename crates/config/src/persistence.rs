//! File system persistence for configuration
//!
//! This module handles reading and writing config files with:
//! - Raw byte reads that report a missing file as `None`, not an error
//! - Atomic writes (temp file in the same directory, then rename)
//! - Directory creation
//! - NO PANICS - all errors are handled via Result types

use crate::template::DEFAULT_CONFIG_TEMPLATE;
use crate::{Config, ConfigError, ConfigResult};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const WRITTEN_HEADER: &str = "# fontdock configuration (rewritten automatically; comments are not preserved)\n\n";

/// Handles configuration file persistence
pub struct ConfigPersistence {
    config_path: PathBuf,
}

impl ConfigPersistence {
    /// Creates a new persistence handler for the given config file path
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Reads the config file as bytes
    ///
    /// Returns `Ok(None)` when the file does not exist (including when a parent
    /// path component is a regular file); first run is not an error.
    pub fn read_raw(&self) -> ConfigResult<Option<Vec<u8>>> {
        match fs::read(&self.config_path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
                Ok(None)
            }
            Err(e) => Err(ConfigError::ReadError {
                path: self.config_path.clone(),
                source: e,
            }),
        }
    }

    /// Serializes the typed config and replaces the file atomically
    ///
    /// Always writes current field names and the config's own version tag.
    pub fn write_typed(&self, config: &Config) -> ConfigResult<()> {
        let contents = render(config)?;
        write_atomic(&self.config_path, contents.as_bytes())?;
        log::info!("Config saved to {}", self.config_path.display());
        Ok(())
    }

    /// Writes the commented default config file
    pub fn write_default_template(&self) -> ConfigResult<()> {
        write_atomic(&self.config_path, DEFAULT_CONFIG_TEMPLATE.as_bytes())?;
        log::info!("Generated default config at {}", self.config_path.display());
        Ok(())
    }
}

/// Renders a config as the TOML text that would be written to disk
pub fn render(config: &Config) -> ConfigResult<String> {
    let body = toml::to_string_pretty(config).map_err(ConfigError::SerializeError)?;
    Ok(format!("{}{}", WRITTEN_HEADER, body))
}

/// Replaces `path` with `contents` via a temp file and rename
///
/// A crash mid-write leaves either the old file or the new one, never a mix.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> ConfigResult<()> {
    let dir = parent_dir(path);
    ensure_directory_exists(dir)?;

    let mut temp_file = NamedTempFile::new_in(dir).map_err(|e| ConfigError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })?;

    temp_file
        .write_all(contents)
        .and_then(|()| temp_file.flush())
        .and_then(|()| temp_file.as_file().sync_all())
        .map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

    temp_file
        .persist(path)
        .map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e.error,
        })?;

    Ok(())
}

/// Directory containing `path`, `.` for a bare file name
pub(crate) fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn ensure_directory_exists(path: &Path) -> ConfigResult<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| ConfigError::DirectoryCreationError {
            path: path.to_path_buf(),
            source: e,
        })?;
        log::info!("Created config directory: {}", path.display());
    }
    Ok(())
}
