//! Config location resolution
//!
//! A stateless function of the host's home directory; nothing here is cached.

use crate::CONFIG_FILE_NAME;
use directories::BaseDirs;
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = ".fontdock";

/// Where the config directory and file live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub config_dir: PathBuf,
    pub config_file: PathBuf,
}

impl ConfigPaths {
    /// Resolves `<home>/.fontdock/config.toml`
    ///
    /// Without a home directory the config lives in `./.fontdock`.
    pub fn from_home(home: Option<&Path>) -> Self {
        let config_dir = match home {
            Some(home) => home.join(APP_DIR_NAME),
            None => PathBuf::from(".").join(APP_DIR_NAME),
        };
        Self::in_directory(config_dir)
    }

    /// Uses `config_dir/config.toml`
    pub fn in_directory(config_dir: PathBuf) -> Self {
        let config_file = config_dir.join(CONFIG_FILE_NAME);
        Self {
            config_dir,
            config_file,
        }
    }

    /// Resolves the location from the current user's home directory
    pub fn detect() -> Self {
        let base_dirs = BaseDirs::new();
        if base_dirs.is_none() {
            log::warn!("Could not determine home directory, using ./{}", APP_DIR_NAME);
        }
        Self::from_home(base_dirs.as_ref().map(BaseDirs::home_dir))
    }
}
