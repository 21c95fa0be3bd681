//! Configuration backup and restore utilities
//!
//! Backups are byte-for-byte copies of the config file, colocated with it and
//! named `<file>.backup.<timestamp>`. The timestamp is UTC with microseconds,
//! so lexical and chronological order agree.

use crate::persistence::{parent_dir, write_atomic};
use crate::{ConfigError, ConfigResult, DEFAULT_MAX_BACKUPS};
use chrono::{NaiveDateTime, Utc};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

const BACKUP_MARKER: &str = ".backup.";
const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S%.6f";
/// Seconds-only stamps written by older releases
const LEGACY_TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";
const SNAPSHOT_ATTEMPTS: usize = 5;

/// Manages backups of one config file
#[derive(Debug, Clone)]
pub struct BackupManager {
    config_path: PathBuf,
    max_backups: usize,
}

impl BackupManager {
    /// Creates a backup manager for the given config file
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            max_backups: DEFAULT_MAX_BACKUPS,
        }
    }

    /// Sets the number of backups kept by `prune_to_limit`
    pub fn with_max_backups(mut self, max: usize) -> Self {
        self.max_backups = max;
        self
    }

    pub fn max_backups(&self) -> usize {
        self.max_backups
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Copies the current config file to a new timestamped backup
    ///
    /// Returns the path to the backup file. Never overwrites an existing backup.
    pub fn snapshot(&self) -> ConfigResult<PathBuf> {
        let original = fs::read(&self.config_path).map_err(|e| ConfigError::BackupError {
            path: self.config_path.clone(),
            source: e,
        })?;

        let mut last_error = None;
        for _ in 0..SNAPSHOT_ATTEMPTS {
            let backup_path = self.backup_path_for(&Utc::now().naive_utc());
            match write_new(&backup_path, &original) {
                Ok(()) => {
                    log::info!("Created config backup at {}", backup_path.display());
                    return Ok(backup_path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    log::debug!("Backup name {} taken, retrying", backup_path.display());
                    last_error = Some(e);
                    std::thread::sleep(std::time::Duration::from_micros(1));
                }
                Err(e) => {
                    return Err(ConfigError::BackupError {
                        path: backup_path,
                        source: e,
                    })
                }
            }
        }

        Err(ConfigError::BackupError {
            path: self.config_path.clone(),
            source: last_error
                .unwrap_or_else(|| std::io::Error::from(ErrorKind::AlreadyExists)),
        })
    }

    /// Writes a backup's bytes back over the config file atomically
    pub fn restore(&self, backup_path: &Path) -> ConfigResult<()> {
        let contents = fs::read(backup_path).map_err(|e| ConfigError::RestoreError {
            path: backup_path.to_path_buf(),
            source: e,
        })?;

        write_atomic(&self.config_path, &contents)?;
        log::info!(
            "Restored {} from {}",
            self.config_path.display(),
            backup_path.display()
        );
        Ok(())
    }

    /// Deletes all but the `keep` most recent backups
    ///
    /// Best effort: a backup that cannot be deleted is logged and skipped.
    /// Returns the number of backups removed.
    pub fn prune(&self, keep: usize) -> usize {
        let backups = match self.list_backups() {
            Ok(backups) => backups,
            Err(e) => {
                log::warn!("Could not list backups for pruning: {}", e);
                return 0;
            }
        };

        let mut removed = 0;
        for backup in backups.iter().skip(keep) {
            match fs::remove_file(&backup.path) {
                Ok(()) => {
                    log::debug!("Deleted old backup {}", backup.path.display());
                    removed += 1;
                }
                Err(e) => log::warn!(
                    "Could not delete old backup {}: {}",
                    backup.path.display(),
                    e
                ),
            }
        }

        if removed > 0 {
            log::info!("Pruned {} old backup(s), keeping {}", removed, keep);
        }
        removed
    }

    /// Prunes to the configured retention count
    pub fn prune_to_limit(&self) -> usize {
        self.prune(self.max_backups)
    }

    /// Lists backups of this config file, newest first
    ///
    /// Files whose names do not carry a parseable timestamp are ignored.
    pub fn list_backups(&self) -> ConfigResult<Vec<BackupInfo>> {
        let dir = parent_dir(&self.config_path);
        let Some(prefix) = self.backup_prefix() else {
            return Ok(Vec::new());
        };

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(ConfigError::ReadError {
                    path: dir.to_path_buf(),
                    source: e,
                })
            }
        };

        let mut backups = Vec::new();
        for entry in entries {
            let entry = entry.map_err(ConfigError::IoError)?;
            let Some(filename) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            let Some(created) = filename
                .strip_prefix(&prefix)
                .and_then(parse_backup_timestamp)
            else {
                continue;
            };

            let metadata = match entry.metadata() {
                Ok(metadata) if metadata.is_file() => metadata,
                _ => continue,
            };

            backups.push(BackupInfo {
                path: entry.path(),
                filename,
                created,
                size_bytes: metadata.len(),
            });
        }

        backups.sort_by(|a, b| b.created.cmp(&a.created));
        Ok(backups)
    }

    /// The most recent backup, if any
    pub fn latest(&self) -> ConfigResult<Option<BackupInfo>> {
        Ok(self.list_backups()?.into_iter().next())
    }

    fn backup_prefix(&self) -> Option<String> {
        self.config_path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| format!("{}{}", name, BACKUP_MARKER))
    }

    fn backup_path_for(&self, at: &NaiveDateTime) -> PathBuf {
        let mut name = self
            .config_path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(BACKUP_MARKER);
        name.push(at.format(TIMESTAMP_FORMAT).to_string());
        self.config_path.with_file_name(name)
    }
}

fn write_new(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

fn parse_backup_timestamp(stamp: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(stamp, LEGACY_TIMESTAMP_FORMAT))
        .ok()
}

/// Information about a config backup
#[derive(Debug, Clone)]
pub struct BackupInfo {
    /// Full path to the backup file
    pub path: PathBuf,
    /// Filename of the backup
    pub filename: String,
    /// Timestamp embedded in the filename (UTC)
    pub created: NaiveDateTime,
    /// File size in bytes
    pub size_bytes: u64,
}

impl BackupInfo {
    /// Returns a human-readable timestamp
    pub fn created_timestamp(&self) -> String {
        self.created.format("%Y-%m-%d %H:%M:%S UTC").to_string()
    }

    /// Returns file size in a human-readable format
    pub fn size_human(&self) -> String {
        let bytes = self.size_bytes as f64;
        if bytes < 1024.0 {
            format!("{} B", bytes)
        } else if bytes < 1024.0 * 1024.0 {
            format!("{:.1} KB", bytes / 1024.0)
        } else {
            format!("{:.1} MB", bytes / (1024.0 * 1024.0))
        }
    }
}
