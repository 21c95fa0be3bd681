//! Error types for the configuration system

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur during configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write config file
    #[error("Failed to write config file at {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Config file is not valid UTF-8
    #[error("Config file at {path} is not valid UTF-8: {source}")]
    Encoding {
        path: PathBuf,
        source: std::string::FromUtf8Error,
    },

    /// Failed to parse config file
    #[error("Failed to parse config file at {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A schema-valid section could not be decoded into its typed form
    #[error("Failed to decode [{section}] section: {source}")]
    Decode {
        section: &'static str,
        source: toml::de::Error,
    },

    /// Failed to serialize config
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// Config file contains invalid values
    #[error("{0}")]
    Validation(ValidationErrors),

    /// No registered migration step leads from the stored version to the target
    #[error("no migration path found from version {from} to {to} (stopped at {stuck_at})")]
    NoMigrationPath {
        from: String,
        to: String,
        stuck_at: String,
    },

    /// A migration step failed; `restore` records what happened to the file afterwards
    #[error("migration from {from} to {to} failed: {reason}; {restore}")]
    MigrationFailed {
        from: String,
        to: String,
        #[source]
        reason: Box<ConfigError>,
        restore: RestoreOutcome,
    },

    /// A migration step reported an error from inside its transform
    #[error("{0}")]
    Transform(String),

    /// Two migration steps were registered for the same origin version
    #[error("a migration step from version {from} is already registered")]
    DuplicateMigration { from: String },

    /// A migration step that would leave the version unchanged
    #[error("a migration step from version {version} to itself is not allowed")]
    SelfMigration { version: String },

    /// Failed to create config directory
    #[error("Failed to create config directory at {path}: {source}")]
    DirectoryCreationError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Config directory path could not be determined
    #[error("Could not determine config directory path: {reason}")]
    PathResolutionError { reason: String },

    /// Failed to create a backup of the config file
    #[error("Failed to backup config file {path}: {source}")]
    BackupError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to read a backup while restoring the config file from it
    #[error("Failed to restore config file from backup {path}: {source}")]
    RestoreError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Generic I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// What happened to the on-disk file after a migration step failed
#[derive(Debug)]
pub enum RestoreOutcome {
    /// The original content was written back from this backup
    Restored(PathBuf),
    /// Restoring from this backup failed as well
    Failed {
        backup: PathBuf,
        error: Box<ConfigError>,
    },
    /// No snapshot had been taken, so there was nothing to restore from
    NoBackup,
}

impl fmt::Display for RestoreOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestoreOutcome::Restored(backup) => {
                write!(f, "original file restored from {}", backup.display())
            }
            RestoreOutcome::Failed { backup, error } => write!(
                f,
                "restore from {} also failed: {}",
                backup.display(),
                error
            ),
            RestoreOutcome::NoBackup => {
                write!(f, "no backup was available, original file left unchanged")
            }
        }
    }
}

/// Validation error for a specific config field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Path to the field (e.g., "update.channel")
    pub field: String,

    /// Human-readable error message
    pub message: String,

    /// The invalid value, if available
    pub value: Option<String>,
}

impl ValidationError {
    /// Creates a new validation error
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            value: None,
        }
    }

    /// Creates a validation error with the invalid value
    pub fn with_value(
        field: impl Into<String>,
        message: impl Into<String>,
        value: impl ToString,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            value: Some(value.to_string()),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Field '{}': {}", self.field, self.message)?;
        if let Some(ref value) = self.value {
            write!(f, " (got: {})", value)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Every schema violation found in one document, in discovery order
///
/// An empty set means the document is schema-valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    /// Returns true if any violation names exactly this field path
    pub fn contains_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// Converts a non-empty set into a fatal `ConfigError::Validation`
    pub fn into_result(self) -> ConfigResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "configuration validation failed:")?;
        for error in &self.0 {
            write!(f, "\n  - {}", error)?;
        }
        Ok(())
    }
}

impl Extend<ValidationError> for ValidationErrors {
    fn extend<I: IntoIterator<Item = ValidationError>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
