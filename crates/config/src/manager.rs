//! Configuration manager - main API for config operations

use crate::backup::BackupManager;
use crate::loader::{load_from_bytes, parse_document};
use crate::migration::{MigrationEngine, MigrationReport};
use crate::paths::ConfigPaths;
use crate::persistence::ConfigPersistence;
use crate::validation::validate_document;
use crate::{Config, ConfigError, ConfigResult, ValidationErrors, DEFAULT_MAX_BACKUPS};
use std::path::{Path, PathBuf};

/// How a load produced its config
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No file existed; defaults were used and a template written if possible
    FirstRun,
    /// The file was already at the current version
    Loaded,
    /// The file was upgraded and written back
    Migrated(MigrationReport),
}

/// A loaded config together with how it was obtained
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub config: Config,
    pub outcome: LoadOutcome,
}

/// Main configuration manager
///
/// This is the primary interface for loading, saving, and managing configuration.
/// It runs the full read → validate → merge → migrate → write-back lifecycle.
pub struct ConfigManager {
    persistence: ConfigPersistence,
    config_dir: PathBuf,
    engine: MigrationEngine,
    max_backups: usize,
}

impl ConfigManager {
    /// Creates a new config manager using the default location
    ///
    /// The config lives at `~/.fontdock/config.toml`.
    pub fn new() -> ConfigResult<Self> {
        let paths = ConfigPaths::detect();
        Self::with_file(paths.config_file)
    }

    /// Creates a config manager with a custom config directory
    pub fn with_directory(config_dir: PathBuf) -> ConfigResult<Self> {
        let paths = ConfigPaths::in_directory(config_dir);
        Self::with_file(paths.config_file)
    }

    /// Creates a config manager for an explicit config file
    pub fn with_file(config_path: PathBuf) -> ConfigResult<Self> {
        if config_path.file_name().is_none() {
            return Err(ConfigError::PathResolutionError {
                reason: format!("{} does not name a file", config_path.display()),
            });
        }

        let config_dir = crate::persistence::parent_dir(&config_path).to_path_buf();
        Ok(Self {
            persistence: ConfigPersistence::new(config_path),
            config_dir,
            engine: MigrationEngine::default(),
            max_backups: DEFAULT_MAX_BACKUPS,
        })
    }

    /// Replaces the migration engine (custom registries, other targets)
    ///
    /// The engine's backup retention becomes the manager's.
    pub fn with_engine(mut self, engine: MigrationEngine) -> Self {
        self.max_backups = engine.max_backups();
        self.engine = engine;
        self
    }

    /// Sets how many backups are kept after a migration
    pub fn with_max_backups(mut self, max: usize) -> Self {
        self.max_backups = max;
        self.engine = std::mem::take(&mut self.engine).with_max_backups(max);
        self
    }

    /// Returns the config directory path
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Returns the full config file path
    pub fn config_path(&self) -> &Path {
        self.persistence.path()
    }

    /// Loads the configuration
    ///
    /// A missing file is a first run: the commented defaults are written and
    /// returned. A file from an older release is migrated and written back.
    /// Parse and validation failures are returned as a single error.
    pub fn load(&self) -> ConfigResult<Config> {
        self.load_with_report().map(|report| report.config)
    }

    /// Like `load`, but also reports whether this was a first run or a migration
    pub fn load_with_report(&self) -> ConfigResult<LoadReport> {
        let Some(bytes) = self.persistence.read_raw()? else {
            log::info!(
                "No config found at {}, using defaults",
                self.config_path().display()
            );
            if let Err(e) = self.persistence.write_default_template() {
                log::warn!("Could not write default config file: {}", e);
            }
            return Ok(LoadReport {
                config: Config::default(),
                outcome: LoadOutcome::FirstRun,
            });
        };

        let config = load_from_bytes(&bytes, self.config_path())?;
        let (config, report) = self.engine.migrate(config, self.config_path())?;

        if !report.migrated() {
            return Ok(LoadReport {
                config,
                outcome: LoadOutcome::Loaded,
            });
        }

        if report.is_degraded() {
            log::warn!("Config was migrated without a backup of the original file");
        }
        self.persistence.write_typed(&config)?;

        Ok(LoadReport {
            config,
            outcome: LoadOutcome::Migrated(report),
        })
    }

    /// Loads the configuration, falling back to defaults on any error
    ///
    /// This is a convenience method that never returns an error.
    /// Errors are logged but the function always returns a valid config.
    pub fn load_or_default(&self) -> Config {
        match self.load() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load config: {}, using defaults", e);
                Config::default()
            }
        }
    }

    /// Validates the config file without loading or migrating it
    ///
    /// Returns every violation found; an empty set means the file is valid.
    /// A missing file is valid (defaults apply). Unparseable files are errors.
    pub fn validate_file(&self) -> ConfigResult<ValidationErrors> {
        match self.persistence.read_raw()? {
            Some(bytes) => {
                let doc = parse_document(&bytes, self.config_path())?;
                Ok(validate_document(&doc))
            }
            None => Ok(ValidationErrors::new()),
        }
    }

    /// Saves the configuration to file
    ///
    /// This performs validation before saving and uses atomic writes
    /// to prevent corruption.
    pub fn save(&self, config: &Config) -> ConfigResult<()> {
        config.validate().map_err(ConfigError::Validation)?;
        self.persistence.write_typed(config)
    }

    /// Updates the configuration using a closure
    ///
    /// This loads the current config, applies the update function,
    /// and saves the result atomically.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use fontdock_config::ConfigManager;
    /// # fn main() -> Result<(), fontdock_config::ConfigError> {
    /// let manager = ConfigManager::new()?;
    /// manager.update(|config| {
    ///     config.search.result_limit = 25;
    /// })?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn update<F>(&self, update_fn: F) -> ConfigResult<()>
    where
        F: FnOnce(&mut Config),
    {
        let mut config = self.load()?;
        update_fn(&mut config);
        self.save(&config)
    }

    /// Generates a default config file if one doesn't exist
    ///
    /// Returns Ok(true) if a new file was created, Ok(false) if one already exists.
    pub fn initialize(&self) -> ConfigResult<bool> {
        if self.config_path().exists() {
            log::info!(
                "Config file already exists at {}",
                self.config_path().display()
            );
            return Ok(false);
        }

        self.persistence.write_default_template()?;
        Ok(true)
    }

    /// Resets the configuration to defaults
    ///
    /// This overwrites the existing config file with the commented defaults.
    pub fn reset(&self) -> ConfigResult<()> {
        self.persistence.write_default_template()
    }

    /// Backups of this manager's config file
    pub fn backups(&self) -> BackupManager {
        BackupManager::new(self.config_path()).with_max_backups(self.max_backups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::BackupStatus;
    use std::fs;
    use tempfile::TempDir;

    fn setup_test_manager() -> (TempDir, ConfigManager) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let manager = ConfigManager::with_directory(temp_dir.path().to_path_buf())
            .expect("Failed to create manager");
        (temp_dir, manager)
    }

    #[test]
    fn test_new_manager() {
        let manager = ConfigManager::new().expect("Should resolve a location");
        assert!(manager.config_path().ends_with("config.toml"));
    }

    #[test]
    fn test_first_run_writes_template() {
        let (_temp_dir, manager) = setup_test_manager();

        let report = manager.load_with_report().expect("Should load");
        assert_eq!(report.outcome, LoadOutcome::FirstRun);
        assert_eq!(report.config, Config::default());
        assert!(manager.config_path().exists());

        let second = manager.load_with_report().expect("Should load again");
        assert_eq!(second.outcome, LoadOutcome::Loaded);
        assert_eq!(second.config, Config::default());
    }

    #[test]
    fn test_first_run_survives_unwritable_location() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let blocker = temp_dir.path().join("not-a-dir");
        fs::write(&blocker, "file in the way").expect("write");
        let manager =
            ConfigManager::with_file(blocker.join("config.toml")).expect("Failed to create manager");

        let config = manager.load().expect("Defaults despite write failure");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_or_default_with_broken_file() {
        let (_temp_dir, manager) = setup_test_manager();
        fs::write(manager.config_path(), "[[[ not toml").expect("write");
        let config = manager.load_or_default();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let (_temp_dir, manager) = setup_test_manager();

        let mut config = Config::default();
        config.search.result_limit = 75;

        manager.save(&config).expect("Should save config");
        let loaded = manager.load().expect("Should load config");

        assert_eq!(loaded.search.result_limit, 75);
    }

    #[test]
    fn test_save_rejects_invalid() {
        let (_temp_dir, manager) = setup_test_manager();

        let mut config = Config::default();
        config.update.check_interval_hours = 0;
        let err = manager
            .save(&config)
            .expect_err("Should not save invalid config");
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(!manager.config_path().exists());
    }

    #[test]
    fn test_update() {
        let (_temp_dir, manager) = setup_test_manager();
        manager.save(&Config::default()).expect("Should save");

        manager
            .update(|config| {
                config.update.auto_check = false;
            })
            .expect("Should update");

        let loaded = manager.load().expect("Should load");
        assert!(!loaded.update.auto_check);
    }

    #[test]
    fn test_legacy_file_is_migrated_and_written_back() {
        let (_temp_dir, manager) = setup_test_manager();
        fs::write(
            manager.config_path(),
            "[general]\n[logging]\nlog_path = \"/tmp/f.log\"\nmax_size = \"2MB\"\nmax_files = 7\n[limits]\nmax_source_file_size = \"1GB\"\n",
        )
        .expect("write");

        let report = manager.load_with_report().expect("Should migrate");
        let LoadOutcome::Migrated(migration) = &report.outcome else {
            panic!("expected migration, got {:?}", report.outcome);
        };
        assert!(matches!(migration.backup, BackupStatus::Created(_)));
        assert_eq!(report.config.logging.max_log_files, 7);
        assert_eq!(report.config.logging.max_log_size, "2MB");

        let written = fs::read_to_string(manager.config_path()).expect("read");
        assert!(written.contains("config_version = \"2.0\""));
        assert!(written.contains("max_log_files = 7"));
        assert!(!written.contains("[limits]"));

        let again = manager.load_with_report().expect("Should load");
        assert_eq!(again.outcome, LoadOutcome::Loaded);
        assert_eq!(manager.backups().list_backups().expect("list").len(), 1);
    }

    #[test]
    fn test_current_file_with_limits_is_not_written_back() {
        let (_temp_dir, manager) = setup_test_manager();
        fs::write(
            manager.config_path(),
            "config_version = \"2.0\"\n[general]\n[logging]\nlog_path = \"/tmp/f.log\"\nmax_log_size = \"2MB\"\nmax_log_files = 7\n[limits]\nmax_source_file_size = \"1GB\"\n",
        )
        .expect("write");

        let config = manager.load().expect("Should load");
        assert!(config.limits.is_none());
        manager.save(&config).expect("Should save");
        let written = fs::read_to_string(manager.config_path()).expect("read");
        assert!(!written.contains("[limits]"));
    }

    #[test]
    fn test_validate_file_reports_everything() {
        let (_temp_dir, manager) = setup_test_manager();
        fs::write(
            manager.config_path(),
            "[logging]\nlog_path = \"\"\nmax_log_size = \"huge\"\nmax_log_files = -1\n",
        )
        .expect("write");

        let errors = manager.validate_file().expect("Should parse");
        assert!(errors.contains_field("general"));
        assert!(errors.contains_field("logging.log_path"));
        assert!(errors.contains_field("logging.max_log_size"));
        assert!(errors.contains_field("logging.max_log_files"));
    }

    #[test]
    fn test_validate_file_missing_is_valid() {
        let (_temp_dir, manager) = setup_test_manager();
        assert!(manager.validate_file().expect("ok").is_empty());
    }

    #[test]
    fn test_initialize_creates_file() {
        let (_temp_dir, manager) = setup_test_manager();

        let created = manager.initialize().expect("Should initialize");
        assert!(created);
        assert!(manager.config_path().exists());
    }

    #[test]
    fn test_initialize_with_existing_file() {
        let (_temp_dir, manager) = setup_test_manager();
        manager.save(&Config::default()).expect("Should save");

        let created = manager.initialize().expect("Should initialize");
        assert!(!created);
    }

    #[test]
    fn test_reset() {
        let (_temp_dir, manager) = setup_test_manager();

        let mut config = Config::default();
        config.search.enable_popularity_sort = false;
        manager.save(&config).expect("Should save");

        manager.reset().expect("Should reset");

        let loaded = manager.load().expect("Should load");
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn test_with_engine_keeps_engine_retention() {
        let (_temp_dir, manager) = setup_test_manager();
        let manager = manager
            .with_max_backups(5)
            .with_engine(MigrationEngine::default().with_max_backups(2));

        assert_eq!(manager.engine.max_backups(), 2);
        assert_eq!(manager.backups().max_backups(), 2);

        let manager = manager.with_max_backups(4);
        assert_eq!(manager.engine.max_backups(), 4);
    }

    #[test]
    fn test_config_file_path() {
        let (temp_dir, manager) = setup_test_manager();
        assert!(manager.config_path().ends_with("config.toml"));
        assert_eq!(manager.config_dir(), temp_dir.path());
    }
}
