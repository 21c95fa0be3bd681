//! Configuration migration system
//!
//! Each step upgrades a typed config from exactly one schema version to the
//! next, so the registered steps form a single linked chain. The engine plans
//! the whole chain before touching anything, snapshots the file before the
//! first transform, and puts the original bytes back if a transform fails.
//!
//! To change the schema: bump `CURRENT_CONFIG_VERSION`, add the version to
//! `SUPPORTED_VERSIONS`, and register a step from the previous version in
//! `MigrationRegistry::builtin`.

use crate::backup::BackupManager;
use crate::error::RestoreOutcome;
use crate::{Config, ConfigError, ConfigResult, CURRENT_CONFIG_VERSION, DEFAULT_MAX_BACKUPS};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// One version-to-version upgrade of the typed config
pub trait Migration {
    /// Version this step upgrades FROM
    fn from_version(&self) -> &str;

    /// Version this step upgrades TO
    fn to_version(&self) -> &str;

    /// One-line summary shown in logs and reports
    fn description(&self) -> &str;

    /// Transforms the config in place
    ///
    /// Must not drop user-set values the step does not own.
    fn migrate(&self, config: &mut Config) -> ConfigResult<()>;
}

/// 1.0 → 2.0: the `[limits]` section is gone and `[search]` is new
///
/// Search values (including the relocated popularity flag) are already merged
/// by the loader, so only the deprecated section needs handling here.
struct RemoveLimitsAddSearch;

impl Migration for RemoveLimitsAddSearch {
    fn from_version(&self) -> &str {
        "1.0"
    }

    fn to_version(&self) -> &str {
        "2.0"
    }

    fn description(&self) -> &str {
        "Remove deprecated limits section, add search section"
    }

    fn migrate(&self, config: &mut Config) -> ConfigResult<()> {
        if let Some(limits) = config.limits.take() {
            log::info!(
                "Dropping deprecated [limits] (max_source_file_size = {}, file_copy_buffer_size = {})",
                limits.max_source_file_size,
                limits.file_copy_buffer_size
            );
        }
        log::debug!(
            "Search settings: result_limit = {}, enable_popularity_sort = {}",
            config.search.result_limit,
            config.search.enable_popularity_sort
        );
        Ok(())
    }
}

/// Registered steps keyed by origin version
#[derive(Default)]
pub struct MigrationRegistry {
    steps: BTreeMap<String, Box<dyn Migration>>,
}

impl MigrationRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The steps shipped with this release
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.steps.insert(
            RemoveLimitsAddSearch.from_version().to_string(),
            Box::new(RemoveLimitsAddSearch),
        );
        registry
    }

    /// Adds a step
    ///
    /// Fails if a step from the same version exists or the step does not
    /// change the version.
    pub fn register(&mut self, step: Box<dyn Migration>) -> ConfigResult<()> {
        let from = step.from_version().to_string();
        if from == step.to_version() {
            return Err(ConfigError::SelfMigration { version: from });
        }
        if self.steps.contains_key(&from) {
            return Err(ConfigError::DuplicateMigration { from });
        }
        self.steps.insert(from, step);
        Ok(())
    }

    /// The step that upgrades from `version`, if any
    pub fn step_from(&self, version: &str) -> Option<&dyn Migration> {
        self.steps.get(version).map(|step| step.as_ref())
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Resolves the chain of steps from `from` to `to`
    ///
    /// A version reached twice means the chain loops and can never arrive.
    pub fn plan(&self, from: &str, to: &str) -> ConfigResult<Vec<&dyn Migration>> {
        let mut chain = Vec::new();
        let mut visited = BTreeSet::new();
        let mut current = from;
        visited.insert(current);

        while current != to {
            let no_path = || ConfigError::NoMigrationPath {
                from: from.to_string(),
                to: to.to_string(),
                stuck_at: current.to_string(),
            };
            let step = self.step_from(current).ok_or_else(no_path)?;
            if !visited.insert(step.to_version()) {
                log::warn!(
                    "Migration chain loops back to version {}",
                    step.to_version()
                );
                return Err(no_path());
            }
            chain.push(step);
            current = step.to_version();
        }

        Ok(chain)
    }
}

/// Whether a safety copy exists for a migration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupStatus {
    /// No transform ran, so nothing was snapshotted
    NotNeeded,
    /// The original file was copied here before the first transform
    Created(PathBuf),
    /// The snapshot failed; the migration ran without a safety net
    Failed(String),
}

/// What a `migrate` call did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub from_version: String,
    pub to_version: String,
    /// Descriptions of the steps applied, in order
    pub applied: Vec<String>,
    pub backup: BackupStatus,
}

impl MigrationReport {
    fn unchanged(version: &str) -> Self {
        Self {
            from_version: version.to_string(),
            to_version: version.to_string(),
            applied: Vec::new(),
            backup: BackupStatus::NotNeeded,
        }
    }

    /// True if at least one step ran
    pub fn migrated(&self) -> bool {
        !self.applied.is_empty()
    }

    /// True if steps ran without a backup
    pub fn is_degraded(&self) -> bool {
        matches!(self.backup, BackupStatus::Failed(_))
    }
}

/// Applies registered steps to bring a config up to the target version
pub struct MigrationEngine {
    registry: MigrationRegistry,
    target_version: String,
    max_backups: usize,
}

impl Default for MigrationEngine {
    fn default() -> Self {
        Self::new(MigrationRegistry::builtin(), CURRENT_CONFIG_VERSION)
    }
}

impl MigrationEngine {
    pub fn new(registry: MigrationRegistry, target_version: impl Into<String>) -> Self {
        Self {
            registry,
            target_version: target_version.into(),
            max_backups: DEFAULT_MAX_BACKUPS,
        }
    }

    /// Sets how many backups survive pruning after a successful migration
    ///
    /// The snapshot taken by the run itself is always kept, so a value of
    /// zero behaves like one.
    pub fn with_max_backups(mut self, max: usize) -> Self {
        self.max_backups = max;
        self
    }

    pub fn max_backups(&self) -> usize {
        self.max_backups
    }

    pub fn target_version(&self) -> &str {
        &self.target_version
    }

    pub fn registry(&self) -> &MigrationRegistry {
        &self.registry
    }

    /// Upgrades `config`, which was read from `config_path`
    ///
    /// An already-current config is returned untouched with no backup taken.
    /// The file itself is never written here; on transform failure it is
    /// restored from the snapshot so it matches its pre-call content.
    pub fn migrate(
        &self,
        mut config: Config,
        config_path: &Path,
    ) -> ConfigResult<(Config, MigrationReport)> {
        let start = config.effective_version().to_string();
        if start == self.target_version {
            log::debug!("Config already at version {}", start);
            return Ok((config, MigrationReport::unchanged(&start)));
        }

        let chain = self.registry.plan(&start, &self.target_version)?;
        log::info!(
            "Migrating config from version {} to {} ({} step(s))",
            start,
            self.target_version,
            chain.len()
        );

        let backups = BackupManager::new(config_path);
        let mut report = MigrationReport::unchanged(&start);

        for step in chain {
            if report.applied.is_empty() {
                report.backup = take_snapshot(&backups);
            }

            if let Err(e) = step.migrate(&mut config) {
                log::error!(
                    "Migration step {} -> {} failed: {}",
                    step.from_version(),
                    step.to_version(),
                    e
                );
                let restore = restore_original(&backups, &report.backup);
                return Err(ConfigError::MigrationFailed {
                    from: step.from_version().to_string(),
                    to: step.to_version().to_string(),
                    reason: Box::new(e),
                    restore,
                });
            }

            config.config_version = step.to_version().to_string();
            report.applied.push(step.description().to_string());
            log::info!(
                "Applied migration {} -> {}: {}",
                step.from_version(),
                step.to_version(),
                step.description()
            );
        }

        if matches!(report.backup, BackupStatus::Created(_)) {
            backups.prune(self.max_backups.max(1));
        }

        report.to_version = config.config_version.clone();
        log::info!(
            "Config migrated from {} to {}",
            report.from_version,
            report.to_version
        );
        Ok((config, report))
    }
}

fn take_snapshot(backups: &BackupManager) -> BackupStatus {
    match backups.snapshot() {
        Ok(path) => BackupStatus::Created(path),
        Err(e) => {
            log::warn!("Could not back up config before migrating, continuing without one: {}", e);
            BackupStatus::Failed(e.to_string())
        }
    }
}

fn restore_original(backups: &BackupManager, status: &BackupStatus) -> RestoreOutcome {
    let BackupStatus::Created(backup) = status else {
        log::warn!("No backup available to restore from");
        return RestoreOutcome::NoBackup;
    };

    match backups.restore(backup) {
        Ok(()) => RestoreOutcome::Restored(backup.clone()),
        Err(e) => {
            log::error!("Restoring from {} failed: {}", backup.display(), e);
            RestoreOutcome::Failed {
                backup: backup.clone(),
                error: Box::new(e),
            }
        }
    }
}
