//! Property-style tests for the configuration system

use fontdock_config::backup::BackupManager;
use fontdock_config::migration::MigrationEngine;
use fontdock_config::{
    load_from_bytes, Config, ConfigManager, UpdateChannel, CURRENT_CONFIG_VERSION,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

#[test]
fn property_default_always_valid() {
    let config = Config::default();
    assert!(config.validate().is_ok());
}

#[test]
fn property_load_save_idempotent() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let manager = ConfigManager::with_directory(temp_dir.path().to_path_buf())?;

    let mut config = Config::default();
    config.update.channel = UpdateChannel::Nightly;
    manager.save(&config)?;
    let loaded = manager.load()?;
    let first_bytes = fs::read(manager.config_path())?;

    manager.save(&loaded)?;
    let loaded2 = manager.load()?;
    assert_eq!(loaded, loaded2);
    assert_eq!(fs::read(manager.config_path())?, first_bytes);
    Ok(())
}

#[test]
fn property_validation_deterministic() {
    let mut config = Config::default();
    config.logging.max_log_files = 0;
    config.search.enable_popularity_sort = false;

    let result1 = config.validate();
    let result2 = config.validate();
    assert_eq!(result1, result2);
}

#[test]
fn property_bool_spellings_agree() -> Result<(), Box<dyn std::error::Error>> {
    let cases = [
        ("true", true),
        ("false", false),
        ("\"true\"", true),
        ("\"FALSE\"", false),
        ("\"1\"", true),
        ("\"0\"", false),
        ("\"yes\"", true),
        ("\"No\"", false),
    ];

    for (spelling, expected) in cases {
        let text = format!(
            "[general]\n[logging]\nlog_path = \"x\"\nmax_log_size = \"1MB\"\nmax_log_files = 1\n[update]\nauto_check = {}\n",
            spelling
        );
        let config = load_from_bytes(text.as_bytes(), Path::new("bools.toml"))?;
        assert_eq!(config.update.auto_check, expected, "spelling {}", spelling);
    }
    Ok(())
}

#[test]
fn property_migration_always_reaches_current() -> Result<(), Box<dyn std::error::Error>> {
    let engine = MigrationEngine::default();
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("config.toml");
    fs::write(&path, "[general]\n")?;

    for tag in ["", "1.0", "2.0"] {
        let mut config = Config::default();
        config.config_version = tag.to_string();

        let (migrated, _) = engine.migrate(config, &path)?;
        assert_eq!(migrated.config_version, CURRENT_CONFIG_VERSION);

        let (again, report) = engine.migrate(migrated.clone(), &path)?;
        assert_eq!(again, migrated);
        assert!(!report.migrated());
    }
    Ok(())
}

#[test]
fn property_prune_keeps_newest() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("config.toml");
    fs::write(&path, "x")?;
    let backups = BackupManager::new(&path);

    let mut created = Vec::new();
    for _ in 0..6 {
        created.push(backups.snapshot()?);
    }

    for keep in (0..=6).rev() {
        backups.prune(keep);
        let remaining: Vec<_> = backups.list_backups()?.into_iter().map(|b| b.path).collect();
        let expected: Vec<_> = created.iter().rev().take(keep).cloned().collect();
        assert_eq!(remaining, expected);
    }
    Ok(())
}

#[test]
fn property_config_file_size_bounded() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let manager = ConfigManager::with_directory(temp_dir.path().to_path_buf())?;

    let mut config = Config::default();
    config.general.default_editor = "code --wait".to_string();
    manager.save(&config)?;

    let metadata = fs::metadata(manager.config_path())?;
    assert!(metadata.len() < 10_000);
    Ok(())
}

#[test]
fn property_update_never_corrupts() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let manager = ConfigManager::with_directory(temp_dir.path().to_path_buf())?;
    manager.initialize()?;

    for i in 0..20u32 {
        // Every fifth update is invalid and must be refused without damage
        let result = manager.update(|config| {
            config.update.check_interval_hours = i % 5;
        });
        assert_eq!(result.is_ok(), i % 5 != 0);
        assert!(manager.load().is_ok());
    }
    Ok(())
}
