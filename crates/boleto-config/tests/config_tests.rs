use boleto_config::{Config, ConfigError, ConfigManager};
use tempfile::tempdir;

#[test]
fn default_config_targets_brazilian_reais() {
    let cfg = Config::default();

    assert_eq!(cfg.currency, "BRL");
    assert_eq!(cfg.locale, "pt-BR");
    assert_eq!(cfg.due_soon_days, 7);
    assert_eq!(cfg.backup_retention, 5);
}

#[test]
fn missing_file_loads_defaults() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");

    assert_eq!(manager.load().expect("load config"), Config::default());
    assert!(manager.backups_dir().exists());
    assert!(manager.config_path().ends_with("config/config.json"));
}

#[test]
fn config_manager_persists_and_loads_config() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("config.json"), dir.path().join("backups"));

    let mut cfg = Config::default();
    cfg.currency = "USD".to_string();
    cfg.locale = "en_US".to_string();
    cfg.set("due_soon_days", "3").expect("set window");

    manager.save(&cfg).expect("save config");
    let loaded = manager.load().expect("load config");

    assert_eq!(loaded, cfg);
    assert!(!dir.path().join("config.json.tmp").exists());
}

#[test]
fn backups_restore_previous_settings() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");

    let original = Config::default();
    manager.save(&original).expect("save");
    let name = manager
        .backup(&original, Some("before tweak"))
        .expect("backup config");
    assert!(name.starts_with("config_"));
    assert!(name.ends_with("_before-tweak.json"));

    let mut tweaked = original.clone();
    tweaked.set("upcoming_limit", "12").expect("set limit");
    manager.save(&tweaked).expect("save tweak");

    assert_eq!(manager.list_backups().expect("list"), vec![name.clone()]);
    let restored = manager.restore(&name).expect("restore");
    assert_eq!(restored, original);
    assert_eq!(manager.load().expect("reload"), original);
}

#[test]
fn restoring_unknown_backup_fails() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");
    assert!(matches!(
        manager.restore("config_20240101_000000.json"),
        Err(ConfigError::Io(_))
    ));
}

#[test]
fn corrupt_file_is_a_serde_error() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");
    std::fs::write(manager.config_path(), "{ not json").expect("write garbage");
    assert!(matches!(manager.load(), Err(ConfigError::Serde(_))));
}
