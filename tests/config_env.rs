mod support;

use std::path::PathBuf;

use depscreen::app_dirs::APP_DIR_NAME;
use depscreen::config::{self, CONFIG_FILE_NAME};
use depscreen::predict::{CacheState, ScreeningService};
use support::depscreen_env::DepscreenEnvGuard;

#[test]
fn settings_are_read_from_config_home() {
    let temp = tempfile::tempdir().expect("create tempdir");
    let _env = DepscreenEnvGuard::set_config_home(temp.path().to_path_buf());
    let app_dir = temp.path().join(APP_DIR_NAME);
    std::fs::create_dir_all(&app_dir).expect("create app dir");
    std::fs::write(
        app_dir.join(CONFIG_FILE_NAME),
        "[paths]\nartifact = \"elsewhere/model.json\"\n\n[serving]\nrisk_threshold = 0.35\n",
    )
    .expect("write config");

    let settings = config::load_or_default().expect("load settings");
    assert_eq!(settings.paths.artifact, PathBuf::from("elsewhere/model.json"));
    assert_eq!(settings.serving.risk_threshold, 0.35);
    assert_eq!(settings.training.trees, 100);
}

#[test]
fn service_built_from_settings_starts_unloaded() {
    let temp = tempfile::tempdir().expect("create tempdir");
    let _env = DepscreenEnvGuard::set_config_home(temp.path().to_path_buf());
    let mut settings = config::load_or_default().expect("defaults");
    settings.paths.artifact = temp.path().join("absent.json");

    let mut service = ScreeningService::from_settings(&settings);
    assert_eq!(service.cache().state(), CacheState::NotLoaded);
    assert!(service.ensure_ready().is_err());
    assert_eq!(service.cache().state(), CacheState::Failed);
    assert_eq!(service.cache().path(), temp.path().join("absent.json"));
}
