use std::path::PathBuf;

use tempfile::tempdir;

use super::*;
use crate::app_dirs::{APP_DIR_NAME, OverrideGuard};
use crate::ml::forest::MaxFeatures;

#[test]
fn missing_file_yields_defaults() {
    let dir = tempdir().unwrap();
    let settings = load_from(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
    assert_eq!(settings, AppSettings::default());
    assert_eq!(settings.paths.dataset, PathBuf::from(DEFAULT_DATASET_FILE));
    assert_eq!(settings.paths.artifact, PathBuf::from("depression_model.json"));
    assert_eq!(settings.training.seed, 42);
    assert_eq!(settings.training.trees, 100);
    assert_eq!(settings.serving.risk_threshold, 0.5);
}

#[test]
fn partial_file_keeps_other_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(
        &path,
        "[training]\ntrees = 25\nmax_features = \"log2\"\n\n[paths]\nartifact = \"out/model.json\"\n",
    )
    .unwrap();
    let settings = load_from(&path).unwrap();
    assert_eq!(settings.training.trees, 25);
    assert_eq!(settings.training.max_features, MaxFeatures::Log2);
    assert_eq!(settings.training.seed, 42);
    assert_eq!(settings.paths.artifact, PathBuf::from("out/model.json"));
    assert_eq!(settings.paths.dataset, PathBuf::from(DEFAULT_DATASET_FILE));
}

#[test]
fn out_of_range_values_are_clamped() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(
        &path,
        "[training]\ntest_fraction = 0.95\ntrees = 0\nmax_depth = 0\nmin_samples_split = 1\nmin_samples_leaf = 0\n\n[serving]\nrisk_threshold = 3.0\n",
    )
    .unwrap();
    let settings = load_from(&path).unwrap();
    assert_eq!(settings.training.test_fraction, 0.5);
    assert_eq!(settings.training.trees, 1);
    assert_eq!(settings.training.max_depth, None);
    assert_eq!(settings.training.min_samples_split, 2);
    assert_eq!(settings.training.min_samples_leaf, 1);
    assert_eq!(settings.serving.risk_threshold, 1.0);
}

#[test]
fn malformed_toml_is_reported_with_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "[training\ntrees = ").unwrap();
    let err = load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ParseToml { path: p, .. } if p == path));
}

#[test]
fn config_path_lives_in_app_dir() {
    let base = tempdir().unwrap();
    let _guard = OverrideGuard::set(base.path().to_path_buf());
    let path = config_path().unwrap();
    assert_eq!(path, base.path().join(APP_DIR_NAME).join(CONFIG_FILE_NAME));
    assert_eq!(load_or_default().unwrap(), AppSettings::default());
}
