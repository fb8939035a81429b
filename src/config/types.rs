use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::artifact::DEFAULT_ARTIFACT_FILE;
use crate::ml::forest::MaxFeatures;

use super::DEFAULT_DATASET_FILE;

/// Errors that may occur while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to create the config directory.
    #[error("Unable to create config directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// No usable config directory found.
    #[error("No suitable config directory found")]
    NoConfigDir,
}

/// Top-level settings file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub paths: PathSettings,
    #[serde(default)]
    pub training: TrainingSettings,
    #[serde(default)]
    pub serving: ServingSettings,
}

impl AppSettings {
    pub(crate) fn normalized(self) -> Self {
        Self {
            paths: self.paths,
            training: self.training.normalized(),
            serving: self.serving.normalized(),
        }
    }
}

/// Where the dataset and the artifact live. Relative paths resolve against
/// the working directory.
///
/// Config keys: `dataset`, `artifact`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSettings {
    #[serde(default = "default_dataset_path")]
    pub dataset: PathBuf,
    #[serde(default = "default_artifact_path")]
    pub artifact: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            dataset: default_dataset_path(),
            artifact: default_artifact_path(),
        }
    }
}

/// Forest and split hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSettings {
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,
    #[serde(default = "default_trees")]
    pub trees: usize,
    /// Absent or `0` means unlimited.
    #[serde(default)]
    pub max_depth: Option<usize>,
    #[serde(default = "default_min_samples_split")]
    pub min_samples_split: usize,
    #[serde(default = "default_min_samples_leaf")]
    pub min_samples_leaf: usize,
    #[serde(default)]
    pub max_features: MaxFeatures,
}

impl Default for TrainingSettings {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            test_fraction: default_test_fraction(),
            trees: default_trees(),
            max_depth: None,
            min_samples_split: default_min_samples_split(),
            min_samples_leaf: default_min_samples_leaf(),
            max_features: MaxFeatures::default(),
        }
    }
}

impl TrainingSettings {
    pub(crate) fn normalized(mut self) -> Self {
        self.test_fraction = clamp_test_fraction(self.test_fraction);
        self.trees = self.trees.clamp(1, MAX_TREES);
        self.max_depth = self.max_depth.filter(|depth| *depth > 0);
        self.min_samples_split = self.min_samples_split.max(2);
        self.min_samples_leaf = self.min_samples_leaf.max(1);
        self
    }
}

/// Inference settings.
///
/// Config keys: `risk_threshold`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServingSettings {
    /// Positive probability at or above which the label is 1.
    #[serde(default = "default_risk_threshold")]
    pub risk_threshold: f32,
}

impl Default for ServingSettings {
    fn default() -> Self {
        Self {
            risk_threshold: default_risk_threshold(),
        }
    }
}

impl ServingSettings {
    pub(crate) fn normalized(mut self) -> Self {
        self.risk_threshold = clamp_risk_threshold(self.risk_threshold);
        self
    }
}

const MAX_TREES: usize = 2_000;
const MIN_TEST_FRACTION: f64 = 0.05;
const MAX_TEST_FRACTION: f64 = 0.5;

fn default_dataset_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATASET_FILE)
}

fn default_artifact_path() -> PathBuf {
    PathBuf::from(DEFAULT_ARTIFACT_FILE)
}

fn default_seed() -> u64 {
    42
}

fn default_test_fraction() -> f64 {
    0.2
}

fn default_trees() -> usize {
    100
}

fn default_min_samples_split() -> usize {
    2
}

fn default_min_samples_leaf() -> usize {
    1
}

fn default_risk_threshold() -> f32 {
    0.5
}

pub(crate) fn clamp_test_fraction(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(MIN_TEST_FRACTION, MAX_TEST_FRACTION)
    } else {
        default_test_fraction()
    }
}

fn clamp_risk_threshold(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        default_risk_threshold()
    }
}
