//! Versioned artifact bundle written by training and read by serving.
//!
//! One JSON file holds everything inference needs: the ordered feature
//! names, the fitted encoders, the imputation statistics, the forest and the
//! held-out evaluation. A bundle is immutable once written.

mod io;

pub use io::{load, save};

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ml::forest::RandomForestModel;
use crate::ml::metrics::EvaluationSummary;
use crate::preprocess::{CategoryEncoder, FeatureLayout, ImputationStats};
use crate::schema::{self, TARGET_COLUMN};

/// Current on-disk format version.
pub const BUNDLE_FORMAT_VERSION: u32 = 1;
/// File name used when no path is configured.
pub const DEFAULT_ARTIFACT_FILE: &str = "depression_model.json";

#[derive(Debug, Error)]
pub enum ArtifactError {
    /// No bundle at the expected path.
    #[error("Model artifact '{path}' not found; run depscreen-train first")]
    Missing { path: PathBuf },
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid artifact at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Unsupported artifact format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
    /// Feature list or encoders disagree with the compiled-in schema.
    #[error("Artifact does not match the survey schema: {0}")]
    SchemaMismatch(String),
    #[error("Artifact contains an invalid model: {0}")]
    InvalidModel(String),
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to serialize artifact: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Everything inference needs, produced by one training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactBundle {
    pub format_version: u32,
    /// Name of the label column the model predicts.
    pub target: String,
    /// Training-time column order of the feature vector.
    pub feature_names: Vec<String>,
    /// Encoders keyed by categorical field name.
    pub encoders: BTreeMap<String, CategoryEncoder>,
    pub imputation: ImputationStats,
    pub model: RandomForestModel,
    /// Held-out metrics from the training run.
    pub evaluation: EvaluationSummary,
}

impl ArtifactBundle {
    /// Check the bundle against the compiled-in schema and its own model.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.format_version != BUNDLE_FORMAT_VERSION {
            return Err(ArtifactError::UnsupportedVersion {
                found: self.format_version,
                expected: BUNDLE_FORMAT_VERSION,
            });
        }
        if self.target != TARGET_COLUMN {
            return Err(ArtifactError::SchemaMismatch(format!(
                "target is '{}' but expected '{TARGET_COLUMN}'",
                self.target
            )));
        }

        let mut seen = std::collections::BTreeSet::new();
        for name in &self.feature_names {
            if !seen.insert(name.as_str()) {
                return Err(ArtifactError::SchemaMismatch(format!(
                    "feature '{name}' is listed twice"
                )));
            }
            let spec = schema::field(name).ok_or_else(|| {
                ArtifactError::SchemaMismatch(format!("unknown feature '{name}'"))
            })?;
            match (spec.is_categorical(), self.encoders.get(name)) {
                (true, None) => {
                    return Err(ArtifactError::SchemaMismatch(format!(
                        "categorical feature '{name}' has no encoder"
                    )));
                }
                (false, Some(_)) => {
                    return Err(ArtifactError::SchemaMismatch(format!(
                        "numeric feature '{name}' has an encoder"
                    )));
                }
                _ => {}
            }
        }
        if let Some(missing) = schema::field_names().find(|name| !seen.contains(name)) {
            return Err(ArtifactError::SchemaMismatch(format!(
                "feature '{missing}' is missing"
            )));
        }

        for (name, encoder) in &self.encoders {
            if !seen.contains(name.as_str()) {
                return Err(ArtifactError::SchemaMismatch(format!(
                    "encoder for '{name}' does not belong to any feature"
                )));
            }
            if &encoder.field != name {
                return Err(ArtifactError::SchemaMismatch(format!(
                    "encoder stored under '{name}' is for '{}'",
                    encoder.field
                )));
            }
            encoder.validate().map_err(ArtifactError::SchemaMismatch)?;
        }

        self.model.validate().map_err(ArtifactError::InvalidModel)?;
        if self.model.feature_len != self.feature_names.len() {
            return Err(ArtifactError::SchemaMismatch(format!(
                "model expects {} features but the bundle lists {}",
                self.model.feature_len,
                self.feature_names.len()
            )));
        }
        Ok(())
    }

    /// Encode-and-reorder view over this bundle.
    pub fn layout(&self) -> FeatureLayout<'_> {
        FeatureLayout::new(&self.feature_names, &self.encoders)
    }
}

/// Small valid bundle whose single tree splits on `Gender`.
#[cfg(test)]
pub(crate) fn fixture_bundle() -> ArtifactBundle {
    use crate::ml::forest::{
        DecisionTree, FOREST_MODEL_TYPE, FOREST_MODEL_VERSION, ForestParams, TreeNode,
    };
    use crate::ml::metrics::BinaryConfusion;

    let numeric = schema::STUDENT_FIELDS.iter().filter(|s| !s.is_categorical());
    let categorical = schema::STUDENT_FIELDS.iter().filter(|s| s.is_categorical());
    let feature_names: Vec<String> = numeric
        .chain(categorical)
        .map(|spec| spec.name.to_string())
        .collect();
    let encoders: BTreeMap<String, CategoryEncoder> = schema::STUDENT_FIELDS
        .iter()
        .filter(|spec| spec.is_categorical())
        .map(|spec| {
            let classes: &[&str] = if spec.name == "Gender" {
                &["Male", "Female"]
            } else {
                &["No", "Yes"]
            };
            (
                spec.name.to_string(),
                CategoryEncoder::fit(spec.name, classes.iter().copied()),
            )
        })
        .collect();
    let gender_idx = feature_names
        .iter()
        .position(|name| name == "Gender")
        .unwrap_or(0) as u16;
    let tree = DecisionTree {
        nodes: vec![
            TreeNode::Split {
                feature_index: gender_idx,
                threshold: 0.5,
                left: 1,
                right: 2,
            },
            TreeNode::Leaf {
                positive_rate: 0.75,
                samples: 4,
            },
            TreeNode::Leaf {
                positive_rate: 0.25,
                samples: 4,
            },
        ],
    };
    ArtifactBundle {
        format_version: BUNDLE_FORMAT_VERSION,
        target: TARGET_COLUMN.to_string(),
        encoders,
        imputation: ImputationStats::default(),
        model: RandomForestModel {
            model_version: FOREST_MODEL_VERSION,
            model_type: FOREST_MODEL_TYPE.to_string(),
            feature_len: feature_names.len(),
            params: ForestParams::default(),
            trees: vec![tree],
        },
        evaluation: BinaryConfusion::from_pairs([(1, 1), (0, 0)]).summary(),
        feature_names,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_is_valid() {
        fixture_bundle().validate().unwrap();
    }

    #[test]
    fn other_versions_are_rejected() {
        let mut bundle = fixture_bundle();
        bundle.format_version = 2;
        assert!(matches!(
            bundle.validate(),
            Err(ArtifactError::UnsupportedVersion {
                found: 2,
                expected: 1
            })
        ));
    }

    #[test]
    fn feature_set_must_match_schema() {
        let mut missing = fixture_bundle();
        missing.feature_names.retain(|name| name != "CGPA");
        assert!(matches!(
            missing.validate(),
            Err(ArtifactError::SchemaMismatch(_))
        ));

        let mut renamed = fixture_bundle();
        renamed.feature_names[0] = "Shoe Size".into();
        assert!(matches!(
            renamed.validate(),
            Err(ArtifactError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn encoders_must_line_up_with_field_kinds() {
        let mut numeric_encoded = fixture_bundle();
        numeric_encoded
            .encoders
            .insert("Age".into(), CategoryEncoder::fit("Age", ["20"]));
        assert!(matches!(
            numeric_encoded.validate(),
            Err(ArtifactError::SchemaMismatch(_))
        ));

        let mut unencoded = fixture_bundle();
        unencoded.encoders.remove("City");
        assert!(matches!(
            unencoded.validate(),
            Err(ArtifactError::SchemaMismatch(_))
        ));

        let mut unsorted = fixture_bundle();
        if let Some(encoder) = unsorted.encoders.get_mut("Degree") {
            encoder.classes.reverse();
        }
        assert!(matches!(
            unsorted.validate(),
            Err(ArtifactError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn broken_model_is_invalid() {
        let mut bundle = fixture_bundle();
        bundle.model.trees.clear();
        assert!(matches!(
            bundle.validate(),
            Err(ArtifactError::InvalidModel(_))
        ));
    }
}
