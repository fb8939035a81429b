//! Inference over a loaded artifact bundle.
//!
//! [`Predictor`] is the pure scoring path. [`BundleCache`] owns the
//! load-once lifecycle and [`ScreeningService`] is what the form talks to.

mod cache;
mod service;

pub use cache::{BundleCache, CacheState};
pub use service::{ScreeningService, ServeError};

use std::path::Path;

use crate::artifact::{self, ArtifactBundle, ArtifactError};
use crate::preprocess::{PreprocessError, RangePolicy, RawRecord};

/// Default positive-probability cut-off.
pub const DEFAULT_RISK_THRESHOLD: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    Low,
    High,
}

impl RiskLevel {
    pub fn headline(self) -> &'static str {
        match self {
            RiskLevel::Low => "Low Risk Detected",
            RiskLevel::High => "High Risk Detected",
        }
    }
}

/// Outcome for one record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// `1` for elevated risk.
    pub label: u8,
    /// Positive-class probability, whichever label was chosen.
    pub probability: f32,
}

impl Prediction {
    pub fn risk_level(&self) -> RiskLevel {
        if self.label == 1 {
            RiskLevel::High
        } else {
            RiskLevel::Low
        }
    }
}

/// Validated bundle plus the decision threshold.
#[derive(Debug, Clone)]
pub struct Predictor {
    bundle: ArtifactBundle,
    threshold: f32,
}

impl Predictor {
    pub fn from_bundle(bundle: ArtifactBundle, threshold: f32) -> Result<Self, ArtifactError> {
        bundle.validate()?;
        Ok(Self {
            bundle,
            threshold: threshold.clamp(0.0, 1.0),
        })
    }

    pub fn load(path: &Path, threshold: f32) -> Result<Self, ArtifactError> {
        Self::from_bundle(artifact::load(path)?, threshold)
    }

    /// Score a form submission. Numeric answers must lie in their schema range.
    pub fn predict(&self, record: &RawRecord) -> Result<Prediction, PreprocessError> {
        self.predict_with(record, RangePolicy::Validate)
    }

    pub fn predict_with(
        &self,
        record: &RawRecord,
        policy: RangePolicy,
    ) -> Result<Prediction, PreprocessError> {
        let features = self.bundle.layout().encode(record, policy)?;
        Ok(self.predict_features(&features))
    }

    /// Score an already encoded feature vector in bundle order.
    pub fn predict_features(&self, features: &[f32]) -> Prediction {
        let probability = self.bundle.model.predict_proba(features);
        Prediction {
            label: u8::from(probability >= self.threshold),
            probability,
        }
    }

    /// Known labels of a categorical field, in code order.
    pub fn categories(&self, field: &str) -> Option<&[String]> {
        self.bundle
            .encoders
            .get(field)
            .map(|encoder| encoder.classes.as_slice())
    }

    pub fn feature_names(&self) -> &[String] {
        &self.bundle.feature_names
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn bundle(&self) -> &ArtifactBundle {
        &self.bundle
    }
}

#[cfg(test)]
pub(crate) fn fixture_record(gender: &str) -> RawRecord {
    use crate::schema::{FieldKind, STUDENT_FIELDS};
    let mut record = RawRecord::new();
    for spec in STUDENT_FIELDS.iter() {
        record = match spec.kind {
            FieldKind::Numeric(range) => record.with_number(spec.name, range.default),
            FieldKind::Categorical if spec.name == "Gender" => {
                record.with_category(spec.name, gender)
            }
            FieldKind::Categorical => record.with_category(spec.name, "No"),
        };
    }
    record
}
