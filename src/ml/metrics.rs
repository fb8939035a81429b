//! Evaluation metrics for the binary classifier.

use serde::{Deserialize, Serialize};

/// 2x2 confusion matrix with `1` as the positive class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryConfusion {
    pub true_positive: u32,
    pub false_positive: u32,
    pub true_negative: u32,
    pub false_negative: u32,
}

impl BinaryConfusion {
    /// Tally `(truth, predicted)` label pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (u8, u8)>) -> Self {
        let mut cm = Self::default();
        for (truth, predicted) in pairs {
            cm.add(truth, predicted);
        }
        cm
    }

    pub fn add(&mut self, truth: u8, predicted: u8) {
        let slot = match (truth != 0, predicted != 0) {
            (true, true) => &mut self.true_positive,
            (false, true) => &mut self.false_positive,
            (false, false) => &mut self.true_negative,
            (true, false) => &mut self.false_negative,
        };
        *slot = slot.saturating_add(1);
    }

    pub fn total(&self) -> u64 {
        self.true_positive as u64
            + self.false_positive as u64
            + self.true_negative as u64
            + self.false_negative as u64
    }

    /// Share of correct predictions; `0.0` when empty.
    pub fn accuracy(&self) -> f32 {
        ratio(
            self.true_positive as u64 + self.true_negative as u64,
            self.total(),
        )
    }

    /// `TP / (TP + FP)`.
    pub fn precision(&self) -> f32 {
        ratio(
            self.true_positive as u64,
            self.true_positive as u64 + self.false_positive as u64,
        )
    }

    /// `TP / (TP + FN)`.
    pub fn recall(&self) -> f32 {
        ratio(
            self.true_positive as u64,
            self.true_positive as u64 + self.false_negative as u64,
        )
    }

    pub fn f1(&self) -> f32 {
        let (p, r) = (self.precision(), self.recall());
        if p + r == 0.0 { 0.0 } else { 2.0 * p * r / (p + r) }
    }

    pub fn summary(&self) -> EvaluationSummary {
        EvaluationSummary {
            rows: self.total(),
            accuracy: self.accuracy(),
            precision: self.precision(),
            recall: self.recall(),
            f1: self.f1(),
            confusion: *self,
        }
    }
}

/// Serialized metrics snapshot stored next to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    /// Number of evaluated rows.
    pub rows: u64,
    pub accuracy: f32,
    pub precision: f32,
    pub recall: f32,
    pub f1: f32,
    pub confusion: BinaryConfusion,
}

fn ratio(num: u64, den: u64) -> f32 {
    if den == 0 {
        0.0
    } else {
        num as f32 / den as f32
    }
}
