//! Preprocessing contract shared by training, evaluation and serving.
//!
//! Dataset rows and form submissions go through the same encode-and-reorder
//! routine, so a feature vector built at inference time lines up slot for
//! slot with the vectors the forest was trained on.

mod encoder;
mod impute;
mod record;
mod transform;

pub use encoder::CategoryEncoder;
pub use impute::ImputationStats;
pub use record::{FieldValue, RawRecord};
pub use transform::{FeatureLayout, RangePolicy};

use thiserror::Error;

/// Per-record failures while turning raw answers into a feature vector.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PreprocessError {
    /// A categorical value that was never observed during training.
    #[error("Unknown value {value:?} for field '{field}'; it was not seen during training")]
    UnknownCategory { field: String, value: String },
    /// The record does not line up with the trained feature list.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),
    /// A numeric answer outside its declared range.
    #[error("Value {value} for field '{field}' is outside [{min}, {max}]")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },
}
