use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::PreprocessError;

/// Fitted mapping from category labels to integer codes for one field.
///
/// Classes are kept in ascending byte-wise order and a label's code is its
/// index. The forest's split thresholds are expressed in these codes, so the
/// ordering is part of the trained model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEncoder {
    /// Column this encoder belongs to.
    pub field: String,
    /// Sorted, de-duplicated class labels.
    pub classes: Vec<String>,
}

impl CategoryEncoder {
    /// Fit an encoder over every observed value of a column.
    pub fn fit<'a>(field: impl Into<String>, values: impl IntoIterator<Item = &'a str>) -> Self {
        let classes: BTreeSet<&str> = values.into_iter().collect();
        Self {
            field: field.into(),
            classes: classes.into_iter().map(str::to_string).collect(),
        }
    }

    /// Code for `value`; unseen labels fail closed.
    pub fn encode(&self, value: &str) -> Result<u32, PreprocessError> {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(value))
            .map(|idx| idx as u32)
            .map_err(|_| PreprocessError::UnknownCategory {
                field: self.field.clone(),
                value: value.to_string(),
            })
    }

    /// Label for `code`, if it is in range.
    pub fn decode(&self, code: u32) -> Option<&str> {
        self.classes.get(code as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Check the invariants a loaded encoder must satisfy.
    pub fn validate(&self) -> Result<(), String> {
        if self.classes.is_empty() {
            return Err(format!("Encoder for '{}' has no classes", self.field));
        }
        if let Some(pair) = self.classes.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(format!(
                "Encoder for '{}' is not strictly ascending at {:?} / {:?}",
                self.field, pair[0], pair[1]
            ));
        }
        Ok(())
    }
}
