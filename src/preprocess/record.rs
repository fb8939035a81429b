use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One raw answer: either a number or a category label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Category(String),
}

impl FieldValue {
    fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Number(_) => "number",
            FieldValue::Category(_) => "category",
        }
    }

    pub(super) fn describe(&self) -> String {
        match self {
            FieldValue::Number(value) => format!("{} {value}", self.kind_name()),
            FieldValue::Category(value) => format!("{} {value:?}", self.kind_name()),
        }
    }
}

/// A single student's answers keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    values: BTreeMap<String, FieldValue>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style numeric insert.
    pub fn with_number(mut self, field: impl Into<String>, value: f64) -> Self {
        self.insert(field, FieldValue::Number(value));
        self
    }

    /// Builder-style categorical insert.
    pub fn with_category(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(field, FieldValue::Category(value.into()));
        self
    }

    /// Insert or replace a field, returning the previous value.
    pub fn insert(&mut self, field: impl Into<String>, value: FieldValue) -> Option<FieldValue> {
        self.values.insert(field.into(), value)
    }

    pub fn remove(&mut self, field: &str) -> Option<FieldValue> {
        self.values.remove(field)
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    /// Field names in ascending order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
