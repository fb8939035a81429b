//! Labeled survey data as read from the training CSV.

pub mod loader;
pub mod split;

use crate::preprocess::{FieldValue, RawRecord};

pub use loader::{DatasetError, load_csv, read_csv};

/// Cell values of one predictor column; `None` marks a missing cell.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Numeric(Vec<Option<f64>>),
    Categorical(Vec<Option<String>>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Numeric(values) => values.len(),
            ColumnValues::Categorical(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn missing_count(&self) -> usize {
        match self {
            ColumnValues::Numeric(values) => values.iter().filter(|v| v.is_none()).count(),
            ColumnValues::Categorical(values) => values.iter().filter(|v| v.is_none()).count(),
        }
    }

    fn cell(&self, row: usize) -> Option<FieldValue> {
        match self {
            ColumnValues::Numeric(values) => values.get(row).copied().flatten().map(FieldValue::Number),
            ColumnValues::Categorical(values) => values
                .get(row)
                .and_then(|v| v.clone())
                .map(FieldValue::Category),
        }
    }
}

/// A named predictor column.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetColumn {
    pub name: String,
    pub values: ColumnValues,
}

impl DatasetColumn {
    pub fn is_numeric(&self) -> bool {
        matches!(self.values, ColumnValues::Numeric(_))
    }
}

/// Predictor columns in header order plus the binary target.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentDataset {
    columns: Vec<DatasetColumn>,
    target: Vec<u8>,
}

impl StudentDataset {
    /// Assemble a dataset, checking that every column matches the target length.
    pub fn from_parts(columns: Vec<DatasetColumn>, target: Vec<u8>) -> Result<Self, DatasetError> {
        if let Some(column) = columns.iter().find(|c| c.values.len() != target.len()) {
            return Err(DatasetError::RaggedColumn {
                column: column.name.clone(),
                expected: target.len(),
                found: column.values.len(),
            });
        }
        Ok(Self { columns, target })
    }

    pub fn len(&self) -> usize {
        self.target.len()
    }

    pub fn is_empty(&self) -> bool {
        self.target.is_empty()
    }

    pub fn columns(&self) -> &[DatasetColumn] {
        &self.columns
    }

    pub(crate) fn columns_mut(&mut self) -> &mut [DatasetColumn] {
        &mut self.columns
    }

    pub fn column(&self, name: &str) -> Option<&DatasetColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn target(&self) -> &[u8] {
        &self.target
    }

    /// Feature order used for training: numeric columns first, then
    /// categorical columns, each group in header order.
    pub fn feature_names(&self) -> Vec<String> {
        let numeric = self.columns.iter().filter(|c| c.is_numeric());
        let categorical = self.columns.iter().filter(|c| !c.is_numeric());
        numeric.chain(categorical).map(|c| c.name.clone()).collect()
    }

    /// Total number of missing cells across predictor columns.
    pub fn missing_count(&self) -> usize {
        self.columns.iter().map(|c| c.values.missing_count()).sum()
    }

    /// Raw answers for one row; missing cells are left out.
    pub fn row_record(&self, row: usize) -> RawRecord {
        let mut record = RawRecord::new();
        for column in &self.columns {
            if let Some(value) = column.values.cell(row) {
                record.insert(column.name.clone(), value);
            }
        }
        record
    }
}
