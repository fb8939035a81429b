//! CSV loader for the labeled survey file.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};
use thiserror::Error;

use crate::schema::{self, ID_COLUMN, TARGET_COLUMN};

use super::{ColumnValues, DatasetColumn, StudentDataset};

/// Cell spellings treated as missing in any column.
pub const MISSING_TOKENS: [&str; 9] = ["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None", "#N/A"];

#[derive(Debug, Error)]
pub enum DatasetError {
    /// The training file does not exist.
    #[error("Dataset file '{path}' not found")]
    Missing { path: PathBuf },
    #[error("Failed to open dataset {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Dataset is missing required column '{0}'")]
    MissingColumn(String),
    #[error("Dataset header lists column '{0}' more than once")]
    DuplicateColumn(String),
    #[error("Invalid target value {value:?} on line {line}; expected 0 or 1")]
    InvalidTarget { line: u64, value: String },
    #[error("Column '{column}' has {found} values but the target has {expected}")]
    RaggedColumn {
        column: String,
        expected: usize,
        found: usize,
    },
    #[error("Dataset has no data rows")]
    Empty,
}

/// Load the survey CSV at `path`.
pub fn load_csv(path: &Path) -> Result<StudentDataset, DatasetError> {
    let file = File::open(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            DatasetError::Missing {
                path: path.to_path_buf(),
            }
        } else {
            DatasetError::Open {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    let dataset = read_csv(file)?;
    tracing::info!(
        "Loaded {} rows from {} ({} missing cells)",
        dataset.len(),
        path.display(),
        dataset.missing_count()
    );
    Ok(dataset)
}

/// Parse survey CSV from any reader.
///
/// Schema columns are typed by the schema rather than by sniffing, so a
/// numeric column with stray tokens (such as `?`) stays numeric and those
/// cells become missing values.
pub fn read_csv<R: Read>(reader: R) -> Result<StudentDataset, DatasetError> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let layout = HeaderLayout::resolve(&headers)?;

    let mut columns: Vec<DatasetColumn> = layout
        .predictors
        .iter()
        .map(|(_, spec)| DatasetColumn {
            name: spec.name.to_string(),
            values: if spec.is_categorical() {
                ColumnValues::Categorical(Vec::new())
            } else {
                ColumnValues::Numeric(Vec::new())
            },
        })
        .collect();
    let mut target = Vec::new();
    let mut coerced = vec![0usize; columns.len()];

    let mut record = StringRecord::new();
    while rdr.read_record(&mut record)? {
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let raw_target = record.get(layout.target).unwrap_or("");
        target.push(parse_target(raw_target).ok_or_else(|| DatasetError::InvalidTarget {
            line,
            value: raw_target.to_string(),
        })?);

        for (slot, (idx, _)) in layout.predictors.iter().enumerate() {
            let cell = record.get(*idx).unwrap_or("");
            match &mut columns[slot].values {
                ColumnValues::Numeric(values) => {
                    let parsed = parse_numeric(cell);
                    if parsed.is_none() && !is_missing_token(cell) {
                        coerced[slot] += 1;
                    }
                    values.push(parsed);
                }
                ColumnValues::Categorical(values) => {
                    values.push((!is_missing_token(cell)).then(|| cell.to_string()));
                }
            }
        }
    }

    for (column, count) in columns.iter().zip(&coerced) {
        if *count > 0 {
            tracing::warn!(
                "Treated {count} non-numeric cells in '{}' as missing",
                column.name
            );
        }
    }
    if target.is_empty() {
        return Err(DatasetError::Empty);
    }
    StudentDataset::from_parts(columns, target)
}

struct HeaderLayout {
    target: usize,
    /// Header index and schema entry of each predictor, in header order.
    predictors: Vec<(usize, &'static schema::FieldSpec)>,
}

impl HeaderLayout {
    fn resolve(headers: &StringRecord) -> Result<Self, DatasetError> {
        let mut positions: BTreeMap<&str, usize> = BTreeMap::new();
        for (idx, name) in headers.iter().enumerate() {
            if positions.insert(name, idx).is_some() {
                return Err(DatasetError::DuplicateColumn(name.to_string()));
            }
        }
        let target = *positions
            .get(TARGET_COLUMN)
            .ok_or_else(|| DatasetError::MissingColumn(TARGET_COLUMN.to_string()))?;

        let mut predictors = Vec::new();
        for spec in schema::STUDENT_FIELDS.iter() {
            let idx = *positions
                .get(spec.name)
                .ok_or_else(|| DatasetError::MissingColumn(spec.name.to_string()))?;
            predictors.push((idx, spec));
        }
        predictors.sort_by_key(|(idx, _)| *idx);

        for name in headers.iter() {
            if name != TARGET_COLUMN && name != ID_COLUMN && schema::field(name).is_none() {
                tracing::warn!("Ignoring unknown dataset column '{name}'");
            }
        }
        Ok(Self { target, predictors })
    }
}

fn is_missing_token(cell: &str) -> bool {
    MISSING_TOKENS.contains(&cell.trim())
}

fn parse_numeric(cell: &str) -> Option<f64> {
    if is_missing_token(cell) {
        return None;
    }
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_target(cell: &str) -> Option<u8> {
    match cell.trim().parse::<f64>() {
        Ok(v) if v == 0.0 => Some(0),
        Ok(v) if v == 1.0 => Some(1),
        _ => None,
    }
}
