use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::{ColumnValues, StudentDataset};

/// Fill values learned from the training rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImputationStats {
    /// Column mean for each numeric field.
    pub numeric_means: BTreeMap<String, f64>,
    /// Most frequent value for each categorical field.
    pub categorical_modes: BTreeMap<String, String>,
}

impl ImputationStats {
    /// Learn fill values from the rows listed in `rows`.
    ///
    /// Modes break ties toward the smallest label so repeated runs agree.
    pub fn fit(dataset: &StudentDataset, rows: &[usize]) -> Result<Self, String> {
        let mut stats = Self::default();
        for column in dataset.columns() {
            match &column.values {
                ColumnValues::Numeric(values) => {
                    let (sum, count) = rows
                        .iter()
                        .filter_map(|&row| values.get(row).copied().flatten())
                        .fold((0.0f64, 0usize), |(sum, count), v| (sum + v, count + 1));
                    if count == 0 {
                        return Err(format!(
                            "Column '{}' has no observed values to impute from",
                            column.name
                        ));
                    }
                    stats
                        .numeric_means
                        .insert(column.name.clone(), sum / count as f64);
                }
                ColumnValues::Categorical(values) => {
                    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
                    for row in rows {
                        if let Some(Some(value)) = values.get(*row) {
                            *counts.entry(value.as_str()).or_default() += 1;
                        }
                    }
                    let mut mode: Option<(&str, usize)> = None;
                    for (value, count) in counts {
                        if mode.is_none_or(|(_, best)| count > best) {
                            mode = Some((value, count));
                        }
                    }
                    let (mode, _) = mode.ok_or_else(|| {
                        format!(
                            "Column '{}' has no observed values to impute from",
                            column.name
                        )
                    })?;
                    stats
                        .categorical_modes
                        .insert(column.name.clone(), mode.to_string());
                }
            }
        }
        Ok(stats)
    }

    /// Replace every missing cell in `dataset`; returns how many were filled.
    ///
    /// Columns without a learned fill value are left untouched.
    pub fn apply(&self, dataset: &mut StudentDataset) -> usize {
        let mut filled = 0;
        for column in dataset.columns_mut() {
            match &mut column.values {
                ColumnValues::Numeric(values) => {
                    let Some(&mean) = self.numeric_means.get(&column.name) else {
                        continue;
                    };
                    for value in values.iter_mut().filter(|v| v.is_none()) {
                        *value = Some(mean);
                        filled += 1;
                    }
                }
                ColumnValues::Categorical(values) => {
                    let Some(mode) = self.categorical_modes.get(&column.name) else {
                        continue;
                    };
                    for value in values.iter_mut().filter(|v| v.is_none()) {
                        *value = Some(mode.clone());
                        filled += 1;
                    }
                }
            }
        }
        filled
    }
}
