use std::collections::BTreeMap;

use crate::schema;

use super::{CategoryEncoder, FieldValue, PreprocessError, RawRecord};

/// Whether numeric answers are checked against the schema ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangePolicy {
    /// Form submissions: out-of-range numbers are rejected.
    Validate,
    /// Dataset rows: numbers are taken as recorded.
    PassThrough,
}

/// Trained feature order plus the encoders that go with it.
#[derive(Debug, Clone, Copy)]
pub struct FeatureLayout<'a> {
    feature_names: &'a [String],
    encoders: &'a BTreeMap<String, CategoryEncoder>,
}

impl<'a> FeatureLayout<'a> {
    pub fn new(
        feature_names: &'a [String],
        encoders: &'a BTreeMap<String, CategoryEncoder>,
    ) -> Self {
        Self {
            feature_names,
            encoders,
        }
    }

    pub fn feature_names(&self) -> &'a [String] {
        self.feature_names
    }

    /// Encode `record` into a feature vector in trained column order.
    ///
    /// Every trained feature must be present exactly once and nothing else
    /// may be; categorical fields must carry labels and numeric fields
    /// numbers.
    pub fn encode(&self, record: &RawRecord, policy: RangePolicy) -> Result<Vec<f32>, PreprocessError> {
        if let Some(extra) = record
            .fields()
            .find(|field| !self.feature_names.iter().any(|name| name == field))
        {
            return Err(PreprocessError::SchemaMismatch(format!(
                "field '{extra}' is not part of the trained feature list"
            )));
        }

        let mut features = Vec::with_capacity(self.feature_names.len());
        for name in self.feature_names {
            let value = record.get(name).ok_or_else(|| {
                PreprocessError::SchemaMismatch(format!("field '{name}' is missing"))
            })?;
            let encoded = match (self.encoders.get(name), value) {
                (Some(encoder), FieldValue::Category(label)) => encoder.encode(label)? as f32,
                (None, FieldValue::Number(number)) => {
                    if policy == RangePolicy::Validate {
                        check_range(name, *number)?;
                    }
                    *number as f32
                }
                (Some(_), other) => {
                    return Err(PreprocessError::SchemaMismatch(format!(
                        "field '{name}' expects a category but got {}",
                        other.describe()
                    )));
                }
                (None, other) => {
                    return Err(PreprocessError::SchemaMismatch(format!(
                        "field '{name}' expects a number but got {}",
                        other.describe()
                    )));
                }
            };
            features.push(encoded);
        }
        Ok(features)
    }
}

fn check_range(name: &str, value: f64) -> Result<(), PreprocessError> {
    let Some(range) = schema::field(name).and_then(|spec| spec.numeric_range()) else {
        return Ok(());
    };
    if range.contains(value) {
        Ok(())
    } else {
        Err(PreprocessError::OutOfRange {
            field: name.to_string(),
            value,
            min: range.min,
            max: range.max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout_parts() -> (Vec<String>, BTreeMap<String, CategoryEncoder>) {
        let names = vec!["Age".to_string(), "CGPA".to_string(), "Gender".to_string()];
        let mut encoders = BTreeMap::new();
        encoders.insert(
            "Gender".to_string(),
            CategoryEncoder::fit("Gender", ["Male", "Female"]),
        );
        (names, encoders)
    }

    fn record() -> RawRecord {
        RawRecord::new()
            .with_category("Gender", "Male")
            .with_number("CGPA", 7.5)
            .with_number("Age", 21.0)
    }

    #[test]
    fn encodes_in_trained_order_regardless_of_input_order() {
        let (names, encoders) = layout_parts();
        let layout = FeatureLayout::new(&names, &encoders);
        let features = layout.encode(&record(), RangePolicy::Validate).unwrap();
        assert_eq!(features, vec![21.0, 7.5, 1.0]);
    }

    #[test]
    fn missing_and_extra_fields_are_schema_mismatches() {
        let (names, encoders) = layout_parts();
        let layout = FeatureLayout::new(&names, &encoders);

        let mut missing = record();
        missing.remove("CGPA");
        assert!(matches!(
            layout.encode(&missing, RangePolicy::Validate),
            Err(PreprocessError::SchemaMismatch(_))
        ));

        let extra = record().with_number("Shoe Size", 9.0);
        assert!(matches!(
            layout.encode(&extra, RangePolicy::Validate),
            Err(PreprocessError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn wrong_value_kind_is_schema_mismatch() {
        let (names, encoders) = layout_parts();
        let layout = FeatureLayout::new(&names, &encoders);
        let swapped = record().with_number("Gender", 1.0);
        assert!(matches!(
            layout.encode(&swapped, RangePolicy::PassThrough),
            Err(PreprocessError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn range_check_only_applies_when_validating() {
        let (names, encoders) = layout_parts();
        let layout = FeatureLayout::new(&names, &encoders);
        let old = record().with_number("Age", 75.0);
        assert_eq!(
            layout.encode(&old, RangePolicy::Validate).unwrap_err(),
            PreprocessError::OutOfRange {
                field: "Age".into(),
                value: 75.0,
                min: 15.0,
                max: 60.0,
            }
        );
        assert_eq!(
            layout.encode(&old, RangePolicy::PassThrough).unwrap(),
            vec![75.0, 7.5, 1.0]
        );
    }

    #[test]
    fn unseen_category_propagates() {
        let (names, encoders) = layout_parts();
        let layout = FeatureLayout::new(&names, &encoders);
        let other = record().with_category("Gender", "Other");
        assert!(matches!(
            layout.encode(&other, RangePolicy::Validate),
            Err(PreprocessError::UnknownCategory { field, value }) if field == "Gender" && value == "Other"
        ));
    }
}
