//! Fixed survey schema shared by training, evaluation and the form.

/// Binary label column in the training data.
pub const TARGET_COLUMN: &str = "Depression";
/// Row identifier column, dropped before training when present.
pub const ID_COLUMN: &str = "id";

/// How a numeric field is entered in the form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericInput {
    /// Bounded slider for score-like answers.
    Slider,
    /// Free numeric entry clamped to the range, moving in `step` increments
    /// and showing at most `decimals` fraction digits.
    Number { step: f64, decimals: usize },
}

/// Declared bounds and form default for a numeric field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub input: NumericInput,
}

impl NumericRange {
    /// `value` rounded to the precision the form shows for this field.
    pub fn quantize(&self, value: f64) -> f64 {
        match self.input {
            NumericInput::Number { decimals, .. } if value.is_finite() => {
                let scale = 10f64.powi(decimals as i32);
                (value * scale).round() / scale
            }
            _ => value,
        }
    }

    /// Whether `value` is finite and inside `[min, max]`.
    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Numeric(NumericRange),
    Categorical,
}

/// One predictor column of the survey.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    /// Column name as it appears in the dataset header.
    pub name: &'static str,
    /// Label shown next to the form widget.
    pub label: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn is_categorical(&self) -> bool {
        matches!(self.kind, FieldKind::Categorical)
    }

    pub fn numeric_range(&self) -> Option<&NumericRange> {
        match &self.kind {
            FieldKind::Numeric(range) => Some(range),
            FieldKind::Categorical => None,
        }
    }
}

const fn numeric(
    name: &'static str,
    label: &'static str,
    min: f64,
    max: f64,
    default: f64,
    input: NumericInput,
) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind: FieldKind::Numeric(NumericRange {
            min,
            max,
            default,
            input,
        }),
    }
}

const fn categorical(name: &'static str, label: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind: FieldKind::Categorical,
    }
}

/// The 16 predictor fields in survey order.
pub const STUDENT_FIELDS: [FieldSpec; 16] = [
    categorical("Gender", "Gender"),
    numeric(
        "Age",
        "Age (Years)",
        15.0,
        60.0,
        20.0,
        NumericInput::Number {
            step: 1.0,
            decimals: 0,
        },
    ),
    categorical("City", "City"),
    categorical("Profession", "Profession"),
    numeric(
        "Academic Pressure",
        "Academic Pressure (1-5)",
        0.0,
        5.0,
        3.0,
        NumericInput::Slider,
    ),
    numeric(
        "Work Pressure",
        "Work Pressure (0-5)",
        0.0,
        5.0,
        0.0,
        NumericInput::Slider,
    ),
    numeric(
        "CGPA",
        "CGPA (0-10)",
        0.0,
        10.0,
        7.0,
        NumericInput::Number {
            step: 0.01,
            decimals: 2,
        },
    ),
    numeric(
        "Study Satisfaction",
        "Study Satisfaction (1-5)",
        0.0,
        5.0,
        3.0,
        NumericInput::Slider,
    ),
    numeric(
        "Job Satisfaction",
        "Job Satisfaction (0-5)",
        0.0,
        5.0,
        0.0,
        NumericInput::Slider,
    ),
    categorical("Sleep Duration", "Sleep Duration"),
    categorical("Dietary Habits", "Dietary Habits"),
    categorical("Degree", "Degree"),
    categorical(
        "Have you ever had suicidal thoughts ?",
        "History of Suicidal Thoughts?",
    ),
    numeric(
        "Work/Study Hours",
        "Daily Work/Study Hours",
        0.0,
        12.0,
        6.0,
        NumericInput::Number {
            step: 0.01,
            decimals: 2,
        },
    ),
    numeric(
        "Financial Stress",
        "Financial Stress (1-5)",
        0.0,
        5.0,
        3.0,
        NumericInput::Slider,
    ),
    categorical(
        "Family History of Mental Illness",
        "Family History of Mental Illness",
    ),
];

/// Look up a predictor field by column name.
pub fn field(name: &str) -> Option<&'static FieldSpec> {
    STUDENT_FIELDS.iter().find(|spec| spec.name == name)
}

/// Iterate predictor column names in survey order.
pub fn field_names() -> impl Iterator<Item = &'static str> {
    STUDENT_FIELDS.iter().map(|spec| spec.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn schema_has_sixteen_unique_predictors() {
        let names: BTreeSet<&str> = field_names().collect();
        assert_eq!(names.len(), 16);
        assert!(!names.contains(TARGET_COLUMN));
        assert!(!names.contains(ID_COLUMN));
    }

    #[test]
    fn schema_splits_evenly_between_kinds() {
        let categorical = STUDENT_FIELDS.iter().filter(|f| f.is_categorical()).count();
        assert_eq!(categorical, 8);
    }

    #[test]
    fn defaults_sit_inside_declared_ranges() {
        for spec in STUDENT_FIELDS.iter() {
            if let Some(range) = spec.numeric_range() {
                assert!(range.contains(range.default), "{}", spec.name);
            }
        }
    }

    #[test]
    fn age_is_entered_in_whole_years() {
        let age = field("Age").and_then(|f| f.numeric_range()).unwrap();
        assert_eq!(
            age.input,
            NumericInput::Number {
                step: 1.0,
                decimals: 0
            }
        );
        for spec in STUDENT_FIELDS.iter() {
            if let Some(range) = spec.numeric_range()
                && let NumericInput::Number { decimals: 0, .. } = range.input
            {
                assert_eq!(range.default.fract(), 0.0, "{}", spec.name);
            }
        }
        assert_eq!(age.quantize(20.6), 21.0);
        let cgpa = field("CGPA").and_then(|f| f.numeric_range()).unwrap();
        assert_eq!(cgpa.quantize(8.456), 8.46);
    }

    #[test]
    fn range_rejects_non_finite_values() {
        let range = field("CGPA").and_then(|f| f.numeric_range()).unwrap();
        assert!(range.contains(10.0));
        assert!(!range.contains(10.5));
        assert!(!range.contains(f64::NAN));
    }
}
