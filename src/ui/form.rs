//! Form state kept separate from the widgets so it can be tested headless.

use std::collections::BTreeMap;

use crate::predict::Predictor;
use crate::preprocess::RawRecord;
use crate::schema::{self, FieldKind};

/// Fields shown in the left column, top to bottom.
pub const LEFT_COLUMN: [&str; 8] = [
    "Gender",
    "Age",
    "City",
    "Profession",
    "Degree",
    "Academic Pressure",
    "Work Pressure",
    "CGPA",
];

/// Fields shown in the right column, top to bottom.
pub const RIGHT_COLUMN: [&str; 8] = [
    "Study Satisfaction",
    "Job Satisfaction",
    "Sleep Duration",
    "Dietary Habits",
    "Have you ever had suicidal thoughts ?",
    "Work/Study Hours",
    "Financial Stress",
    "Family History of Mental Illness",
];

/// Current answers for every schema field.
///
/// Dropdown options come from the loaded encoders, so only trained labels
/// can be picked; numbers start at their schema defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreeningForm {
    numbers: BTreeMap<&'static str, f64>,
    choices: BTreeMap<&'static str, String>,
    options: BTreeMap<&'static str, Vec<String>>,
}

impl ScreeningForm {
    pub fn new(predictor: &Predictor) -> Self {
        let mut form = Self {
            numbers: BTreeMap::new(),
            choices: BTreeMap::new(),
            options: BTreeMap::new(),
        };
        for spec in schema::STUDENT_FIELDS.iter() {
            if spec.is_categorical() {
                let options = predictor
                    .categories(spec.name)
                    .map(<[String]>::to_vec)
                    .unwrap_or_default();
                form.options.insert(spec.name, options);
            }
        }
        form.reset();
        form
    }

    /// Restore every answer to its default.
    pub fn reset(&mut self) {
        for spec in schema::STUDENT_FIELDS.iter() {
            match spec.kind {
                FieldKind::Numeric(range) => {
                    self.numbers.insert(spec.name, range.default);
                }
                FieldKind::Categorical => {
                    let first = self
                        .options
                        .get(spec.name)
                        .and_then(|options| options.first())
                        .cloned()
                        .unwrap_or_default();
                    self.choices.insert(spec.name, first);
                }
            }
        }
    }

    pub fn number(&self, field: &str) -> Option<f64> {
        self.numbers.get(field).copied()
    }

    pub fn number_mut(&mut self, field: &str) -> Option<&mut f64> {
        self.numbers.get_mut(field)
    }

    pub fn choice(&self, field: &str) -> Option<&str> {
        self.choices.get(field).map(String::as_str)
    }

    /// Options and current selection of a dropdown, borrowed together.
    pub fn choice_parts(&mut self, field: &str) -> Option<(&[String], &mut String)> {
        let options = self.options.get(field)?;
        let choice = self.choices.get_mut(field)?;
        Some((options.as_slice(), choice))
    }

    pub fn set_choice(&mut self, field: &str, value: impl Into<String>) -> bool {
        match self.choices.get_mut(field) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    /// Answers as a record ready for scoring.
    pub fn to_record(&self) -> RawRecord {
        let mut record = RawRecord::new();
        for (name, value) in &self.numbers {
            let value = schema::field(name)
                .and_then(|spec| spec.numeric_range())
                .map_or(*value, |range| range.quantize(*value));
            record = record.with_number(*name, value);
        }
        for (name, value) in &self.choices {
            record = record.with_category(*name, value.as_str());
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::fixture_bundle;
    use crate::preprocess::FieldValue;
    use std::collections::BTreeSet;

    fn form() -> ScreeningForm {
        ScreeningForm::new(&Predictor::from_bundle(fixture_bundle(), 0.5).unwrap())
    }

    #[test]
    fn columns_cover_schema_once() {
        let shown: BTreeSet<&str> = LEFT_COLUMN.iter().chain(&RIGHT_COLUMN).copied().collect();
        let expected: BTreeSet<&str> = schema::field_names().collect();
        assert_eq!(shown, expected);
        assert!(shown.iter().all(|name| schema::field(name).is_some()));
    }

    #[test]
    fn defaults_use_first_class_and_schema_numbers() {
        let form = form();
        assert_eq!(form.choice("Gender"), Some("Female"));
        assert_eq!(form.number("Age"), Some(20.0));
        assert_eq!(form.number("Work Pressure"), Some(0.0));
    }

    #[test]
    fn record_contains_every_field_with_its_kind() {
        let mut form = form();
        form.set_choice("Gender", "Male");
        if let Some(cgpa) = form.number_mut("CGPA") {
            *cgpa = 8.5;
        }
        let record = form.to_record();
        assert_eq!(record.len(), 16);
        assert_eq!(record.get("Gender"), Some(&FieldValue::Category("Male".into())));
        assert_eq!(record.get("CGPA"), Some(&FieldValue::Number(8.5)));
    }

    #[test]
    fn fractional_age_is_submitted_as_whole_years() {
        let mut form = form();
        if let Some(age) = form.number_mut("Age") {
            *age = 22.4;
        }
        if let Some(pressure) = form.number_mut("Academic Pressure") {
            *pressure = 2.37;
        }
        let record = form.to_record();
        assert_eq!(record.get("Age"), Some(&FieldValue::Number(22.0)));
        assert_eq!(record.get("Academic Pressure"), Some(&FieldValue::Number(2.37)));
    }

    #[test]
    fn default_form_scores_and_reset_restores() {
        let predictor = Predictor::from_bundle(fixture_bundle(), 0.5).unwrap();
        let mut form = ScreeningForm::new(&predictor);
        assert_eq!(predictor.predict(&form.to_record()).unwrap().label, 1);
        form.set_choice("Gender", "Male");
        form.reset();
        assert_eq!(form.choice("Gender"), Some("Female"));
        assert!(!form.set_choice("Age", "x"));
    }
}
