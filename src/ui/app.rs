use eframe::egui::{
    self, Button, Color32, ComboBox, CornerRadius, DragValue, Frame, Margin, RichText,
    ScrollArea, Slider, Ui,
};

use crate::predict::{Prediction, RiskLevel, ScreeningService};
use crate::schema::{self, FieldKind, NumericInput};

use super::form::{LEFT_COLUMN, RIGHT_COLUMN, ScreeningForm};
use super::style;

/// Result card contents after the last submission.
#[derive(Debug, Clone, PartialEq)]
enum Outcome {
    Scored(Prediction),
    Rejected(String),
}

/// The screening window: one form, one button, one result card.
pub struct ScreeningApp {
    service: ScreeningService,
    form: ScreeningForm,
    outcome: Option<Outcome>,
}

impl ScreeningApp {
    /// Load the model before the window opens; the error text is what the
    /// launch screen shows.
    pub fn new(mut service: ScreeningService) -> Result<Self, String> {
        let form = {
            let predictor = service.ensure_ready().map_err(|err| err.to_string())?;
            ScreeningForm::new(predictor)
        };
        Ok(Self {
            service,
            form,
            outcome: None,
        })
    }

    fn analyze(&mut self) {
        let record = self.form.to_record();
        self.outcome = Some(match self.service.submit(&record) {
            Ok(prediction) => Outcome::Scored(prediction),
            Err(err) => Outcome::Rejected(err.to_string()),
        });
    }
}

impl eframe::App for ScreeningApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let palette = style::palette();
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical().show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(12.0);
                    ui.label(RichText::new("Student Wellness Monitor").size(32.0).strong());
                    ui.label(
                        RichText::new("Depression risk assessment for students")
                            .size(17.0)
                            .color(palette.text_muted),
                    );
                });
                ui.add_space(16.0);

                Frame::new()
                    .fill(palette.bg_card)
                    .corner_radius(CornerRadius::same(20))
                    .inner_margin(Margin::same(28))
                    .show(ui, |ui| {
                        ui.label(RichText::new("Enter Student Details").size(20.0).strong());
                        ui.add_space(10.0);
                        ui.columns(2, |columns| {
                            field_column(&mut columns[0], &mut self.form, &LEFT_COLUMN);
                            field_column(&mut columns[1], &mut self.form, &RIGHT_COLUMN);
                        });
                        ui.add_space(12.0);
                        let button = Button::new(
                            RichText::new("Analyze Risk Profile")
                                .size(17.0)
                                .strong()
                                .color(Color32::WHITE),
                        )
                        .fill(palette.accent)
                        .corner_radius(CornerRadius::same(10))
                        .min_size(egui::vec2(ui.available_width(), 42.0));
                        if ui.add(button).clicked() {
                            self.analyze();
                        }
                    });

                if let Some(outcome) = &self.outcome {
                    ui.add_space(16.0);
                    outcome_card(ui, outcome);
                }
            });
        });
    }
}

fn field_column(ui: &mut Ui, form: &mut ScreeningForm, names: &[&str]) {
    let label_color = style::palette().text_label;
    for name in names {
        let Some(spec) = schema::field(name) else {
            continue;
        };
        ui.label(RichText::new(spec.label).strong().color(label_color));
        match spec.kind {
            FieldKind::Numeric(range) => {
                if let Some(value) = form.number_mut(spec.name) {
                    match range.input {
                        NumericInput::Slider => {
                            ui.add(Slider::new(value, range.min..=range.max));
                        }
                        NumericInput::Number { step, decimals } => {
                            ui.add(
                                DragValue::new(value)
                                    .range(range.min..=range.max)
                                    .speed(step)
                                    .max_decimals(decimals),
                            );
                        }
                    }
                }
            }
            FieldKind::Categorical => {
                if let Some((options, selected)) = form.choice_parts(spec.name) {
                    ComboBox::from_id_salt(spec.name)
                        .width(ui.available_width())
                        .selected_text(selected.clone())
                        .show_ui(ui, |ui| {
                            for option in options {
                                ui.selectable_value(selected, option.clone(), option.as_str());
                            }
                        });
                }
            }
        }
        ui.add_space(8.0);
    }
}

fn outcome_card(ui: &mut Ui, outcome: &Outcome) {
    let (colors, title, lines) = match outcome {
        Outcome::Scored(prediction) => {
            let colors = match prediction.risk_level() {
                RiskLevel::High => style::high_risk_card(),
                RiskLevel::Low => style::low_risk_card(),
            };
            (colors, prediction.risk_level().headline(), result_lines(prediction))
        }
        Outcome::Rejected(message) => (
            style::warning_card(),
            "Could not analyze this profile",
            vec![message.clone()],
        ),
    };
    Frame::new()
        .fill(colors.fill)
        .corner_radius(CornerRadius::same(15))
        .inner_margin(Margin::same(20))
        .show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            ui.vertical_centered(|ui| {
                ui.label(RichText::new(title).size(24.0).strong().color(colors.text));
                for line in lines {
                    ui.label(RichText::new(line).color(colors.text));
                }
            });
        });
}

/// Body text of a result card.
fn result_lines(prediction: &Prediction) -> Vec<String> {
    let probability = format_probability(prediction.probability);
    match prediction.risk_level() {
        RiskLevel::High => vec![
            format!(
                "The model predicts a high likelihood of depression (Probability: {probability})."
            ),
            "Recommendation: successful intervention often involves consulting a mental health professional."
                .to_string(),
        ],
        RiskLevel::Low => vec![
            format!(
                "The model predicts a low likelihood of depression (Probability: {probability})."
            ),
            "Maintaining a healthy work-life balance is key to mental wellness.".to_string(),
        ],
    }
}

/// Probability as a percentage with two decimals.
fn format_probability(probability: f32) -> String {
    format!("{:.2}%", probability * 100.0)
}
