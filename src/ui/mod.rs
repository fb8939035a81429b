//! egui front end for the screening form.

mod app;
pub mod form;
pub mod style;

pub use app::ScreeningApp;
pub use form::ScreeningForm;

use eframe::egui;

use crate::config::AppSettings;
use crate::predict::ScreeningService;

/// Window title.
pub const APP_TITLE: &str = "Depression Risk Assessment";
/// Initial window size in points.
pub const WINDOW_SIZE: [f32; 2] = [900.0, 860.0];
/// Smallest usable window size in points.
pub const MIN_WINDOW_SIZE: [f32; 2] = [640.0, 480.0];

/// Open the screening window and block until it closes.
///
/// The bundle is loaded before the window is created; when that fails the
/// window only shows the diagnostic.
pub fn run(settings: &AppSettings) -> eframe::Result<()> {
    let startup = ScreeningApp::new(ScreeningService::from_settings(settings));
    let viewport = egui::ViewportBuilder::default()
        .with_title(APP_TITLE)
        .with_inner_size(WINDOW_SIZE)
        .with_min_inner_size(MIN_WINDOW_SIZE);
    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    eframe::run_native(
        APP_TITLE,
        native_options,
        Box::new(move |cc| {
            let mut visuals = cc.egui_ctx.style().visuals.clone();
            style::apply_visuals(&mut visuals);
            cc.egui_ctx.set_visuals(visuals);
            match startup {
                Ok(app) => Ok(Box::new(app)),
                Err(message) => Ok(Box::new(LaunchError { message })),
            }
        }),
    )
}

/// Minimal fallback app to display initialization errors.
struct LaunchError {
    message: String,
}

impl eframe::App for LaunchError {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let colors = style::warning_card();
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                ui.heading("Model not available");
                ui.add_space(8.0);
                egui::Frame::new()
                    .fill(colors.fill)
                    .corner_radius(egui::CornerRadius::same(10))
                    .inner_margin(egui::Margin::same(16))
                    .show(ui, |ui| {
                        ui.label(egui::RichText::new(&self.message).color(colors.text));
                    });
            });
        });
    }
}
