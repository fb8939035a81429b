//! Library exports for the screening binaries, benchmarks and tests.
/// Application directory helpers.
pub mod app_dirs;
/// Versioned model artifact bundle.
pub mod artifact;
/// Optional settings file.
pub mod config;
/// Labeled survey dataset loading and splitting.
pub mod data;
/// Logging setup.
pub mod logging;
/// Random forest and evaluation metrics.
pub mod ml;
/// Prediction service.
pub mod predict;
/// Imputation, encoders and feature layout.
pub mod preprocess;
/// Fixed survey schema.
pub mod schema;
/// Offline training pipeline.
pub mod training;
/// Screening window.
pub mod ui;
