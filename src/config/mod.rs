//! Optional `config.toml` settings for training and serving.
//!
//! Every key has a default, so a missing file or a partial file is fine.
//! Command-line flags override whatever is loaded here.

mod load;
mod types;

#[cfg(test)]
mod tests;

pub use load::{config_path, load_from, load_or_default};
pub use types::{AppSettings, ConfigError, PathSettings, ServingSettings, TrainingSettings};

/// File name of the settings file inside the application directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";
/// Survey export looked for when no dataset path is configured.
pub const DEFAULT_DATASET_FILE: &str = "Student Depression Dataset.csv";
