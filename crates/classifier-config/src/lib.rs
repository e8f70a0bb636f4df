//! Classifier Configuration
//!
//! Settings for class selection and the train/evaluation split, layered
//! from built-in defaults, an optional file and `CLAVEL__` environment
//! variables.

mod inputs;
mod settings;

pub use inputs::InputFiles;
pub use settings::{load, ClassifierConfig, Settings, ENV_PREFIX};

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Missing {what}: {}", path.display())]
    MissingInput { what: &'static str, path: PathBuf },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::Load(err.to_string())
    }
}
