//! Classifier settings and layered loading

use crate::ConfigError;
use config::{Config, Environment, File};
use feature_engine::PeriodogramConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Prefix of environment variable overrides
pub const ENV_PREFIX: &str = "CLAVEL";

/// Highest accepted training percentage
const MAX_TRAINING_PERCENT: u32 = 99;

/// Highest accepted number of trees
const MAX_TREES: u32 = 200;

/// Classifier parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Minimum number of enabled stars for a class to be used
    pub stars_set_min_cardinal: usize,
    /// Percentage of each class's stars used for training
    pub training_set_percent: u32,
    /// Trees of the downstream random forest; only validated and reported
    /// with the run output
    pub number_of_trees: u32,
    /// Seed for reproducible splits (entropy when unset)
    pub seed: Option<u64>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            stars_set_min_cardinal: 15,
            training_set_percent: 65,
            number_of_trees: 100,
            seed: None,
        }
    }
}

impl ClassifierConfig {
    /// Clamp out-of-range values, logging each replacement
    pub fn validated(mut self) -> Self {
        if self.training_set_percent == 0 || self.training_set_percent > MAX_TRAINING_PERCENT {
            warn!(
                "Training percent {} not valid, using {}",
                self.training_set_percent, MAX_TRAINING_PERCENT
            );
            self.training_set_percent = MAX_TRAINING_PERCENT;
        }

        if self.number_of_trees == 0 || self.number_of_trees > MAX_TREES {
            warn!(
                "Number of trees {} not valid, using {}",
                self.number_of_trees, MAX_TREES
            );
            self.number_of_trees = MAX_TREES;
        }

        self
    }
}

/// All runtime settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub classifier: ClassifierConfig,
    pub periodogram: PeriodogramConfig,
}

/// Load settings: defaults, then `path` if given, then `CLAVEL__*`
/// environment variables
pub fn load(path: Option<&Path>) -> Result<Settings, ConfigError> {
    load_with_prefix(path, ENV_PREFIX)
}

fn load_with_prefix(path: Option<&Path>, prefix: &str) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder().add_source(Config::try_from(&Settings::default())?);

    if let Some(path) = path {
        if !path.is_file() {
            return Err(ConfigError::MissingInput {
                what: "configuration file",
                path: path.to_path_buf(),
            });
        }
        info!("Loading configuration from {}", path.display());
        builder = builder.add_source(File::from(path));
    }

    let settings: Settings = builder
        .add_source(
            Environment::with_prefix(prefix)
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    Ok(Settings {
        classifier: settings.classifier.validated(),
        ..settings
    })
}
