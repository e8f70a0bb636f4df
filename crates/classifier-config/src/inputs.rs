//! Run input files

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// Files a classification run reads from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputFiles {
    /// Light-curve database
    pub database: PathBuf,
    /// Labeled stars listing
    pub stars: PathBuf,
    /// Feature cache directory, created on first use
    pub features_dir: Option<PathBuf>,
}

impl InputFiles {
    /// Check that the inputs exist and do not contradict each other
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.database.is_file() {
            return Err(ConfigError::MissingInput {
                what: "light curve database",
                path: self.database.clone(),
            });
        }

        if !self.stars.is_file() {
            return Err(ConfigError::MissingInput {
                what: "stars file",
                path: self.stars.clone(),
            });
        }

        if let Some(dir) = &self.features_dir {
            if dir.exists() && !dir.is_dir() {
                return Err(ConfigError::Invalid(format!(
                    "features path {} is not a directory",
                    dir.display()
                )));
            }
        }

        debug!("Run inputs: {:?}", self);
        Ok(())
    }
}
