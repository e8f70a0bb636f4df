//! Training and Evaluation Sets
//!
//! Selects the classes with enough enabled stars, splits each class at
//! random into training and evaluation subsets, and translates the
//! per-class positions back to global star indexes.

mod partition;
mod sampler;
mod sets;

pub use partition::{ClassPartition, ClassPartitioner};
pub use sampler::StratifiedSampler;
pub use sets::{LabeledIndexes, TrainEvalSets, TrainEvalSplit};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Position of a star within its class partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassLocalIndex(pub usize);

/// Position of a class in the retained-class list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassId(pub usize);

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Training set errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrainingSetError {
    #[error("No class has at least {min_cardinal} enabled stars ({classes_seen} classes seen)")]
    NoEligibleClasses {
        min_cardinal: usize,
        classes_seen: usize,
    },
}
