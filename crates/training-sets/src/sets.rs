//! Training and evaluation index sets

use crate::partition::{ClassPartition, ClassPartitioner};
use crate::sampler::StratifiedSampler;
use crate::{ClassId, ClassLocalIndex, TrainingSetError};
use classifier_config::ClassifierConfig;
use rand::Rng;
use serde::Serialize;
use star_classes::{StarClasses, StarIndex};
use std::fmt;
use tracing::info;

/// Class-local training and evaluation positions of one class
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainEvalSplit {
    training: Vec<ClassLocalIndex>,
    evaluation: Vec<ClassLocalIndex>,
}

impl TrainEvalSplit {
    pub(crate) fn new(training: Vec<ClassLocalIndex>, evaluation: Vec<ClassLocalIndex>) -> Self {
        Self {
            training,
            evaluation,
        }
    }

    /// Ascending training positions
    pub fn training(&self) -> &[ClassLocalIndex] {
        &self.training
    }

    /// Ascending evaluation positions (empty when every star trains)
    pub fn evaluation(&self) -> &[ClassLocalIndex] {
        &self.evaluation
    }
}

/// Global star indexes with the class of each, position by position
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LabeledIndexes {
    pub stars: Vec<StarIndex>,
    pub classes: Vec<ClassId>,
}

impl LabeledIndexes {
    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StarIndex, ClassId)> + '_ {
        self.stars.iter().copied().zip(self.classes.iter().copied())
    }
}

/// Per-class training and evaluation sets of one classification run
#[derive(Debug, Clone)]
pub struct TrainEvalSets {
    partitions: Vec<ClassPartition>,
    splits: Vec<TrainEvalSplit>,
    min_cardinal: usize,
    training_percent: u32,
}

impl TrainEvalSets {
    /// Randomly split every retained class by the configured percentage
    pub fn calculate_training_and_evaluation_sets<R: Rng + ?Sized>(
        registry: &StarClasses,
        config: &ClassifierConfig,
        rng: &mut R,
    ) -> Result<Self, TrainingSetError> {
        let sampler = StratifiedSampler::new(config.training_set_percent);
        Self::build(registry, config, |n| sampler.split(n, rng))
    }

    /// Use every enabled star of every retained class for training
    pub fn set_all_stars_for_training(
        registry: &StarClasses,
        config: &ClassifierConfig,
    ) -> Result<Self, TrainingSetError> {
        Self::build(registry, config, StratifiedSampler::all_training)
    }

    fn build<F>(
        registry: &StarClasses,
        config: &ClassifierConfig,
        mut split: F,
    ) -> Result<Self, TrainingSetError>
    where
        F: FnMut(usize) -> TrainEvalSplit,
    {
        let partitioner = ClassPartitioner::new(registry, config.stars_set_min_cardinal);
        let partitions = partitioner.determine_classes_to_use_for_training();

        if partitions.is_empty() {
            return Err(TrainingSetError::NoEligibleClasses {
                min_cardinal: config.stars_set_min_cardinal,
                classes_seen: partitioner.count_instances_by_class().len(),
            });
        }

        let splits: Vec<TrainEvalSplit> = partitions.iter().map(|p| split(p.len())).collect();

        info!("Training and evaluation sets:");
        for (partition, split) in partitions.iter().zip(&splits) {
            info!(
                "Class {}, training {}, evaluation {}",
                partition.label(),
                split.training().len(),
                split.evaluation().len()
            );
        }

        Ok(Self {
            partitions,
            splits,
            min_cardinal: config.stars_set_min_cardinal,
            training_percent: config.training_set_percent,
        })
    }

    /// Labels of the retained classes; position is the `ClassId`
    pub fn training_classes(&self) -> Vec<&str> {
        self.partitions.iter().map(ClassPartition::label).collect()
    }

    pub fn number_of_classes(&self) -> usize {
        self.partitions.len()
    }

    pub fn partitions(&self) -> &[ClassPartition] {
        &self.partitions
    }

    pub fn split(&self, class: ClassId) -> Option<&TrainEvalSplit> {
        self.splits.get(class.0)
    }

    /// Global indexes and classes of the training stars
    pub fn training_indexes(&self) -> LabeledIndexes {
        self.translate(TrainEvalSplit::training)
    }

    /// Global indexes and classes of the evaluation stars
    pub fn evaluation_indexes(&self) -> LabeledIndexes {
        self.translate(TrainEvalSplit::evaluation)
    }

    fn translate<F>(&self, positions: F) -> LabeledIndexes
    where
        F: Fn(&TrainEvalSplit) -> &[ClassLocalIndex],
    {
        let mut out = LabeledIndexes::default();

        for (class, (partition, split)) in self.partitions.iter().zip(&self.splits).enumerate() {
            for &local in positions(split) {
                out.stars.push(partition.members()[local.0]);
                out.classes.push(ClassId(class));
            }
        }

        out
    }
}

impl fmt::Display for TrainEvalSets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Number of classes: {}, Minimum cardinal: {}, training_set_percent: {}",
            self.partitions.len(),
            self.min_cardinal,
            self.training_percent
        )
    }
}
