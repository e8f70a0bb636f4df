//! Stratified Sampler

use crate::sets::TrainEvalSplit;
use crate::ClassLocalIndex;
use rand::seq::index;
use rand::Rng;

/// Splits a class of `n` stars into training and evaluation positions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StratifiedSampler {
    training_percent: u32,
}

impl StratifiedSampler {
    pub fn new(training_percent: u32) -> Self {
        Self { training_percent }
    }

    pub fn training_percent(&self) -> u32 {
        self.training_percent
    }

    /// Training positions drawn for a class of `n`: floor(n * percent / 100), at most `n`
    pub fn training_count(&self, n: usize) -> usize {
        (n * self.training_percent as usize / 100).min(n)
    }

    /// Draw a training sample without replacement; the rest is evaluation
    pub fn split<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> TrainEvalSplit {
        let k = self.training_count(n);

        let mut training: Vec<ClassLocalIndex> = index::sample(rng, n, k)
            .into_iter()
            .map(ClassLocalIndex)
            .collect();
        training.sort_unstable();

        let evaluation = if n - k > 0 {
            let mut selected = vec![false; n];
            for i in &training {
                selected[i.0] = true;
            }
            (0..n)
                .filter(|&i| !selected[i])
                .map(ClassLocalIndex)
                .collect()
        } else {
            Vec::new()
        };

        TrainEvalSplit::new(training, evaluation)
    }

    /// Every position for training, none for evaluation
    pub fn all_training(n: usize) -> TrainEvalSplit {
        TrainEvalSplit::new((0..n).map(ClassLocalIndex).collect(), Vec::new())
    }
}
