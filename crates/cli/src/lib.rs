//! Clavel - Command Line Front End
//!
//! Wires the curve database, the labeled stars, the feature pipeline and
//! the training set sampler together for one run.

use anyhow::{Context, Result};
use classifier_config::{ClassifierConfig, InputFiles, Settings};
use feature_engine::FeatureExtractor;
use feature_pipeline::{PipelineReport, StarsFeatures};
use light_curve::{CurveDatabase, StarId};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use star_classes::{StarClasses, StarIndex};
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use storage::FileFeatureStore;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use training_sets::{ClassId, LabeledIndexes, TrainEvalSets};

/// Initialize logging to stderr, or to `log_file` as JSON lines
pub fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating log file {}", path.display()))?;
            let subscriber = builder.json().with_writer(Mutex::new(file)).finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        None => {
            let subscriber = builder.with_writer(std::io::stderr).finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    Ok(())
}

/// What a run produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Features only
    Features,
    /// Every star of the retained classes for training
    Train,
    /// Stratified training and evaluation split
    Evaluate,
}

/// One star of an index set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledStar {
    pub index: StarIndex,
    pub id: StarId,
    pub class_id: ClassId,
    pub class: String,
}

/// Training and evaluation sets in output form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetsOutput {
    pub classes: Vec<String>,
    pub training: Vec<LabeledStar>,
    pub evaluation: Vec<LabeledStar>,
}

impl SetsOutput {
    pub fn new(sets: &TrainEvalSets, registry: &StarClasses) -> Self {
        let classes: Vec<String> = sets.training_classes().into_iter().map(String::from).collect();
        let label = |indexes: LabeledIndexes| -> Vec<LabeledStar> {
            indexes
                .iter()
                .filter_map(|(index, class_id)| {
                    Some(LabeledStar {
                        index,
                        id: registry.instance_id(index)?,
                        class_id,
                        class: classes.get(class_id.0)?.clone(),
                    })
                })
                .collect()
        };

        let training = label(sets.training_indexes());
        let evaluation = label(sets.evaluation_indexes());
        Self {
            classes,
            training,
            evaluation,
        }
    }
}

/// Result of a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunOutput {
    /// Classifier parameters for the downstream training step
    pub classifier: ClassifierConfig,
    pub features: PipelineReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sets: Option<SetsOutput>,
}

/// Load the stars and their features, from the cache when one is configured
pub fn load_features(inputs: &InputFiles, settings: &Settings) -> Result<(StarClasses, PipelineReport)> {
    let database = CurveDatabase::open(&inputs.database)
        .with_context(|| format!("opening database {}", inputs.database.display()))?;
    let mut stars = StarClasses::open(&inputs.stars)
        .with_context(|| format!("loading stars {}", inputs.stars.display()))?;

    let extractor = FeatureExtractor::new(settings.periodogram.clone());
    let mut pipeline = StarsFeatures::new(&mut stars, extractor);
    let report = match &inputs.features_dir {
        Some(dir) => {
            let store = FileFeatureStore::new(dir)?;
            pipeline.get_features(&database, &store)?
        }
        None => pipeline.calculate_features(&database)?,
    };

    Ok((stars, report))
}

/// Run the pipeline and, unless only features were asked for, the sampler
pub fn execute(mode: Mode, inputs: &InputFiles, settings: &Settings) -> Result<RunOutput> {
    inputs.validate()?;
    let (stars, features) = load_features(inputs, settings)?;

    let config = &settings.classifier;
    let sets = match mode {
        Mode::Features => None,
        Mode::Train => Some(TrainEvalSets::set_all_stars_for_training(&stars, config)?),
        Mode::Evaluate => {
            let mut rng = match config.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            Some(TrainEvalSets::calculate_training_and_evaluation_sets(
                &stars, config, &mut rng,
            )?)
        }
    };

    if let Some(sets) = &sets {
        info!("{}", sets);
    }

    Ok(RunOutput {
        classifier: config.clone(),
        features,
        sets: sets.map(|s| SetsOutput::new(&s, &stars)),
    })
}
