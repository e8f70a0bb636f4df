//! Clavel - Main Entry Point

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use clavel::{execute, init_logging, Mode};
use classifier_config::{InputFiles, Settings};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "clavel")]
#[command(about = "Light curve features and stratified training sets for variable star classification")]
#[command(version)]
struct Cli {
    /// Configuration file (TOML, JSON or YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write log messages to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Debug level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute (or load cached) features and print the pipeline report
    Features {
        #[command(flatten)]
        inputs: InputArgs,
    },

    /// Use every star of the retained classes for training
    Train {
        #[command(flatten)]
        inputs: InputArgs,
        #[command(flatten)]
        classifier: ClassifierArgs,
    },

    /// Split each retained class into training and evaluation stars
    Evaluate {
        #[command(flatten)]
        inputs: InputArgs,
        #[command(flatten)]
        classifier: ClassifierArgs,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Light curve database (JSON)
    #[arg(short, long)]
    database: PathBuf,

    /// Labeled stars file, one "<id> <class>" per line
    #[arg(short, long)]
    stars: PathBuf,

    /// Directory of cached features; created and filled when absent
    #[arg(short, long)]
    features_dir: Option<PathBuf>,

    /// Write the JSON result here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args, Default)]
struct ClassifierArgs {
    /// Minimum number of stars of a class to use the class
    #[arg(short = 'c', long)]
    min_cardinal: Option<usize>,

    /// Percentage of each class used for training
    #[arg(short = 'g', long)]
    training_percent: Option<u32>,

    /// Number of trees of the classifier
    #[arg(short = 'r', long)]
    trees: Option<u32>,

    /// Seed for a reproducible split
    #[arg(long)]
    seed: Option<u64>,
}

impl ClassifierArgs {
    /// Command line values take precedence over file and environment
    fn apply(&self, settings: &mut Settings) {
        let classifier = &mut settings.classifier;
        if let Some(c) = self.min_cardinal {
            classifier.stars_set_min_cardinal = c;
        }
        if let Some(g) = self.training_percent {
            classifier.training_set_percent = g;
        }
        if let Some(r) = self.trees {
            classifier.number_of_trees = r;
        }
        if self.seed.is_some() {
            classifier.seed = self.seed;
        }
        settings.classifier = settings.classifier.clone().validated();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    info!("=== Clavel v{} ===", env!("CARGO_PKG_VERSION"));
    let mut settings = classifier_config::load(cli.config.as_deref())?;

    let (mode, inputs, classifier) = match cli.command {
        Commands::Features { inputs } => (Mode::Features, inputs, ClassifierArgs::default()),
        Commands::Train { inputs, classifier } => (Mode::Train, inputs, classifier),
        Commands::Evaluate { inputs, classifier } => (Mode::Evaluate, inputs, classifier),
    };
    classifier.apply(&mut settings);

    let files = InputFiles {
        database: inputs.database,
        stars: inputs.stars,
        features_dir: inputs.features_dir,
    };
    let output = execute(mode, &files, &settings)?;

    let mut writer: Box<dyn Write> = match &inputs.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    };
    serde_json::to_writer_pretty(&mut writer, &output)?;
    writeln!(writer)?;
    writer.flush()?;

    Ok(())
}
