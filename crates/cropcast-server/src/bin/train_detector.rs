//! Offline trainer for the crop disease classifier.
//!
//! Reads `<train_dir>/<class>/*` and `<val_dir>/<class>/*`, then writes the
//! weights and the class label table into `<output_dir>`.

use std::path::PathBuf;

use clap::Parser;
use cropcast_server::startup::{self, LoggingConfig};
use cropcast_vision::training::{TrainingConfig, train_from_directories};
use tracing::info;

#[derive(Debug, Parser)]
#[command(about = "Train the crop disease classifier")]
struct Args {
    #[arg(long = "train-dir", default_value = "dataset/train")]
    train_dir: PathBuf,
    #[arg(long = "val-dir", default_value = "dataset/val")]
    val_dir: PathBuf,
    #[arg(short = 'o', long = "output-dir", default_value = "model")]
    output_dir: PathBuf,
    #[arg(long, default_value_t = 10)]
    epochs: usize,
    #[arg(long = "batch-size", default_value_t = 32)]
    batch_size: usize,
    #[arg(long = "learning-rate", default_value_t = 1e-3)]
    learning_rate: f64,
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let _logging_guard = startup::init_logging(&LoggingConfig::from_env())?;

    let config = TrainingConfig {
        epochs: args.epochs,
        batch_size: args.batch_size,
        learning_rate: args.learning_rate,
        seed: args.seed,
    };
    info!(?config, train = %args.train_dir.display(), "Starting training");

    let classes = train_from_directories(&args.train_dir, &args.val_dir, &args.output_dir, &config)?;
    info!(classes = ?classes.names(), "Model trained and saved");
    Ok(())
}
