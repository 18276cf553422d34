//! Fits the harvest regressor on the built-in synthetic dataset.

use std::path::PathBuf;

use clap::Parser;
use cropcast_server::startup::{self, LoggingConfig};

#[derive(Debug, Parser)]
#[command(about = "Train the harvest-day regressor")]
struct Args {
    #[arg(short = 'o', long = "output", default_value = "model/harvest_predictor.json")]
    output: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let _logging_guard = startup::init_logging(&LoggingConfig::from_env())?;

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    cropcast_harvest::train_and_save(&args.output)?;
    Ok(())
}
