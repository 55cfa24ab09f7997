//! Aggregate loss rate per scheme from `pantheon_perf.json`.
//!
//! The chart is written into the current directory.

use std::path::Path;

use clap::Parser;
use color_eyre::Result;

use cc_compare::cli::{self, ExperimentArgs};
use cc_compare::runner::PERF_SUMMARY_FILE;

#[derive(Parser)]
#[command(name = "plot-loss-bar", version)]
#[command(about = "Bar chart of aggregate loss rate per scheme")]
struct Cli {
    #[command(flatten)]
    args: ExperimentArgs,
}

fn main() -> Result<()> {
    let Cli { args } = Cli::parse();
    cli::init(&args.log_level)?;

    let runner = args.prepare()?;
    let summary = args.experiment_dir.join(PERF_SUMMARY_FILE);
    runner.run_loss_bar(&summary, Path::new("."))?;
    Ok(())
}
