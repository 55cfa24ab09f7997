//! Egress throughput over time for every scheme in one experiment directory.

use clap::Parser;
use color_eyre::Result;

use cc_compare::cli::{self, ExperimentArgs};
use cc_compare::runner::OverlayMetric;

#[derive(Parser)]
#[command(name = "combine-throughput", version)]
#[command(about = "Overlay per-scheme throughput over time")]
struct Cli {
    #[command(flatten)]
    args: ExperimentArgs,
}

fn main() -> Result<()> {
    let Cli { args } = Cli::parse();
    cli::init(&args.log_level)?;

    let runner = args.prepare()?;
    runner.run_overlay(&args.experiment_dir, OverlayMetric::Throughput)?;
    Ok(())
}
