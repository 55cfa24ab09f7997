//! 95th-percentile one-way delay per scheme as a bar chart.

use clap::Parser;
use color_eyre::Result;

use cc_compare::cli::{self, ExperimentArgs};

#[derive(Parser)]
#[command(name = "plot-rtt-bar", version)]
#[command(about = "Bar chart of the 95th-percentile RTT per scheme")]
struct Cli {
    #[command(flatten)]
    args: ExperimentArgs,
}

fn main() -> Result<()> {
    let Cli { args } = Cli::parse();
    cli::init(&args.log_level)?;

    let runner = args.prepare()?;
    runner.run_rtt_bar(&args.experiment_dir)?;
    Ok(())
}
