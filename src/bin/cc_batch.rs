//! Renders every comparison chart for several experiment directories.
//!
//! Directories are independent, so they are processed in parallel.

use clap::Parser;
use color_eyre::eyre::{bail, Context, Result};
use rayon::prelude::*;

use cc_compare::cli::{self, BatchArgs};
use cc_compare::config_loader;

fn main() -> Result<()> {
    let args = BatchArgs::parse();
    cli::init(&args.log_level)?;

    if args.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    let config = config_loader::load_or_default(args.config.as_deref())?;
    let runner = cli::default_runner(config);

    log::info!("Processing {} experiment directories...", args.experiment_dirs.len());
    let failures: Vec<String> = args
        .experiment_dirs
        .par_iter()
        .filter_map(|dir| match runner.run_experiment(dir) {
            Ok(reports) => {
                let warnings: usize = reports.iter().map(|r| r.warnings.len()).sum();
                log::info!(
                    "{}: {} charts, {} warnings",
                    dir.display(),
                    reports.len(),
                    warnings
                );
                None
            }
            Err(e) => {
                log::error!("{}: {:#}", dir.display(), e);
                Some(dir.display().to_string())
            }
        })
        .collect();

    if !failures.is_empty() {
        bail!("{} experiment directories failed: {}", failures.len(), failures.join(", "));
    }
    log::info!("All experiment directories processed");
    Ok(())
}
