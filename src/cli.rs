//! Shared command-line surface of the analysis binaries.

use std::path::PathBuf;

use clap::{Args, Parser};
use color_eyre::eyre::{bail, Result};
use env_logger::Env;

use crate::analysis::TunnelLogSource;
use crate::config::AnalysisConfig;
use crate::config_loader;
use crate::render::PlottersRenderer;
use crate::runner::ExperimentRunner;

/// Arguments taken by every single-directory analysis binary
#[derive(Args, Debug)]
pub struct ExperimentArgs {
    /// Pantheon experiment directory holding the per-scheme logs
    pub experiment_dir: PathBuf,

    /// Optional analysis configuration YAML file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Arguments of the batch binary
#[derive(Parser, Debug)]
#[command(name = "cc-batch", version)]
#[command(about = "Render every comparison chart for several experiment directories in parallel")]
pub struct BatchArgs {
    /// Pantheon experiment directories
    #[arg(required = true)]
    pub experiment_dirs: Vec<PathBuf>,

    /// Optional analysis configuration YAML file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Number of parallel workers (0 = auto-detect)
    #[arg(short = 'j', long, default_value = "0")]
    pub threads: usize,
}

/// Install error reporting and logging
pub fn init(log_level: &str) -> Result<()> {
    color_eyre::install()?;
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();
    Ok(())
}

pub type DefaultRunner = ExperimentRunner<TunnelLogSource, PlottersRenderer>;

/// Runner backed by the tunnel log parser and the PNG renderer
pub fn default_runner(config: AnalysisConfig) -> DefaultRunner {
    let source = TunnelLogSource::new(config.tunnel.clone());
    ExperimentRunner::new(config, source, PlottersRenderer::default())
}

impl ExperimentArgs {
    /// Load the configuration and check the experiment directory exists
    pub fn prepare(&self) -> Result<DefaultRunner> {
        if !self.experiment_dir.is_dir() {
            bail!("Experiment directory not found: {}", self.experiment_dir.display());
        }
        let config = config_loader::load_or_default(self.config.as_deref())?;
        log::info!("Experiment directory: {:?}", self.experiment_dir);
        Ok(default_runner(config))
    }
}
