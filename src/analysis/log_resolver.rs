//! Locates per-scheme log files inside an experiment directory.
//!
//! Pantheon writes the datalink log under one of two names depending on
//! whether the run went through a mahimahi tunnel:
//! `{scheme}_mm_datalink_run{N}.log` or `{scheme}_datalink_run{N}.log`.

use std::path::{Path, PathBuf};

use super::types::Scheme;

/// Name of the tunneled datalink log
pub fn tunneled_log_name(scheme: Scheme, run_id: u32) -> String {
    format!("{}_mm_datalink_run{}.log", scheme, run_id)
}

/// Name of the plain datalink log
pub fn plain_log_name(scheme: Scheme, run_id: u32) -> String {
    format!("{}_datalink_run{}.log", scheme, run_id)
}

/// Resolve the datalink log for a scheme, preferring the tunneled variant.
///
/// Returns `None` when neither variant exists; the caller decides whether
/// that is worth a warning.
pub fn resolve_datalink_log(experiment_dir: &Path, scheme: Scheme, run_id: u32) -> Option<PathBuf> {
    [tunneled_log_name(scheme, run_id), plain_log_name(scheme, run_id)]
        .into_iter()
        .map(|name| experiment_dir.join(name))
        .find(|path| path.is_file())
}

/// Path of the stats log holding the textual performance summary
pub fn stats_log_path(experiment_dir: &Path, scheme: Scheme, run_id: u32) -> PathBuf {
    experiment_dir.join(format!("{}_stats_run{}.log", scheme, run_id))
}
