//! Derived-metrics pipeline for congestion-control comparison.
//!
//! This module resolves per-scheme logs, turns tunnel logs into ingress and
//! egress series, derives loss from them and extracts tail latency from
//! stats logs.

pub mod types;
pub mod log_resolver;
pub mod tunnel_log;
pub mod loss;
pub mod latency;

pub use types::*;
pub use log_resolver::{resolve_datalink_log, stats_log_path};
pub use tunnel_log::{SourceError, TimeSeriesSource, TunnelLogSource, TunnelSeries};
pub use loss::{compute_loss_series, extract_aggregate_loss, load_perf_summary, PerfSummary, SummaryError};
pub use latency::{extract_p95_delay, read_p95_delay};
