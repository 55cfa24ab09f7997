//! # cc-compare - Comparison charts for congestion-control experiments
//!
//! This library turns the logs of a Pantheon experiment into charts that
//! compare congestion-control schemes (cubic, bbr, vegas) run under the
//! same network conditions.
//!
//! ## Overview
//!
//! For each scheme in an experiment directory it:
//!
//! - **Resolves logs**: picks the tunneled (`{scheme}_mm_datalink_run1.log`)
//!   or plain (`{scheme}_datalink_run1.log`) datalink log
//! - **Derives series**: bins ingress and egress packet events into
//!   throughput, and computes instantaneous loss from the two
//! - **Extracts tail latency**: reads the 95th-percentile one-way delay from
//!   `{scheme}_stats_run1.log`
//! - **Renders charts**: overlays per-scheme time series, or draws one bar
//!   per scheme, with a fixed style per scheme
//!
//! Missing data for a scheme is reported as a warning and the chart is
//! still produced; a chart with no data at all is an error.
//!
//! ## Architecture
//!
//! - `analysis`: scheme types, log resolution, tunnel log parsing, loss and latency metrics
//! - `render`: backend-independent chart model and the `plotters` PNG renderer
//! - `runner`: per-experiment orchestration across the scheme set
//! - `config` / `config_loader`: YAML analysis configuration
//! - `cli`: argument parsing and logging setup shared by the binaries
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use cc_compare::cli::default_runner;
//! use cc_compare::config::AnalysisConfig;
//! use cc_compare::runner::OverlayMetric;
//!
//! let runner = default_runner(AnalysisConfig::default());
//! let report = runner.run_overlay(Path::new("data/experiment-1"), OverlayMetric::Loss)?;
//! println!("wrote {}", report.artifact.display());
//! # Ok::<(), color_eyre::eyre::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! Library components return typed errors built with `thiserror`; the runner
//! and the binaries use `color_eyre` for reporting with context.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod config_loader;
pub mod render;
pub mod runner;
