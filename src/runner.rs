//! Experiment orchestration.
//!
//! Walks the fixed scheme set for one experiment directory, derives the
//! requested metric per scheme and hands the collected series to a
//! [`ChartRenderer`]. Problems with a single scheme become warnings; only a
//! chart with no data at all is an error.

use std::path::{Path, PathBuf};

use color_eyre::Result;

use crate::analysis::{
    compute_loss_series, extract_aggregate_loss, load_perf_summary, read_p95_delay,
    resolve_datalink_log, stats_log_path, FlowSeries, Scheme, SchemeWarning, TimeSeries,
    TimeSeriesSource,
};
use crate::config::AnalysisConfig;
use crate::render::{Bar, BarChart, ChartRenderer, OverlayChart, OverlaySeries};

/// File holding Pantheon's per-scheme performance summary
pub const PERF_SUMMARY_FILE: &str = "pantheon_perf.json";
pub const RTT_BAR_FILE: &str = "rtt_95pct_bar.png";
pub const LOSS_BAR_FILE: &str = "loss_rate_comparison.png";

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("No scheme has data for the {chart} chart in {}", .dir.display())]
    NoSchemeData { chart: &'static str, dir: PathBuf },
}

/// Metric plotted over time on an overlay chart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayMetric {
    /// Egress throughput
    Throughput,
    /// Instantaneous loss derived from ingress and egress
    Loss,
}

impl OverlayMetric {
    pub fn name(&self) -> &'static str {
        match self {
            OverlayMetric::Throughput => "throughput",
            OverlayMetric::Loss => "loss",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            OverlayMetric::Throughput => "combined_throughput_time.png",
            OverlayMetric::Loss => "combined_loss_time.png",
        }
    }

    fn title(&self, dir_label: &str) -> String {
        match self {
            OverlayMetric::Throughput => format!("Throughput Over Time - {}", dir_label),
            OverlayMetric::Loss => format!("Loss Over Time - {}", dir_label),
        }
    }

    fn y_label(&self) -> &'static str {
        match self {
            OverlayMetric::Throughput => "Throughput (Mbit/s)",
            OverlayMetric::Loss => "Loss rate (%)",
        }
    }

    fn derive(&self, scheme: Scheme, flow: &FlowSeries, warnings: &mut Vec<SchemeWarning>) -> TimeSeries {
        match self {
            OverlayMetric::Throughput => {
                let head = &flow.egress.values[..flow.egress.len().min(5)];
                log::debug!("First 5 {} throughputs: {:.2?}", scheme, head);
                flow.egress.clone()
            }
            OverlayMetric::Loss => {
                let loss = compute_loss_series(&flow.ingress, &flow.egress);
                if let Some(t) = loss.truncation {
                    push_warning(
                        warnings,
                        scheme,
                        format!(
                            "ingress has {} bins but egress has {}; loss series truncated to {}",
                            t.ingress_len,
                            t.egress_len,
                            t.kept()
                        ),
                    );
                }
                log::debug!(
                    "{}: len(egress)={}, len(loss)={}",
                    scheme,
                    flow.egress.len(),
                    loss.series.len()
                );
                loss.series
            }
        }
    }
}

/// Outcome of producing one chart
#[derive(Debug, Clone)]
pub struct ChartReport {
    pub artifact: PathBuf,
    /// Schemes whose values came from data, in drawing order
    pub plotted: Vec<Scheme>,
    pub warnings: Vec<SchemeWarning>,
}

impl ChartReport {
    pub fn warned_about(&self, scheme: Scheme) -> bool {
        self.warnings.iter().any(|w| w.scheme == scheme)
    }
}

fn push_warning(warnings: &mut Vec<SchemeWarning>, scheme: Scheme, message: String) {
    log::warn!("{}: {}", scheme, message);
    warnings.push(SchemeWarning { scheme, message });
}

/// Basename of a directory for chart titles
fn dir_label(dir: &Path) -> String {
    dir.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .or_else(|| {
            let canonical = dir.canonicalize().ok()?;
            canonical.file_name().map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| dir.display().to_string())
}

/// Produces comparison charts for experiment directories
pub struct ExperimentRunner<S, R> {
    config: AnalysisConfig,
    source: S,
    renderer: R,
}

impl<S: TimeSeriesSource, R: ChartRenderer> ExperimentRunner<S, R> {
    pub fn new(config: AnalysisConfig, source: S, renderer: R) -> Self {
        Self {
            config,
            source,
            renderer,
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Overlay one metric over time for every scheme with a usable log
    pub fn run_overlay(&self, exp_dir: &Path, metric: OverlayMetric) -> Result<ChartReport> {
        let run_id = self.config.run_id;
        let mut warnings = Vec::new();
        let mut plotted = Vec::new();
        let mut series = Vec::new();

        for scheme in Scheme::DRAW_ORDER {
            let Some(log_path) = resolve_datalink_log(exp_dir, scheme, run_id) else {
                push_warning(
                    &mut warnings,
                    scheme,
                    format!("No datalink log for run {} in {}", run_id, exp_dir.display()),
                );
                continue;
            };

            log::info!("Loading {} from {}", scheme, log_path.display());
            let tunnel = match self.source.load(&log_path) {
                Ok(tunnel) => tunnel,
                Err(e) => {
                    push_warning(&mut warnings, scheme, e.to_string());
                    continue;
                }
            };

            let Some(flow) = tunnel.primary_flow(self.config.tunnel.flow) else {
                push_warning(
                    &mut warnings,
                    scheme,
                    format!("Requested flow not found in {}", log_path.display()),
                );
                continue;
            };

            let derived = metric.derive(scheme, flow, &mut warnings);
            if derived.is_empty() {
                push_warning(
                    &mut warnings,
                    scheme,
                    format!("No {} samples in {}", metric.name(), log_path.display()),
                );
                continue;
            }

            series.push(OverlaySeries::for_scheme(scheme, &derived));
            plotted.push(scheme);
        }

        if series.is_empty() {
            return Err(RunError::NoSchemeData {
                chart: metric.name(),
                dir: exp_dir.to_path_buf(),
            }
            .into());
        }

        let chart = OverlayChart {
            title: metric.title(&dir_label(exp_dir)),
            x_label: "Time (s)".to_string(),
            y_label: metric.y_label().to_string(),
            series,
        };
        let artifact = exp_dir.join(metric.file_name());
        self.renderer.render_overlay(&chart, &artifact)?;

        Ok(ChartReport {
            artifact,
            plotted,
            warnings,
        })
    }

    /// Bar chart of the 95th-percentile one-way delay per scheme.
    ///
    /// A scheme whose stats log is missing or unparsable gets a zero bar.
    pub fn run_rtt_bar(&self, exp_dir: &Path) -> Result<ChartReport> {
        let run_id = self.config.run_id;
        let mut warnings = Vec::new();
        let mut plotted = Vec::new();
        let mut bars = Vec::new();
        let mut any_stats = false;

        for scheme in Scheme::ALL {
            let stats = stats_log_path(exp_dir, scheme, run_id);
            let value = if !stats.is_file() {
                push_warning(
                    &mut warnings,
                    scheme,
                    format!("Missing stats log {}", stats.display()),
                );
                0.0
            } else {
                any_stats = true;
                match read_p95_delay(&stats) {
                    Ok(Some(rtt)) => {
                        log::info!("{}: 95th-pct RTT = {:.3} ms", scheme, rtt);
                        plotted.push(scheme);
                        rtt
                    }
                    Ok(None) => {
                        push_warning(
                            &mut warnings,
                            scheme,
                            format!("Couldn't parse RTT in {}", stats.display()),
                        );
                        0.0
                    }
                    Err(e) => {
                        push_warning(
                            &mut warnings,
                            scheme,
                            format!("Failed to read {}: {}", stats.display(), e),
                        );
                        0.0
                    }
                }
            };
            bars.push(Bar { scheme, value });
        }

        if !any_stats {
            return Err(RunError::NoSchemeData {
                chart: "rtt",
                dir: exp_dir.to_path_buf(),
            }
            .into());
        }

        let chart = BarChart::new(
            format!("95th-Percentile RTT - {}", dir_label(exp_dir)),
            "95th-percentile RTT (ms)".to_string(),
            bars,
        );
        let artifact = exp_dir.join(RTT_BAR_FILE);
        self.renderer.render_bars(&chart, &artifact)?;

        Ok(ChartReport {
            artifact,
            plotted,
            warnings,
        })
    }

    /// Bar chart of aggregate loss from a performance summary.
    ///
    /// Only schemes present in the summary get a bar. A present entry that
    /// cannot be read is an error, since there is no safe default for it.
    pub fn run_loss_bar(&self, summary_path: &Path, out_dir: &Path) -> Result<ChartReport> {
        let summary = load_perf_summary(summary_path)?;
        let mut warnings = Vec::new();
        let mut plotted = Vec::new();
        let mut bars = Vec::new();

        for key in summary.keys() {
            if key.parse::<Scheme>().is_err() {
                log::warn!("Ignoring unknown scheme {:?} in {}", key, summary_path.display());
            }
        }

        for scheme in Scheme::ALL {
            if !summary.contains(scheme) {
                push_warning(
                    &mut warnings,
                    scheme,
                    format!("Not present in {}", summary_path.display()),
                );
                continue;
            }
            let loss = extract_aggregate_loss(&summary, scheme)?;
            log::info!("{}: loss rate = {:.3}%", scheme, loss);
            bars.push(Bar { scheme, value: loss });
            plotted.push(scheme);
        }

        let source_dir = summary_path.parent().unwrap_or_else(|| Path::new("."));
        if bars.is_empty() {
            return Err(RunError::NoSchemeData {
                chart: "loss rate",
                dir: source_dir.to_path_buf(),
            }
            .into());
        }

        let dir_name = if source_dir.as_os_str().is_empty() {
            dir_label(Path::new("."))
        } else {
            dir_label(source_dir)
        };
        let chart = BarChart::new(
            format!("Loss Rate by Congestion Control Scheme - {}", dir_name),
            "Loss rate (%)".to_string(),
            bars,
        );
        let artifact = out_dir.join(LOSS_BAR_FILE);
        self.renderer.render_bars(&chart, &artifact)?;

        Ok(ChartReport {
            artifact,
            plotted,
            warnings,
        })
    }

    /// Every chart for one directory; the loss bar chart only when a summary exists
    pub fn run_experiment(&self, exp_dir: &Path) -> Result<Vec<ChartReport>> {
        let mut reports = vec![
            self.run_overlay(exp_dir, OverlayMetric::Throughput)?,
            self.run_overlay(exp_dir, OverlayMetric::Loss)?,
            self.run_rtt_bar(exp_dir)?,
        ];

        let summary = exp_dir.join(PERF_SUMMARY_FILE);
        if summary.is_file() {
            reports.push(self.run_loss_bar(&summary, exp_dir)?);
        } else {
            log::info!("No {} in {}, skipping loss rate chart", PERF_SUMMARY_FILE, exp_dir.display());
        }

        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dir_label_uses_basename() {
        assert_eq!(dir_label(Path::new("data/experiment-1")), "experiment-1");
        assert_eq!(dir_label(Path::new("data/experiment-1/")), "experiment-1");
    }

    #[test]
    fn test_metric_labels() {
        assert_eq!(OverlayMetric::Throughput.file_name(), "combined_throughput_time.png");
        assert_eq!(OverlayMetric::Loss.file_name(), "combined_loss_time.png");
        assert_eq!(OverlayMetric::Loss.title("exp"), "Loss Over Time - exp");
        assert_eq!(OverlayMetric::Throughput.y_label(), "Throughput (Mbit/s)");
    }

    #[test]
    fn test_throughput_uses_egress() {
        let flow = FlowSeries {
            ingress: TimeSeries::new(vec![0.0], vec![10.0]),
            egress: TimeSeries::new(vec![0.0, 0.5], vec![8.0, 9.0]),
        };
        let mut warnings = Vec::new();
        let derived = OverlayMetric::Throughput.derive(Scheme::Cubic, &flow, &mut warnings);
        assert_eq!(derived, flow.egress);
        assert!(warnings.is_empty());

        let derived = OverlayMetric::Loss.derive(Scheme::Cubic, &flow, &mut warnings);
        assert_eq!(derived.len(), 1);
        assert!((derived.values[0] - 20.0).abs() < 1e-9);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].scheme, Scheme::Cubic);
    }
}
