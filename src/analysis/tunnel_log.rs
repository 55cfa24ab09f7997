//! Tunnel log parsing for Pantheon/mahimahi datalink logs.
//!
//! A datalink log records one line per packet event, timestamps in ms:
//!
//! ```text
//! # init timestamp: 1537984241315
//! 1537984241316 # 1500          delivery opportunity
//! 1537984241318 + 1500 1        arrival of 1500 bytes on flow 1
//! 1537984241350 - 1500 32 1     departure after 32 ms queueing
//! ```
//!
//! Events are summed into fixed-width bins and turned into per-flow
//! ingress (arrival) and egress (departure) throughput series in Mbit/s.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::config::TunnelOptions;

use super::types::{FlowSeries, TimeSeries};

/// Errors raised while turning a log into time series
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Failed to read tunnel log {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No arrival or departure events in {}", .path.display())]
    NoFlows { path: PathBuf },
}

/// Converts a captured log into per-flow series.
///
/// The analysis core only depends on this trait; the tunnel parser below
/// is the implementation used by the binaries.
pub trait TimeSeriesSource {
    fn load(&self, log_path: &Path) -> Result<TunnelSeries, SourceError>;
}

/// Per-flow series parsed from one tunnel log
#[derive(Debug, Clone, Default)]
pub struct TunnelSeries {
    pub flows: BTreeMap<u32, FlowSeries>,
}

impl TunnelSeries {
    /// The requested flow, or the lowest flow id when none is requested
    pub fn primary_flow(&self, flow: Option<u32>) -> Option<&FlowSeries> {
        match flow {
            Some(id) => self.flows.get(&id),
            None => self.flows.values().next(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum TunnelEvent {
    Arrival { ts: f64, bits: u64, flow: u32 },
    Departure { ts: f64, bits: u64, flow: u32 },
    Opportunity { ts: f64 },
}

impl TunnelEvent {
    fn ts(&self) -> f64 {
        match *self {
            TunnelEvent::Arrival { ts, .. }
            | TunnelEvent::Departure { ts, .. }
            | TunnelEvent::Opportunity { ts } => ts,
        }
    }
}

fn parse_event(line: &str) -> Option<TunnelEvent> {
    let items: Vec<&str> = line.split_whitespace().collect();
    if items.len() < 3 {
        return None;
    }
    let ts: f64 = items[0].parse().ok().filter(|ts: &f64| ts.is_finite())?;
    let bits = items[2].parse::<u64>().ok()?.checked_mul(8)?;

    match items[1] {
        "#" => Some(TunnelEvent::Opportunity { ts }),
        "+" => {
            let flow = if items.len() == 4 { items[3].parse().ok()? } else { 0 };
            Some(TunnelEvent::Arrival { ts, bits, flow })
        }
        "-" => {
            // The queueing delay field must be present even when unused
            items.get(3)?.parse::<f64>().ok()?;
            let flow = if items.len() == 5 { items[4].parse().ok()? } else { 0 };
            Some(TunnelEvent::Departure { ts, bits, flow })
        }
        _ => None,
    }
}

/// Highest bin index accepted; events further out are treated as malformed
const MAX_BIN: u64 = 1_000_000;

#[derive(Default)]
struct FlowBins {
    arrivals: BTreeMap<u64, u64>,
    departures: BTreeMap<u64, u64>,
}

fn bins_to_series(bins: &BTreeMap<u64, u64>, ms_per_bin: u64) -> TimeSeries {
    let Some(&max_bin) = bins.keys().next_back() else {
        return TimeSeries::default();
    };
    let us_per_bin = 1000.0 * ms_per_bin as f64;

    let (timestamps, values): (Vec<f64>, Vec<f64>) = (0..=max_bin)
        .map(|bin| {
            let time_sec = (bin * ms_per_bin) as f64 / 1000.0;
            let bits = bins.get(&bin).copied().unwrap_or(0);
            (time_sec, bits as f64 / us_per_bin)
        })
        .unzip();

    TimeSeries::new(timestamps, values)
}

/// Parse tunnel log lines into binned per-flow throughput.
///
/// Malformed lines are skipped.
pub fn parse_tunnel_log<R: BufRead>(reader: R, options: &TunnelOptions) -> TunnelSeries {
    let ms_per_bin = options.ms_per_bin;
    let mut first_ts: Option<f64> = None;
    let mut bins: BTreeMap<u32, FlowBins> = BTreeMap::new();
    let mut skipped = 0usize;

    for line_result in reader.lines() {
        let line = match line_result {
            Ok(l) => l,
            Err(_) => continue, // Skip unreadable lines
        };
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }

        let Some(event) = parse_event(&line) else {
            skipped += 1;
            continue;
        };

        let base = *first_ts.get_or_insert(event.ts());
        let offset = ((event.ts() - base) / ms_per_bin as f64).floor().max(0.0);
        if offset > MAX_BIN as f64 {
            skipped += 1;
            continue;
        }
        let bin = offset as u64;

        match event {
            TunnelEvent::Arrival { bits, flow, .. } => {
                let total = bins.entry(flow).or_default().arrivals.entry(bin).or_insert(0);
                *total = total.saturating_add(bits);
            }
            TunnelEvent::Departure { bits, flow, .. } => {
                let total = bins.entry(flow).or_default().departures.entry(bin).or_insert(0);
                *total = total.saturating_add(bits);
            }
            TunnelEvent::Opportunity { .. } => {}
        }
    }

    if skipped > 0 {
        log::debug!("Skipped {} malformed tunnel log lines", skipped);
    }

    let flows = bins
        .into_iter()
        .map(|(flow, flow_bins)| {
            let series = FlowSeries {
                ingress: bins_to_series(&flow_bins.arrivals, ms_per_bin),
                egress: bins_to_series(&flow_bins.departures, ms_per_bin),
            };
            (flow, series)
        })
        .collect();

    TunnelSeries { flows }
}

/// Reads Pantheon tunnel logs from disk
#[derive(Debug, Clone, Default)]
pub struct TunnelLogSource {
    options: TunnelOptions,
}

impl TunnelLogSource {
    pub fn new(options: TunnelOptions) -> Self {
        Self { options }
    }
}

impl TimeSeriesSource for TunnelLogSource {
    fn load(&self, log_path: &Path) -> Result<TunnelSeries, SourceError> {
        let file = File::open(log_path).map_err(|source| SourceError::Io {
            path: log_path.to_path_buf(),
            source,
        })?;
        let reader = BufReader::with_capacity(64 * 1024, file);

        let series = parse_tunnel_log(reader, &self.options);
        if series.flows.is_empty() {
            return Err(SourceError::NoFlows {
                path: log_path.to_path_buf(),
            });
        }

        log::debug!(
            "Parsed {}: {} flow(s)",
            log_path.display(),
            series.flows.len()
        );
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn parse(text: &str) -> TunnelSeries {
        parse_tunnel_log(Cursor::new(text), &TunnelOptions::default())
    }

    #[test]
    fn test_parse_event_variants() {
        assert_eq!(
            parse_event("100 + 1500"),
            Some(TunnelEvent::Arrival { ts: 100.0, bits: 12000, flow: 0 })
        );
        assert_eq!(
            parse_event("100 + 1500 2"),
            Some(TunnelEvent::Arrival { ts: 100.0, bits: 12000, flow: 2 })
        );
        assert_eq!(
            parse_event("130 - 1500 30 2"),
            Some(TunnelEvent::Departure { ts: 130.0, bits: 12000, flow: 2 })
        );
        assert_eq!(
            parse_event("130 - 1500 30"),
            Some(TunnelEvent::Departure { ts: 130.0, bits: 12000, flow: 0 })
        );
        assert_eq!(parse_event("90 # 1500"), Some(TunnelEvent::Opportunity { ts: 90.0 }));
        assert_eq!(parse_event("garbage"), None);
        assert_eq!(parse_event("100 ? 1500"), None);
        assert_eq!(parse_event("130 - 1500"), None);
    }

    #[test]
    fn test_parse_event_rejects_out_of_range_fields() {
        assert_eq!(parse_event("0 + 18446744073709551615"), None);
        assert_eq!(parse_event("inf + 1500"), None);
        assert_eq!(parse_event("NaN - 1500 10"), None);
    }

    #[test]
    fn test_far_future_events_are_skipped() {
        let series = parse("0 + 1500\n1e300 + 1500\n1537984241315 + 1500\n400 + 1500\n");
        let flow = series.primary_flow(None).unwrap();
        assert_eq!(flow.ingress.timestamps, vec![0.0]);
        assert!((flow.ingress.values[0] - 0.048).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_timestamps_are_skipped() {
        let series = parse("inf + 1500\n0 + 1500\n-inf + 1500\n");
        let flow = series.primary_flow(None).unwrap();
        assert_eq!(flow.ingress.len(), 1);
        assert!((flow.ingress.values[0] - 0.024).abs() < 1e-9);
    }

    #[test]
    fn test_bins_and_throughput() {
        // 500 ms bins: 1500 bytes = 12000 bits / 500000 us = 0.024 Mbit/s
        let series = parse(
            "# init timestamp: 1000\n\
             1000 + 1500\n\
             1100 + 1500\n\
             1200 - 1500 200\n\
             2100 + 1500\n\
             2150 - 1500 50\n",
        );

        let flow = series.primary_flow(None).unwrap();
        assert_eq!(flow.ingress.timestamps, vec![0.0, 0.5, 1.0]);
        assert!((flow.ingress.values[0] - 0.048).abs() < 1e-9);
        assert_eq!(flow.ingress.values[1], 0.0);
        assert!((flow.ingress.values[2] - 0.024).abs() < 1e-9);

        assert_eq!(flow.egress.timestamps, vec![0.0, 0.5, 1.0]);
        assert!((flow.egress.values[0] - 0.024).abs() < 1e-9);
        assert_eq!(flow.egress.values[1], 0.0);
        assert!((flow.egress.values[2] - 0.024).abs() < 1e-9);
    }

    #[test]
    fn test_opportunity_anchors_time_base() {
        let series = parse("0 # 1500\n600 + 1500\n");
        let flow = series.primary_flow(None).unwrap();
        assert_eq!(flow.ingress.timestamps, vec![0.0, 0.5]);
        assert_eq!(flow.ingress.values[0], 0.0);
        assert!(flow.egress.is_empty());
    }

    #[test]
    fn test_flow_selection() {
        let series = parse("0 + 1500 2\n10 + 1500 1\n20 - 1500 10 1\n");
        assert_eq!(series.flows.len(), 2);

        let lowest = series.primary_flow(None).unwrap();
        assert_eq!(lowest.egress.len(), 1);

        let second = series.primary_flow(Some(2)).unwrap();
        assert!(second.egress.is_empty());
        assert!(series.primary_flow(Some(7)).is_none());
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let series = parse("0 + 1500\nnot a line\n10 + abc\n\n20 + 1500\n");
        let flow = series.primary_flow(None).unwrap();
        assert_eq!(flow.ingress.len(), 1);
        assert!((flow.ingress.values[0] - 0.048).abs() < 1e-9);
    }

    #[test]
    fn test_load_reports_missing_and_empty_logs() {
        let dir = TempDir::new().unwrap();
        let source = TunnelLogSource::default();

        let missing = source.load(&dir.path().join("absent.log"));
        assert!(matches!(missing, Err(SourceError::Io { .. })));

        let empty = dir.path().join("empty.log");
        std::fs::write(&empty, "# init timestamp: 0\n0 # 1500\n").unwrap();
        assert!(matches!(source.load(&empty), Err(SourceError::NoFlows { .. })));
    }

    #[test]
    fn test_custom_bin_width() {
        let options = TunnelOptions { ms_per_bin: 1000, flow: None };
        let series = parse_tunnel_log(Cursor::new("0 + 1000\n900 + 1000\n"), &options);
        let flow = series.primary_flow(None).unwrap();
        assert_eq!(flow.ingress.timestamps, vec![0.0]);
        // 16000 bits over 1 s
        assert!((flow.ingress.values[0] - 0.016).abs() < 1e-9);
    }
}
