//! Loss metrics derived from ingress/egress series and performance summaries.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};

use super::types::{DerivedLossSeries, Scheme, TimeSeries, Truncation};

/// Errors raised while reading `pantheon_perf.json`
#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error("Scheme {scheme} is not present in the performance summary")]
    MissingScheme { scheme: Scheme },

    #[error("Malformed performance summary entry for {scheme}: {detail}")]
    Malformed { scheme: Scheme, detail: String },

    #[error("Failed to read performance summary {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in performance summary {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Per-scheme performance summary, keyed by scheme name
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct PerfSummary {
    entries: Map<String, Value>,
}

impl PerfSummary {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Scheme names as they appear in the file
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn contains(&self, scheme: Scheme) -> bool {
        self.entries.contains_key(scheme.as_str())
    }
}

/// Load a performance summary file
pub fn load_perf_summary(path: &Path) -> Result<PerfSummary, SummaryError> {
    let json = fs::read_to_string(path).map_err(|source| SummaryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    PerfSummary::from_json_str(&json).map_err(|source| SummaryError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Instantaneous loss percentage per bin.
///
/// The result is as long as the shorter input; timestamps come from the
/// egress series. A bin with no ingress traffic has 0% loss. When the two
/// lengths differ, `truncation` records both of them.
pub fn compute_loss_series(ingress: &TimeSeries, egress: &TimeSeries) -> DerivedLossSeries {
    let values: Vec<f64> = ingress
        .values
        .iter()
        .zip(egress.values.iter())
        .map(|(&i, &e)| if i > 0.0 { (i - e) / i * 100.0 } else { 0.0 })
        .collect();
    let timestamps: Vec<f64> = egress.timestamps.iter().take(values.len()).copied().collect();

    let truncation = (ingress.len() != egress.len()).then_some(Truncation {
        ingress_len: ingress.len(),
        egress_len: egress.len(),
    });

    DerivedLossSeries {
        series: TimeSeries::new(timestamps, values),
        truncation,
    }
}

/// Aggregate loss of a scheme, as a percentage
pub fn extract_aggregate_loss(summary: &PerfSummary, scheme: Scheme) -> Result<f64, SummaryError> {
    let malformed = |detail: &str| SummaryError::Malformed {
        scheme,
        detail: detail.to_string(),
    };

    let entry = summary
        .entries
        .get(scheme.as_str())
        .ok_or(SummaryError::MissingScheme { scheme })?;
    let loss = entry
        .get("all")
        .ok_or_else(|| malformed("missing 'all' record"))?
        .get("loss")
        .ok_or_else(|| malformed("missing 'all.loss' field"))?
        .as_f64()
        .ok_or_else(|| malformed("'all.loss' is not a number"))?;

    Ok(loss * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[f64]) -> TimeSeries {
        let timestamps = (0..values.len()).map(|i| i as f64 * 0.5).collect();
        TimeSeries::new(timestamps, values.to_vec())
    }

    #[test]
    fn test_loss_for_equal_lengths() {
        let ingress = series(&[10.0, 8.0, 4.0]);
        let egress = series(&[9.0, 8.0, 1.0]);

        let loss = compute_loss_series(&ingress, &egress);
        assert_eq!(loss.series.len(), 3);
        assert!(loss.truncation.is_none());
        for (idx, expected) in [10.0, 0.0, 75.0].iter().enumerate() {
            assert!((loss.series.values[idx] - expected).abs() < 1e-9);
        }
        assert_eq!(loss.series.timestamps, egress.timestamps);
    }

    #[test]
    fn test_zero_ingress_yields_zero_loss() {
        let ingress = series(&[0.0, 5.0, 0.0]);
        let egress = series(&[3.0, 5.0, 0.0]);

        let loss = compute_loss_series(&ingress, &egress);
        assert_eq!(loss.series.values, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_length_mismatch_truncates_to_shorter() {
        let ingress = series(&[4.0, 4.0, 4.0, 4.0]);
        let egress = TimeSeries::new(vec![0.1, 0.6], vec![2.0, 4.0]);

        let loss = compute_loss_series(&ingress, &egress);
        assert_eq!(loss.series.len(), 2);
        assert_eq!(loss.series.timestamps, vec![0.1, 0.6]);
        assert_eq!(
            loss.truncation,
            Some(Truncation { ingress_len: 4, egress_len: 2 })
        );

        // Egress longer than ingress keeps the egress timestamps prefix
        let loss = compute_loss_series(&series(&[2.0]), &series(&[1.0, 1.0, 1.0]));
        assert_eq!(loss.series.timestamps, vec![0.0]);
        assert_eq!(loss.series.values, vec![50.0]);
        assert_eq!(loss.truncation.unwrap().kept(), 1);
    }

    #[test]
    fn test_egress_above_ingress_is_negative_loss() {
        let loss = compute_loss_series(&series(&[2.0]), &series(&[3.0]));
        assert!((loss.series.values[0] + 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_extract_aggregate_loss() {
        let summary = PerfSummary::from_json_str(
            r#"{"cubic": {"all": {"loss": 0.05}}, "bbr": {"all": {"loss": 0.02, "tput": 90.1}}}"#,
        )
        .unwrap();

        assert!((extract_aggregate_loss(&summary, Scheme::Cubic).unwrap() - 5.0).abs() < 1e-9);
        assert!((extract_aggregate_loss(&summary, Scheme::Bbr).unwrap() - 2.0).abs() < 1e-9);
        assert!(matches!(
            extract_aggregate_loss(&summary, Scheme::Vegas),
            Err(SummaryError::MissingScheme { scheme: Scheme::Vegas })
        ));
    }

    #[test]
    fn test_malformed_summary_entries() {
        let summary = PerfSummary::from_json_str(
            r#"{"cubic": {"1": {"loss": 0.05}}, "bbr": {"all": {}}, "vegas": {"all": {"loss": "high"}}}"#,
        )
        .unwrap();

        for scheme in Scheme::ALL {
            assert!(matches!(
                extract_aggregate_loss(&summary, scheme),
                Err(SummaryError::Malformed { .. })
            ));
        }
    }

    #[test]
    fn test_load_perf_summary_errors() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = load_perf_summary(&dir.path().join("pantheon_perf.json"));
        assert!(matches!(missing, Err(SummaryError::Io { .. })));

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{not json").unwrap();
        assert!(matches!(load_perf_summary(&bad), Err(SummaryError::Json { .. })));
    }
}
