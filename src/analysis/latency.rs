//! Tail-latency extraction from Pantheon stats logs.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

/// Match: "95th percentile per-packet one-way delay: 42.619 ms"
pub static P95_DELAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"95th[- ]percentile.*delay: ([\d.]+) ms").expect("Invalid p95 delay regex")
});

fn match_line(line: &str) -> Option<f64> {
    let caps = P95_DELAY.captures(line)?;
    caps.get(1)?.as_str().parse().ok()
}

/// First 95th-percentile one-way delay (ms) found in the text, if any
pub fn extract_p95_delay(stats_text: &str) -> Option<f64> {
    stats_text.lines().find_map(match_line)
}

/// Stream a stats log and extract its 95th-percentile delay
pub fn read_p95_delay(path: &Path) -> io::Result<Option<f64>> {
    let reader = BufReader::new(File::open(path)?);
    for line in reader.lines() {
        if let Some(value) = match_line(&line?) {
            return Ok(Some(value));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATS: &str = "\
Start at: Wed Sep 26 17:50:41 2018
End at: Wed Sep 26 17:51:11 2018
Local clock offset: 0.059 ms
Remote clock offset: -0.021 ms

# Below is generated by plot.py at 2018-09-26 17:52:53
Datalink statistics
-- Total of 1 flow:
Average throughput: 93.27 Mbit/s
95th percentile per-packet one-way delay: 12.345 ms
Loss rate: 0.54%
-- Flow 1:
Average throughput: 93.27 Mbit/s
95th percentile per-packet one-way delay: 99.000 ms
Loss rate: 0.54%
";

    #[test]
    fn test_first_match_wins() {
        assert_eq!(extract_p95_delay(STATS), Some(12.345));
    }

    #[test]
    fn test_hyphen_and_space_separators() {
        assert_eq!(extract_p95_delay("95th-percentile one-way delay: 7.5 ms"), Some(7.5));
        assert_eq!(
            extract_p95_delay("... 95th percentile one-way delay: 12.345 ms ..."),
            Some(12.345)
        );
    }

    #[test]
    fn test_no_match_is_absent() {
        assert_eq!(extract_p95_delay("Average throughput: 93.27 Mbit/s\nLoss rate: 0.54%"), None);
        assert_eq!(extract_p95_delay("95th percentile delay: n/a ms"), None);
        assert_eq!(extract_p95_delay(""), None);
    }

    #[test]
    fn test_unparsable_value_falls_through_to_next_line() {
        let text = "95th percentile delay: 1.2.3 ms\n95th percentile delay: 4.5 ms\n";
        assert_eq!(extract_p95_delay(text), Some(4.5));
    }

    #[test]
    fn test_read_p95_delay_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("cubic_stats_run1.log");
        std::fs::write(&path, STATS).unwrap();

        assert_eq!(read_p95_delay(&path).unwrap(), Some(12.345));
        assert!(read_p95_delay(&dir.path().join("missing.log")).is_err());
    }
}
