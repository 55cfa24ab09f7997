//! Backend-independent description of the comparison charts.

use crate::analysis::types::{Scheme, SeriesStyle, TimeSeries};

/// Width of each bar, in category units
pub const BAR_WIDTH: f64 = 0.6;

/// Draw a marker at roughly every tenth of the points, never less than every point
pub fn marker_stride(point_count: usize) -> usize {
    (point_count / 10).max(1)
}

/// One scheme's line on an overlay chart
#[derive(Debug, Clone, PartialEq)]
pub struct OverlaySeries {
    pub label: String,
    pub style: SeriesStyle,
    pub points: Vec<(f64, f64)>,
    pub marker_every: usize,
}

impl OverlaySeries {
    pub fn for_scheme(scheme: Scheme, series: &TimeSeries) -> Self {
        Self {
            label: scheme.to_string(),
            style: scheme.style(),
            points: series.points(),
            marker_every: marker_stride(series.len()),
        }
    }

    /// Points that carry a marker
    pub fn marker_points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.points.iter().copied().step_by(self.marker_every)
    }
}

/// Several series on one shared time axis
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<OverlaySeries>,
}

impl OverlayChart {
    /// Axis ranges covering every series, padded so no line sits on the frame
    pub fn bounds(&self) -> ((f64, f64), (f64, f64)) {
        let points = self.series.iter().flat_map(|s| s.points.iter());
        let (mut x_max, mut y_min, mut y_max) = (0.0f64, 0.0f64, 0.0f64);
        for &(x, y) in points {
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
        if x_max <= 0.0 {
            x_max = 1.0;
        }
        if y_max - y_min <= f64::EPSILON {
            y_max = y_min + 1.0;
        }
        let pad = (y_max - y_min) * 0.05;
        let y_min = if y_min < 0.0 { y_min - pad } else { y_min };
        ((0.0, x_max), (y_min, y_max + pad))
    }
}

/// A single bar of a per-scheme bar chart
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub scheme: Scheme,
    pub value: f64,
}

/// One bar per scheme, in the order given
#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    pub y_label: String,
    pub bars: Vec<Bar>,
    pub bar_width: f64,
}

impl BarChart {
    pub fn new(title: String, y_label: String, bars: Vec<Bar>) -> Self {
        Self {
            title,
            y_label,
            bars,
            bar_width: BAR_WIDTH,
        }
    }

    pub fn values(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.value).collect()
    }

    /// Upper end of the value axis, leaving 20% headroom above the tallest bar
    pub fn y_max(&self) -> f64 {
        let max = self.bars.iter().map(|b| b.value).fold(0.0f64, f64::max);
        if max > 0.0 {
            max * 1.2
        } else {
            1.0
        }
    }
}
