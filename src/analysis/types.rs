//! Core data types for congestion-control comparison.

use std::fmt;
use std::str::FromStr;

/// Time offset in seconds from the first event of a tunnel log
pub type ExpTime = f64;

/// Congestion-control scheme under comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scheme {
    Cubic,
    Bbr,
    Vegas,
}

impl Scheme {
    /// Every supported scheme, in bar-chart order
    pub const ALL: [Scheme; 3] = [Scheme::Cubic, Scheme::Bbr, Scheme::Vegas];

    /// Overlay draw order: cubic is drawn last so it stays on top
    pub const DRAW_ORDER: [Scheme; 3] = [Scheme::Bbr, Scheme::Vegas, Scheme::Cubic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Cubic => "cubic",
            Scheme::Bbr => "bbr",
            Scheme::Vegas => "vegas",
        }
    }

    /// Display style shared by every chart type
    pub fn style(&self) -> SeriesStyle {
        match self {
            Scheme::Cubic => SeriesStyle {
                color: Rgb(0x00, 0x00, 0xff),
                line: LineStyle::Solid,
                marker: MarkerShape::Circle,
            },
            Scheme::Bbr => SeriesStyle {
                color: Rgb(0xff, 0xa5, 0x00),
                line: LineStyle::Dashed,
                marker: MarkerShape::Square,
            },
            Scheme::Vegas => SeriesStyle {
                color: Rgb(0x00, 0x80, 0x00),
                line: LineStyle::Dotted,
                marker: MarkerShape::Triangle,
            },
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown congestion-control scheme: {0}")]
pub struct UnknownScheme(pub String);

impl FromStr for Scheme {
    type Err = UnknownScheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cubic" => Ok(Scheme::Cubic),
            "bbr" => Ok(Scheme::Bbr),
            "vegas" => Ok(Scheme::Vegas),
            other => Err(UnknownScheme(other.to_string())),
        }
    }
}

/// 24-bit colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
    Dotted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerShape {
    Circle,
    Square,
    Triangle,
}

/// Colour, line style and marker assigned to a scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesStyle {
    pub color: Rgb,
    pub line: LineStyle,
    pub marker: MarkerShape,
}

/// Parallel timestamp/value sequences; timestamps are non-decreasing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    pub timestamps: Vec<ExpTime>,
    pub values: Vec<f64>,
}

impl TimeSeries {
    pub fn new(timestamps: Vec<ExpTime>, values: Vec<f64>) -> Self {
        debug_assert_eq!(timestamps.len(), values.len());
        Self { timestamps, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn points(&self) -> Vec<(f64, f64)> {
        self.timestamps
            .iter()
            .copied()
            .zip(self.values.iter().copied())
            .collect()
    }
}

/// Ingress (tunnel entry) and egress (tunnel exit) throughput of one flow
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowSeries {
    pub ingress: TimeSeries,
    pub egress: TimeSeries,
}

/// Lengths of the two parent series when they disagree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Truncation {
    pub ingress_len: usize,
    pub egress_len: usize,
}

impl Truncation {
    pub fn kept(&self) -> usize {
        self.ingress_len.min(self.egress_len)
    }
}

/// Instantaneous loss percentage per time bin
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedLossSeries {
    pub series: TimeSeries,
    /// Set when ingress and egress lengths differed and the tail was dropped
    pub truncation: Option<Truncation>,
}

/// Non-fatal problem with one scheme's data
#[derive(Debug, Clone, PartialEq)]
pub struct SchemeWarning {
    pub scheme: Scheme,
    pub message: String,
}

impl fmt::Display for SchemeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.scheme, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_round_trips_through_name() {
        for scheme in Scheme::ALL {
            assert_eq!(scheme.as_str().parse::<Scheme>().unwrap(), scheme);
        }
        assert!("reno".parse::<Scheme>().is_err());
    }

    #[test]
    fn test_styles_are_distinct() {
        let styles: Vec<SeriesStyle> = Scheme::ALL.iter().map(Scheme::style).collect();
        assert_ne!(styles[0].color, styles[1].color);
        assert_ne!(styles[1].color, styles[2].color);
        assert_ne!(styles[0].line, styles[2].line);
        assert_ne!(styles[0].marker, styles[1].marker);
    }

    #[test]
    fn test_draw_order_puts_cubic_last() {
        assert_eq!(Scheme::DRAW_ORDER.last(), Some(&Scheme::Cubic));
    }
}
