//! Comparison chart model and rendering.

pub mod chart;
pub mod plotters_renderer;

use std::path::{Path, PathBuf};

pub use chart::{marker_stride, Bar, BarChart, OverlayChart, OverlaySeries, BAR_WIDTH};
pub use plotters_renderer::PlottersRenderer;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to draw chart {}: {message}", .path.display())]
    Backend { path: PathBuf, message: String },
}

/// Writes a chart artifact, overwriting any previous file at `output`
pub trait ChartRenderer {
    fn render_overlay(&self, chart: &OverlayChart, output: &Path) -> Result<(), RenderError>;
    fn render_bars(&self, chart: &BarChart, output: &Path) -> Result<(), RenderError>;
}
