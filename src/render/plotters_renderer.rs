//! PNG rendering of comparison charts with `plotters`.

use std::error::Error;
use std::path::Path;

use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::analysis::types::{LineStyle, MarkerShape, Rgb};

use super::chart::{BarChart, OverlayChart};
use super::{ChartRenderer, RenderError};

const FONT: &str = "sans-serif";
const LINE_WIDTH: u32 = 4;
const MARKER_SIZE: i32 = 8;
const ALPHA: f64 = 0.8;

type DrawResult = Result<(), Box<dyn Error>>;

fn to_color(rgb: Rgb) -> RGBColor {
    RGBColor(rgb.0, rgb.1, rgb.2)
}

/// Writes charts as PNG files at a fixed resolution
#[derive(Debug, Clone)]
pub struct PlottersRenderer {
    /// Overlay image size in pixels (8x4 in at 300 dpi)
    pub overlay_size: (u32, u32),
    /// Bar chart image size in pixels (6x4 in at 300 dpi)
    pub bar_size: (u32, u32),
}

impl Default for PlottersRenderer {
    fn default() -> Self {
        Self {
            overlay_size: (2400, 1200),
            bar_size: (1800, 1200),
        }
    }
}

fn draw_overlay(chart: &OverlayChart, output: &Path, size: (u32, u32)) -> DrawResult {
    let root = BitMapBackend::new(output, size).into_drawing_area();
    root.fill(&WHITE)?;

    let ((x_min, x_max), (y_min, y_max)) = chart.bounds();
    let mut ctx = ChartBuilder::on(&root)
        .caption(&chart.title, (FONT, 48))
        .margin(30)
        .x_label_area_size(90)
        .y_label_area_size(120)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    ctx.configure_mesh()
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .label_style((FONT, 28))
        .axis_desc_style((FONT, 32))
        .draw()?;

    for series in &chart.series {
        let color = to_color(series.style.color);
        let line = color.mix(ALPHA).stroke_width(LINE_WIDTH);
        let points = series.points.clone();

        let anno = match series.style.line {
            LineStyle::Solid => ctx.draw_series(LineSeries::new(points, line))?,
            LineStyle::Dashed => ctx.draw_series(DashedLineSeries::new(points, 18, 10, line))?,
            LineStyle::Dotted => ctx.draw_series(DashedLineSeries::new(points, 4, 8, line))?,
        };
        anno.label(series.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 40, y)], line));

        let fill = color.mix(ALPHA).filled();
        match series.style.marker {
            MarkerShape::Circle => {
                ctx.draw_series(series.marker_points().map(|p| Circle::new(p, MARKER_SIZE, fill)))?;
            }
            MarkerShape::Square => {
                ctx.draw_series(series.marker_points().map(|p| {
                    EmptyElement::at(p)
                        + Rectangle::new([(-MARKER_SIZE, -MARKER_SIZE), (MARKER_SIZE, MARKER_SIZE)], fill)
                }))?;
            }
            MarkerShape::Triangle => {
                ctx.draw_series(
                    series.marker_points().map(|p| TriangleMarker::new(p, MARKER_SIZE + 2, fill)),
                )?;
            }
        }
    }

    ctx.configure_series_labels()
        .label_font((FONT, 28))
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

fn draw_bars(chart: &BarChart, output: &Path, size: (u32, u32)) -> DrawResult {
    let root = BitMapBackend::new(output, size).into_drawing_area();
    root.fill(&WHITE)?;

    let slots = chart.bars.len().max(1) as f64;
    let mut ctx = ChartBuilder::on(&root)
        .caption(&chart.title, (FONT, 44))
        .margin(30)
        .x_label_area_size(70)
        .y_label_area_size(120)
        .build_cartesian_2d(-0.5f64..(slots - 0.5), 0f64..chart.y_max())?;

    // Only horizontal grid lines; category names are drawn below the bars
    ctx.configure_mesh()
        .disable_x_mesh()
        .light_line_style(WHITE)
        .bold_line_style(BLACK.mix(0.25))
        .x_label_formatter(&|_| String::new())
        .y_desc(chart.y_label.as_str())
        .label_style((FONT, 28))
        .axis_desc_style((FONT, 32))
        .draw()?;

    let half = chart.bar_width / 2.0;
    ctx.draw_series(chart.bars.iter().enumerate().map(|(idx, bar)| {
        let x = idx as f64;
        Rectangle::new(
            [(x - half, 0.0), (x + half, bar.value)],
            to_color(bar.scheme.style().color).filled(),
        )
    }))?;

    let label_style = TextStyle::from((FONT, 30).into_font()).pos(Pos::new(HPos::Center, VPos::Top));
    for (idx, bar) in chart.bars.iter().enumerate() {
        let (px, py) = ctx.plotting_area().map_coordinate(&(idx as f64, 0.0));
        root.draw(&Text::new(bar.scheme.to_string(), (px, py + 12), label_style.clone()))?;
    }

    root.present()?;
    Ok(())
}

impl ChartRenderer for PlottersRenderer {
    fn render_overlay(&self, chart: &OverlayChart, output: &Path) -> Result<(), RenderError> {
        draw_overlay(chart, output, self.overlay_size).map_err(|e| RenderError::Backend {
            path: output.to_path_buf(),
            message: e.to_string(),
        })?;
        log::info!("Wrote {}", output.display());
        Ok(())
    }

    fn render_bars(&self, chart: &BarChart, output: &Path) -> Result<(), RenderError> {
        draw_bars(chart, output, self.bar_size).map_err(|e| RenderError::Backend {
            path: output.to_path_buf(),
            message: e.to_string(),
        })?;
        log::info!("Wrote {}", output.display());
        Ok(())
    }
}
