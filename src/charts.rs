/// Bar chart rendering for the revenue lag report
///
/// Every chart is a set of green bars over categorical labels with a dashed
/// horizontal reference line at the dataset mean. Charts are written as PNG
/// files with the [`plotters`] bitmap backend.
///
/// Styling is carried by an immutable [`ChartStyle`] passed to each call;
/// nothing here touches shared state.

use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use plotters::style::FontTransform;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::ops::Range;
use std::path::Path;
use thiserror::Error;

use crate::analysis::groupings::LagGroup;

/// Errors that can occur during chart generation
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Failed to create drawing area: {0}")]
    DrawingArea(String),

    #[error("Failed to configure chart: {0}")]
    ChartConfig(String),

    #[error("Failed to draw chart elements: {0}")]
    Drawing(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

type Result<T> = core::result::Result<T, PlotError>;

/// Label of the dashed reference line in every chart legend.
pub const MEAN_LINE_LABEL: &str = "Mean of Data Set";

/// Visual settings shared by every chart in a report.
#[derive(Debug, Clone)]
pub struct ChartStyle {
    /// Output size in pixels.
    pub size: (u32, u32),
    pub font_family: &'static str,
    pub title_font_size: f64,
    pub axis_desc_font_size: f64,
    pub tick_font_size: f64,
    /// Tick label size for rotated (route) labels.
    pub rotated_tick_font_size: f64,
    pub line_width: u32,
    pub bar_color: RGBColor,
    pub plot_background: RGBColor,
    pub mean_line_color: RGBColor,
    /// Dash length and gap of the reference line, in pixels.
    pub dash: (u32, u32),
}

impl Default for ChartStyle {
    fn default() -> Self {
        ChartStyle {
            size: (1400, 700),
            font_family: "sans-serif",
            title_font_size: 26.0,
            axis_desc_font_size: 28.0,
            tick_font_size: 20.0,
            rotated_tick_font_size: 16.0,
            line_width: 2,
            bar_color: RGBColor(0, 128, 0),
            plot_background: RGBColor(211, 211, 211),
            mean_line_color: BLACK,
            dash: (12, 6),
        }
    }
}

/// What to draw in one bar chart.
#[derive(Debug, Clone)]
pub struct BarChart<'a> {
    pub title: &'a str,
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub bars: &'a [LagGroup],
    /// Height of the dashed reference line.
    pub reference: f64,
    /// Draw x tick labels vertically (long route labels).
    pub rotate_labels: bool,
}

/// Y-axis range covering every bar, the zero baseline and the reference
/// line, with 10% headroom on each side that has data.
pub fn value_range(values: &[f64], reference: f64) -> Range<f64> {
    let low = values.iter().copied().fold(reference.min(0.0), f64::min);
    let high = values.iter().copied().fold(reference.max(0.0), f64::max);

    let pad = (high - low).abs().max(1.0) * 0.1;
    let low = if low < 0.0 { low - pad } else { 0.0 };
    let high = if high > 0.0 { high + pad } else { pad };
    low..high
}

/// X-axis range with exactly one unit-wide slot per bar.
pub fn category_range(bars: usize) -> Range<f64> {
    0.0..bars as f64
}

/// Left and right edge of bar `index` on the category axis.
pub fn bar_span(index: usize) -> (f64, f64) {
    (index as f64, index as f64 + 1.0)
}

/// Gap between the x axis and the top of its category labels, in pixels.
const LABEL_GAP: i32 = 8;

/// Style of the category labels drawn under the x axis.
///
/// Rotated labels read downwards and start at the axis; upright labels
/// hang centred under their bar.
fn category_label_style(style: &ChartStyle, rotate: bool) -> TextStyle<'static> {
    if rotate {
        TextStyle::from((style.font_family, style.rotated_tick_font_size).into_font())
            .transform(FontTransform::Rotate90)
            .pos(Pos::new(HPos::Left, VPos::Center))
    } else {
        TextStyle::from((style.font_family, style.tick_font_size).into_font())
            .pos(Pos::new(HPos::Center, VPos::Top))
    }
}

/// Renders `chart` to a PNG at `output_path`.
///
/// # Returns
/// * `Ok(())` - If the chart was successfully created and saved
/// * `Err(PlotError)` - If `chart.bars` is empty or drawing failed
pub fn render_bar_chart(chart: &BarChart<'_>, style: &ChartStyle, output_path: &Path) -> Result<()> {
    if chart.bars.is_empty() {
        return Err(PlotError::InvalidData(format!("'{}' has no bars", chart.title)));
    }

    let values: Vec<f64> = chart.bars.iter().map(|g| g.mean_lag_days).collect();
    let x_range = category_range(values.len());
    let y_range = value_range(&values, chart.reference);

    let root = BitMapBackend::new(output_path, style.size).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    let x_label_area = if chart.rotate_labels { 160 } else { 70 };
    let mut chart_context = ChartBuilder::on(&root)
        .caption(chart.title, (style.font_family, style.title_font_size))
        .margin(20)
        .x_label_area_size(x_label_area)
        .y_label_area_size(80)
        .build_cartesian_2d(x_range.clone(), y_range.clone())
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    chart_context
        .plotting_area()
        .fill(&style.plot_background)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    // Category labels are drawn below; the mesh only draws the y axis labels.
    chart_context
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(0)
        .y_label_style((style.font_family, style.tick_font_size))
        .x_desc(chart.x_label)
        .y_desc(chart.y_label)
        .axis_desc_style((style.font_family, style.axis_desc_font_size))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    let label_style = category_label_style(style, chart.rotate_labels);
    for (i, group) in chart.bars.iter().enumerate() {
        let (left, right) = bar_span(i);
        let (x, y) = chart_context.backend_coord(&((left + right) / 2.0, y_range.start));
        root.draw_text(&group.label, &label_style, (x, y + LABEL_GAP))
            .map_err(|e| PlotError::Drawing(e.to_string()))?;
    }

    let bar_style = style.bar_color.filled();
    chart_context
        .draw_series(values.iter().enumerate().map(|(i, value)| {
            let (left, right) = bar_span(i);
            let mut bar = Rectangle::new([(left, 0.0), (right, *value)], bar_style);
            bar.set_margin(0, 0, 6, 6);
            bar
        }))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    let line_style = style.mean_line_color.stroke_width(style.line_width);
    let mean_line = [(x_range.start, chart.reference), (x_range.end, chart.reference)];
    chart_context
        .draw_series(DashedLineSeries::new(mean_line, style.dash.0, style.dash.1, line_style))
        .map_err(|e| PlotError::Drawing(e.to_string()))?
        .label(MEAN_LINE_LABEL)
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 24, y)], line_style));

    chart_context
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .label_font((style.font_family, style.tick_font_size))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    // Flushes the bitmap to the PNG file.
    root.present()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    Ok(())
}
