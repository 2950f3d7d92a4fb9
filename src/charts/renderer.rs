//! Static Chart Renderer
//! Writes the collection trend chart and the category bar chart to SVG or PNG.
//!
//! Layout:
//! 1. Caption: "{metric title} by Collection" / "{metric title} by Category"
//! 2. Plot area with labelled axes
//! 3. Legend (trend chart only), upper right

use crate::data::Collection;
use crate::stats::{CategoryMetrics, Metric, MonthlyBucket};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::register_font;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;

/// Chart font, embedded so rendering never depends on system fonts.
const FONT_FAMILY: &str = "sans-serif";
static FONT_BYTES: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

/// Series colours, one per collection in `Collection::ALL` order.
pub const PALETTE: [RGBColor; 3] = [
    RGBColor(231, 76, 60),  // Oversized
    RGBColor(52, 152, 219), // Fitted
    RGBColor(46, 204, 113), // Classic
];

const BAR_COLOR: RGBColor = RGBColor(91, 155, 213);

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Nothing to plot")]
    NoData,
    #[error("Unsupported chart format: {0} (use .svg or .png)")]
    UnsupportedFormat(String),
    #[error("Failed to draw chart: {0}")]
    Draw(String),
    #[error("Embedded chart font could not be loaded")]
    Font,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Svg,
    Png,
}

impl Format {
    fn from_path(path: &Path) -> Result<Self, ChartError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "svg" => Ok(Format::Svg),
            "png" => Ok(Format::Png),
            _ => Err(ChartError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

type DrawResult = Result<(), Box<dyn std::error::Error>>;

pub struct ChartRenderer;

impl ChartRenderer {
    /// One line per collection across the monthly buckets.
    pub fn render_monthly(
        buckets: &[MonthlyBucket],
        metric: Metric,
        path: &Path,
        size: (u32, u32),
    ) -> Result<(), ChartError> {
        if buckets.is_empty() {
            return Err(ChartError::NoData);
        }
        Self::render(path, size, |format| match format {
            Format::Svg => Self::draw_monthly(SVGBackend::new(path, size).into_drawing_area(), buckets, metric),
            Format::Png => Self::draw_monthly(BitMapBackend::new(path, size).into_drawing_area(), buckets, metric),
        })
    }

    /// One bar per category.
    pub fn render_categories(
        metrics: &[CategoryMetrics],
        metric: Metric,
        path: &Path,
        size: (u32, u32),
    ) -> Result<(), ChartError> {
        if metrics.is_empty() {
            return Err(ChartError::NoData);
        }
        Self::render(path, size, |format| match format {
            Format::Svg => Self::draw_categories(SVGBackend::new(path, size).into_drawing_area(), metrics, metric),
            Format::Png => Self::draw_categories(BitMapBackend::new(path, size).into_drawing_area(), metrics, metric),
        })
    }

    fn render<F>(path: &Path, size: (u32, u32), draw: F) -> Result<(), ChartError>
    where
        F: FnOnce(Format) -> DrawResult,
    {
        let format = Format::from_path(path)?;
        Self::register_fonts()?;
        draw(format).map_err(|e| ChartError::Draw(e.to_string()))?;
        tracing::info!(path = %path.display(), width = size.0, height = size.1, "rendered chart");
        Ok(())
    }

    /// Registers the embedded font once per process. Text layout looks fonts up
    /// by family name, so both backends need it before the first caption.
    fn register_fonts() -> Result<(), ChartError> {
        static REGISTERED: OnceLock<bool> = OnceLock::new();
        let registered = *REGISTERED.get_or_init(|| {
            register_font(FONT_FAMILY, FontStyle::Normal, FONT_BYTES).is_ok()
        });
        if registered {
            Ok(())
        } else {
            Err(ChartError::Font)
        }
    }

    /// Upper bound for the y axis with 10% headroom.
    fn y_max(values: impl Iterator<Item = f64>) -> f64 {
        let max = values.filter(|v| v.is_finite()).fold(0.0_f64, f64::max);
        if max > 0.0 {
            max * 1.1
        } else {
            1.0
        }
    }

    fn draw_monthly<DB>(root: DrawingArea<DB, Shift>, buckets: &[MonthlyBucket], metric: Metric) -> DrawResult
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        root.fill(&WHITE)?;

        let y_max = Self::y_max(buckets.iter().flat_map(|b| b.values(metric)));
        let x_max = buckets.len().saturating_sub(1).max(1);

        let mut chart = ChartBuilder::on(&root)
            .caption(format!("{} by Collection", metric.title()), (FONT_FAMILY, 24))
            .margin(16)
            .x_label_area_size(40)
            .y_label_area_size(80)
            .build_cartesian_2d(0usize..x_max, 0f64..y_max)?;

        let label_for = |idx: &usize| {
            buckets
                .get(*idx)
                .map(|b| b.display.clone())
                .unwrap_or_default()
        };
        let value_label = |v: &f64| metric.format_value(*v);

        chart
            .configure_mesh()
            .x_labels(buckets.len().min(12))
            .x_label_formatter(&label_for)
            .y_label_formatter(&value_label)
            .y_desc(metric.title())
            .draw()?;

        for (collection, color) in Collection::ALL.into_iter().zip(PALETTE) {
            chart
                .draw_series(LineSeries::new(
                    buckets
                        .iter()
                        .enumerate()
                        .map(|(x, b)| (x, b.totals(collection).value(metric))),
                    color.stroke_width(2),
                ))?
                .label(collection.label())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        root.present()?;
        Ok(())
    }

    fn draw_categories<DB>(root: DrawingArea<DB, Shift>, metrics: &[CategoryMetrics], metric: Metric) -> DrawResult
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        root.fill(&WHITE)?;

        let y_max = Self::y_max(metrics.iter().map(|m| m.value(metric)));

        let mut chart = ChartBuilder::on(&root)
            .caption(format!("{} by Category", metric.title()), (FONT_FAMILY, 24))
            .margin(16)
            .x_label_area_size(40)
            .y_label_area_size(80)
            .build_cartesian_2d((0..metrics.len()).into_segmented(), 0f64..y_max)?;

        let label_for = |v: &SegmentValue<usize>| match v {
            SegmentValue::CenterOf(idx) => metrics
                .get(*idx)
                .map(|m| m.category.clone())
                .unwrap_or_default(),
            _ => String::new(),
        };
        let value_label = |v: &f64| metric.format_value(*v);

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(metrics.len())
            .x_label_formatter(&label_for)
            .y_label_formatter(&value_label)
            .y_desc(metric.title())
            .draw()?;

        chart.draw_series(metrics.iter().enumerate().map(|(idx, m)| {
            let mut bar = Rectangle::new(
                [
                    (SegmentValue::Exact(idx), 0.0),
                    (SegmentValue::Exact(idx + 1), m.value(metric)),
                ],
                BAR_COLOR.filled(),
            );
            bar.set_margin(0, 0, 8, 8);
            bar
        }))?;

        root.present()?;
        Ok(())
    }
}
