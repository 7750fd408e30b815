//! Chart renderers

use std::path::Path;

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::debug;

use crate::config::ChartConfig;
use crate::error::{ErrorContext, ReportResult, WithContext};
use crate::visualization::chart::{
    category_label, category_tick_count, ChartData, ComparisonData, BAR_HALF_WIDTH,
};
use crate::visualization::fonts::{ensure_font_registered, FONT_FAMILY};

/// Single-series bar color
pub const BAR_COLOR: RGBColor = RGBColor(31, 119, 180);

/// Color of the "N/A" marker
pub const NOT_AVAILABLE_COLOR: RGBColor = RGBColor(214, 39, 40);

/// Ten-color categorical palette; series past the tenth reuse it.
pub const PALETTE: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

pub fn palette_color(index: usize) -> RGBColor {
    PALETTE[index % PALETTE.len()]
}

/// Turns chart data into an image file.
pub trait ChartRenderer {
    fn render_dataset_chart(&self, chart: &ChartData, path: &Path) -> ReportResult<()>;

    fn render_comparison_chart(&self, chart: &ComparisonData, path: &Path) -> ReportResult<()>;
}

/// Renders charts to PNG files through plotters' bitmap backend.
#[derive(Debug, Clone)]
pub struct PngRenderer {
    dataset_size: (u32, u32),
    comparison_size: (u32, u32),
}

impl PngRenderer {
    /// Registers the chart font on first use.
    pub fn new(config: &ChartConfig) -> ReportResult<Self> {
        ensure_font_registered(config.font_path.as_deref())?;
        Ok(Self {
            dataset_size: config.dataset_chart_size,
            comparison_size: config.comparison_chart_size,
        })
    }

    fn draw_dataset_chart(&self, chart: &ChartData, path: &Path) -> ReportResult<()> {
        let root = BitMapBackend::new(path, self.dataset_size).into_drawing_area();
        root.fill(&WHITE)?;

        let labels = &chart.labels;
        let x_range = chart.x_range();
        let ticks = category_tick_count(&x_range);
        let mut plot = ChartBuilder::on(&root)
            .caption(&chart.title, (FONT_FAMILY, 28))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(80)
            .build_cartesian_2d(x_range, chart.value_range())?;

        plot.configure_mesh()
            .disable_x_mesh()
            .x_labels(ticks)
            .x_label_formatter(&|x| category_label(labels, *x))
            .y_desc(chart.metric.as_str())
            .label_style((FONT_FAMILY, 16))
            .axis_desc_style((FONT_FAMILY, 18))
            .draw()?;

        plot.draw_series(chart.values.iter().enumerate().map(|(i, value)| {
            let x = i as f64;
            Rectangle::new(
                [(x - BAR_HALF_WIDTH, 0.0), (x + BAR_HALF_WIDTH, value.height())],
                BAR_COLOR.filled(),
            )
        }))?;

        let anchor = Pos::new(HPos::Center, VPos::Bottom);
        plot.draw_series(chart.values.iter().enumerate().map(|(i, value)| {
            let style = if value.is_available() {
                (FONT_FAMILY, 14).into_font().color(&BLACK)
            } else {
                (FONT_FAMILY, 16).into_font().color(&NOT_AVAILABLE_COLOR)
            };
            Text::new(
                value.label(chart.precision),
                (i as f64, value.label_y()),
                style.pos(anchor),
            )
        }))?;

        root.present()?;
        Ok(())
    }

    fn draw_comparison_chart(&self, chart: &ComparisonData, path: &Path) -> ReportResult<()> {
        let root = BitMapBackend::new(path, self.comparison_size).into_drawing_area();
        root.fill(&WHITE)?;

        let categories = &chart.categories;
        let x_range = chart.x_range();
        let ticks = category_tick_count(&x_range);
        let mut plot = ChartBuilder::on(&root)
            .caption(&chart.title, (FONT_FAMILY, 28))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(80)
            .build_cartesian_2d(x_range, chart.value_range())?;

        plot.configure_mesh()
            .disable_x_mesh()
            .x_labels(ticks)
            .x_label_formatter(&|x| category_label(categories, *x))
            .y_desc(chart.metric.as_str())
            .label_style((FONT_FAMILY, 16))
            .axis_desc_style((FONT_FAMILY, 18))
            .draw()?;

        let offsets = chart.offsets();
        let half = chart.bar_width / 2.0;
        for ((idx, series), offset) in chart.series.iter().enumerate().zip(offsets) {
            let color = palette_color(idx);
            plot.draw_series(series.values.iter().enumerate().map(move |(category, height)| {
                let center = category as f64 + offset;
                Rectangle::new([(center - half, 0.0), (center + half, *height)], color.filled())
            }))?
            .label(series.label.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 6), (x + 14, y + 6)], color.filled()));
        }

        if !chart.series.is_empty() {
            plot.configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .label_font((FONT_FAMILY, 14))
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()?;
        }

        root.present()?;
        Ok(())
    }
}

impl ChartRenderer for PngRenderer {
    fn render_dataset_chart(&self, chart: &ChartData, path: &Path) -> ReportResult<()> {
        debug!("Drawing {} bars into {:?}", chart.values.len(), path);
        self.draw_dataset_chart(chart, path).with_context(|| {
            ErrorContext::new("render_dataset_chart")
                .with_path(path)
                .with_metric(&chart.metric)
        })
    }

    fn render_comparison_chart(&self, chart: &ComparisonData, path: &Path) -> ReportResult<()> {
        debug!(
            "Drawing {} clusters of {} bars into {:?}",
            chart.categories.len(),
            chart.series.len(),
            path
        );
        self.draw_comparison_chart(chart, path).with_context(|| {
            ErrorContext::new("render_comparison_chart")
                .with_path(path)
                .with_metric(&chart.metric)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::Summary;
    use crate::visualization::fonts::locate_font;
    use tempfile::tempdir;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    // Rendering needs a TrueType font on the host; skip when none is installed.
    fn renderer() -> Option<PngRenderer> {
        if locate_font(None).is_err() {
            eprintln!("no system font available, skipping PNG rendering test");
            return None;
        }
        let config = ChartConfig {
            dataset_chart_size: (400, 300),
            comparison_chart_size: (500, 300),
            ..ChartConfig::default()
        };
        Some(PngRenderer::new(&config).unwrap())
    }

    fn summary() -> Summary {
        Summary::from_json_str(
            r#"{"coco": {"yolo": {"mAP50": 0.5}, "rcnn": {}}, "voc": {"yolo": {"mAP50": 0.7}}}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_palette_cycles() {
        assert_eq!(palette_color(0), palette_color(10));
        assert_ne!(palette_color(0), palette_color(1));
    }

    #[test]
    fn test_dataset_chart_writes_png() {
        let Some(renderer) = renderer() else { return };
        let dir = tempdir().unwrap();
        let path = dir.path().join("coco_mAP50.png");

        let summary = summary();
        let chart = ChartData::for_dataset(&summary, "coco", &summary.model_names(), "mAP50", 3).unwrap();
        renderer.render_dataset_chart(&chart, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], &PNG_SIGNATURE);
    }

    #[test]
    fn test_comparison_chart_is_reproducible() {
        let Some(renderer) = renderer() else { return };
        let dir = tempdir().unwrap();
        let path = dir.path().join("comparison_mAP50.png");

        let summary = summary();
        let chart = ComparisonData::from_summary(&summary, &summary.model_names(), "mAP50", 0.15).unwrap();
        renderer.render_comparison_chart(&chart, &path).unwrap();
        let first = std::fs::read(&path).unwrap();
        renderer.render_comparison_chart(&chart, &path).unwrap();
        let second = std::fs::read(&path).unwrap();

        assert_eq!(&first[..8], &PNG_SIGNATURE);
        assert_eq!(first, second);
    }

    #[test]
    fn test_render_into_missing_directory_fails() {
        let Some(renderer) = renderer() else { return };
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent").join("coco_mAP50.png");

        let summary = summary();
        let chart = ChartData::for_dataset(&summary, "coco", &summary.model_names(), "mAP50", 3).unwrap();
        let err = renderer.render_dataset_chart(&chart, &path).unwrap_err();
        assert!(err.to_string().contains("render_dataset_chart"));
    }
}
