//! Chart data built from a summary, independent of any drawing backend

use std::ops::Range;

use crate::error::ReportResult;
use crate::summary::Summary;

/// Label drawn in place of a value for a missing metric.
pub const NOT_AVAILABLE_LABEL: &str = "N/A";

/// Height at which the "N/A" label sits.
pub const NOT_AVAILABLE_LABEL_Y: f64 = 0.02;

/// Half the width of a bar in a per-dataset chart, in category units.
pub const BAR_HALF_WIDTH: f64 = 0.4;

/// One bar: a metric value or the marker for a missing one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BarValue {
    Available(f64),
    NotAvailable,
}

impl BarValue {
    pub fn from_option(value: Option<f64>) -> Self {
        value.map_or(BarValue::NotAvailable, BarValue::Available)
    }

    pub fn is_available(&self) -> bool {
        matches!(self, BarValue::Available(_))
    }

    /// Drawn height; missing values sit at zero.
    pub fn height(&self) -> f64 {
        match self {
            BarValue::Available(v) => *v,
            BarValue::NotAvailable => 0.0,
        }
    }

    pub fn label(&self, precision: usize) -> String {
        match self {
            BarValue::Available(v) => format!("{:.*}", precision, v),
            BarValue::NotAvailable => NOT_AVAILABLE_LABEL.to_string(),
        }
    }

    /// Baseline of the value label.
    pub fn label_y(&self) -> f64 {
        match self {
            BarValue::Available(v) => v + label_offset(*v),
            BarValue::NotAvailable => NOT_AVAILABLE_LABEL_Y,
        }
    }
}

/// Gap between a bar top and its label: fixed below magnitude 1, proportional above.
pub fn label_offset(value: f64) -> f64 {
    if value.abs() < 1.0 {
        0.01
    } else {
        value * 0.01
    }
}

/// Offsets of `count` bars of `width` laid out symmetrically around a category center.
pub fn cluster_offsets(count: usize, width: f64) -> Vec<f64> {
    let start = -((count as f64 - 1.0) / 2.0) * width;
    (0..count).map(|i| start + i as f64 * width).collect()
}

/// X range covering `count` categories centered on 0, 1, .. with `half_width` either side.
pub fn category_range(count: usize, half_width: f64) -> Range<f64> {
    let last = count.saturating_sub(1) as f64;
    -half_width..last + half_width
}

/// Number of whole-number ticks inside `range`, so the mesh places one tick per category.
pub fn category_tick_count(range: &Range<f64>) -> usize {
    let first = range.start.ceil();
    let last = range.end.floor();
    if last < first {
        1
    } else {
        (last - first) as usize + 1
    }
}

/// Name of the category at tick `x`, empty between categories.
pub fn category_label(labels: &[String], x: f64) -> String {
    let nearest = x.round();
    if (x - nearest).abs() > 1e-6 || nearest < 0.0 {
        return String::new();
    }
    labels.get(nearest as usize).cloned().unwrap_or_default()
}

/// Y range holding zero and every point, with 10% headroom.
pub fn value_axis_range<I>(points: I) -> Range<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (mut lo, mut hi) = (0.0f64, 0.0f64);
    for p in points.into_iter().filter(|p| p.is_finite()) {
        lo = lo.min(p);
        hi = hi.max(p);
    }
    if hi - lo < f64::EPSILON {
        hi = lo + 1.0;
    }
    let pad = (hi - lo) * 0.1;
    let bottom = if lo < 0.0 { lo - pad } else { lo };
    bottom..hi + pad
}

/// Bars of a single chart: one labelled value per category
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub title: String,
    pub metric: String,
    pub labels: Vec<String>,
    pub values: Vec<BarValue>,
    pub precision: usize,
}

impl ChartData {
    /// Per-dataset chart: one bar per model in `models`, missing metrics marked "N/A".
    pub fn for_dataset(
        summary: &Summary,
        dataset: &str,
        models: &[String],
        metric: &str,
        precision: usize,
    ) -> ReportResult<Self> {
        let values = models
            .iter()
            .map(|model| summary.metric(dataset, model, metric).map(BarValue::from_option))
            .collect::<ReportResult<Vec<_>>>()?;

        Ok(Self {
            title: format!("{} - {}", metric, dataset),
            metric: metric.to_string(),
            labels: models.to_vec(),
            values,
            precision,
        })
    }

    pub fn bar_labels(&self) -> Vec<String> {
        self.values.iter().map(|v| v.label(self.precision)).collect()
    }

    pub fn heights(&self) -> Vec<f64> {
        self.values.iter().map(BarValue::height).collect()
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_available()).count()
    }

    pub fn x_range(&self) -> Range<f64> {
        category_range(self.labels.len(), 0.5)
    }

    pub fn value_range(&self) -> Range<f64> {
        value_axis_range(
            self.values
                .iter()
                .flat_map(|v| [v.height(), v.label_y()]),
        )
    }
}

/// Values of one model across every dataset of a comparison chart
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesData {
    pub label: String,
    pub values: Vec<f64>,
}

/// Grouped bars: one cluster per dataset, one bar per model
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonData {
    pub title: String,
    pub metric: String,
    pub categories: Vec<String>,
    pub series: Vec<SeriesData>,
    pub bar_width: f64,
}

impl ComparisonData {
    /// Missing metrics are plotted at zero without annotation.
    pub fn from_summary(
        summary: &Summary,
        models: &[String],
        metric: &str,
        bar_width: f64,
    ) -> ReportResult<Self> {
        let categories = summary.dataset_names();

        let mut series = Vec::with_capacity(models.len());
        for model in models {
            let values = categories
                .iter()
                .map(|dataset| {
                    summary
                        .metric(dataset, model, metric)
                        .map(|v| BarValue::from_option(v).height())
                })
                .collect::<ReportResult<Vec<_>>>()?;
            series.push(SeriesData {
                label: model.clone(),
                values,
            });
        }

        Ok(Self {
            title: format!("{} comparison across datasets", metric),
            metric: metric.to_string(),
            categories,
            series,
            bar_width,
        })
    }

    pub fn offsets(&self) -> Vec<f64> {
        cluster_offsets(self.series.len(), self.bar_width)
    }

    /// Horizontal extent `(left, right)` of the bar of `series` in category `category`.
    pub fn bar_span(&self, series: usize, category: usize) -> (f64, f64) {
        let center = category as f64 + cluster_offsets(self.series.len(), self.bar_width)[series];
        (center - self.bar_width / 2.0, center + self.bar_width / 2.0)
    }

    pub fn x_range(&self) -> Range<f64> {
        let cluster = self.series.len() as f64 * self.bar_width / 2.0;
        category_range(self.categories.len(), cluster.max(0.5))
    }

    pub fn value_range(&self) -> Range<f64> {
        value_axis_range(self.series.iter().flat_map(|s| s.values.iter().copied()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coco() -> Summary {
        Summary::from_json_str(r#"{"coco": {"yolo": {"mAP50": 0.5}, "rcnn": {}}}"#).unwrap()
    }

    #[test]
    fn test_label_offset() {
        assert_eq!(label_offset(0.5), 0.01);
        assert_eq!(label_offset(-0.99), 0.01);
        assert_eq!(label_offset(250.0), 2.5);
        assert_eq!(label_offset(1.0), 0.01 * 1.0);
    }

    #[test]
    fn test_bar_value_labels() {
        assert_eq!(BarValue::Available(0.5).label(3), "0.500");
        assert_eq!(BarValue::Available(1234.56789).label(3), "1234.568");
        assert_eq!(BarValue::NotAvailable.label(3), "N/A");
        assert_eq!(BarValue::NotAvailable.height(), 0.0);
        assert_eq!(BarValue::NotAvailable.label_y(), NOT_AVAILABLE_LABEL_Y);
        assert_eq!(BarValue::Available(0.0).label(3), "0.000");
        assert!(BarValue::Available(0.0).is_available());
    }

    #[test]
    fn test_dataset_chart_marks_missing_models() {
        let summary = coco();
        let models = summary.model_names();
        let chart = ChartData::for_dataset(&summary, "coco", &models, "mAP50", 3).unwrap();

        assert_eq!(chart.labels, vec!["rcnn", "yolo"]);
        assert_eq!(chart.values, vec![BarValue::NotAvailable, BarValue::Available(0.5)]);
        assert_eq!(chart.bar_labels(), vec!["N/A", "0.500"]);
        assert_eq!(chart.heights(), vec![0.0, 0.5]);
        assert_eq!(chart.missing_count(), 1);
        assert_eq!(chart.title, "mAP50 - coco");
    }

    #[test]
    fn test_dataset_chart_keeps_models_absent_from_dataset() {
        let summary = Summary::from_json_str(
            r#"{"a": {"m1": {"recall": 0.2}}, "b": {"m2": {"recall": 0.3}}}"#,
        )
        .unwrap();
        let models = summary.model_names();
        let chart = ChartData::for_dataset(&summary, "a", &models, "recall", 3).unwrap();
        assert_eq!(chart.labels, vec!["m1", "m2"]);
        assert_eq!(chart.values, vec![BarValue::Available(0.2), BarValue::NotAvailable]);
    }

    #[test]
    fn test_comparison_missing_is_zero() {
        let summary = coco();
        let models = summary.model_names();
        let chart = ComparisonData::from_summary(&summary, &models, "mAP50", 0.15).unwrap();

        assert_eq!(chart.categories, vec!["coco"]);
        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.series[0].label, "rcnn");
        assert_eq!(chart.series[0].values, vec![0.0]);
        assert_eq!(chart.series[1].label, "yolo");
        assert_eq!(chart.series[1].values, vec![0.5]);
        assert_eq!(chart.title, "mAP50 comparison across datasets");
    }

    #[test]
    fn test_cluster_offsets_symmetric() {
        let offsets = cluster_offsets(4, 0.15);
        assert_eq!(offsets.len(), 4);
        assert!((offsets[0] + 0.225).abs() < 1e-12);
        assert!((offsets[3] - 0.225).abs() < 1e-12);
        assert!((offsets[0] + offsets[3]).abs() < 1e-12);
        assert!((offsets[1] + offsets[2]).abs() < 1e-12);

        assert_eq!(cluster_offsets(1, 0.15), vec![0.0]);
        assert!(cluster_offsets(0, 0.15).is_empty());
    }

    #[test]
    fn test_bar_span() {
        let summary = coco();
        let chart = ComparisonData::from_summary(&summary, &summary.model_names(), "mAP50", 0.2).unwrap();
        let (left, right) = chart.bar_span(1, 0);
        assert!((left - 0.0).abs() < 1e-12);
        assert!((right - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_value_axis_range() {
        let range = value_axis_range([0.5, 0.51, 0.0, 0.02]);
        assert_eq!(range.start, 0.0);
        assert!((range.end - 0.561).abs() < 1e-9);

        let empty = value_axis_range(Vec::<f64>::new());
        assert_eq!(empty.start, 0.0);
        assert!((empty.end - 1.1).abs() < 1e-9);

        let negative = value_axis_range([-2.0, 1.0]);
        assert!(negative.start < -2.0);
        assert!(negative.end > 1.0);
    }

    #[test]
    fn test_category_labels() {
        let labels = vec!["coco".to_string(), "voc".to_string()];
        assert_eq!(category_label(&labels, 0.0), "coco");
        assert_eq!(category_label(&labels, 1.0000000001), "voc");
        assert_eq!(category_label(&labels, 0.5), "");
        assert_eq!(category_label(&labels, 2.0), "");
        assert_eq!(category_label(&labels, -1.0), "");

        let range = category_range(2, 0.5);
        assert_eq!(range, -0.5..1.5);
        assert_eq!(category_tick_count(&range), 2);
        assert_eq!(category_tick_count(&category_range(3, 1.2)), 5);
        assert_eq!(category_tick_count(&(0.2..0.8)), 1);
        assert_eq!(category_range(0, 0.5), -0.5..0.5);
    }

    #[test]
    fn test_comparison_x_range_fits_wide_clusters() {
        let json = r#"{"d": {"a": {}, "b": {}, "c": {}, "d": {}, "e": {}, "f": {}, "g": {}, "h": {}}}"#;
        let summary = Summary::from_json_str(json).unwrap();
        let chart = ComparisonData::from_summary(&summary, &summary.model_names(), "x", 0.15).unwrap();
        let range = chart.x_range();
        let (left, _) = chart.bar_span(0, 0);
        let (_, right) = chart.bar_span(7, 0);
        assert!(range.start <= left);
        assert!(range.end >= right);
    }
}
