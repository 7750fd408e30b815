//! Report generation: per-dataset charts, cross-dataset comparisons and the full run

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::{ChartConfig, ReportConfig};
use crate::error::{ErrorContext, ReportError, ReportResult, WithContext};
use crate::summary::{load_summary, Summary};
use crate::visualization::{ChartData, ChartRenderer, ComparisonData, PngRenderer};

pub fn dataset_chart_file_name(dataset: &str, metric: &str) -> String {
    format!("{}_{}.png", dataset, metric)
}

pub fn comparison_chart_file_name(metric: &str) -> String {
    format!("comparison_{}.png", metric)
}

/// Create `path` and its parents if missing.
pub fn ensure_dir(path: &Path) -> ReportResult<()> {
    std::fs::create_dir_all(path).map_err(|e| ReportError::io_error(path, &e))
}

/// Files written by one report run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportOutcome {
    pub output_dir: PathBuf,
    pub dataset_charts: Vec<PathBuf>,
    pub comparison_charts: Vec<PathBuf>,
}

impl ReportOutcome {
    pub fn files(&self) -> impl Iterator<Item = &PathBuf> {
        self.dataset_charts.iter().chain(&self.comparison_charts)
    }

    pub fn total(&self) -> usize {
        self.dataset_charts.len() + self.comparison_charts.len()
    }
}

/// Builds chart data from a summary and hands each chart to a renderer.
pub struct ReportGenerator<R: ChartRenderer> {
    renderer: R,
    value_precision: usize,
    bar_width: f64,
}

impl<R: ChartRenderer> ReportGenerator<R> {
    pub fn new(renderer: R, chart: &ChartConfig) -> Self {
        Self {
            renderer,
            value_precision: chart.value_precision,
            bar_width: chart.comparison_bar_width,
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Draw `metric` for every dataset, one chart per dataset with one bar per model.
    /// Returns the written paths in dataset order.
    pub fn plot_metric_by_dataset(
        &self,
        summary: &Summary,
        metric: &str,
        outdir: &Path,
    ) -> ReportResult<Vec<PathBuf>> {
        ensure_dir(outdir)?;
        let models = summary.model_names();
        debug!("Plotting {} for models {:?}", metric, models);

        let mut written = Vec::with_capacity(summary.datasets().len());
        for dataset in summary.datasets() {
            let context = || {
                ErrorContext::new("plot_metric_by_dataset")
                    .with_dataset(&dataset.name)
                    .with_metric(metric)
            };

            let chart = ChartData::for_dataset(summary, &dataset.name, &models, metric, self.value_precision)
                .with_context(context)?;
            if !chart.values.is_empty() && chart.missing_count() == chart.values.len() {
                warn!("No model reports {} on {}", metric, dataset.name);
            }

            let path = outdir.join(dataset_chart_file_name(&dataset.name, metric));
            self.renderer.render_dataset_chart(&chart, &path).with_context(context)?;

            info!("Wrote {:?}", path);
            written.push(path);
        }

        Ok(written)
    }

    /// Draw `metric` for every dataset in one grouped chart, one bar per model.
    pub fn plot_comparison(&self, summary: &Summary, metric: &str, outdir: &Path) -> ReportResult<PathBuf> {
        ensure_dir(outdir)?;
        let models = summary.model_names();
        let context = || ErrorContext::new("plot_comparison").with_metric(metric);

        let chart = ComparisonData::from_summary(summary, &models, metric, self.bar_width)
            .with_context(context)?;

        let path = outdir.join(comparison_chart_file_name(metric));
        self.renderer.render_comparison_chart(&chart, &path).with_context(context)?;

        info!("Wrote {:?}", path);
        Ok(path)
    }

    /// Per-dataset charts for `per_dataset`, then one comparison chart per entry of `comparison`.
    pub fn run(
        &self,
        summary: &Summary,
        per_dataset: &[String],
        comparison: &[String],
        outdir: &Path,
    ) -> ReportResult<ReportOutcome> {
        let mut outcome = ReportOutcome {
            output_dir: outdir.to_path_buf(),
            ..ReportOutcome::default()
        };

        for metric in per_dataset {
            outcome.dataset_charts.extend(self.plot_metric_by_dataset(summary, metric, outdir)?);
        }

        for metric in comparison {
            outcome.comparison_charts.push(self.plot_comparison(summary, metric, outdir)?);
        }

        Ok(outcome)
    }
}

/// Load the configured summary and render every configured chart as PNG.
pub fn generate_report(config: &ReportConfig) -> ReportResult<ReportOutcome> {
    config.validate()?;
    let summary = load_summary(&config.input.summary_path)?;

    let renderer = PngRenderer::new(&config.chart)?;
    let generator = ReportGenerator::new(renderer, &config.chart);
    let outcome = generator.run(
        &summary,
        &config.metrics.per_dataset,
        &config.metrics.comparison,
        &config.output.directory,
    )?;

    info!(
        "Rendered {} charts into {:?}",
        outcome.total(),
        outcome.output_dir
    );
    Ok(outcome)
}
