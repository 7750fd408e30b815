//! Configuration for report generation

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{ReportError, ReportResult};

/// Metrics drawn as one chart per dataset.
pub const SINGLE_DATASET_METRICS: [&str; 3] = ["mAP50", "precision", "recall"];

/// Metrics drawn as one chart comparing every dataset.
pub const COMPARISON_METRICS: [&str; 5] = [
    "mAP50",
    "precision",
    "recall",
    "mAP50-95",
    "training_time_seconds",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub summary_path: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            summary_path: PathBuf::from("model_results_summary.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("visualizations"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub per_dataset: Vec<String>,
    pub comparison: Vec<String>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            per_dataset: SINGLE_DATASET_METRICS.iter().map(|m| m.to_string()).collect(),
            comparison: COMPARISON_METRICS.iter().map(|m| m.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Pixel size of per-dataset charts (8 x 4.5 in at 150 dpi)
    pub dataset_chart_size: (u32, u32),
    /// Pixel size of comparison charts (10 x 5 in at 150 dpi)
    pub comparison_chart_size: (u32, u32),
    /// Width of one bar inside a comparison cluster, in category units
    pub comparison_bar_width: f64,
    /// Decimal places of bar value labels
    pub value_precision: usize,
    /// TrueType font for chart text; searched in system locations when unset
    pub font_path: Option<PathBuf>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            dataset_chart_size: (1200, 675),
            comparison_chart_size: (1500, 750),
            comparison_bar_width: 0.15,
            value_precision: 3,
            font_path: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DevelopmentConfig {
    pub verbose_logging: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub metrics: MetricsConfig,
    pub chart: ChartConfig,
    pub development: DevelopmentConfig,
}

impl ReportConfig {
    /// Reject values the renderer cannot work with.
    pub fn validate(&self) -> ReportResult<()> {
        for (name, (w, h)) in [
            ("chart.dataset_chart_size", self.chart.dataset_chart_size),
            ("chart.comparison_chart_size", self.chart.comparison_chart_size),
        ] {
            if w == 0 || h == 0 {
                return Err(ReportError::ConfigurationError(format!(
                    "{} must be non-zero, got {}x{}",
                    name, w, h
                )));
            }
        }

        let width = self.chart.comparison_bar_width;
        if !width.is_finite() || width <= 0.0 {
            return Err(ReportError::ConfigurationError(format!(
                "chart.comparison_bar_width must be a positive number, got {}",
                width
            )));
        }

        let mut metrics = self.metrics.per_dataset.iter().chain(&self.metrics.comparison);
        if metrics.any(|m| m.trim().is_empty()) {
            return Err(ReportError::ConfigurationError(
                "metric names must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Load configuration from a JSON file. Missing sections and fields keep their defaults.
pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> ReportResult<ReportConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        ReportError::ConfigurationError(format!("Failed to read config file {}: {}", path.display(), e))
    })?;

    let config: ReportConfig = serde_json::from_str(&content).map_err(|e| {
        ReportError::ConfigurationError(format!("Failed to parse config file {}: {}", path.display(), e))
    })?;
    config.validate()?;

    tracing::info!("Configuration loaded from {:?}", path);
    Ok(config)
}

/// Write configuration as pretty JSON.
pub fn save_config_to_file<P: AsRef<Path>>(config: &ReportConfig, path: P) -> ReportResult<()> {
    let path = path.as_ref();
    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|e| ReportError::io_error(path, &e))?;

    tracing::info!("Configuration saved to {:?}", path);
    Ok(())
}

/// Create a configuration builder for easy setup
pub struct ConfigBuilder {
    config: ReportConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ReportConfig::default(),
        }
    }

    pub fn input(mut self, f: impl FnOnce(&mut InputConfig)) -> Self {
        f(&mut self.config.input);
        self
    }

    pub fn output(mut self, f: impl FnOnce(&mut OutputConfig)) -> Self {
        f(&mut self.config.output);
        self
    }

    pub fn metrics(mut self, f: impl FnOnce(&mut MetricsConfig)) -> Self {
        f(&mut self.config.metrics);
        self
    }

    pub fn chart(mut self, f: impl FnOnce(&mut ChartConfig)) -> Self {
        f(&mut self.config.chart);
        self
    }

    pub fn development(mut self, f: impl FnOnce(&mut DevelopmentConfig)) -> Self {
        f(&mut self.config.development);
        self
    }

    pub fn build(self) -> ReportConfig {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
