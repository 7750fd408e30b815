//! evalplot - bar-chart reports for model evaluation summaries
//!
//! Reads a JSON summary of pre-computed metrics (dataset -> model -> metric -> value)
//! and renders:
//! - one chart per dataset and metric, one bar per model, missing values marked "N/A"
//! - one chart per metric comparing every dataset, bars grouped by model

pub mod config;
pub mod error;
pub mod report;
pub mod summary;
pub mod visualization;

pub use config::{ConfigBuilder, ReportConfig, COMPARISON_METRICS, SINGLE_DATASET_METRICS};
pub use error::{ReportError, ReportResult};
pub use report::{generate_report, ReportGenerator, ReportOutcome};
pub use summary::{load_summary, Summary};

/// Install the global log subscriber. Later calls leave the first subscriber in place.
pub fn init(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    if tracing_subscriber::fmt().with_max_level(level).try_init().is_ok() {
        tracing::debug!("evalplot {} initialized", version());
    }
}

/// Get the current crate version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
