//! Chart data and rendering

pub mod chart;
pub mod fonts;
pub mod render;

pub use chart::{BarValue, ChartData, ComparisonData, SeriesData};
pub use render::{ChartRenderer, PngRenderer};
