use std::path::Path;
use thiserror::Error;
use plotters::drawing::DrawingAreaErrorKind;

/// Main error type for report generation
#[derive(Error, Debug, Clone)]
pub enum ReportError {
    /// Filesystem errors while reading input or writing charts
    #[error("IO error: {0}")]
    IoError(String),

    /// JSON (de)serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Input that parses but does not have the expected shape
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Drawing or image encoding errors
    #[error("Render error: {operation} - {message}")]
    RenderError {
        operation: String,
        message: String,
    },

    /// No usable font for chart text
    #[error("Font error: {0}")]
    FontError(String),

    /// Internal errors that shouldn't happen
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ReportError {
    /// Create a render error with context
    pub fn render_error(operation: &str, message: &str) -> Self {
        ReportError::RenderError {
            operation: operation.to_string(),
            message: message.to_string(),
        }
    }

    /// Create a data error for a value found at `location` that is not of the expected kind
    pub fn invalid_data(location: &str, expected: &str, got: &serde_json::Value) -> Self {
        ReportError::InvalidData(format!(
            "{}: expected {}, got {}",
            location,
            expected,
            json_kind(got)
        ))
    }

    /// Create an IO error that names the path involved
    pub fn io_error(path: &Path, err: &std::io::Error) -> Self {
        ReportError::IoError(format!("{}: {}", path.display(), err))
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

impl From<std::io::Error> for ReportError {
    fn from(err: std::io::Error) -> Self {
        ReportError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        ReportError::SerializationError(err.to_string())
    }
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for ReportError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        ReportError::render_error("draw", &err.to_string())
    }
}

/// Result type for report operations
pub type ReportResult<T> = Result<T, ReportError>;

/// Error context for providing additional debugging information
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub operation: String,
    pub path: Option<String>,
    pub dataset: Option<String>,
    pub metric: Option<String>,
    pub suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            path: None,
            dataset: None,
            metric: None,
            suggestions: Vec::new(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.path = Some(path.as_ref().display().to_string());
        self
    }

    pub fn with_dataset(mut self, dataset: &str) -> Self {
        self.dataset = Some(dataset.to_string());
        self
    }

    pub fn with_metric(mut self, metric: &str) -> Self {
        self.metric = Some(metric.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.suggestions.push(suggestion.to_string());
        self
    }

    pub fn to_error_message(&self) -> String {
        let mut message = format!("Operation: {}", self.operation);

        if let Some(ref path) = self.path {
            message.push_str(&format!("\nPath: {}", path));
        }

        if let Some(ref dataset) = self.dataset {
            message.push_str(&format!("\nDataset: {}", dataset));
        }

        if let Some(ref metric) = self.metric {
            message.push_str(&format!("\nMetric: {}", metric));
        }

        if !self.suggestions.is_empty() {
            message.push_str("\nSuggestions:");
            for suggestion in &self.suggestions {
                message.push_str(&format!("\n  - {}", suggestion));
            }
        }

        message
    }
}

/// Helper trait for adding context to errors
pub trait WithContext<T> {
    fn with_context<F>(self, f: F) -> ReportResult<T>
    where
        F: FnOnce() -> ErrorContext;
}

impl<T> WithContext<T> for ReportResult<T> {
    fn with_context<F>(self, f: F) -> ReportResult<T>
    where
        F: FnOnce() -> ErrorContext,
    {
        self.map_err(|e| {
            let context = f().to_error_message();
            match e {
                ReportError::IoError(msg) => {
                    ReportError::IoError(format!("{}\nContext: {}", msg, context))
                }
                ReportError::SerializationError(msg) => {
                    ReportError::SerializationError(format!("{}\nContext: {}", msg, context))
                }
                ReportError::InvalidData(msg) => {
                    ReportError::InvalidData(format!("{}\nContext: {}", msg, context))
                }
                ReportError::RenderError { operation, message } => ReportError::RenderError {
                    operation,
                    message: format!("{}\nContext: {}", message, context),
                },
                _ => e,
            }
        })
    }
}

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    IoFailed,
    MalformedInput,
    ConfigInvalid,
    OutputFailed,
    FontUnavailable,
    InternalError,
}

impl ReportError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            ReportError::IoError(_) => ErrorCode::IoFailed,
            ReportError::SerializationError(_) => ErrorCode::MalformedInput,
            ReportError::InvalidData(_) => ErrorCode::MalformedInput,
            ReportError::ConfigurationError(_) => ErrorCode::ConfigInvalid,
            ReportError::RenderError { .. } => ErrorCode::OutputFailed,
            ReportError::FontError(_) => ErrorCode::FontUnavailable,
            ReportError::InternalError(_) => ErrorCode::InternalError,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            ReportError::IoError(msg) => {
                format!("IO Error: {}\n\nCheck that the summary file exists and that the output directory is writable.", msg)
            }
            ReportError::SerializationError(msg) => {
                format!("Serialization Error: {}\n\nThe file is not valid JSON. Fix the syntax error at the reported line and column.", msg)
            }
            ReportError::InvalidData(msg) => {
                format!("Invalid Data: {}\n\nThe summary must map dataset -> model -> metric -> number.", msg)
            }
            ReportError::FontError(msg) => {
                format!("Font Error: {}\n\nInstall a TrueType font (e.g. DejaVu Sans) or set chart.font_path in the config file.", msg)
            }
            _ => self.to_string(),
        }
    }
}
