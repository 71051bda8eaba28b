//! Error types for the forecast_companion crate
//!
//! Each pipeline boundary owns one error enum. [`ErrorKind`] folds all of
//! them into the user-facing taxonomy reported by a failed run.

use polars::prelude::PolarsError;
use series_math::MathError;
use std::fmt;
use thiserror::Error;

/// Coarse error classification surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad input shape or content
    Validation,
    /// A date cell could not be read as a date
    Parse,
    /// A value cell could not be read as a number
    Type,
    /// The forecasting engine could not produce a forecast
    ForecastEngine,
    /// Missing or rejected credentials
    Auth,
    /// The narrative provider throttled the call
    RateLimit,
    /// Transport or service failure of the narrative provider
    Upstream,
    /// Internal rendering failure while building the document
    Assembly,
}

impl ErrorKind {
    /// Whether the person running the pipeline can fix this by changing input
    pub fn is_user_fixable(self) -> bool {
        matches!(
            self,
            ErrorKind::Validation
                | ErrorKind::Parse
                | ErrorKind::Type
                | ErrorKind::ForecastEngine
                | ErrorKind::Auth
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Validation => "ValidationError",
            ErrorKind::Parse => "ParseError",
            ErrorKind::Type => "TypeError",
            ErrorKind::ForecastEngine => "ForecastEngineError",
            ErrorKind::Auth => "AuthError",
            ErrorKind::RateLimit => "RateLimitError",
            ErrorKind::Upstream => "UpstreamError",
            ErrorKind::Assembly => "AssemblyError",
        };
        f.write_str(name)
    }
}

/// Errors raised while turning a raw table into a canonical series
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// A requested column is absent from the table
    #[error("Column '{0}' not found in input")]
    MissingColumn(String),

    /// A date cell could not be parsed
    #[error("Parse error in row {row}: cannot read '{value}' as a date")]
    Parse { row: usize, value: String },

    /// A value cell is not numeric
    #[error("Type error in row {row}: {detail}")]
    Type { row: usize, detail: String },

    /// The series or request violates a shape invariant
    #[error("Validation error: {0}")]
    Validation(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    Polars(String),
}

impl From<PolarsError> for NormalizeError {
    fn from(err: PolarsError) -> Self {
        NormalizeError::Polars(err.to_string())
    }
}

impl NormalizeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            NormalizeError::Parse { .. } => ErrorKind::Parse,
            NormalizeError::Type { .. } => ErrorKind::Type,
            NormalizeError::MissingColumn(_)
            | NormalizeError::Validation(_)
            | NormalizeError::Io(_)
            | NormalizeError::Polars(_) => ErrorKind::Validation,
        }
    }
}

/// Errors raised by a forecasting engine or its adapter
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// Too few observations for the engine
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// The series cannot be fitted (non-finite values, no cadence, ...)
    #[error("Degenerate series: {0}")]
    Degenerate(String),

    /// The engine returned a forecast that breaks the boundary contract
    #[error("Engine contract violated: {0}")]
    ContractViolation(String),

    /// Error from the numeric kernels
    #[error("Math error: {0}")]
    Math(#[from] MathError),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::ForecastEngine
    }
}

/// Errors raised by a narrative engine
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NarrativeError {
    /// Missing or rejected credentials
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The provider is throttling requests
    #[error("Rate limited: {0}")]
    RateLimit(String),

    /// Transport failure or unexpected provider response
    #[error("Upstream error: {0}")]
    Upstream(String),
}

impl NarrativeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            NarrativeError::Auth(_) => ErrorKind::Auth,
            NarrativeError::RateLimit(_) => ErrorKind::RateLimit,
            NarrativeError::Upstream(_) => ErrorKind::Upstream,
        }
    }
}

/// Errors raised while rendering the output document
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// Drawing the forecast chart failed
    #[error("Chart rendering failed: {0}")]
    Chart(String),

    /// Encoding the chart image failed
    #[error("Image encoding failed: {0}")]
    Encode(String),

    /// Writing the document package failed
    #[error("Document packaging failed: {0}")]
    Package(String),
}

impl From<zip::result::ZipError> for AssemblyError {
    fn from(err: zip::result::ZipError) -> Self {
        AssemblyError::Package(err.to_string())
    }
}

impl From<std::io::Error> for AssemblyError {
    fn from(err: std::io::Error) -> Self {
        AssemblyError::Package(err.to_string())
    }
}

impl AssemblyError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Assembly
    }
}

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Any stage error of a pipeline run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Narrative(#[from] NarrativeError),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Normalize(e) => e.kind(),
            PipelineError::Engine(e) => e.kind(),
            PipelineError::Narrative(e) => e.kind(),
            PipelineError::Assembly(e) => e.kind(),
        }
    }
}

/// Result type for table normalization
pub type Result<T> = std::result::Result<T, NormalizeError>;
