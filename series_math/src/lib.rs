//! # Series Math
//!
//! Numeric kernels shared by the forecasting engines: trend regression,
//! double exponential smoothing and residual statistics.

use thiserror::Error;

pub mod forecasting;
pub mod residuals;

pub use forecasting::{DoubleExponentialSmoothing, HoltParams, LinearRegression};
pub use residuals::{interval_multiplier, residual_std};

/// Errors that can occur in series calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for series math operations
pub type Result<T> = std::result::Result<T, MathError>;
