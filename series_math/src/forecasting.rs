//! Trend fitting kernels for time series prediction
//!
//! Contains implementations of:
//! - Linear Regression over the observation index
//! - Double Exponential Smoothing (Holt's linear trend method)

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

fn ensure_finite(values: &[f64]) -> Result<()> {
    if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
        return Err(MathError::InvalidInput(format!(
            "Value at position {} is not finite",
            pos
        )));
    }
    Ok(())
}

/// Ordinary least squares fit of `value = slope * index + intercept`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearRegression {
    len: usize,
    slope: f64,
    intercept: f64,
    r_squared: Option<f64>,
}

impl LinearRegression {
    /// Fit a regression line through `values`, using their positions as x
    pub fn fit(values: &[f64]) -> Result<Self> {
        if values.len() < 2 {
            return Err(MathError::InsufficientData(
                "Need at least 2 points for linear regression".to_string(),
            ));
        }
        ensure_finite(values)?;

        let n = values.len() as f64;
        let x_mean = (values.len() - 1) as f64 / 2.0;
        let y_mean = values.iter().sum::<f64>() / n;

        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for (i, &y) in values.iter().enumerate() {
            let x = i as f64;
            numerator += (x - x_mean) * (y - y_mean);
            denominator += (x - x_mean) * (x - x_mean);
        }

        if denominator.abs() < 1e-10 {
            return Err(MathError::CalculationError(
                "Cannot calculate slope: x values are too similar".to_string(),
            ));
        }

        let slope = numerator / denominator;
        let intercept = y_mean - slope * x_mean;

        let ss_total: f64 = values.iter().map(|y| (y - y_mean).powi(2)).sum();
        let ss_residual: f64 = values
            .iter()
            .enumerate()
            .map(|(i, y)| (y - (slope * i as f64 + intercept)).powi(2))
            .sum();
        // A flat series has no variance to explain
        let r_squared = if ss_total.abs() < 1e-10 {
            None
        } else {
            Some(1.0 - ss_residual / ss_total)
        };

        Ok(Self {
            len: values.len(),
            slope,
            intercept,
            r_squared,
        })
    }

    /// Value of the fitted line at position `index`
    pub fn predict_at(&self, index: usize) -> f64 {
        self.slope * index as f64 + self.intercept
    }

    /// In-sample fitted values, one per observation
    pub fn fitted(&self) -> Vec<f64> {
        (0..self.len).map(|i| self.predict_at(i)).collect()
    }

    /// Predict the value `periods_ahead` steps past the last observation
    pub fn forecast(&self, periods_ahead: usize) -> f64 {
        self.predict_at(self.len - 1 + periods_ahead)
    }

    /// Get the slope (trend direction and strength)
    pub fn slope(&self) -> f64 {
        self.slope
    }

    /// Get the intercept
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Coefficient of determination, `None` for a constant series
    pub fn r_squared(&self) -> Option<f64> {
        self.r_squared
    }
}

/// Smoothing factors for Holt's method
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoltParams {
    /// Level smoothing factor
    pub alpha: f64,
    /// Trend smoothing factor
    pub beta: f64,
}

impl Default for HoltParams {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            beta: 0.3,
        }
    }
}

/// Double Exponential Smoothing (Holt's Method) implementation
#[derive(Debug, Clone)]
pub struct DoubleExponentialSmoothing {
    alpha: f64,
    beta: f64,
    level: Option<f64>,
    trend: Option<f64>,
    values_seen: usize,
}

impl DoubleExponentialSmoothing {
    /// Create a new Double Exponential Smoothing with the specified parameters
    pub fn new(params: HoltParams) -> Result<Self> {
        if params.alpha <= 0.0 || params.alpha >= 1.0 {
            return Err(MathError::InvalidInput(
                "Alpha must be between 0 and 1 (exclusive)".to_string(),
            ));
        }
        if params.beta <= 0.0 || params.beta >= 1.0 {
            return Err(MathError::InvalidInput(
                "Beta must be between 0 and 1 (exclusive)".to_string(),
            ));
        }

        Ok(Self {
            alpha: params.alpha,
            beta: params.beta,
            level: None,
            trend: None,
            values_seen: 0,
        })
    }

    /// Update the smoother with a new observation
    pub fn update(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(MathError::InvalidInput(format!(
                "Observation {} is not finite",
                self.values_seen
            )));
        }
        self.values_seen += 1;

        match (self.level, self.trend) {
            (None, _) => {
                self.level = Some(value);
            }
            (Some(prev_level), None) => {
                // Second observation seeds the trend with the first difference
                self.trend = Some(value - prev_level);
                self.level = Some(value);
            }
            (Some(prev_level), Some(prev_trend)) => {
                let new_level = self.alpha * value + (1.0 - self.alpha) * (prev_level + prev_trend);
                let new_trend =
                    self.beta * (new_level - prev_level) + (1.0 - self.beta) * prev_trend;

                self.level = Some(new_level);
                self.trend = Some(new_trend);
            }
        }

        Ok(())
    }

    /// Forecast h steps ahead
    pub fn forecast(&self, h: usize) -> Result<f64> {
        match (self.level, self.trend) {
            (Some(level), Some(trend)) => Ok(level + (h as f64) * trend),
            _ => Err(MathError::InsufficientData(
                "Not enough data to make a forecast".to_string(),
            )),
        }
    }

    /// Run the smoother over `values` and return the one-step-ahead
    /// prediction made for each observation before it was seen.
    ///
    /// The first two predictions echo the observations that seed the
    /// level and trend.
    pub fn one_step_ahead(&mut self, values: &[f64]) -> Result<Vec<f64>> {
        let mut predictions = Vec::with_capacity(values.len());
        for &value in values {
            let prediction = match self.forecast(1) {
                Ok(p) => p,
                Err(_) => value,
            };
            predictions.push(prediction);
            self.update(value)?;
        }
        Ok(predictions)
    }

    /// Get the current level
    pub fn level(&self) -> Result<f64> {
        self.level.ok_or_else(|| {
            MathError::InsufficientData("Level not calculated yet".to_string())
        })
    }

    /// Get the current trend
    pub fn trend(&self) -> Result<f64> {
        self.trend.ok_or_else(|| {
            MathError::InsufficientData("Trend not calculated yet".to_string())
        })
    }

    /// Number of observations consumed so far
    pub fn values_seen(&self) -> usize {
        self.values_seen
    }
}
