//! Holt linear trend engine

use crate::data::{Horizon, Series};
use crate::error::EngineError;
use crate::models::{EngineFrame, Forecast, ForecastEngine};
use series_math::{DoubleExponentialSmoothing, HoltParams};

/// Double exponential smoothing engine
#[derive(Debug, Clone)]
pub struct HoltEngine {
    /// Name of the engine
    name: String,
    /// Smoothing factors
    params: HoltParams,
    /// Coverage of the uncertainty interval
    interval_width: f64,
}

impl HoltEngine {
    /// Create a Holt engine with default smoothing factors
    pub fn new(interval_width: f64) -> Self {
        Self::with_params(HoltParams::default(), interval_width)
    }

    pub fn with_params(params: HoltParams, interval_width: f64) -> Self {
        Self {
            name: format!("Holt (alpha={}, beta={})", params.alpha, params.beta),
            params,
            interval_width,
        }
    }
}

impl ForecastEngine for HoltEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn forecast(&self, series: &Series, horizon: Horizon) -> Result<Forecast, EngineError> {
        let frame = EngineFrame::from_series(series);
        if frame.y.len() < 2 {
            return Err(EngineError::InsufficientData(
                "Holt smoothing needs at least 2 observations".to_string(),
            ));
        }

        let mut smoother = DoubleExponentialSmoothing::new(self.params)?;
        let fitted = smoother.one_step_ahead(&frame.y)?;
        let predictions = (1..=horizon.get())
            .map(|h| smoother.forecast(h))
            .collect::<Result<Vec<f64>, _>>()?;

        frame.into_forecast(fitted, predictions, horizon, self.interval_width)
    }
}
