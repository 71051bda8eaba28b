//! Least squares trend engine

use crate::data::{Horizon, Series};
use crate::error::EngineError;
use crate::models::{EngineFrame, Forecast, ForecastEngine};
use series_math::LinearRegression;

/// Straight-line trend fitted over the observation index
#[derive(Debug, Clone)]
pub struct LinearTrendEngine {
    interval_width: f64,
}

impl LinearTrendEngine {
    pub fn new(interval_width: f64) -> Self {
        Self { interval_width }
    }
}

impl ForecastEngine for LinearTrendEngine {
    fn name(&self) -> &str {
        "Linear Trend"
    }

    fn forecast(&self, series: &Series, horizon: Horizon) -> Result<Forecast, EngineError> {
        let frame = EngineFrame::from_series(series);
        let regression = LinearRegression::fit(&frame.y)?;

        let fitted = regression.fitted();
        let predictions = (1..=horizon.get()).map(|h| regression.forecast(h)).collect();

        frame.into_forecast(fitted, predictions, horizon, self.interval_width)
    }
}
