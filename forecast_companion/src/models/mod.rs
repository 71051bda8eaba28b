//! Forecasting engines and the forecast value they produce

use crate::data::{Horizon, Series};
use crate::error::EngineError;
use crate::utils::{future_dates, infer_cadence};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use series_math::{interval_multiplier, residual_std};
use std::fmt::Debug;
use std::io::Write;

pub mod holt;
pub mod linear_trend;

pub use holt::HoltEngine;
pub use linear_trend::LinearTrendEngine;

/// One row of a forecast: fitted history or genuine prediction
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    #[serde(rename = "ds")]
    pub date: NaiveDate,
    #[serde(rename = "yhat")]
    pub value: f64,
    #[serde(rename = "yhat_lower")]
    pub lower: f64,
    #[serde(rename = "yhat_upper")]
    pub upper: f64,
}

/// Predicted series covering the history followed by `horizon` future rows
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    points: Vec<ForecastPoint>,
    horizon: usize,
}

impl Forecast {
    /// Create a forecast, checking that dates strictly increase and that
    /// at least one history row precedes the `horizon` future rows
    pub fn new(points: Vec<ForecastPoint>, horizon: Horizon) -> Result<Self, EngineError> {
        if points.len() <= horizon.get() {
            return Err(EngineError::ContractViolation(format!(
                "Forecast has {} rows, which does not cover a horizon of {} plus history",
                points.len(),
                horizon
            )));
        }
        if let Some(pair) = points.windows(2).find(|pair| pair[0].date >= pair[1].date) {
            return Err(EngineError::ContractViolation(format!(
                "Forecast dates not strictly increasing at {}",
                pair[1].date
            )));
        }

        Ok(Self {
            points,
            horizon: horizon.get(),
        })
    }

    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Index of the first genuine prediction
    pub fn boundary(&self) -> usize {
        self.points.len() - self.horizon
    }

    /// Index of the last fitted history row, where the chart divider sits
    pub fn marker_index(&self) -> usize {
        self.boundary() - 1
    }

    /// Fitted history rows
    pub fn history(&self) -> &[ForecastPoint] {
        &self.points[..self.boundary()]
    }

    /// Future rows
    pub fn future(&self) -> &[ForecastPoint] {
        &self.points[self.boundary()..]
    }

    /// Write the forecast as `ds,yhat,yhat_lower,yhat_upper` CSV
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for point in &self.points {
            csv_writer.serialize(point)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

/// A forecasting capability: canonical series in, forecast out
pub trait ForecastEngine: Debug + Send + Sync {
    /// Name of the engine
    fn name(&self) -> &str;

    /// Produce `series.len() + horizon` rows: fitted history then predictions
    fn forecast(&self, series: &Series, horizon: Horizon) -> Result<Forecast, EngineError>;
}

impl<E: ForecastEngine + ?Sized> ForecastEngine for Box<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn forecast(&self, series: &Series, horizon: Horizon) -> Result<Forecast, EngineError> {
        (**self).forecast(series, horizon)
    }
}

/// Built-in engine selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    /// Holt's linear trend smoothing
    #[default]
    Holt,
    /// Least squares trend line
    LinearTrend,
}

impl EngineKind {
    /// Instantiate the engine with the given uncertainty interval width
    pub fn build(self, interval_width: f64) -> Box<dyn ForecastEngine> {
        match self {
            EngineKind::Holt => Box::new(HoltEngine::new(interval_width)),
            EngineKind::LinearTrend => Box::new(LinearTrendEngine::new(interval_width)),
        }
    }
}

/// Engine-side view of a series: `ds` dates and `y` observations.
///
/// Engines work on this frame so the column naming they need never leaks
/// into the rest of the pipeline.
#[derive(Debug, Clone)]
pub(crate) struct EngineFrame {
    pub ds: Vec<NaiveDate>,
    pub y: Vec<f64>,
}

impl EngineFrame {
    pub fn from_series(series: &Series) -> Self {
        Self {
            ds: series.dates(),
            y: series.values(),
        }
    }

    /// Join in-sample fit and future predictions into a forecast with
    /// residual-based uncertainty bounds
    pub fn into_forecast(
        self,
        fitted: Vec<f64>,
        predictions: Vec<f64>,
        horizon: Horizon,
        interval_width: f64,
    ) -> Result<Forecast, EngineError> {
        if fitted.len() != self.y.len() || predictions.len() != horizon.get() {
            return Err(EngineError::ContractViolation(format!(
                "Fit produced {} history and {} future values for {} observations and horizon {}",
                fitted.len(),
                predictions.len(),
                self.y.len(),
                horizon
            )));
        }
        if let Some(bad) = fitted.iter().chain(predictions.iter()).find(|v| !v.is_finite()) {
            return Err(EngineError::Degenerate(format!(
                "Engine produced a non-finite value ({})",
                bad
            )));
        }

        let sigma = residual_std(&self.y, &fitted)?;
        let z = interval_multiplier(interval_width)?;
        let last = *self
            .ds
            .last()
            .ok_or_else(|| EngineError::InsufficientData("Empty series".to_string()))?;
        let future = future_dates(last, infer_cadence(&self.ds)?, horizon.get())?;

        let mut points = Vec::with_capacity(fitted.len() + predictions.len());
        for (date, value) in self.ds.into_iter().zip(fitted) {
            let margin = z * sigma;
            points.push(ForecastPoint {
                date,
                value,
                lower: value - margin,
                upper: value + margin,
            });
        }
        for (step, (date, value)) in future.into_iter().zip(predictions).enumerate() {
            let margin = z * sigma * ((step + 1) as f64).sqrt();
            points.push(ForecastPoint {
                date,
                value,
                lower: value - margin,
                upper: value + margin,
            });
        }

        Forecast::new(points, horizon)
    }
}
