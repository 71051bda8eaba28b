//! Read-through memoization of the two expensive pipeline calls.
//!
//! Keys are blake3 hashes of the semantic inputs only. Values are shared
//! behind `Arc`. Failed computations are never stored, so the next call
//! with the same key computes afresh.

use crate::data::{Horizon, Series};
use crate::error::{EngineError, NarrativeError};
use crate::models::{Forecast, ForecastEngine};
use crate::narrative::{Credentials, GenerationBudget, InsightSet, NarrativeEngine};
use crate::prompt::NarrativePrompt;
use moka::sync::Cache;
use std::sync::Arc;
use tracing::{debug, warn};

/// Content-addressed store shared across pipeline runs
#[derive(Clone)]
pub struct ContentCache<V: Send + Sync + 'static> {
    entries: Cache<String, Arc<V>>,
}

impl<V: Send + Sync + 'static> ContentCache<V> {
    /// Create a cache; `None` keeps every entry for the process lifetime
    pub fn new(capacity: Option<u64>) -> Self {
        let entries = match capacity {
            Some(max_entries) => Cache::builder().max_capacity(max_entries).build(),
            None => Cache::builder().build(),
        };
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<Arc<V>> {
        self.entries.get(key)
    }

    pub fn insert(&self, key: String, value: Arc<V>) {
        self.entries.insert(key, value);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Invalidate all entries
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }
}

/// Cache key over series content and horizon
pub fn forecast_key(series: &Series, horizon: Horizon) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&(series.len() as u64).to_le_bytes());
    for point in series.points() {
        hasher.update(point.date.format("%Y-%m-%d").to_string().as_bytes());
        hasher.update(&point.value.to_bits().to_le_bytes());
    }
    hasher.update(&(horizon.get() as u64).to_le_bytes());
    hasher.finalize().to_hex().to_string()
}

/// Cache key over prompt text and credential scope
pub fn narrative_key(prompt: &NarrativePrompt, credentials: &Credentials) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(prompt.as_str().as_bytes());
    hasher.update(&[0]);
    hasher.update(credentials.scope().as_bytes());
    hasher.finalize().to_hex().to_string()
}

/// Forecast engine adapter with at-most-once computation per input
pub struct ForecastService<E> {
    engine: E,
    cache: ContentCache<Forecast>,
}

impl<E: ForecastEngine> ForecastService<E> {
    pub fn new(engine: E, capacity: Option<u64>) -> Self {
        Self {
            engine,
            cache: ContentCache::new(capacity),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Return the cached forecast for `(series, horizon)`, computing it on
    /// the first request
    pub fn get_forecast(
        &self,
        series: &Series,
        horizon: Horizon,
    ) -> Result<Arc<Forecast>, EngineError> {
        let key = forecast_key(series, horizon);
        if let Some(hit) = self.cache.get(&key) {
            debug!(key = %&key[..12], "forecast cache hit");
            return Ok(hit);
        }

        debug!(key = %&key[..12], engine = self.engine.name(), "forecast cache miss");
        let forecast = self.engine.forecast(series, horizon).map_err(|e| {
            warn!(error = %e, "forecast engine failed");
            e
        })?;
        check_boundary(&forecast, series, horizon)?;

        let forecast = Arc::new(forecast);
        self.cache.insert(key, Arc::clone(&forecast));
        Ok(forecast)
    }
}

/// Verify an engine's output against the request rather than trusting the
/// engine's own notion of where history ends
fn check_boundary(forecast: &Forecast, series: &Series, horizon: Horizon) -> Result<(), EngineError> {
    let expected = series.len() + horizon.get();
    if forecast.len() != expected || forecast.horizon() != horizon.get() {
        return Err(EngineError::ContractViolation(format!(
            "Engine returned {} rows for horizon {}, expected {}",
            forecast.len(),
            forecast.horizon(),
            expected
        )));
    }

    let history_matches = forecast
        .history()
        .iter()
        .zip(series.points())
        .all(|(fitted, observed)| fitted.date == observed.date);
    if !history_matches {
        return Err(EngineError::ContractViolation(
            "Fitted history dates do not match the input series".to_string(),
        ));
    }

    Ok(())
}

/// Narrative engine adapter with at-most-once generation per prompt and
/// credential scope
pub struct NarrativeService<N> {
    engine: N,
    budget: GenerationBudget,
    cache: ContentCache<InsightSet>,
}

impl<N: NarrativeEngine> NarrativeService<N> {
    pub fn new(engine: N, budget: GenerationBudget, capacity: Option<u64>) -> Self {
        Self {
            engine,
            budget,
            cache: ContentCache::new(capacity),
        }
    }

    pub fn engine(&self) -> &N {
        &self.engine
    }

    /// Return the cached insights for `prompt`, generating them on the
    /// first request for this credential scope
    pub fn get_insights(
        &self,
        prompt: &NarrativePrompt,
        credentials: &Credentials,
    ) -> Result<Arc<InsightSet>, NarrativeError> {
        if credentials.is_missing() {
            return Err(NarrativeError::Auth("API key not configured".to_string()));
        }

        let key = narrative_key(prompt, credentials);
        if let Some(hit) = self.cache.get(&key) {
            debug!(key = %&key[..12], "narrative cache hit");
            return Ok(hit);
        }

        debug!(key = %&key[..12], scope = %credentials.scope(), "narrative cache miss");
        let text = self
            .engine
            .generate(prompt.as_str(), credentials, &self.budget)
            .map_err(|e| {
                warn!(error = %e, "narrative engine failed");
                e
            })?;

        let insights = Arc::new(InsightSet::from_text(&text));
        self.cache.insert(key, Arc::clone(&insights));
        Ok(insights)
    }
}
