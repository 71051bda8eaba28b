//! Test doubles shared by the integration tests
#![allow(dead_code)]

use chrono::NaiveDate;
use forecast_companion::data::{Horizon, Series};
use forecast_companion::error::{EngineError, NarrativeError};
use forecast_companion::models::holt::HoltEngine;
use forecast_companion::models::{Forecast, ForecastEngine};
use forecast_companion::narrative::{Credentials, GenerationBudget, NarrativeEngine};
use polars::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// The four-month series used by the end-to-end scenario
pub fn monthly_table() -> DataFrame {
    df!(
        "month" => &["2024-01", "2024-02", "2024-03", "2024-04"],
        "sales" => &[10.0, 12.0, 11.0, 14.0]
    )
    .unwrap()
}

pub fn monthly_series() -> Series {
    Series::from_pairs(&[
        (ymd(2024, 1, 1), 10.0),
        (ymd(2024, 2, 1), 12.0),
        (ymd(2024, 3, 1), 11.0),
        (ymd(2024, 4, 1), 14.0),
    ])
    .unwrap()
}

/// Holt engine that counts invocations and can fail a number of times first
#[derive(Debug, Clone)]
pub struct CountingEngine {
    inner: HoltEngine,
    calls: Arc<AtomicUsize>,
    failures_left: Arc<AtomicUsize>,
}

impl CountingEngine {
    pub fn new() -> Self {
        Self::failing_first(0)
    }

    pub fn failing_first(failures: usize) -> Self {
        Self {
            inner: HoltEngine::new(0.8),
            calls: Arc::new(AtomicUsize::new(0)),
            failures_left: Arc::new(AtomicUsize::new(failures)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl ForecastEngine for CountingEngine {
    fn name(&self) -> &str {
        "counting"
    }

    fn forecast(&self, series: &Series, horizon: Horizon) -> Result<Forecast, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let should_fail = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(EngineError::Degenerate("scripted failure".to_string()));
        }
        self.inner.forecast(series, horizon)
    }
}

/// Engine that returns a forecast missing one future row
#[derive(Debug)]
pub struct ShortEngine;

impl ForecastEngine for ShortEngine {
    fn name(&self) -> &str {
        "short"
    }

    fn forecast(&self, series: &Series, horizon: Horizon) -> Result<Forecast, EngineError> {
        let shorter = Horizon::new(horizon.get() - 1, 24).map_err(|e| {
            EngineError::Degenerate(e.to_string())
        })?;
        HoltEngine::new(0.8).forecast(series, shorter)
    }
}

/// Narrative engine replaying scripted replies and counting calls
pub struct ScriptedNarrator {
    replies: Mutex<Vec<Result<String, NarrativeError>>>,
    fallback: Result<String, NarrativeError>,
    calls: Arc<AtomicUsize>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedNarrator {
    pub fn replying(text: &str) -> Self {
        Self::scripted(Vec::new(), Ok(text.to_string()))
    }

    pub fn failing(error: NarrativeError) -> Self {
        Self::scripted(Vec::new(), Err(error))
    }

    /// Replies in order, then `fallback` forever
    pub fn scripted(
        replies: Vec<Result<String, NarrativeError>>,
        fallback: Result<String, NarrativeError>,
    ) -> Self {
        let mut replies = replies;
        replies.reverse();
        Self {
            replies: Mutex::new(replies),
            fallback,
            calls: Arc::new(AtomicUsize::new(0)),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl NarrativeEngine for ScriptedNarrator {
    fn generate(
        &self,
        prompt: &str,
        _credentials: &Credentials,
        _budget: &GenerationBudget,
    ) -> Result<String, NarrativeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| self.fallback.clone())
    }
}
