//! End-to-end run: normalize, forecast, build prompt, narrate, assemble

use crate::cache::{ForecastService, NarrativeService};
use crate::config::CompanionConfig;
use crate::data::{Horizon, TableNormalizer};
use crate::document::DocumentAssembler;
use crate::error::{ErrorKind, NarrativeError, PipelineError};
use crate::models::{Forecast, ForecastEngine};
use crate::narrative::{Credentials, InsightSet, NarrativeEngine, OpenAiNarrator};
use crate::prompt::PromptBuilder;
use polars::prelude::DataFrame;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Position of a run in the stage sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Idle,
    Normalizing,
    Forecasting,
    BuildingPrompt,
    Narrating,
    Assembling,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "Idle",
            Stage::Normalizing => "Normalizing",
            Stage::Forecasting => "Forecasting",
            Stage::BuildingPrompt => "BuildingPrompt",
            Stage::Narrating => "Narrating",
            Stage::Assembling => "Assembling",
            Stage::Done => "Done",
        };
        f.write_str(name)
    }
}

/// Everything one run needs from its caller
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub table: DataFrame,
    pub date_column: String,
    pub value_column: String,
    pub horizon: usize,
    pub credentials: Credentials,
}

impl RunRequest {
    pub fn new(
        table: DataFrame,
        date_column: impl Into<String>,
        value_column: impl Into<String>,
        horizon: usize,
        credentials: Credentials,
    ) -> Self {
        Self {
            table,
            date_column: date_column.into(),
            value_column: value_column.into(),
            horizon,
            credentials,
        }
    }
}

/// Output of a successful run
#[derive(Debug, Clone)]
pub struct ArtifactBundle {
    pub forecast: Arc<Forecast>,
    pub insights: Arc<InsightSet>,
    pub document: Vec<u8>,
}

impl ArtifactBundle {
    pub fn write_document<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        std::fs::write(path, &self.document)
    }
}

/// A run that stopped at `stage`.
///
/// `forecast` is kept when the failure happened after forecasting so the
/// caller can still inspect it.
#[derive(Debug, Error)]
#[error("{stage} failed with {kind}: {error}", kind = .error.kind())]
pub struct PipelineFailure {
    pub stage: Stage,
    #[source]
    pub error: PipelineError,
    pub forecast: Option<Arc<Forecast>>,
}

impl PipelineFailure {
    fn new(stage: Stage, error: impl Into<PipelineError>, forecast: Option<Arc<Forecast>>) -> Self {
        let error = error.into();
        warn!(%stage, kind = %error.kind(), error = %error, "pipeline failed");
        Self {
            stage,
            error,
            forecast,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

fn enter(stage: Stage) {
    info!(%stage, "entering stage");
}

/// Sequences the pipeline stages over shared caches.
///
/// A `Pipeline` is meant to live for the whole process so that repeated runs
/// with equal inputs reuse cached forecasts and insights.
pub struct Pipeline<F, N> {
    config: CompanionConfig,
    normalizer: TableNormalizer,
    forecasts: ForecastService<F>,
    prompts: PromptBuilder,
    narratives: NarrativeService<N>,
    assembler: DocumentAssembler,
}

impl<F: ForecastEngine, N: NarrativeEngine> Pipeline<F, N> {
    pub fn new(config: CompanionConfig, forecast_engine: F, narrative_engine: N) -> Self {
        let forecasts = ForecastService::new(forecast_engine, config.cache_capacity);
        let narratives = NarrativeService::new(
            narrative_engine,
            config.narrative.budget(),
            config.cache_capacity,
        );
        Self {
            normalizer: TableNormalizer::new(),
            forecasts,
            prompts: config.prompt_builder(),
            narratives,
            assembler: DocumentAssembler::new(config.document.clone()),
            config,
        }
    }

    pub fn config(&self) -> &CompanionConfig {
        &self.config
    }

    pub fn forecasts(&self) -> &ForecastService<F> {
        &self.forecasts
    }

    pub fn narratives(&self) -> &NarrativeService<N> {
        &self.narratives
    }

    /// Run every stage in order, stopping at the first failure
    pub fn run(&self, request: RunRequest) -> Result<ArtifactBundle, PipelineFailure> {
        let RunRequest {
            table,
            date_column,
            value_column,
            horizon,
            credentials,
        } = request;

        enter(Stage::Normalizing);
        let horizon = Horizon::new(horizon, self.config.max_horizon)
            .map_err(|e| PipelineFailure::new(Stage::Normalizing, e, None))?;
        let series = self
            .normalizer
            .normalize(&table, &date_column, &value_column)
            .map_err(|e| PipelineFailure::new(Stage::Normalizing, e, None))?;
        info!(rows = series.len(), %horizon, "series normalized");

        enter(Stage::Forecasting);
        let forecast = self
            .forecasts
            .get_forecast(&series, horizon)
            .map_err(|e| PipelineFailure::new(Stage::Forecasting, e, None))?;

        enter(Stage::BuildingPrompt);
        let prompt = self.prompts.build(&forecast);

        enter(Stage::Narrating);
        let insights = self
            .narratives
            .get_insights(&prompt, &credentials)
            .map_err(|e| PipelineFailure::new(Stage::Narrating, e, Some(Arc::clone(&forecast))))?;

        enter(Stage::Assembling);
        let document = self
            .assembler
            .assemble(&forecast, &insights, horizon)
            .map_err(|e| PipelineFailure::new(Stage::Assembling, e, Some(Arc::clone(&forecast))))?;

        info!(
            stage = %Stage::Done,
            forecast_rows = forecast.len(),
            insights = insights.len(),
            document_bytes = document.len(),
            "pipeline finished"
        );
        Ok(ArtifactBundle {
            forecast,
            insights,
            document,
        })
    }
}

impl Pipeline<Box<dyn ForecastEngine>, OpenAiNarrator> {
    /// Build a pipeline with the configured engine and the HTTP narrator
    pub fn from_config(config: CompanionConfig) -> Result<Self, NarrativeError> {
        let engine = config.engine.build(config.interval_width);
        let narrator = config.narrative.narrator()?;
        Ok(Self::new(config, engine, narrator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::BuildingPrompt.to_string(), "BuildingPrompt");
        assert_eq!(Stage::Idle.to_string(), "Idle");
    }
}
