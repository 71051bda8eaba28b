//! # Forecast Companion
//!
//! Turns a tabular time series into a forecast, a short written narrative
//! about that forecast, and a slide deck combining both.
//!
//! ## Stages
//!
//! - **Normalizing**: validate and reshape a table into a sorted, duplicate-free series
//! - **Forecasting**: fit a trend model and extend it by the requested horizon (cached)
//! - **BuildingPrompt**: render the tail of the forecast into an instruction prompt
//! - **Narrating**: ask a chat completions service for bullet insights (cached)
//! - **Assembling**: title slide, chart slide, one slide per insight
//!
//! Forecasts and insights are memoized by content hash for the lifetime of a
//! [`Pipeline`], so running the same input twice costs one engine call each.
//! Failed calls are never cached.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use forecast_companion::data::TableLoader;
//! use forecast_companion::narrative::Credentials;
//! use forecast_companion::{CompanionConfig, Pipeline, RunRequest};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let table = TableLoader::from_csv("sales.csv")?;
//! let pipeline = Pipeline::from_config(CompanionConfig::default())?;
//!
//! let request = RunRequest::new(table, "month", "sales", 6, Credentials::new("sk-..."));
//! let bundle = pipeline.run(request)?;
//!
//! for line in bundle.insights.iter() {
//!     println!("{line}");
//! }
//! bundle.write_document("forecast_narrative.pptx")?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod data;
pub mod document;
pub mod error;
pub mod models;
pub mod narrative;
pub mod pipeline;
pub mod prompt;
pub mod telemetry;
pub mod utils;

// Re-export commonly used types
pub use crate::cache::{ForecastService, NarrativeService};
pub use crate::config::CompanionConfig;
pub use crate::data::{Horizon, Series, TableNormalizer};
pub use crate::document::DocumentAssembler;
pub use crate::error::{ErrorKind, PipelineError};
pub use crate::models::{Forecast, ForecastEngine};
pub use crate::narrative::{Credentials, InsightSet, NarrativeEngine};
pub use crate::pipeline::{ArtifactBundle, Pipeline, PipelineFailure, RunRequest, Stage};
pub use crate::prompt::{build_prompt, NarrativePrompt, PromptBuilder};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
