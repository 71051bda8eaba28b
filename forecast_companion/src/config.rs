//! Runtime configuration loaded from TOML

use crate::document::DocumentStyle;
use crate::error::ConfigError;
use crate::models::EngineKind;
use crate::narrative::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT};
use crate::narrative::{GenerationBudget, OpenAiNarrator};
use crate::prompt::{PromptBuilder, DEFAULT_INSIGHT_COUNT, DEFAULT_WINDOW};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Top-level settings for a pipeline
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CompanionConfig {
    /// Largest accepted forecast horizon
    pub max_horizon: usize,
    /// Horizon used when the caller gives none
    pub default_horizon: usize,
    /// Trailing forecast rows shown to the narrative engine
    pub prompt_window: usize,
    /// Number of insights requested
    pub insight_count: usize,
    pub engine: EngineKind,
    /// Coverage of the uncertainty interval, strictly between 0 and 1
    pub interval_width: f64,
    /// Entry limit per cache; unbounded when absent
    pub cache_capacity: Option<u64>,
    pub narrative: NarrativeConfig,
    pub document: DocumentStyle,
}

impl Default for CompanionConfig {
    fn default() -> Self {
        Self {
            max_horizon: 24,
            default_horizon: 6,
            prompt_window: DEFAULT_WINDOW,
            insight_count: DEFAULT_INSIGHT_COUNT,
            engine: EngineKind::default(),
            interval_width: 0.8,
            cache_capacity: None,
            narrative: NarrativeConfig::default(),
            document: DocumentStyle::default(),
        }
    }
}

/// Narrative provider settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NarrativeConfig {
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub system_prompt: String,
    pub timeout_secs: u64,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        let budget = GenerationBudget::default();
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: budget.max_tokens,
            temperature: budget.temperature,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            timeout_secs: 60,
        }
    }
}

impl NarrativeConfig {
    pub fn budget(&self) -> GenerationBudget {
        GenerationBudget {
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }

    /// Build the HTTP narrator described by these settings
    pub fn narrator(&self) -> Result<OpenAiNarrator, crate::error::NarrativeError> {
        Ok(OpenAiNarrator::new(Duration::from_secs(self.timeout_secs))?
            .with_base_url(&self.base_url)
            .with_model(&self.model)
            .with_system_prompt(&self.system_prompt))
    }
}

impl CompanionConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_horizon == 0 {
            return Err(ConfigError::Invalid("max_horizon must be at least 1".to_string()));
        }
        if self.default_horizon == 0 || self.default_horizon > self.max_horizon {
            return Err(ConfigError::Invalid(format!(
                "default_horizon must be between 1 and {}",
                self.max_horizon
            )));
        }
        if self.prompt_window == 0 {
            return Err(ConfigError::Invalid("prompt_window must be at least 1".to_string()));
        }
        if self.insight_count == 0 {
            return Err(ConfigError::Invalid("insight_count must be at least 1".to_string()));
        }
        if !(self.interval_width > 0.0 && self.interval_width < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "interval_width must be in (0, 1), got {}",
                self.interval_width
            )));
        }
        if self.cache_capacity == Some(0) {
            return Err(ConfigError::Invalid("cache_capacity must be positive".to_string()));
        }
        if self.document.chart_width_px == 0 || self.document.chart_height_px == 0 {
            return Err(ConfigError::Invalid("chart size must be non-zero".to_string()));
        }
        Ok(())
    }

    pub fn prompt_builder(&self) -> PromptBuilder {
        PromptBuilder::new(self.prompt_window, self.insight_count)
    }
}
