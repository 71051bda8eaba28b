//! Narrative request building: a bounded tail of the forecast rendered into
//! a fixed instruction template

use crate::models::Forecast;
use std::fmt;
use std::fmt::Write;

/// Default number of trailing forecast rows shown to the narrative engine
pub const DEFAULT_WINDOW: usize = 8;
/// Default number of bullet insights requested
pub const DEFAULT_INSIGHT_COUNT: usize = 5;

/// Prompt text handed to the narrative engine
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NarrativePrompt(String);

impl NarrativePrompt {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for NarrativePrompt {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl fmt::Display for NarrativePrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builds deterministic prompts from forecasts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptBuilder {
    window: usize,
    insight_count: usize,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            insight_count: DEFAULT_INSIGHT_COUNT,
        }
    }
}

impl PromptBuilder {
    pub fn new(window: usize, insight_count: usize) -> Self {
        Self {
            window,
            insight_count,
        }
    }

    /// Render the last `window` rows of `forecast` into the template
    pub fn build(&self, forecast: &Forecast) -> NarrativePrompt {
        let points = forecast.points();
        let start = points.len().saturating_sub(self.window);

        let mut rows = String::from("ds yhat");
        for point in &points[start..] {
            // Writing into a String cannot fail
            let _ = write!(rows, "\n{} {:.2}", point.date.format("%Y-%m-%d"), point.value);
        }

        NarrativePrompt(format!(
            "Here are dates & values:\n{}\nProvide {} concise bullet-point insights highlighting trends and anomalies.",
            rows, self.insight_count
        ))
    }
}

/// Build a prompt from the last `window_size` rows with the default template
pub fn build_prompt(forecast: &Forecast, window_size: usize) -> NarrativePrompt {
    PromptBuilder::new(window_size, DEFAULT_INSIGHT_COUNT).build(forecast)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Horizon;
    use crate::models::ForecastPoint;
    use chrono::NaiveDate;

    fn forecast(rows: u32) -> Forecast {
        let points = (1..=rows)
            .map(|d| ForecastPoint {
                date: NaiveDate::from_ymd_opt(2024, 1, d).unwrap(),
                value: d as f64 + 0.25,
                lower: 0.0,
                upper: 0.0,
            })
            .collect();
        Forecast::new(points, Horizon::new(1, 24).unwrap()).unwrap()
    }

    #[test]
    fn test_window_takes_tail() {
        let prompt = build_prompt(&forecast(12), 8);
        let text = prompt.as_str();

        assert!(!text.contains("2024-01-04 "));
        assert!(text.contains("2024-01-05 5.25"));
        assert!(text.contains("2024-01-12 12.25"));
        assert!(text.starts_with("Here are dates & values:\nds yhat\n"));
        assert!(text.ends_with("Provide 5 concise bullet-point insights highlighting trends and anomalies."));
    }

    #[test]
    fn test_short_forecast_uses_all_rows() {
        let text = build_prompt(&forecast(3), 8).into_string();
        assert_eq!(text.lines().count(), 2 + 3 + 1);
    }
}
