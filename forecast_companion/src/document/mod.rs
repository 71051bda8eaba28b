//! Slide document assembly: a title section, a chart section and one
//! section per insight line, rendered into a single `.pptx` package

use crate::data::Horizon;
use crate::error::AssemblyError;
use crate::models::Forecast;
use crate::narrative::InsightSet;
use serde::Deserialize;
use tracing::debug;

pub mod chart;
pub mod pptx;

pub use chart::{render_chart, ChartImage};
pub use pptx::PptxWriter;

/// Text and sizing choices for the generated document
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DocumentStyle {
    pub title: String,
    pub chart_title: String,
    pub chart_width_px: u32,
    pub chart_height_px: u32,
}

impl Default for DocumentStyle {
    fn default() -> Self {
        Self {
            title: "Forecast & Narrative Companion".to_string(),
            chart_title: "Forecast Plot".to_string(),
            chart_width_px: 1000,
            chart_height_px: 500,
        }
    }
}

/// One section of the output document
#[derive(Debug, Clone, PartialEq)]
pub enum Slide {
    Title { title: String },
    Chart { title: String, image: ChartImage },
    Insight { index: usize, title: String, body: String },
}

impl Slide {
    fn rank(&self) -> u8 {
        match self {
            Slide::Title { .. } => 0,
            Slide::Chart { .. } => 1,
            Slide::Insight { .. } => 2,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Slide::Title { title } | Slide::Chart { title, .. } | Slide::Insight { title, .. } => {
                title
            }
        }
    }
}

/// Ordered sections: exactly one title, then one chart, then insights
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Deck {
    slides: Vec<Slide>,
}

impl Deck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a section, rejecting anything that breaks the section order
    pub fn push(&mut self, slide: Slide) -> Result<(), AssemblyError> {
        let expected_rank = match self.slides.len() {
            0 => 0,
            1 => 1,
            _ => 2,
        };
        if slide.rank() != expected_rank {
            return Err(AssemblyError::Package(format!(
                "Section '{}' out of order at position {}",
                slide.title(),
                self.slides.len()
            )));
        }
        self.slides.push(slide);
        Ok(())
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }
}

/// Composes forecast and insights into a document
#[derive(Debug, Clone, Default)]
pub struct DocumentAssembler {
    style: DocumentStyle,
}

impl DocumentAssembler {
    pub fn new(style: DocumentStyle) -> Self {
        Self { style }
    }

    /// Build the section model; any section failing to render fails the
    /// whole document
    pub fn compose(
        &self,
        forecast: &Forecast,
        insights: &InsightSet,
        horizon: Horizon,
    ) -> Result<Deck, AssemblyError> {
        if forecast.horizon() != horizon.get() {
            return Err(AssemblyError::Chart(format!(
                "Forecast covers horizon {} but document was asked for {}",
                forecast.horizon(),
                horizon
            )));
        }

        let mut deck = Deck::new();
        deck.push(Slide::Title {
            title: self.style.title.clone(),
        })?;

        let image = render_chart(
            forecast,
            forecast.marker_index(),
            self.style.chart_width_px,
            self.style.chart_height_px,
        )?;
        deck.push(Slide::Chart {
            title: self.style.chart_title.clone(),
            image,
        })?;

        for (i, line) in insights.iter().enumerate() {
            deck.push(Slide::Insight {
                index: i + 1,
                title: format!("Insight {}", i + 1),
                body: line.to_string(),
            })?;
        }

        debug!(sections = deck.len(), "document composed");
        Ok(deck)
    }

    /// Compose and serialize the document
    pub fn assemble(
        &self,
        forecast: &Forecast,
        insights: &InsightSet,
        horizon: Horizon,
    ) -> Result<Vec<u8>, AssemblyError> {
        let deck = self.compose(forecast, insights, horizon)?;
        PptxWriter::new(&self.style.title).write(&deck)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deck_rejects_insight_before_chart() {
        let mut deck = Deck::new();
        deck.push(Slide::Title {
            title: "t".to_string(),
        })
        .unwrap();
        let result = deck.push(Slide::Insight {
            index: 1,
            title: "Insight 1".to_string(),
            body: "b".to_string(),
        });
        assert!(result.is_err());
        assert_eq!(deck.len(), 1);
    }

    #[test]
    fn test_deck_rejects_second_title() {
        let mut deck = Deck::new();
        deck.push(Slide::Title {
            title: "t".to_string(),
        })
        .unwrap();
        assert!(deck
            .push(Slide::Title {
                title: "again".to_string()
            })
            .is_err());
    }
}
