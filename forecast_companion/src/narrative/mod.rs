//! Narrative generation boundary: credentials, the engine trait, and the
//! insight lines parsed from generated text

use crate::error::NarrativeError;
use std::fmt;

pub mod openai;

pub use openai::OpenAiNarrator;

/// Caller-supplied API credentials.
///
/// The key authorizes calls only. It is never cached, logged or rendered;
/// [`Credentials::scope`] is the only derived value that leaves this type.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// True when no usable key was supplied
    pub fn is_missing(&self) -> bool {
        self.api_key.trim().is_empty()
    }

    /// Stable, non-reversible identifier of the credential
    pub fn scope(&self) -> String {
        let hash = blake3::hash(self.api_key.as_bytes());
        hash.to_hex().as_str()[..16].to_string()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("scope", &self.scope())
            .finish()
    }
}

/// Per-call generation limits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationBudget {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationBudget {
    fn default() -> Self {
        Self {
            max_tokens: 200,
            temperature: 0.7,
        }
    }
}

/// A text generation capability
pub trait NarrativeEngine: Send + Sync {
    /// Generate free-form text for `prompt` within `budget`
    fn generate(
        &self,
        prompt: &str,
        credentials: &Credentials,
        budget: &GenerationBudget,
    ) -> Result<String, NarrativeError>;
}

impl<N: NarrativeEngine + ?Sized> NarrativeEngine for Box<N> {
    fn generate(
        &self,
        prompt: &str,
        credentials: &Credentials,
        budget: &GenerationBudget,
    ) -> Result<String, NarrativeError> {
        (**self).generate(prompt, credentials, budget)
    }
}

/// Ordered, non-blank insight lines
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InsightSet {
    lines: Vec<String>,
}

impl InsightSet {
    /// Split generated text on line breaks, dropping blank lines
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insights_drop_blank_lines() {
        let insights = InsightSet::from_text("- up\n- seasonal\n\n- stable");
        assert_eq!(insights.lines(), &["- up", "- seasonal", "- stable"]);
    }

    #[test]
    fn test_insights_whitespace_only_lines_and_crlf() {
        let insights = InsightSet::from_text("first\r\n   \r\nsecond\n\t\n");
        assert_eq!(insights.lines(), &["first", "second"]);
    }

    #[test]
    fn test_credentials_debug_hides_key() {
        let credentials = Credentials::new("sk-very-secret");
        let shown = format!("{:?}", credentials);
        assert!(!shown.contains("sk-very-secret"));
        assert!(shown.contains(&credentials.scope()));
        assert_eq!(credentials.scope().len(), 16);
    }

    #[test]
    fn test_credentials_missing() {
        assert!(Credentials::new("  ").is_missing());
        assert!(!Credentials::new("key").is_missing());
    }
}
