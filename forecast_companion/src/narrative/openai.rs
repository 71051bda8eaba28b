//! OpenAI-compatible chat completions client

use crate::error::NarrativeError;
use crate::narrative::{Credentials, GenerationBudget, NarrativeEngine};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a financial analyst that writes bullet-point insights with clarity and design in mind.";

/// Chat completions client used as the narrative engine
#[derive(Debug, Clone)]
pub struct OpenAiNarrator {
    client: Client,
    base_url: String,
    model: String,
    system_prompt: String,
}

impl OpenAiNarrator {
    /// Create a narrator with default endpoint, model and persona
    pub fn new(timeout: Duration) -> Result<Self, NarrativeError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| NarrativeError::Upstream(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        })
    }

    /// Point the client at another OpenAI-compatible endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    fn build_headers(&self, credentials: &Credentials) -> Result<HeaderMap, NarrativeError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let bearer = HeaderValue::from_str(&format!("Bearer {}", credentials.api_key()))
            .map_err(|_| NarrativeError::Auth("API key contains invalid characters".to_string()))?;
        headers.insert(AUTHORIZATION, bearer);
        Ok(headers)
    }

    fn build_request<'a>(&'a self, prompt: &'a str, budget: &GenerationBudget) -> ApiRequest<'a> {
        ApiRequest {
            model: &self.model,
            messages: vec![
                ApiMessage {
                    role: "system",
                    content: &self.system_prompt,
                },
                ApiMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: budget.temperature,
            max_tokens: budget.max_tokens,
        }
    }
}

impl NarrativeEngine for OpenAiNarrator {
    fn generate(
        &self,
        prompt: &str,
        credentials: &Credentials,
        budget: &GenerationBudget,
    ) -> Result<String, NarrativeError> {
        if credentials.is_missing() {
            return Err(NarrativeError::Auth("API key not configured".to_string()));
        }

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .headers(self.build_headers(credentials)?)
            .json(&self.build_request(prompt, budget))
            .send()
            .map_err(|e| NarrativeError::Upstream(format!("Network error: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(classify_failure(status, body));
        }

        let body: ApiResponse = response
            .json()
            .map_err(|e| NarrativeError::Upstream(format!("Failed to parse response: {e}")))?;
        extract_text(body)
    }
}

/// Map a non-success HTTP status onto the narrative error taxonomy
pub fn classify_failure(status: StatusCode, body: String) -> NarrativeError {
    let message = format!("status {}: {}", status.as_u16(), body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => NarrativeError::Auth(message),
        StatusCode::TOO_MANY_REQUESTS => NarrativeError::RateLimit(message),
        _ => NarrativeError::Upstream(message),
    }
}

fn extract_text(body: ApiResponse) -> Result<String, NarrativeError> {
    body.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|text| text.trim().to_string())
        .ok_or_else(|| NarrativeError::Upstream("Response contained no message content".to_string()))
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ApiChoiceMessage {
    content: Option<String>,
}
