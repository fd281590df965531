//! Generative model client abstraction and implementations.
//!
//! Defines the [`Generator`] trait and concrete implementations:
//! - **[`DisabledGenerator`]** — fails every call with a fixed message;
//!   used when no model client is configured.
//! - **[`GeminiGenerator`]** — calls the Generative Language API with
//!   bounded retry and backoff.
//!
//! # Retry Strategy
//!
//! The Gemini client retries transient errors with exponential backoff:
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)
//!
//! Parse failures are never retried: a well-formed HTTP response with an
//! uninterpretable payload is not transient.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::GenerationConfig;

/// Fixed message for the disabled client; callers may match on it.
pub const DISABLED_MESSAGE: &str =
    "Answer generation is disabled: no model client is configured";

/// Failure of a single generation call. Carried to the synthesis boundary,
/// where it becomes [`AnswerFailure`](crate::models::AnswerFailure) data.
#[derive(Debug)]
pub enum GenerateError {
    /// The client is not configured; the feature is off.
    Disabled,
    /// The remote call failed or returned a non-success status.
    Transport(String),
    /// The response arrived but could not be interpreted.
    Parse(String),
}

impl std::fmt::Display for GenerateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerateError::Disabled => write!(f, "{}", DISABLED_MESSAGE),
            GenerateError::Transport(e) => write!(f, "model call failed: {}", e),
            GenerateError::Parse(e) => write!(f, "model response unusable: {}", e),
        }
    }
}

impl std::error::Error for GenerateError {}

/// An opaque remote text generator.
#[async_trait]
pub trait Generator: Send + Sync {
    /// The model identifier (e.g. `"gemini-1.5-flash"`).
    fn model_name(&self) -> &str;

    /// Generate text for a fully assembled prompt.
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}

/// A no-op generator that always fails with [`DISABLED_MESSAGE`].
pub struct DisabledGenerator;

#[async_trait]
impl Generator for DisabledGenerator {
    fn model_name(&self) -> &str {
        "disabled"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, GenerateError> {
        Err(GenerateError::Disabled)
    }
}

/// Generator backed by the Generative Language API
/// (`models/{model}:generateContent`).
///
/// Requires the `GEMINI_API_KEY` environment variable.
pub struct GeminiGenerator {
    model: String,
    api_key: String,
    max_retries: u32,
    client: reqwest::Client,
    base_url: String,
}

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

impl GeminiGenerator {
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let model = config
            .model
            .clone()
            .ok_or_else(|| anyhow::anyhow!("generation.model required for Gemini provider"))?;
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| anyhow::anyhow!("GEMINI_API_KEY environment variable not set"))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            model,
            api_key,
            max_retries: config.max_retries,
            client,
            base_url: GEMINI_BASE_URL.to_string(),
        })
    }
}

#[async_trait]
impl Generator for GeminiGenerator {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });

        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tokio::time::sleep(delay).await;
            }

            let resp = self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .header("Content-Type", "application/json")
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let json: serde_json::Value = response
                            .json()
                            .await
                            .map_err(|e| GenerateError::Parse(e.to_string()))?;
                        return parse_gemini_response(&json);
                    }

                    // Rate limited or server error, retry
                    if status.as_u16() == 429 || status.is_server_error() {
                        let body_text = response.text().await.unwrap_or_default();
                        last_err = Some(GenerateError::Transport(format!(
                            "API error {}: {}",
                            status, body_text
                        )));
                        continue;
                    }

                    // Other client errors are not transient
                    let body_text = response.text().await.unwrap_or_default();
                    return Err(GenerateError::Transport(format!(
                        "API error {}: {}",
                        status, body_text
                    )));
                }
                Err(e) => {
                    last_err = Some(GenerateError::Transport(e.to_string()));
                    continue;
                }
            }
        }

        Err(last_err
            .unwrap_or_else(|| GenerateError::Transport("generation failed after retries".into())))
    }
}

/// Extract the generated text from a `generateContent` response.
///
/// Tolerates missing fields by surfacing a parse error rather than
/// panicking: no candidates, a blocked/empty candidate, and non-string
/// parts all fail cleanly.
fn parse_gemini_response(json: &serde_json::Value) -> Result<String, GenerateError> {
    let candidates = json
        .get("candidates")
        .and_then(|c| c.as_array())
        .ok_or_else(|| GenerateError::Parse("missing candidates array".into()))?;

    let first = candidates
        .first()
        .ok_or_else(|| GenerateError::Parse("empty candidate list".into()))?;

    let parts = first
        .get("content")
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .ok_or_else(|| GenerateError::Parse("candidate has no content parts".into()))?;

    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect::<Vec<_>>()
        .join("");

    if text.trim().is_empty() {
        return Err(GenerateError::Parse("candidate contained no text".into()));
    }

    Ok(text)
}

/// Create the appropriate [`Generator`] based on configuration.
pub fn create_generator(config: &GenerationConfig) -> Result<Box<dyn Generator>> {
    match config.provider.as_str() {
        "disabled" => Ok(Box::new(DisabledGenerator)),
        "gemini" => Ok(Box::new(GeminiGenerator::new(config)?)),
        other => anyhow::bail!("Unknown generation provider: {}", other),
    }
}
