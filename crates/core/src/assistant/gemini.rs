//! Client for the Generative Language `generateContent` endpoint.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use debttracker_shared::config::AssistantConfig;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{AssistantError, GenerationRequest, LanguageModel};

/// Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    inner: Arc<GeminiClientInner>,
}

struct GeminiClientInner {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.inner.model)
            .field("endpoint", &self.inner.endpoint)
            .field("api_key", &"[hidden]")
            .finish()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl GeminiClient {
    /// Creates a client for `config`, or `None` when no API key is configured.
    ///
    /// # Errors
    ///
    /// Returns `AssistantError::Http` if the HTTP client cannot be built.
    pub fn from_config(config: &AssistantConfig) -> Result<Option<Self>, AssistantError> {
        let Some(api_key) = config.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
        else {
            return Ok(None);
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Some(Self {
            inner: Arc::new(GeminiClientInner {
                client,
                endpoint: format!(
                    "{}/models/{}:generateContent",
                    config.base_url.trim_end_matches('/'),
                    config.model
                ),
                api_key: api_key.to_string(),
                model: config.model.clone(),
            }),
        }))
    }
}

/// Concatenates the text parts of the first candidate.
fn extract_text(response: GenerateContentResponse) -> Result<String, AssistantError> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        Err(AssistantError::EmptyResponse)
    } else {
        Ok(text)
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    #[instrument(skip(self, request), fields(model = %self.inner.model))]
    async fn generate(&self, request: GenerationRequest) -> Result<String, AssistantError> {
        let body = GenerateContentRequest {
            system_instruction: request.system.as_deref().map(|text| Content {
                role: None,
                parts: vec![Part { text }],
            }),
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part {
                    text: &request.prompt,
                }],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
            },
        };

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .header("x-goog-api-key", &self.inner.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map_or(text, |envelope| envelope.error.message);
            return Err(AssistantError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&text)
            .map_err(|e| AssistantError::Parse(format!("Failed to parse response: {e}")))?;
        extract_text(parsed)
    }
}
