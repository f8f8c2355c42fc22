//! AI assistant over the owner's debt data.
//!
//! The assistant builds prompts from the owner's debtors and hands them to a
//! hosted language model. No retrieval or tool calls: the debtor list is
//! embedded in the prompt and is the model's only source of truth.

mod gemini;
mod prompt;
mod service;

use async_trait::async_trait;
use debttracker_shared::AppError;
use serde::Deserialize;
use thiserror::Error;

pub use gemini::GeminiClient;
pub use prompt::{CHAT_TEMPERATURE, SUMMARY_TEMPERATURE};
pub use service::AssistantService;

/// One generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// System instructions.
    pub system: Option<String>,
    /// User prompt.
    pub prompt: String,
    /// Sampling temperature.
    pub temperature: f32,
}

/// A hosted text model.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generates a completion for `request`.
    async fn generate(&self, request: GenerationRequest) -> Result<String, AssistantError>;
}

/// A prior chat turn sent back by the client.
///
/// Role is kept as free text so unknown roles can be dropped instead of
/// failing the request.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryMessage {
    /// `user` or `model`; anything else is ignored.
    pub role: String,
    /// Message text.
    #[serde(default)]
    pub text: String,
}

/// Errors that can occur in assistant operations.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// The user sent nothing to answer.
    #[error("Prompt must not be empty")]
    EmptyPrompt,

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The model API returned an error.
    #[error("model API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// Failed to build or parse a payload.
    #[error("parse error: {0}")]
    Parse(String),

    /// The model returned no text.
    #[error("model returned an empty response")]
    EmptyResponse,
}

impl From<AssistantError> for AppError {
    fn from(err: AssistantError) -> Self {
        match err {
            AssistantError::EmptyPrompt => Self::Validation(err.to_string()),
            _ => Self::ExternalService(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        let app: AppError = AssistantError::EmptyPrompt.into();
        assert_eq!(app.status_code(), 400);

        let app: AppError = AssistantError::Api {
            status: 429,
            message: "quota".into(),
        }
        .into();
        assert!(app.is_internal());
    }

    #[test]
    fn test_history_message_text_defaults() {
        let msg: HistoryMessage = serde_json::from_str(r#"{"role":"user"}"#).unwrap();
        assert_eq!(msg.role, "user");
        assert!(msg.text.is_empty());
    }
}
