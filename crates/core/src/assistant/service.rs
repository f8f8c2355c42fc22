//! Assistant operations.

use std::sync::Arc;

use tracing::debug;

use super::prompt::{self, CHAT_TEMPERATURE, SUMMARY_TEMPERATURE};
use super::{AssistantError, GenerationRequest, HistoryMessage, LanguageModel};
use crate::ledger::Debtor;

/// Summaries and chat over an owner's debtors.
#[derive(Clone)]
pub struct AssistantService {
    model: Arc<dyn LanguageModel>,
    language: String,
}

impl std::fmt::Debug for AssistantService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistantService")
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}

impl AssistantService {
    /// Creates a service answering in `language`.
    pub fn new(model: Arc<dyn LanguageModel>, language: impl Into<String>) -> Self {
        Self {
            model,
            language: language.into(),
        }
    }

    /// Summarizes the owner's debt situation.
    ///
    /// An empty list gets a fixed answer without calling the model.
    ///
    /// # Errors
    ///
    /// Returns an `AssistantError` if the model call fails.
    pub async fn summarize(&self, debtors: &[Debtor]) -> Result<String, AssistantError> {
        if debtors.is_empty() {
            return Ok(prompt::empty_summary(&self.language));
        }

        debug!(debtors = debtors.len(), "Requesting debt summary");
        self.model
            .generate(GenerationRequest {
                system: None,
                prompt: prompt::summary_prompt(debtors, &self.language)?,
                temperature: SUMMARY_TEMPERATURE,
            })
            .await
    }

    /// Answers a question about the owner's debtors.
    ///
    /// # Errors
    ///
    /// Returns `AssistantError::EmptyPrompt` for a blank question, or an
    /// `AssistantError` if the model call fails.
    pub async fn chat(
        &self,
        history: &[HistoryMessage],
        question: &str,
        debtors: &[Debtor],
    ) -> Result<String, AssistantError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AssistantError::EmptyPrompt);
        }

        debug!(
            history = history.len(),
            debtors = debtors.len(),
            "Requesting chat answer"
        );
        self.model
            .generate(GenerationRequest {
                system: Some(prompt::chat_system(debtors, &self.language)?),
                prompt: prompt::chat_prompt(history, question),
                temperature: CHAT_TEMPERATURE,
            })
            .await
    }
}
