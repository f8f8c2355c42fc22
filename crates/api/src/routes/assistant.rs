//! AI assistant routes.

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};
use debttracker_core::assistant::{AssistantService, HistoryMessage};
use debttracker_shared::AppError;
use serde::{Deserialize, Serialize};

use super::debtors::ledger;
use crate::{ApiResult, AppState, middleware::AuthUser};

/// Creates the assistant routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/assistant/summary", post(summary))
        .route("/assistant/chat", post(chat))
}

/// Chat request body.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Earlier turns of the conversation.
    #[serde(default)]
    pub history: Vec<HistoryMessage>,
    /// The new question.
    pub prompt: String,
}

/// Summary response.
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    /// Generated summary.
    pub summary: String,
}

/// Chat response.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// The assistant's answer.
    pub reply: String,
}

fn assistant(state: &AppState) -> ApiResult<Arc<AssistantService>> {
    state
        .assistant
        .clone()
        .ok_or_else(|| AppError::Unavailable("The AI assistant is not configured".into()).into())
}

/// POST /assistant/summary - Summarize the caller's debts.
async fn summary(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<SummaryResponse>> {
    let assistant = assistant(&state)?;
    let debtors = ledger(&state).list_debtors(&user.owner()).await?;

    let summary = assistant.summarize(&debtors).await?;
    Ok(Json(SummaryResponse { summary }))
}

/// POST /assistant/chat - Answer a question about the caller's debts.
async fn chat(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let assistant = assistant(&state)?;
    let debtors = ledger(&state).list_debtors(&user.owner()).await?;

    let reply = assistant
        .chat(&payload.history, &payload.prompt, &debtors)
        .await?;
    Ok(Json(ChatResponse { reply }))
}
