//! Debtor ledger routes.
//!
//! Alias and amount are validated before the ledger is called. Payment
//! outcomes other than success are answered with their outcome code.
//! Alias-keyed routes live under `/debtors/alias/` so no alias collides with
//! a fixed path segment.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use debttracker_core::ledger::{
    AddDebtOutcome, DebtEntry, DebtLedger, Debtor, DebtorAlias, DebtorInsights, DebtorQuery,
    LedgerStore, LedgerSummary, PaymentOutcome, PositiveAmount, newest_first,
};
use debttracker_shared::types::{DebtorId, format_amount};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::{ApiError, ApiResult, AppState, middleware::AuthUser};

/// Creates the debtor routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/debtors", get(list_debtors))
        .route("/debtors/summary", get(summary))
        .route("/debtors/debts", post(add_debt))
        .route("/debtors/payments", post(pay_debt))
        .route("/debtors/id/{debtor_id}", get(get_by_id).delete(delete_by_id))
        .route("/debtors/alias/{alias}", get(get_debtor).delete(delete_by_alias))
}

pub(crate) fn ledger(state: &AppState) -> DebtLedger<Arc<dyn LedgerStore>> {
    DebtLedger::new(state.ledger_store.clone())
}

// ============================================================================
// Request / Response Types
// ============================================================================

/// Body for recording a debt or a payment.
#[derive(Debug, Deserialize)]
pub struct LedgerEntryRequest {
    /// Debtor alias, matched case-insensitively.
    pub alias: String,
    /// Strictly positive amount.
    pub amount: Decimal,
}

impl LedgerEntryRequest {
    fn parse(&self) -> ApiResult<(DebtorAlias, PositiveAmount)> {
        Ok((
            DebtorAlias::parse(&self.alias)?,
            PositiveAmount::new(self.amount)?,
        ))
    }
}

/// A debtor as returned to clients.
#[derive(Debug, Serialize)]
pub struct DebtorResponse {
    /// Debtor ID.
    pub id: DebtorId,
    /// Alias as first entered.
    pub alias: String,
    /// Outstanding balance.
    pub total_debt: Decimal,
    /// Balance formatted for display.
    pub total_debt_display: String,
    /// History, most recent first.
    pub debts: Vec<DebtEntry>,
}

impl From<&Debtor> for DebtorResponse {
    fn from(debtor: &Debtor) -> Self {
        Self {
            id: debtor.id(),
            alias: debtor.alias().to_string(),
            total_debt: debtor.total_debt(),
            total_debt_display: format_amount(debtor.total_debt()),
            debts: newest_first(debtor),
        }
    }
}

/// A single debtor with history insights.
#[derive(Debug, Serialize)]
pub struct DebtorDetailResponse {
    /// The debtor.
    #[serde(flatten)]
    pub debtor: DebtorResponse,
    /// Earliest entry.
    pub debt_started_at: Option<DateTime<Utc>>,
    /// Latest entry of any kind.
    pub last_transaction_at: Option<DateTime<Utc>>,
    /// Latest payment.
    pub last_payment_at: Option<DateTime<Utc>>,
}

impl From<&Debtor> for DebtorDetailResponse {
    fn from(debtor: &Debtor) -> Self {
        let insights = DebtorInsights::of(debtor);
        Self {
            debtor: DebtorResponse::from(debtor),
            debt_started_at: insights.debt_started_at,
            last_transaction_at: insights.last_transaction_at,
            last_payment_at: insights.last_payment_at,
        }
    }
}

/// Dashboard stats.
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    /// Number of open debtors.
    pub debtor_count: usize,
    /// Sum of all balances.
    pub total_outstanding: Decimal,
    /// Sum formatted for display.
    pub total_outstanding_display: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /debtors - List the caller's debtors, filtered and sorted.
async fn list_debtors(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<DebtorQuery>,
) -> ApiResult<Json<Vec<DebtorResponse>>> {
    let debtors = ledger(&state).list_debtors(&user.owner()).await?;

    Ok(Json(
        query
            .apply(debtors)
            .iter()
            .map(DebtorResponse::from)
            .collect(),
    ))
}

/// GET /debtors/summary - Debtor count and total outstanding.
async fn summary(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<SummaryResponse>> {
    let debtors = ledger(&state).list_debtors(&user.owner()).await?;
    let summary = LedgerSummary::from_debtors(&debtors)?;

    Ok(Json(SummaryResponse {
        debtor_count: summary.debtor_count,
        total_outstanding: summary.total_outstanding,
        total_outstanding_display: format_amount(summary.total_outstanding),
    }))
}

/// GET /debtors/alias/{alias} - One debtor with its history.
async fn get_debtor(
    State(state): State<AppState>,
    user: AuthUser,
    Path(alias): Path<String>,
) -> ApiResult<Json<DebtorDetailResponse>> {
    let alias = DebtorAlias::parse(&alias)?;
    let debtor = ledger(&state)
        .get_debtor(&user.owner(), &alias)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Debtor '{alias}' not found")))?;

    Ok(Json(DebtorDetailResponse::from(&debtor)))
}

/// GET /debtors/id/{debtor_id} - One debtor by id.
async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(debtor_id): Path<Uuid>,
) -> ApiResult<Json<DebtorDetailResponse>> {
    let debtor = ledger(&state)
        .get_debtor_by_id(&user.owner(), DebtorId::from_uuid(debtor_id))
        .await?
        .ok_or_else(|| ApiError::not_found("Debtor not found"))?;

    Ok(Json(DebtorDetailResponse::from(&debtor)))
}

/// POST /debtors/debts - Record a debt, opening the debtor if needed.
async fn add_debt(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<LedgerEntryRequest>,
) -> ApiResult<Response> {
    let (alias, amount) = payload.parse()?;
    let outcome = ledger(&state)
        .add_debt(&user.owner(), &alias, amount)
        .await?;

    let status = match outcome {
        AddDebtOutcome::Created(_) => StatusCode::CREATED,
        AddDebtOutcome::Updated(_) => StatusCode::OK,
    };

    Ok((
        status,
        Json(json!({
            "result": "SUCCESS",
            "created": status == StatusCode::CREATED,
            "debtor": DebtorResponse::from(outcome.debtor()),
        })),
    )
        .into_response())
}

/// POST /debtors/payments - Record a payment.
async fn pay_debt(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<LedgerEntryRequest>,
) -> ApiResult<Response> {
    let (alias, amount) = payload.parse()?;
    let outcome = ledger(&state)
        .pay_debt(&user.owner(), &alias, amount)
        .await?;

    let response = match &outcome {
        PaymentOutcome::Recorded(debtor) => (
            StatusCode::OK,
            Json(json!({
                "result": outcome.code(),
                "settled": false,
                "debtor": DebtorResponse::from(debtor),
            })),
        ),
        PaymentOutcome::Settled { debtor_id, alias } => (
            StatusCode::OK,
            Json(json!({
                "result": outcome.code(),
                "settled": true,
                "debtor_id": debtor_id,
                "alias": alias,
            })),
        ),
        PaymentOutcome::DebtorNotFound => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "debtor_not_found",
                "result": outcome.code(),
                "message": format!("Debtor '{alias}' not found"),
            })),
        ),
        PaymentOutcome::ExceedsDebt { total_debt } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": "payment_exceeds_debt",
                "result": outcome.code(),
                "message": format!(
                    "Payment exceeds the outstanding balance of {}",
                    format_amount(*total_debt)
                ),
                "total_debt": total_debt,
            })),
        ),
    };

    Ok(response.into_response())
}

/// DELETE /debtors/id/{debtor_id} - Remove a debtor regardless of balance.
async fn delete_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(debtor_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let removed = ledger(&state)
        .delete_debtor(&user.owner(), DebtorId::from_uuid(debtor_id))
        .await?;

    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Debtor not found"))
    }
}

/// DELETE /debtors/alias/{alias} - Remove a debtor by alias regardless of balance.
async fn delete_by_alias(
    State(state): State<AppState>,
    user: AuthUser,
    Path(alias): Path<String>,
) -> ApiResult<StatusCode> {
    let alias = DebtorAlias::parse(&alias)?;
    let removed = ledger(&state)
        .delete_debtor_by_alias(&user.owner(), &alias)
        .await?;

    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("Debtor '{alias}' not found")))
    }
}
