//! Balance and period summary routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::ActorContext;
use crate::AppState;
use rentra_db::repositories::balance::BalanceRepository;

/// Creates the balance routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/landlords/{landlord_id}/accounts/{account_id}/balance",
            get(get_balance),
        )
        .route(
            "/landlords/{landlord_id}/accounts/{account_id}/period-summary",
            get(get_period_summary),
        )
        .route(
            "/landlords/{landlord_id}/accounts/{account_id}/snapshots",
            post(snapshot_period),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for a point-in-time balance.
#[derive(Debug, Deserialize)]
pub struct BalanceQuery {
    /// Balance as of this date (inclusive); defaults to today.
    pub as_of: Option<NaiveDate>,
}

/// Query parameters for a period summary.
#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    /// First day of the window (inclusive).
    pub start: NaiveDate,
    /// Last day of the window (inclusive).
    pub end: NaiveDate,
}

/// Request body for snapshotting a period.
#[derive(Debug, Deserialize)]
pub struct SnapshotRequest {
    /// First day of the window (inclusive).
    pub period_start: NaiveDate,
    /// Last day of the window (inclusive).
    pub period_end: NaiveDate,
}

/// Response for a point-in-time balance.
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    /// Account ID.
    pub account_id: Uuid,
    /// Date the balance is computed as of.
    pub as_of: String,
    /// Signed balance in the account's normal-balance orientation.
    pub balance: String,
}

/// Response for a period summary.
#[derive(Debug, Serialize)]
pub struct PeriodSummaryResponse {
    /// Account ID.
    pub account_id: Uuid,
    /// First day of the window.
    pub period_start: String,
    /// Last day of the window.
    pub period_end: String,
    /// Balance immediately before the window.
    pub opening_balance: String,
    /// Total debits within the window.
    pub total_debits: String,
    /// Total credits within the window.
    pub total_credits: String,
    /// Balance at the end of the window.
    pub closing_balance: String,
}

/// Response for a stored snapshot.
#[derive(Debug, Serialize)]
pub struct SnapshotResponse {
    /// Snapshot ID.
    pub id: Uuid,
    /// Account ID.
    pub account_id: Uuid,
    /// First day of the window.
    pub period_start: String,
    /// Last day of the window.
    pub period_end: String,
    /// Opening balance.
    pub opening_balance: String,
    /// Total debits.
    pub total_debits: String,
    /// Total credits.
    pub total_credits: String,
    /// Closing balance.
    pub closing_balance: String,
    /// Whether a completed reconciliation covers this window.
    pub is_reconciled: bool,
    /// Computed at timestamp.
    pub computed_at: String,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/landlords/{landlord_id}/accounts/{account_id}/balance` - Signed balance.
async fn get_balance(
    State(state): State<AppState>,
    _actor: ActorContext,
    Path((landlord_id, account_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<BalanceQuery>,
) -> impl IntoResponse {
    let as_of = query.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let repo = BalanceRepository::new((*state.db).clone());

    match repo.get_balance(landlord_id, account_id, as_of).await {
        Ok(balance) => (
            StatusCode::OK,
            Json(BalanceResponse {
                account_id,
                as_of: as_of.to_string(),
                balance: balance.to_string(),
            }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET `/landlords/{landlord_id}/accounts/{account_id}/period-summary` - Window activity.
async fn get_period_summary(
    State(state): State<AppState>,
    _actor: ActorContext,
    Path((landlord_id, account_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<PeriodQuery>,
) -> impl IntoResponse {
    let repo = BalanceRepository::new((*state.db).clone());

    match repo
        .get_period_summary(landlord_id, account_id, query.start, query.end)
        .await
    {
        Ok(summary) => (
            StatusCode::OK,
            Json(PeriodSummaryResponse {
                account_id,
                period_start: summary.period_start.to_string(),
                period_end: summary.period_end.to_string(),
                opening_balance: summary.opening_balance.to_string(),
                total_debits: summary.total_debits.to_string(),
                total_credits: summary.total_credits.to_string(),
                closing_balance: summary.closing_balance.to_string(),
            }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST `/landlords/{landlord_id}/accounts/{account_id}/snapshots` - Upsert a snapshot.
async fn snapshot_period(
    State(state): State<AppState>,
    _actor: ActorContext,
    Path((landlord_id, account_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<SnapshotRequest>,
) -> impl IntoResponse {
    let repo = BalanceRepository::new((*state.db).clone());

    match repo
        .snapshot_period(landlord_id, account_id, payload.period_start, payload.period_end)
        .await
    {
        Ok(snapshot) => (
            StatusCode::OK,
            Json(SnapshotResponse {
                id: snapshot.id,
                account_id: snapshot.account_id,
                period_start: snapshot.period_start.to_string(),
                period_end: snapshot.period_end.to_string(),
                opening_balance: snapshot.opening_balance.to_string(),
                total_debits: snapshot.total_debits.to_string(),
                total_credits: snapshot.total_credits.to_string(),
                closing_balance: snapshot.closing_balance.to_string(),
                is_reconciled: snapshot.is_reconciled,
                computed_at: snapshot.computed_at.to_rfc3339(),
            }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
