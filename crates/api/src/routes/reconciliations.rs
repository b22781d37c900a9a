//! Reconciliation routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

use crate::error::{bad_request, internal_error, ApiError};
use crate::middleware::ActorContext;
use crate::AppState;
use rentra_core::reconciliation::ReconciliationStatus;
use rentra_db::entities::reconciliations;
use rentra_db::repositories::reconciliation::{
    ReconciliationRepository, StartReconciliationInput,
};

/// Creates the reconciliation routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/landlords/{landlord_id}/reconciliations",
            get(list_reconciliations),
        )
        .route(
            "/landlords/{landlord_id}/reconciliations",
            post(start_reconciliation),
        )
        .route(
            "/landlords/{landlord_id}/reconciliations/{reconciliation_id}",
            get(get_reconciliation),
        )
        .route(
            "/landlords/{landlord_id}/reconciliations/{reconciliation_id}/complete",
            post(complete_reconciliation),
        )
        .route(
            "/landlords/{landlord_id}/reconciliations/{reconciliation_id}/reopen",
            post(reopen_reconciliation),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing reconciliations.
#[derive(Debug, Deserialize)]
pub struct ListReconciliationsQuery {
    /// Filter by account.
    pub account: Option<Uuid>,
}

/// Request body for starting a reconciliation.
#[derive(Debug, Deserialize)]
pub struct StartReconciliationRequest {
    /// Account being reconciled.
    pub account_id: Uuid,
    /// First day of the statement period (YYYY-MM-DD).
    pub period_start: NaiveDate,
    /// Last day of the statement period (YYYY-MM-DD).
    pub period_end: NaiveDate,
    /// Closing balance reported by the external statement.
    pub statement_balance: String,
    /// Optional notes.
    pub notes: Option<String>,
}

/// Request body for reopening a reconciliation.
#[derive(Debug, Deserialize)]
pub struct ReopenRequest {
    /// Why the reconciliation is being reopened.
    pub reason: String,
}

/// Response for a reconciliation.
#[derive(Debug, Serialize)]
pub struct ReconciliationResponse {
    /// Reconciliation ID.
    pub id: Uuid,
    /// Account ID.
    pub account_id: Uuid,
    /// First day of the period.
    pub period_start: String,
    /// Last day of the period.
    pub period_end: String,
    /// Statement closing balance.
    pub statement_balance: String,
    /// System balance at period end.
    pub system_balance: String,
    /// Statement minus system.
    pub difference: String,
    /// Status.
    pub status: &'static str,
    /// Completed by user ID.
    pub completed_by: Option<Uuid>,
    /// Completed at timestamp.
    pub completed_at: Option<String>,
    /// Notes.
    pub notes: Option<String>,
    /// Created at timestamp.
    pub created_at: String,
}

fn reconciliation_response(row: reconciliations::Model) -> ReconciliationResponse {
    let status: ReconciliationStatus = row.status.into();
    ReconciliationResponse {
        id: row.id,
        account_id: row.account_id,
        period_start: row.period_start.to_string(),
        period_end: row.period_end.to_string(),
        statement_balance: row.statement_balance.to_string(),
        system_balance: row.system_balance.to_string(),
        difference: row.difference.to_string(),
        status: status.as_str(),
        completed_by: row.completed_by,
        completed_at: row.completed_at.map(|t| t.to_rfc3339()),
        notes: row.notes,
        created_at: row.created_at.to_rfc3339(),
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/landlords/{landlord_id}/reconciliations` - Start a reconciliation.
async fn start_reconciliation(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(landlord_id): Path<Uuid>,
    Json(payload): Json<StartReconciliationRequest>,
) -> impl IntoResponse {
    let statement_balance = match Decimal::from_str(&payload.statement_balance) {
        Ok(b) => b,
        Err(_) => return bad_request("invalid_balance", "Invalid statement balance format"),
    };

    let repo = ReconciliationRepository::new((*state.db).clone());
    let input = StartReconciliationInput {
        landlord_id,
        account_id: payload.account_id,
        period_start: payload.period_start,
        period_end: payload.period_end,
        statement_balance,
        notes: payload.notes,
    };

    match repo.start_reconciliation(input).await {
        Ok(row) => {
            info!(
                landlord_id = %landlord_id,
                reconciliation_id = %row.id,
                account_id = %row.account_id,
                difference = %row.difference,
                started_by = %actor.user_id(),
                "Reconciliation started"
            );
            (StatusCode::CREATED, Json(reconciliation_response(row))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// POST `.../reconciliations/{reconciliation_id}/complete` - Complete.
async fn complete_reconciliation(
    State(state): State<AppState>,
    actor: ActorContext,
    Path((landlord_id, reconciliation_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let repo = ReconciliationRepository::new((*state.db).clone());

    match repo
        .complete_reconciliation(landlord_id, reconciliation_id, actor.user_id())
        .await
    {
        Ok(row) => {
            info!(
                landlord_id = %landlord_id,
                reconciliation_id = %reconciliation_id,
                completed_by = %actor.user_id(),
                "Reconciliation completed"
            );
            (StatusCode::OK, Json(reconciliation_response(row))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// POST `.../reconciliations/{reconciliation_id}/reopen` - Reopen.
async fn reopen_reconciliation(
    State(state): State<AppState>,
    actor: ActorContext,
    Path((landlord_id, reconciliation_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ReopenRequest>,
) -> impl IntoResponse {
    if payload.reason.trim().is_empty() {
        return bad_request("missing_reason", "A reopen reason is required");
    }

    let repo = ReconciliationRepository::new((*state.db).clone());
    match repo
        .reopen_reconciliation(landlord_id, reconciliation_id, &payload.reason)
        .await
    {
        Ok(row) => {
            info!(
                landlord_id = %landlord_id,
                reconciliation_id = %reconciliation_id,
                reopened_by = %actor.user_id(),
                "Reconciliation reopened"
            );
            (StatusCode::OK, Json(reconciliation_response(row))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// GET `.../reconciliations/{reconciliation_id}` - Get one.
async fn get_reconciliation(
    State(state): State<AppState>,
    _actor: ActorContext,
    Path((landlord_id, reconciliation_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let repo = ReconciliationRepository::new((*state.db).clone());

    match repo.get_reconciliation(landlord_id, reconciliation_id).await {
        Ok(row) => (StatusCode::OK, Json(reconciliation_response(row))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET `/landlords/{landlord_id}/reconciliations` - List.
async fn list_reconciliations(
    State(state): State<AppState>,
    _actor: ActorContext,
    Path(landlord_id): Path<Uuid>,
    Query(query): Query<ListReconciliationsQuery>,
) -> impl IntoResponse {
    let repo = ReconciliationRepository::new((*state.db).clone());

    match repo.list_reconciliations(landlord_id, query.account).await {
        Ok(rows) => {
            let items: Vec<ReconciliationResponse> =
                rows.into_iter().map(reconciliation_response).collect();
            (StatusCode::OK, Json(json!({ "reconciliations": items }))).into_response()
        }
        Err(e) => internal_error(&e),
    }
}
