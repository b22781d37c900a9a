//! Adjustment routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

use crate::error::{bad_request, internal_error, ApiError};
use crate::middleware::ActorContext;
use crate::AppState;
use rentra_core::adjustment::{AdjustmentStatus, AdjustmentType};
use rentra_core::ledger::ReferenceType;
use rentra_db::entities::adjustments;
use rentra_db::repositories::adjustment::{AdjustmentRepository, CreateAdjustmentInput};
use rentra_shared::types::Currency;

/// Creates the adjustment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/landlords/{landlord_id}/adjustments", get(list_adjustments))
        .route("/landlords/{landlord_id}/adjustments", post(create_adjustment))
        .route(
            "/landlords/{landlord_id}/adjustments/{adjustment_id}",
            get(get_adjustment),
        )
        .route(
            "/landlords/{landlord_id}/adjustments/{adjustment_id}/approve",
            post(approve_adjustment),
        )
        .route(
            "/landlords/{landlord_id}/adjustments/{adjustment_id}/reject",
            post(reject_adjustment),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing adjustments.
#[derive(Debug, Deserialize)]
pub struct ListAdjustmentsQuery {
    /// Filter by status.
    pub status: Option<String>,
}

/// Request body for creating an adjustment.
#[derive(Debug, Deserialize)]
pub struct CreateAdjustmentRequest {
    /// Kind of adjustment.
    #[serde(rename = "type")]
    pub adjustment_type: String,
    /// Optional reference type of the corrected business object.
    pub reference_type: Option<String>,
    /// Optional reference ID.
    pub reference_id: Option<Uuid>,
    /// Account debited when the delta is positive.
    pub debit_account_id: Uuid,
    /// Account credited when the delta is positive.
    pub credit_account_id: Uuid,
    /// Amount before the adjustment.
    pub original_amount: String,
    /// Amount after the adjustment.
    pub adjusted_amount: String,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Why the adjustment is needed.
    pub reason: String,
    /// Free-form typed metadata.
    pub metadata: Option<serde_json::Value>,
}

/// Request body for rejecting an adjustment.
#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    /// Why the adjustment is being rejected.
    pub reason: String,
}

/// Response for an adjustment.
#[derive(Debug, Serialize)]
pub struct AdjustmentResponse {
    /// Adjustment ID.
    pub id: Uuid,
    /// Kind of adjustment.
    #[serde(rename = "type")]
    pub adjustment_type: &'static str,
    /// Reference ID of the corrected business object.
    pub reference_id: Option<Uuid>,
    /// Debit-side account.
    pub debit_account_id: Uuid,
    /// Credit-side account.
    pub credit_account_id: Uuid,
    /// Amount before.
    pub original_amount: String,
    /// Amount after.
    pub adjusted_amount: String,
    /// Currency code.
    pub currency: String,
    /// Reason.
    pub reason: String,
    /// Status.
    pub status: &'static str,
    /// Requesting user.
    pub created_by: Uuid,
    /// Approving user, once approved.
    pub approved_by: Option<Uuid>,
    /// Approved at timestamp.
    pub approved_at: Option<String>,
    /// Rejection reason, once rejected.
    pub rejection_reason: Option<String>,
    /// Journal entry posted on approval.
    pub journal_entry_id: Option<Uuid>,
    /// Created at timestamp.
    pub created_at: String,
}

fn adjustment_response(row: adjustments::Model) -> AdjustmentResponse {
    let adjustment_type: AdjustmentType = row.adjustment_type.into();
    let status: AdjustmentStatus = row.status.into();
    AdjustmentResponse {
        id: row.id,
        adjustment_type: adjustment_type.as_str(),
        reference_id: row.reference_id,
        debit_account_id: row.debit_account_id,
        credit_account_id: row.credit_account_id,
        original_amount: row.original_amount.to_string(),
        adjusted_amount: row.adjusted_amount.to_string(),
        currency: row.currency,
        reason: row.reason,
        status: status.as_str(),
        created_by: row.created_by,
        approved_by: row.approved_by,
        approved_at: row.approved_at.map(|t| t.to_rfc3339()),
        rejection_reason: row.rejection_reason,
        journal_entry_id: row.journal_entry_id,
        created_at: row.created_at.to_rfc3339(),
    }
}

fn string_to_reference(s: &str) -> Option<ReferenceType> {
    match s {
        "invoice" => Some(ReferenceType::Invoice),
        "payment" => Some(ReferenceType::Payment),
        "adjustment" => Some(ReferenceType::Adjustment),
        "reconciliation" => Some(ReferenceType::Reconciliation),
        "manual" => Some(ReferenceType::Manual),
        _ => None,
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/landlords/{landlord_id}/adjustments` - Create an adjustment.
async fn create_adjustment(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(landlord_id): Path<Uuid>,
    Json(payload): Json<CreateAdjustmentRequest>,
) -> impl IntoResponse {
    let Ok(adjustment_type) = AdjustmentType::from_str(&payload.adjustment_type) else {
        return bad_request("invalid_adjustment_type", "Unknown adjustment type");
    };
    let Ok(currency) = Currency::from_str(&payload.currency) else {
        return bad_request("invalid_currency", "Unknown currency code");
    };
    let Ok(original_amount) = Decimal::from_str(&payload.original_amount) else {
        return bad_request("invalid_amount", "Invalid original amount format");
    };
    let Ok(adjusted_amount) = Decimal::from_str(&payload.adjusted_amount) else {
        return bad_request("invalid_amount", "Invalid adjusted amount format");
    };
    if payload.reason.trim().is_empty() {
        return bad_request("missing_reason", "An adjustment reason is required");
    }

    let reference = match (payload.reference_type.as_deref(), payload.reference_id) {
        (Some(raw), Some(id)) => match string_to_reference(raw) {
            Some(kind) => Some((kind, id)),
            None => return bad_request("invalid_reference_type", "Unknown reference type"),
        },
        (None, None) => None,
        _ => {
            return bad_request(
                "invalid_reference",
                "reference_type and reference_id must be given together",
            );
        }
    };

    let repo = AdjustmentRepository::new((*state.db).clone());
    let input = CreateAdjustmentInput {
        landlord_id,
        reference,
        adjustment_type,
        debit_account_id: payload.debit_account_id,
        credit_account_id: payload.credit_account_id,
        original_amount,
        adjusted_amount,
        currency,
        reason: payload.reason,
        created_by: actor.user_id(),
        metadata: payload.metadata,
    };

    match repo.create_adjustment(input).await {
        Ok(row) => {
            info!(
                landlord_id = %landlord_id,
                adjustment_id = %row.id,
                created_by = %actor.user_id(),
                "Adjustment created"
            );
            (StatusCode::CREATED, Json(adjustment_response(row))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// POST `.../adjustments/{adjustment_id}/approve` - Approve and post.
async fn approve_adjustment(
    State(state): State<AppState>,
    actor: ActorContext,
    Path((landlord_id, adjustment_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let repo = AdjustmentRepository::new((*state.db).clone());

    match repo
        .approve_adjustment(landlord_id, adjustment_id, actor.user_id())
        .await
    {
        Ok(row) => {
            info!(
                landlord_id = %landlord_id,
                adjustment_id = %adjustment_id,
                journal_entry_id = ?row.journal_entry_id,
                approved_by = %actor.user_id(),
                "Adjustment approved"
            );
            (StatusCode::OK, Json(adjustment_response(row))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// POST `.../adjustments/{adjustment_id}/reject` - Reject.
async fn reject_adjustment(
    State(state): State<AppState>,
    actor: ActorContext,
    Path((landlord_id, adjustment_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<RejectRequest>,
) -> impl IntoResponse {
    if payload.reason.trim().is_empty() {
        return bad_request("missing_reason", "A rejection reason is required");
    }

    let repo = AdjustmentRepository::new((*state.db).clone());
    match repo
        .reject_adjustment(landlord_id, adjustment_id, payload.reason)
        .await
    {
        Ok(row) => {
            info!(
                landlord_id = %landlord_id,
                adjustment_id = %adjustment_id,
                rejected_by = %actor.user_id(),
                "Adjustment rejected"
            );
            (StatusCode::OK, Json(adjustment_response(row))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// GET `.../adjustments/{adjustment_id}` - Get one.
async fn get_adjustment(
    State(state): State<AppState>,
    _actor: ActorContext,
    Path((landlord_id, adjustment_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let repo = AdjustmentRepository::new((*state.db).clone());

    match repo.get_adjustment(landlord_id, adjustment_id).await {
        Ok(row) => (StatusCode::OK, Json(adjustment_response(row))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET `/landlords/{landlord_id}/adjustments` - List.
async fn list_adjustments(
    State(state): State<AppState>,
    _actor: ActorContext,
    Path(landlord_id): Path<Uuid>,
    Query(query): Query<ListAdjustmentsQuery>,
) -> impl IntoResponse {
    let status = match query.status.as_deref() {
        Some(raw) => match AdjustmentStatus::from_str(raw) {
            Ok(s) => Some(s),
            Err(_) => return bad_request("invalid_status", "Unknown adjustment status"),
        },
        None => None,
    };

    let repo = AdjustmentRepository::new((*state.db).clone());
    match repo.list_adjustments(landlord_id, status).await {
        Ok(rows) => {
            let items: Vec<AdjustmentResponse> =
                rows.into_iter().map(adjustment_response).collect();
            (StatusCode::OK, Json(json!({ "adjustments": items }))).into_response()
        }
        Err(e) => internal_error(&e),
    }
}
