//! Journal entry routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
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
use rentra_core::ledger::{
    EntryLineInput, EntryType, JournalStatus, PostEntryInput, ReferenceType,
};
use rentra_db::entities::sea_orm_active_enums;
use rentra_db::repositories::journal::{EntryFilter, EntryWithLines, JournalRepository};
use rentra_shared::types::{Currency, PageRequest};

/// Creates the journal entry routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/landlords/{landlord_id}/journal-entries",
            get(list_entries),
        )
        .route(
            "/landlords/{landlord_id}/journal-entries",
            post(post_entry),
        )
        .route(
            "/landlords/{landlord_id}/journal-entries/drafts",
            post(create_draft),
        )
        .route(
            "/landlords/{landlord_id}/journal-entries/{entry_id}",
            get(get_entry),
        )
        .route(
            "/landlords/{landlord_id}/journal-entries/{entry_id}",
            delete(void_entry),
        )
        .route(
            "/landlords/{landlord_id}/journal-entries/{entry_id}/post",
            post(post_draft),
        )
        .route(
            "/landlords/{landlord_id}/journal-entries/{entry_id}/reverse",
            post(reverse_entry),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing journal entries.
#[derive(Debug, Deserialize)]
pub struct ListEntriesQuery {
    /// Filter by status.
    pub status: Option<String>,
    /// Filter by date range start (YYYY-MM-DD).
    pub from: Option<NaiveDate>,
    /// Filter by date range end (YYYY-MM-DD).
    pub to: Option<NaiveDate>,
    /// Filter by referenced business object ID.
    pub reference: Option<Uuid>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

/// Request body for creating a journal entry.
#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    /// Effective date (YYYY-MM-DD).
    pub entry_date: NaiveDate,
    /// Description.
    pub description: String,
    /// Optional reference type.
    pub reference_type: Option<String>,
    /// Optional reference ID.
    pub reference_id: Option<Uuid>,
    /// Ledger lines.
    pub lines: Vec<CreateLineRequest>,
}

/// Request body for a single ledger line.
#[derive(Debug, Deserialize)]
pub struct CreateLineRequest {
    /// Account ID.
    pub account_id: Uuid,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Amount (positive).
    pub amount: String,
    /// Entry type: "debit" or "credit".
    pub entry_type: String,
    /// Optional memo.
    pub memo: Option<String>,
    /// Optional property tag.
    pub property_id: Option<Uuid>,
    /// Optional unit tag.
    pub unit_id: Option<Uuid>,
    /// Optional renter tag.
    pub renter_id: Option<Uuid>,
}

/// Request body for reversing an entry.
#[derive(Debug, Deserialize)]
pub struct ReverseEntryRequest {
    /// Why the entry is being reversed.
    pub reason: String,
}

/// Response for a journal entry with lines.
#[derive(Debug, Serialize)]
pub struct EntryResponse {
    /// Entry ID.
    pub id: Uuid,
    /// Assigned entry number, absent for drafts.
    pub entry_number: Option<String>,
    /// Effective date.
    pub entry_date: String,
    /// Description.
    pub description: String,
    /// Status.
    pub status: &'static str,
    /// Reference type.
    pub reference_type: Option<&'static str>,
    /// Reference ID.
    pub reference_id: Option<Uuid>,
    /// Entry this one reverses, if any.
    pub reversal_of: Option<Uuid>,
    /// Created by user ID.
    pub created_by: Uuid,
    /// Posted at timestamp.
    pub posted_at: Option<String>,
    /// Created at timestamp.
    pub created_at: String,
    /// Ledger lines.
    pub lines: Vec<LineResponse>,
}

/// Response for a ledger line.
#[derive(Debug, Serialize)]
pub struct LineResponse {
    /// Line ID.
    pub id: Uuid,
    /// Account ID.
    pub account_id: Uuid,
    /// Debit amount.
    pub debit: String,
    /// Credit amount.
    pub credit: String,
    /// Currency code.
    pub currency: String,
    /// Memo.
    pub memo: Option<String>,
    /// Property tag.
    pub property_id: Option<Uuid>,
    /// Unit tag.
    pub unit_id: Option<Uuid>,
    /// Renter tag.
    pub renter_id: Option<Uuid>,
}

/// Response for a list item (without lines).
#[derive(Debug, Serialize)]
pub struct EntryListItem {
    /// Entry ID.
    pub id: Uuid,
    /// Entry number.
    pub entry_number: Option<String>,
    /// Effective date.
    pub entry_date: String,
    /// Description.
    pub description: String,
    /// Status.
    pub status: &'static str,
    /// Created at timestamp.
    pub created_at: String,
}

fn entry_response(result: EntryWithLines) -> EntryResponse {
    EntryResponse {
        id: result.entry.id,
        entry_number: result.entry.entry_number,
        entry_date: result.entry.entry_date.to_string(),
        description: result.entry.description,
        status: status_to_string(&result.entry.status),
        reference_type: result.entry.reference_type.as_ref().map(reference_to_string),
        reference_id: result.entry.reference_id,
        reversal_of: result.entry.reversal_of,
        created_by: result.entry.created_by,
        posted_at: result.entry.posted_at.map(|t| t.to_rfc3339()),
        created_at: result.entry.created_at.to_rfc3339(),
        lines: result
            .lines
            .into_iter()
            .map(|line| LineResponse {
                id: line.id,
                account_id: line.account_id,
                debit: line.debit.to_string(),
                credit: line.credit.to_string(),
                currency: line.currency,
                memo: line.memo,
                property_id: line.property_id,
                unit_id: line.unit_id,
                renter_id: line.renter_id,
            })
            .collect(),
    }
}

fn string_to_status(s: &str) -> Option<JournalStatus> {
    match s {
        "pending" => Some(JournalStatus::Pending),
        "posted" => Some(JournalStatus::Posted),
        "reversed" => Some(JournalStatus::Reversed),
        _ => None,
    }
}

fn status_to_string(s: &sea_orm_active_enums::JournalStatus) -> &'static str {
    match s {
        sea_orm_active_enums::JournalStatus::Pending => "pending",
        sea_orm_active_enums::JournalStatus::Posted => "posted",
        sea_orm_active_enums::JournalStatus::Reversed => "reversed",
    }
}

fn string_to_reference(s: &str) -> Option<ReferenceType> {
    match s {
        "invoice" => Some(ReferenceType::Invoice),
        "payment" => Some(ReferenceType::Payment),
        "adjustment" => Some(ReferenceType::Adjustment),
        "reconciliation" => Some(ReferenceType::Reconciliation),
        "reversal" => Some(ReferenceType::Reversal),
        "manual" => Some(ReferenceType::Manual),
        _ => None,
    }
}

fn reference_to_string(r: &sea_orm_active_enums::ReferenceType) -> &'static str {
    match r {
        sea_orm_active_enums::ReferenceType::Invoice => "invoice",
        sea_orm_active_enums::ReferenceType::Payment => "payment",
        sea_orm_active_enums::ReferenceType::Adjustment => "adjustment",
        sea_orm_active_enums::ReferenceType::Reconciliation => "reconciliation",
        sea_orm_active_enums::ReferenceType::Reversal => "reversal",
        sea_orm_active_enums::ReferenceType::Manual => "manual",
    }
}

/// Parses the request body into posting input, or an error response.
fn parse_entry_request(
    landlord_id: Uuid,
    created_by: Uuid,
    payload: CreateEntryRequest,
) -> Result<PostEntryInput, axum::response::Response> {
    let reference = match (payload.reference_type.as_deref(), payload.reference_id) {
        (Some(raw), Some(id)) => match string_to_reference(raw) {
            Some(kind) => Some((kind, id)),
            None => return Err(bad_request("invalid_reference_type", "Unknown reference type")),
        },
        (None, None) => None,
        _ => {
            return Err(bad_request(
                "invalid_reference",
                "reference_type and reference_id must be given together",
            ));
        }
    };

    let mut lines = Vec::with_capacity(payload.lines.len());
    for line in payload.lines {
        let Ok(currency) = Currency::from_str(&line.currency) else {
            return Err(bad_request("invalid_currency", "Unknown currency code"));
        };
        let amount = match Decimal::from_str(&line.amount) {
            Ok(a) => a,
            Err(_) => return Err(bad_request("invalid_amount", "Invalid amount format")),
        };
        let entry_type = match line.entry_type.as_str() {
            "debit" => EntryType::Debit,
            "credit" => EntryType::Credit,
            _ => {
                return Err(bad_request(
                    "invalid_entry_type",
                    "Entry type must be 'debit' or 'credit'",
                ));
            }
        };

        lines.push(EntryLineInput {
            account_id: line.account_id,
            currency,
            amount,
            entry_type,
            memo: line.memo,
            property_id: line.property_id,
            unit_id: line.unit_id,
            renter_id: line.renter_id,
        });
    }

    Ok(PostEntryInput {
        landlord_id,
        entry_date: payload.entry_date,
        description: payload.description,
        reference,
        lines,
        created_by,
    })
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/landlords/{landlord_id}/journal-entries` - Validate and post an entry.
async fn post_entry(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(landlord_id): Path<Uuid>,
    Json(payload): Json<CreateEntryRequest>,
) -> impl IntoResponse {
    let input = match parse_entry_request(landlord_id, actor.user_id(), payload) {
        Ok(input) => input,
        Err(response) => return response,
    };

    let repo = JournalRepository::new((*state.db).clone());
    match repo.post_entry(input).await {
        Ok(result) => {
            info!(
                landlord_id = %landlord_id,
                entry_id = %result.entry.id,
                entry_number = result.entry.entry_number.as_deref().unwrap_or(""),
                "Journal entry posted"
            );
            (StatusCode::CREATED, Json(entry_response(result))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// POST `/landlords/{landlord_id}/journal-entries/drafts` - Create a draft.
async fn create_draft(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(landlord_id): Path<Uuid>,
    Json(payload): Json<CreateEntryRequest>,
) -> impl IntoResponse {
    let input = match parse_entry_request(landlord_id, actor.user_id(), payload) {
        Ok(input) => input,
        Err(response) => return response,
    };

    let repo = JournalRepository::new((*state.db).clone());
    match repo.create_draft(input).await {
        Ok(result) => (StatusCode::CREATED, Json(entry_response(result))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST `/landlords/{landlord_id}/journal-entries/{entry_id}/post` - Post a draft.
async fn post_draft(
    State(state): State<AppState>,
    actor: ActorContext,
    Path((landlord_id, entry_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let repo = JournalRepository::new((*state.db).clone());

    match repo.post_draft(landlord_id, entry_id, actor.user_id()).await {
        Ok(result) => {
            info!(
                landlord_id = %landlord_id,
                entry_id = %entry_id,
                entry_number = result.entry.entry_number.as_deref().unwrap_or(""),
                "Draft posted"
            );
            (StatusCode::OK, Json(entry_response(result))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// POST `/landlords/{landlord_id}/journal-entries/{entry_id}/reverse` - Reverse.
async fn reverse_entry(
    State(state): State<AppState>,
    actor: ActorContext,
    Path((landlord_id, entry_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ReverseEntryRequest>,
) -> impl IntoResponse {
    if payload.reason.trim().is_empty() {
        return bad_request("missing_reason", "A reversal reason is required");
    }

    let repo = JournalRepository::new((*state.db).clone());
    match repo
        .reverse_entry(landlord_id, entry_id, payload.reason, actor.user_id())
        .await
    {
        Ok(result) => {
            info!(
                landlord_id = %landlord_id,
                original_id = %entry_id,
                reversal_id = %result.entry.id,
                "Journal entry reversed"
            );
            (StatusCode::CREATED, Json(entry_response(result))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// DELETE `/landlords/{landlord_id}/journal-entries/{entry_id}` - Void a draft.
async fn void_entry(
    State(state): State<AppState>,
    actor: ActorContext,
    Path((landlord_id, entry_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let repo = JournalRepository::new((*state.db).clone());

    match repo.void_entry(landlord_id, entry_id).await {
        Ok(()) => {
            info!(
                landlord_id = %landlord_id,
                entry_id = %entry_id,
                voided_by = %actor.user_id(),
                "Draft voided"
            );
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// GET `/landlords/{landlord_id}/journal-entries/{entry_id}` - Get with lines.
async fn get_entry(
    State(state): State<AppState>,
    _actor: ActorContext,
    Path((landlord_id, entry_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let repo = JournalRepository::new((*state.db).clone());

    match repo.get_entry(landlord_id, entry_id).await {
        Ok(result) => (StatusCode::OK, Json(entry_response(result))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET `/landlords/{landlord_id}/journal-entries` - List entries.
async fn list_entries(
    State(state): State<AppState>,
    _actor: ActorContext,
    Path(landlord_id): Path<Uuid>,
    Query(query): Query<ListEntriesQuery>,
) -> impl IntoResponse {
    let repo = JournalRepository::new((*state.db).clone());
    let filter = EntryFilter {
        status: query.status.as_deref().and_then(string_to_status),
        date_from: query.from,
        date_to: query.to,
        reference_id: query.reference,
    };
    let defaults = PageRequest::default();
    let page = PageRequest {
        page: query.page.unwrap_or(defaults.page),
        per_page: query.per_page.unwrap_or(defaults.per_page).min(100),
    };

    match repo.list_entries(landlord_id, filter, page).await {
        Ok(result) => {
            let items: Vec<EntryListItem> = result
                .data
                .into_iter()
                .map(|e| EntryListItem {
                    id: e.id,
                    entry_number: e.entry_number,
                    entry_date: e.entry_date.to_string(),
                    description: e.description,
                    status: status_to_string(&e.status),
                    created_at: e.created_at.to_rfc3339(),
                })
                .collect();
            (
                StatusCode::OK,
                Json(json!({ "entries": items, "meta": result.meta })),
            )
                .into_response()
        }
        Err(e) => internal_error(&e),
    }
}
