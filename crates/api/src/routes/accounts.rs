//! Chart-of-accounts routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

use crate::error::{bad_request, internal_error, ApiError};
use crate::middleware::ActorContext;
use crate::AppState;
use rentra_db::entities::{chart_of_accounts, sea_orm_active_enums};
use rentra_db::repositories::account::{
    AccountFilter, AccountRepository, CreateAccountInput, UpdateAccountInput,
};
use rentra_shared::types::Currency;

/// Creates the chart-of-accounts routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/landlords/{landlord_id}/accounts", get(list_accounts))
        .route("/landlords/{landlord_id}/accounts", post(create_account))
        .route(
            "/landlords/{landlord_id}/accounts/{account_id}",
            get(get_account),
        )
        .route(
            "/landlords/{landlord_id}/accounts/{account_id}",
            patch(update_account),
        )
        .route(
            "/landlords/{landlord_id}/accounts/{account_id}/deactivate",
            post(deactivate_account),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing accounts.
#[derive(Debug, Deserialize)]
pub struct ListAccountsQuery {
    /// Filter by account type.
    #[serde(rename = "type")]
    pub account_type: Option<String>,
    /// Filter by active flag.
    pub active: Option<bool>,
    /// Filter by parent account.
    pub parent: Option<Uuid>,
}

/// Request body for creating an account.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    /// Account code, unique per landlord.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Account type.
    #[serde(rename = "type")]
    pub account_type: String,
    /// Normal balance: "debit" or "credit".
    pub normal_balance: String,
    /// Contra flag.
    #[serde(default)]
    pub is_contra: bool,
    /// Optional parent account ID.
    pub parent_id: Option<Uuid>,
    /// ISO 4217 currency code.
    pub currency: String,
}

/// Request body for updating an account.
#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New parent account ID; explicit null detaches.
    #[serde(default, deserialize_with = "double_option")]
    pub parent_id: Option<Option<Uuid>>,
    /// New account type.
    #[serde(rename = "type")]
    pub account_type: Option<String>,
    /// New normal balance.
    pub normal_balance: Option<String>,
}

/// Response for an account.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    /// Account ID.
    pub id: Uuid,
    /// Account code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Account type.
    #[serde(rename = "type")]
    pub account_type: &'static str,
    /// Normal balance.
    pub normal_balance: &'static str,
    /// Contra flag.
    pub is_contra: bool,
    /// Parent account ID.
    pub parent_id: Option<Uuid>,
    /// Currency code.
    pub currency: String,
    /// Active flag.
    pub is_active: bool,
    /// System account flag.
    pub is_system_account: bool,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

/// Distinguishes an absent field (no change) from an explicit null (clear).
fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<Uuid>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

fn account_response(account: chart_of_accounts::Model) -> AccountResponse {
    AccountResponse {
        id: account.id,
        code: account.code,
        name: account.name,
        description: account.description,
        account_type: account_type_to_string(&account.account_type),
        normal_balance: normal_balance_to_string(&account.normal_balance),
        is_contra: account.is_contra,
        parent_id: account.parent_id,
        currency: account.currency,
        is_active: account.is_active,
        is_system_account: account.is_system_account,
        created_at: account.created_at.to_rfc3339(),
        updated_at: account.updated_at.to_rfc3339(),
    }
}

fn string_to_account_type(s: &str) -> Option<rentra_core::ledger::AccountType> {
    use rentra_core::ledger::AccountType;
    match s {
        "asset" => Some(AccountType::Asset),
        "liability" => Some(AccountType::Liability),
        "equity" => Some(AccountType::Equity),
        "revenue" => Some(AccountType::Revenue),
        "expense" => Some(AccountType::Expense),
        _ => None,
    }
}

fn account_type_to_string(t: &sea_orm_active_enums::AccountType) -> &'static str {
    match t {
        sea_orm_active_enums::AccountType::Asset => "asset",
        sea_orm_active_enums::AccountType::Liability => "liability",
        sea_orm_active_enums::AccountType::Equity => "equity",
        sea_orm_active_enums::AccountType::Revenue => "revenue",
        sea_orm_active_enums::AccountType::Expense => "expense",
    }
}

fn string_to_normal_balance(s: &str) -> Option<rentra_core::ledger::NormalBalance> {
    use rentra_core::ledger::NormalBalance;
    match s {
        "debit" => Some(NormalBalance::Debit),
        "credit" => Some(NormalBalance::Credit),
        _ => None,
    }
}

fn normal_balance_to_string(n: &sea_orm_active_enums::NormalBalance) -> &'static str {
    match n {
        sea_orm_active_enums::NormalBalance::Debit => "debit",
        sea_orm_active_enums::NormalBalance::Credit => "credit",
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/landlords/{landlord_id}/accounts` - Create an account.
async fn create_account(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(landlord_id): Path<Uuid>,
    Json(payload): Json<CreateAccountRequest>,
) -> impl IntoResponse {
    let Some(account_type) = string_to_account_type(&payload.account_type) else {
        return bad_request("invalid_account_type", "Unknown account type");
    };
    let Some(normal_balance) = string_to_normal_balance(&payload.normal_balance) else {
        return bad_request("invalid_normal_balance", "Normal balance must be 'debit' or 'credit'");
    };
    let Ok(currency) = Currency::from_str(&payload.currency) else {
        return bad_request("invalid_currency", "Unknown currency code");
    };
    if payload.code.trim().is_empty() {
        return bad_request("invalid_code", "Account code is required");
    }

    let repo = AccountRepository::new((*state.db).clone());
    let input = CreateAccountInput {
        landlord_id,
        code: payload.code,
        name: payload.name,
        description: payload.description,
        account_type,
        normal_balance,
        is_contra: payload.is_contra,
        parent_id: payload.parent_id,
        currency,
    };

    match repo.create_account(input).await {
        Ok(account) => {
            info!(
                landlord_id = %landlord_id,
                account_id = %account.id,
                created_by = %actor.user_id(),
                "Account created"
            );
            (StatusCode::CREATED, Json(account_response(account))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// GET `/landlords/{landlord_id}/accounts` - List accounts.
async fn list_accounts(
    State(state): State<AppState>,
    _actor: ActorContext,
    Path(landlord_id): Path<Uuid>,
    Query(query): Query<ListAccountsQuery>,
) -> impl IntoResponse {
    let repo = AccountRepository::new((*state.db).clone());
    let filter = AccountFilter {
        account_type: query.account_type.as_deref().and_then(string_to_account_type),
        is_active: query.active,
        parent_id: query.parent,
    };

    match repo.list_accounts(landlord_id, filter).await {
        Ok(accounts) => {
            let items: Vec<AccountResponse> =
                accounts.into_iter().map(account_response).collect();
            (StatusCode::OK, Json(json!({ "accounts": items }))).into_response()
        }
        Err(e) => internal_error(&e),
    }
}

/// GET `/landlords/{landlord_id}/accounts/{account_id}` - Get an account.
async fn get_account(
    State(state): State<AppState>,
    _actor: ActorContext,
    Path((landlord_id, account_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let repo = AccountRepository::new((*state.db).clone());

    match repo.get_account(landlord_id, account_id).await {
        Ok(account) => (StatusCode::OK, Json(account_response(account))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// PATCH `/landlords/{landlord_id}/accounts/{account_id}` - Update an account.
async fn update_account(
    State(state): State<AppState>,
    _actor: ActorContext,
    Path((landlord_id, account_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateAccountRequest>,
) -> impl IntoResponse {
    let account_type = match payload.account_type.as_deref() {
        Some(raw) => match string_to_account_type(raw) {
            Some(t) => Some(t),
            None => return bad_request("invalid_account_type", "Unknown account type"),
        },
        None => None,
    };
    let normal_balance = match payload.normal_balance.as_deref() {
        Some(raw) => match string_to_normal_balance(raw) {
            Some(n) => Some(n),
            None => {
                return bad_request(
                    "invalid_normal_balance",
                    "Normal balance must be 'debit' or 'credit'",
                );
            }
        },
        None => None,
    };

    let repo = AccountRepository::new((*state.db).clone());
    let input = UpdateAccountInput {
        name: payload.name,
        description: payload.description,
        parent_id: payload.parent_id,
        account_type,
        normal_balance,
    };

    match repo.update_account(landlord_id, account_id, input).await {
        Ok(account) => (StatusCode::OK, Json(account_response(account))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST `/landlords/{landlord_id}/accounts/{account_id}/deactivate` - Deactivate.
async fn deactivate_account(
    State(state): State<AppState>,
    actor: ActorContext,
    Path((landlord_id, account_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let repo = AccountRepository::new((*state.db).clone());

    match repo.deactivate_account(landlord_id, account_id).await {
        Ok(account) => {
            info!(
                landlord_id = %landlord_id,
                account_id = %account_id,
                deactivated_by = %actor.user_id(),
                "Account deactivated"
            );
            (StatusCode::OK, Json(account_response(account))).into_response()
        }
        Err(e) => e.into_response(),
    }
}
