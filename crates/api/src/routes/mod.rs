//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod accounts;
pub mod adjustments;
pub mod balances;
pub mod health;
pub mod journal_entries;
pub mod numbers;
pub mod reconciliations;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(accounts::routes())
        .merge(journal_entries::routes())
        .merge(balances::routes())
        .merge(reconciliations::routes())
        .merge(adjustments::routes())
        .merge(numbers::routes())
}
