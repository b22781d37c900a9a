//! Error-to-response mapping.
//!
//! Ledger rule violations carry their own error codes and HTTP statuses;
//! everything else collapses to opaque responses so internals never leak.

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use serde_json::json;
use tracing::error;

use rentra_core::ledger::LedgerError;
use rentra_db::repositories::account::AccountError;
use rentra_db::repositories::adjustment::AdjustmentError;
use rentra_db::repositories::balance::BalanceError;
use rentra_db::repositories::journal::JournalError;
use rentra_db::repositories::reconciliation::ReconciliationError;

/// Builds an error response body in the standard shape.
pub fn error_response(status: StatusCode, error: &str, message: &str) -> Response {
    (
        status,
        Json(json!({ "error": error, "message": message })),
    )
        .into_response()
}

/// Maps a ledger rule violation to its declared status and code.
pub fn ledger_error(e: &LedgerError) -> Response {
    if e.is_fatal() {
        error!(error = %e, code = e.error_code(), "Ledger invariant breach");
    }
    let status = StatusCode::from_u16(e.http_status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    error_response(status, e.error_code(), &e.to_string())
}

/// Opaque 500 for unexpected database failures.
pub fn internal_error(e: &impl std::fmt::Display) -> Response {
    error!(error = %e, "Internal error");
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "An error occurred",
    )
}

/// 404 with a resource label.
pub fn not_found(resource: &str) -> Response {
    error_response(
        StatusCode::NOT_FOUND,
        "not_found",
        &format!("{resource} not found"),
    )
}

/// 400 for request-shape problems caught before the domain layer.
pub fn bad_request(error: &str, message: &str) -> Response {
    error_response(StatusCode::BAD_REQUEST, error, message)
}

/// Conversion from repository errors to HTTP responses.
pub trait ApiError {
    /// Converts this error into an HTTP response.
    fn into_response(self) -> Response;
}

macro_rules! impl_api_error {
    ($err:ty, $resource:literal) => {
        impl ApiError for $err {
            fn into_response(self) -> Response {
                match self {
                    Self::Ledger(e) => ledger_error(&e),
                    Self::Database(e) => internal_error(&e),
                    _ => not_found($resource),
                }
            }
        }
    };
}

impl_api_error!(AccountError, "Account");
impl_api_error!(JournalError, "Journal entry");
impl_api_error!(BalanceError, "Account");
impl_api_error!(AdjustmentError, "Adjustment");

impl ApiError for ReconciliationError {
    fn into_response(self) -> Response {
        match self {
            Self::Ledger(e) => ledger_error(&e),
            Self::Database(e) => internal_error(&e),
            Self::AccountNotFound(_) => not_found("Account"),
            Self::NotFound(_) => not_found("Reconciliation"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ledger_error_status_passthrough() {
        let response = ledger_error(&LedgerError::EmptyEntry);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = ledger_error(&LedgerError::UnbalancedEntry {
            currency: rentra_shared::types::Currency::Ghs,
            debit: dec!(100),
            credit: dec!(50),
        });
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = ledger_error(&LedgerError::EntryAlreadyPosted);
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_not_found_shape() {
        let response = not_found("Account");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
