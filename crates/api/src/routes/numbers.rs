//! Document numbering routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use serde::Serialize;
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

use crate::error::{bad_request, internal_error};
use crate::middleware::ActorContext;
use crate::AppState;
use rentra_core::numbering::DocumentSeries;
use rentra_db::repositories::numbering::NumberingRepository;

/// Creates the numbering routes.
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/landlords/{landlord_id}/numbers/{series}",
        post(next_number),
    )
}

/// Response for an allocated document number.
#[derive(Debug, Serialize)]
pub struct NumberResponse {
    /// Series the number belongs to.
    pub series: &'static str,
    /// The formatted document number.
    pub number: String,
}

/// POST `/landlords/{landlord_id}/numbers/{series}` - Allocate the next number.
///
/// Allocation consumes the number even if the caller discards it; gaps are
/// acceptable, duplicates are not.
async fn next_number(
    State(state): State<AppState>,
    actor: ActorContext,
    Path((landlord_id, series)): Path<(Uuid, String)>,
) -> impl IntoResponse {
    let Ok(series) = DocumentSeries::from_str(&series) else {
        return bad_request("invalid_series", "Unknown document series");
    };

    let repo = NumberingRepository::new((*state.db).clone());
    match repo.next_number(landlord_id, series).await {
        Ok(number) => {
            info!(
                landlord_id = %landlord_id,
                series = series.as_str(),
                number = %number,
                requested_by = %actor.user_id(),
                "Document number allocated"
            );
            (
                StatusCode::CREATED,
                Json(NumberResponse {
                    series: series.as_str(),
                    number,
                }),
            )
                .into_response()
        }
        Err(e) => internal_error(&e),
    }
}
