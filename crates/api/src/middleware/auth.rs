//! Actor identity extraction.
//!
//! Authentication and authorization live in the gateway in front of this
//! service. The gateway forwards the acting user's id in the `X-Actor-Id`
//! header; every write path records it as `created_by` / `approved_by`.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use serde_json::json;
use uuid::Uuid;

/// Header carrying the acting user's id, set by the gateway.
pub const ACTOR_HEADER: &str = "x-actor-id";

/// Extractor for the acting user's identity.
///
/// Use this in handlers that attribute writes to a user:
///
/// ```ignore
/// async fn handler(actor: ActorContext) -> impl IntoResponse {
///     let user_id = actor.user_id();
///     // ...
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ActorContext(pub Uuid);

impl ActorContext {
    /// Returns the acting user's id.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.0
    }
}

impl<S> FromRequestParts<S> for ActorContext
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|h| h.to_str().ok());

        let Some(raw) = header else {
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "missing_actor",
                    "message": "X-Actor-Id header is required"
                })),
            ));
        };

        raw.parse::<Uuid>().map(ActorContext).map_err(|_| {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "invalid_actor",
                    "message": "X-Actor-Id must be a UUID"
                })),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> Result<ActorContext, StatusCode> {
        let (mut parts, ()) = request.into_parts();
        ActorContext::from_request_parts(&mut parts, &())
            .await
            .map_err(|(status, _)| status)
    }

    #[tokio::test]
    async fn test_extracts_actor_id() {
        let id = Uuid::now_v7();
        let request = Request::builder()
            .header("X-Actor-Id", id.to_string())
            .body(())
            .unwrap();

        let actor = extract(request).await.unwrap();
        assert_eq!(actor.user_id(), id);
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let request = Request::builder().body(()).unwrap();
        assert_eq!(extract(request).await.unwrap_err(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_id_is_unauthorized() {
        let request = Request::builder()
            .header("X-Actor-Id", "not-a-uuid")
            .body(())
            .unwrap();
        assert_eq!(extract(request).await.unwrap_err(), StatusCode::UNAUTHORIZED);
    }
}
