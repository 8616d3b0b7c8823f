//! Caller identity.
//!
//! This service sits behind the main application, which authenticates end
//! users and forwards the acting creator's id in the `X-Owner-Id` header.
//! Ownership itself is enforced per-row by the orchestrator; the header only
//! states who is asking.

use axum::extract::FromRequestParts;
use axum::http::{request::Parts, StatusCode};
use axum::Json;
use uuid::Uuid;

use crate::error::ErrorResponse;

pub const OWNER_ID_HEADER: &str = "x-owner-id";

/// Acting creator, extracted from the `X-Owner-Id` header.
#[derive(Debug, Clone, Copy)]
pub struct OwnerContext {
    pub owner_id: Uuid,
}

fn rejection(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::new(message, "MISSING_OWNER_CONTEXT")),
    )
}

impl<S> FromRequestParts<S> for OwnerContext
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(OWNER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| rejection("Missing X-Owner-Id header"))?;

        let owner_id = Uuid::parse_str(raw)
            .map_err(|_| rejection("X-Owner-Id header is not a valid UUID"))?;

        Ok(OwnerContext { owner_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::FromRequestParts;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> Result<OwnerContext, StatusCode> {
        let (mut parts, _) = request.into_parts();
        OwnerContext::from_request_parts(&mut parts, &())
            .await
            .map_err(|(status, _)| status)
    }

    #[tokio::test]
    async fn test_extracts_owner_id() {
        let owner_id = Uuid::new_v4();
        let request = Request::builder()
            .header("X-Owner-Id", owner_id.to_string())
            .body(())
            .unwrap();

        let ctx = extract(request).await.expect("extract");
        assert_eq!(ctx.owner_id, owner_id);
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let request = Request::builder().body(()).unwrap();
        assert_eq!(extract(request).await.unwrap_err(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_uuid_is_unauthorized() {
        let request = Request::builder()
            .header("X-Owner-Id", "not-a-uuid")
            .body(())
            .unwrap();
        assert_eq!(extract(request).await.unwrap_err(), StatusCode::UNAUTHORIZED);
    }
}
