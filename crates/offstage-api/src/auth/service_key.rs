//! Bearer-key authentication for service-to-service calls.
//!
//! The media endpoints are called by the main application, not by browsers;
//! a single shared key gates them. The webhook ingress is NOT behind this
//! layer, it authenticates with the callback signature instead.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use subtle::ConstantTimeEq;

use crate::error::ErrorResponse;

#[derive(Clone)]
pub struct ServiceAuthState {
    /// `None` disables bearer auth (local development only; `Config::validate`
    /// rejects this in production).
    pub api_key: Option<String>,
}

/// Constant-time equality on key material.
fn keys_match(presented: &str, expected: &str) -> bool {
    presented.as_bytes().ct_eq(expected.as_bytes()).into()
}

pub async fn service_auth_middleware(
    State(auth): State<Arc<ServiceAuthState>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = auth.api_key.as_deref() else {
        return next.run(request).await;
    };

    let presented = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match presented {
        Some(key) if keys_match(key, expected) => next.run(request).await,
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new(
                "Missing or invalid API key",
                "UNAUTHORIZED",
            )),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_match() {
        assert!(keys_match("secret-key", "secret-key"));
        assert!(!keys_match("secret-key", "secret-kez"));
        assert!(!keys_match("secret", "secret-key"));
        assert!(!keys_match("", "secret-key"));
    }
}
