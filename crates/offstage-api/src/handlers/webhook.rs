use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use offstage_core::AppError;
use offstage_encoder::EncodeCallback;
use offstage_transcode::CallbackOutcome;

use crate::auth::signature::{verify_signature, SIGNATURE_HEADER};
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

fn outcome_label(outcome: CallbackOutcome) -> &'static str {
    match outcome {
        CallbackOutcome::Completed => "completed",
        CallbackOutcome::Failed => "failed",
        CallbackOutcome::Stale => "ignored",
    }
}

/// Ingress for encoding-worker completion callbacks
///
/// Authenticates with the body signature rather than the service bearer key.
/// The signature is checked over the raw bytes before the payload is parsed.
#[utoipa::path(
    post,
    path = "/api/v0/webhooks/transcoding",
    tag = "webhooks",
    request_body(content = String, content_type = "application/json"),
    responses(
        (status = 200, description = "Callback processed (or ignored as stale)"),
        (status = 400, description = "Malformed callback payload", body = ErrorResponse),
        (status = 401, description = "Missing or invalid signature", body = ErrorResponse),
        (status = 404, description = "Callback matches no known job", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, headers, body))]
pub async fn transcoding_callback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, HttpAppError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            AppError::Unauthorized("Missing X-Encoder-Signature header".to_string())
        })?;

    if !verify_signature(&state.config.webhook_secret, &body, signature) {
        tracing::warn!("Rejected callback with invalid signature");
        return Err(AppError::Unauthorized("Invalid webhook signature".to_string()).into());
    }

    let callback: EncodeCallback = serde_json::from_slice(&body)
        .map_err(|e| AppError::InvalidInput(format!("Malformed callback payload: {}", e)))?;

    let outcome = state.orchestrator.handle_callback(&callback).await?;

    Ok(Json(serde_json::json!({
        "outcome": outcome_label(outcome)
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_labels() {
        assert_eq!(outcome_label(CallbackOutcome::Completed), "completed");
        assert_eq!(outcome_label(CallbackOutcome::Failed), "failed");
        assert_eq!(outcome_label(CallbackOutcome::Stale), "ignored");
    }
}
