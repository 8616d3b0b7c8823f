use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use offstage_core::models::TranscodeStatusResponse;
use offstage_storage::derive_output_paths;

use crate::auth::OwnerContext;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct TriggerTranscodeRequest {
    /// Encoding job priority; lower is more urgent. Defaults to the value on
    /// the media item.
    #[serde(default)]
    pub priority: Option<i32>,
}

/// Submit an encoding job for an uploaded media item
#[utoipa::path(
    post,
    path = "/api/v0/media/{id}/transcode",
    tag = "transcode",
    params(
        ("id" = Uuid, Path, description = "Media ID")
    ),
    request_body = TriggerTranscodeRequest,
    responses(
        (status = 202, description = "Job submitted", body = TranscodeStatusResponse),
        (status = 403, description = "Media not owned by caller", body = ErrorResponse),
        (status = 404, description = "Media not found", body = ErrorResponse),
        (status = 409, description = "Media is not in the uploaded state", body = ErrorResponse),
        (status = 502, description = "Encoding worker rejected the submission", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, body))]
pub async fn trigger_transcode(
    State(state): State<Arc<AppState>>,
    owner_ctx: OwnerContext,
    Path(id): Path<Uuid>,
    ValidatedJson(body): ValidatedJson<TriggerTranscodeRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let item = state
        .orchestrator
        .trigger_job(id, owner_ctx.owner_id, body.priority)
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(TranscodeStatusResponse::from(item)),
    ))
}

/// Retry a failed transcode
#[utoipa::path(
    post,
    path = "/api/v0/media/{id}/transcode/retry",
    tag = "transcode",
    params(
        ("id" = Uuid, Path, description = "Media ID")
    ),
    responses(
        (status = 202, description = "Retry job submitted", body = TranscodeStatusResponse),
        (status = 404, description = "Media not found", body = ErrorResponse),
        (status = 409, description = "Media is not failed, or the attempt cap is reached", body = ErrorResponse),
        (status = 502, description = "Encoding worker rejected the submission", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn retry_transcode(
    State(state): State<Arc<AppState>>,
    owner_ctx: OwnerContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let item = state
        .orchestrator
        .retry_transcoding(id, owner_ctx.owner_id)
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(TranscodeStatusResponse::from(item)),
    ))
}

/// Get the transcoding status of a media item
#[utoipa::path(
    get,
    path = "/api/v0/media/{id}/transcode",
    tag = "transcode",
    params(
        ("id" = Uuid, Path, description = "Media ID")
    ),
    responses(
        (status = 200, description = "Current status", body = TranscodeStatusResponse),
        (status = 404, description = "Media not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn get_transcode_status(
    State(state): State<Arc<AppState>>,
    owner_ctx: OwnerContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let status = state
        .orchestrator
        .get_status(id, owner_ctx.owner_id)
        .await?;

    Ok(Json(status))
}

/// Get the canonical output storage paths for a media item
#[utoipa::path(
    get,
    path = "/api/v0/media/{id}/outputs",
    tag = "transcode",
    params(
        ("id" = Uuid, Path, description = "Media ID")
    ),
    responses(
        (status = 200, description = "Derived output paths", body = offstage_storage::OutputPaths),
        (status = 404, description = "Media not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn get_output_paths(
    State(state): State<Arc<AppState>>,
    owner_ctx: OwnerContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let item = state.orchestrator.get_media(id, owner_ctx.owner_id).await?;

    Ok(Json(derive_output_paths(item.owner_id, item.id, item.kind)))
}
