//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use offstage_core::models;

pub fn openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Offstage API",
        version = "0.1.0",
        description = "Creator media backend (v0): transcoding orchestration for uploaded video and audio. Endpoints are versioned under /api/v0/."
    ),
    paths(
        handlers::transcode::trigger_transcode,
        handlers::transcode::retry_transcode,
        handlers::transcode::get_transcode_status,
        handlers::transcode::get_output_paths,
        handlers::webhook::transcoding_callback,
    ),
    components(schemas(
        error::ErrorResponse,
        handlers::transcode::TriggerTranscodeRequest,
        models::MediaKind,
        models::MediaStatus,
        models::TranscodeStatusResponse,
        offstage_storage::OutputPaths,
    )),
    tags(
        (name = "transcode", description = "Transcoding lifecycle operations"),
        (name = "webhooks", description = "Encoding worker callback ingress")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_covers_every_route() {
        let spec = openapi_spec();
        let paths: Vec<&str> = spec.paths.paths.keys().map(String::as_str).collect();
        assert!(paths.contains(&"/api/v0/media/{id}/transcode"));
        assert!(paths.contains(&"/api/v0/media/{id}/transcode/retry"));
        assert!(paths.contains(&"/api/v0/media/{id}/outputs"));
        assert!(paths.contains(&"/api/v0/webhooks/transcoding"));
    }
}
