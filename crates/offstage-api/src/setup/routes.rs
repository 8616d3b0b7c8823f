//! Route configuration and setup

use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use offstage_core::Config;

use crate::auth::service_key::{service_auth_middleware, ServiceAuthState};
use crate::handlers;
use crate::state::AppState;

/// Requests to this service are JSON control messages, never media payloads.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;
    let auth_state = Arc::new(ServiceAuthState {
        api_key: config.service_api_key.clone(),
    });

    // Public routes: health, docs, and the webhook ingress. The webhook
    // authenticates with the callback signature, not the bearer key.
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            "/api/v0/webhooks/transcoding",
            post(handlers::webhook::transcoding_callback),
        )
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::openapi_spec()) }),
        );

    // Protected routes (require the service API key)
    let protected_routes = media_routes().layer(axum::middleware::from_fn_with_state(
        auth_state,
        service_auth_middleware,
    ));

    let app = public_routes
        .merge(protected_routes)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

/// Media transcoding routes
fn media_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/v0/media/{id}/transcode",
            post(handlers::transcode::trigger_transcode)
                .get(handlers::transcode::get_transcode_status),
        )
        .route(
            "/api/v0/media/{id}/transcode/retry",
            post(handlers::transcode::retry_transcode),
        )
        .route(
            "/api/v0/media/{id}/outputs",
            get(handlers::transcode::get_output_paths),
        )
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins.contains(&"*".to_string()) {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins: Result<Vec<HeaderValue>, _> =
            config.cors_origins.iter().map(|o| o.parse()).collect();

        CorsLayer::new()
            .allow_origin(origins.unwrap_or_default())
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}
