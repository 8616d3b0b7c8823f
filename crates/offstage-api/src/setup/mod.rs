//! Application setup and initialization
//!
//! All initialization logic lives here instead of main.rs, for organization
//! and testability.

pub mod database;
pub mod routes;
pub mod server;

use std::sync::Arc;

use anyhow::Result;

use offstage_core::Config;
use offstage_db::MediaItemRepository;
use offstage_encoder::{EncoderClient, EncoderClientConfig};
use offstage_transcode::{SqlMediaStore, TranscodeConfig, TranscodeOrchestrator};

use crate::state::AppState;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry();

    tracing::info!(
        environment = %config.environment,
        "Configuration loaded and validated successfully"
    );

    let pool = database::setup_database(&config).await?;

    let media_items = MediaItemRepository::new(pool.clone());

    let encoder = EncoderClient::new(EncoderClientConfig::from_app_config(&config))?;
    let orchestrator = Arc::new(TranscodeOrchestrator::new(
        Arc::new(SqlMediaStore::new(media_items.clone())),
        Arc::new(encoder),
        TranscodeConfig::from_app_config(&config),
    ));

    let state = Arc::new(AppState {
        config: config.clone(),
        db_pool: pool,
        media_items,
        orchestrator,
    });

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
