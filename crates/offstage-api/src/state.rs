//! Shared application state handed to every handler.

use std::sync::Arc;

use sqlx::PgPool;

use offstage_core::Config;
use offstage_db::MediaItemRepository;
use offstage_transcode::TranscodeOrchestrator;

pub struct AppState {
    pub config: Config,
    pub db_pool: PgPool,
    pub media_items: MediaItemRepository,
    pub orchestrator: Arc<TranscodeOrchestrator>,
}
