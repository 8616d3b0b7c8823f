mod api_doc;
mod auth;
mod error;
mod handlers;
mod setup;
mod state;
mod telemetry;

use offstage_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load .env in development; ignored when absent.
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize the application (telemetry, database, orchestrator, routes)
    let (_state, router) = crate::setup::initialize_app(config.clone()).await?;

    // Start the server
    crate::setup::server::start_server(&config, router).await?;

    Ok(())
}
