use std::sync::Arc;

use restaurant_api::ai::OpenAiClient;
use restaurant_api::config::AppConfig;
use restaurant_api::conversations::spawn_follow_up_scheduler;
use restaurant_api::whatsapp::EvolutionApiClient;
use restaurant_api::{create_router, db, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Restaurant API - Starting...");

    let config = AppConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&db_pool).await?;

    let evolution = Arc::new(EvolutionApiClient::new(&config.evolution, config.http_timeout)?);
    let ai = Arc::new(OpenAiClient::new(&config.openai, config.http_timeout)?);
    if config.evolution.webhook_base_url.is_none() {
        tracing::warn!("WEBHOOK_BASE_URL not set, new instances will not be pointed at this service");
    }

    let addr = config.bind_address();
    let follow_up_interval = config.follow_up.interval;
    let state = AppState::new(db_pool, config, evolution, ai);

    spawn_follow_up_scheduler(state.conversations.clone(), follow_up_interval);

    let app = create_router(state);

    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Restaurant API is running on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
