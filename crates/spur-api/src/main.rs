use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use spur_api::{build_router, config::Config, state::AppState};
use spur_cache::{CacheStore, RedisCache};
use spur_llm::{ChatClient, GeminiClient, GeminiConfig};
use spur_persist::{LedgerStore, MongoLedger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    tracing::info!("Starting Spur chat API");
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);

    tracing::info!("Connecting to MongoDB");
    let ledger: Arc<dyn LedgerStore> =
        Arc::new(MongoLedger::connect(&config.mongodb_uri, &config.mongodb.database).await?);
    tracing::info!("MongoDB connected");

    tracing::info!("Connecting to Redis");
    let cache: Arc<dyn CacheStore> = Arc::new(RedisCache::connect(&config.redis_url).await?);
    tracing::info!("Redis connected");

    let chat_client: Arc<dyn ChatClient> = Arc::new(GeminiClient::from_config(
        GeminiConfig::new(config.gemini_api_key.as_str()).with_timeout(config.llm.timeout()),
    )?);
    tracing::info!(model = %config.llm.model, "Gemini client ready");

    let state = Arc::new(AppState::new(config.clone(), ledger, cache, chat_client));
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);
    tracing::info!("API docs: http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
