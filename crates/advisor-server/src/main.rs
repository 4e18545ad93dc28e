//! Stock Risk Advisor HTTP Server
//!
//! Axum-based server exposing the conversational advisor over a small REST
//! API. Follow-up state is kept per `conversation_id` in memory.

mod handlers;
mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use advisor_core::MemorySessionStore;
use advisor_runtime::RuntimeConfig;
use stock_advisor::{AdvisorPipeline, ConversationState, MockMarketData, PipelineConfig};

use crate::handlers::{chat_handler, delete_conversation, health_check, list_models};
use crate::state::AppState;

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(600);

fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health & info
        .route("/health", get(health_check))
        .route("/api/models", get(list_models))

        // Advisor API
        .route("/api/chat", post(chat_handler))
        .route("/api/chat/{conversation_id}", delete(delete_conversation))

        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment before reading RUST_LOG
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = RuntimeConfig::from_env()?;
    let provider = config.build_provider()?;

    match provider.health_check().await {
        Ok(true) => {
            tracing::info!("✓ Connected to {}", provider.name());
            if let Ok(models) = provider.list_models().await {
                for model in models {
                    tracing::info!("  Model: {}", model.id);
                }
            }
        }
        Ok(false) | Err(_) => {
            tracing::warn!("⚠ {} not available - answers will fall back to rule-based text", provider.name());
        }
    }

    let market = Arc::new(MockMarketData::new());
    let pipeline = AdvisorPipeline::new(
        provider.clone(),
        market,
        PipelineConfig::from_env(config.model.clone()),
    );

    let sessions: Arc<MemorySessionStore<ConversationState>> = Arc::new(MemorySessionStore::default());
    let sweeper = sessions.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let purged = sweeper.purge_idle().await;
            if purged > 0 {
                tracing::debug!(purged, "Dropped idle conversations");
            }
        }
    });

    let state = AppState {
        provider,
        pipeline: Arc::new(pipeline),
        sessions,
        model: config.model,
    };

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 stock advisor running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("Endpoints:");
    tracing::info!("  GET    /health              - Health check");
    tracing::info!("  GET    /api/models          - List available models");
    tracing::info!("  POST   /api/chat            - Send message");
    tracing::info!("  DELETE /api/chat/{{id}}       - Drop a conversation");

    axum::serve(listener, app(state)).await?;

    Ok(())
}
