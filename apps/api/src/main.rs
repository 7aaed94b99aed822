mod config;
mod errors;
mod extract;
mod interview;
mod llm_client;
mod models;
mod persist;
mod retrieval;
mod routes;
mod session;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::interview::controller::DialogueStateController;
use crate::llm_client::OpenAiClient;
use crate::persist::ResultsStore;
use crate::routes::build_router;
use crate::session::InMemorySessionStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Fieldwork API v{}", env!("CARGO_PKG_VERSION"));

    // Impossible chunking parameters would only surface at upload time — fail at startup instead.
    retrieval::chunker::validate(config.chunk_size, config.chunk_overlap)?;

    // One client serves both the generation and the embedding backend traits.
    let client = Arc::new(OpenAiClient::new(config.openai_api_key.clone()));
    info!(
        "LLM client initialized (chat: {}, embeddings: {})",
        llm_client::CHAT_MODEL,
        llm_client::EMBEDDING_MODEL
    );

    let state = AppState {
        generation: client.clone(),
        embeddings: client,
        sessions: Arc::new(InMemorySessionStore::new()),
        results: ResultsStore::new(config.results_dir.clone()),
        controller: DialogueStateController::new(config.max_turns),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
