mod config;
mod embeddings;
mod errors;
mod index;
mod llm_client;
mod models;
mod resolve;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use qdrant_client::Qdrant;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::embeddings::EmbeddingClient;
use crate::index::retriever::Retriever;
use crate::index::store::ChunkStore;
use crate::llm_client::LlmClient;
use crate::resolve::resolver::{FieldResolver, RagFieldResolver};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails startup on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.rust_log.clone())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Autofill API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize Qdrant
    let qdrant = build_qdrant_client(&config)?;
    info!("Qdrant client initialized ({})", config.qdrant_url);

    // Initialize embeddings client
    let embeddings_client = EmbeddingClient::new(config.openai_api_key.clone());
    info!(
        "Embeddings client initialized (model: {})",
        embeddings::EMBEDDING_MODEL
    );

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Chunk store: collection + payload indexes created on first run
    let store = Arc::new(ChunkStore::new(
        qdrant,
        embeddings_client,
        config.qdrant_collection.clone(),
    ));
    store.ensure_ready().await?;
    info!("Chunk store ready (collection: {})", config.qdrant_collection);

    // Field resolver: tenant-scoped retrieval + one LLM call per field
    let resolver: Arc<dyn FieldResolver> =
        Arc::new(RagFieldResolver::new(Retriever::new(store.clone()), llm));

    let state = AppState::new(store, resolver, config.clone());

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

fn build_qdrant_client(config: &Config) -> Result<Qdrant> {
    let mut builder = Qdrant::from_url(&config.qdrant_url);
    if let Some(key) = &config.qdrant_api_key {
        builder = builder.api_key(key.clone());
    }
    Ok(builder.build()?)
}
