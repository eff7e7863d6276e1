mod agents;
mod config;
mod errors;
mod llm_client;
mod preprocess;
mod progress;
mod rate_limit;
mod review;
mod routes;
mod scoring;
mod state;
mod tools;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::rate_limit::RateLimiter;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting reviewer v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::new(
        config.anthropic_api_key.clone(),
        config.anthropic_api_url.clone(),
        config.ollama_base_url.clone(),
    )?;
    if config.anthropic_api_key.is_none() {
        warn!("ANTHROPIC_API_KEY not set; only the ollama provider is usable");
    }
    info!(
        "LLM client initialized (default model: {}, ollama: {})",
        config.default_model, config.ollama_base_url
    );

    // In-memory, per-process rate limiter
    let rate_limiter = Arc::new(RateLimiter::in_memory(config.analysis.rate_limit));
    info!(
        "Rate limit: {} requests per {}ms",
        config.analysis.rate_limit.max_requests, config.analysis.rate_limit.window_ms
    );

    // Build app state
    let state = AppState {
        llm: Arc::new(llm),
        config: config.clone(),
        rate_limiter,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
