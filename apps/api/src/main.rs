mod config;
mod errors;
mod extraction;
mod llm_client;
mod routes;
mod screening;
mod session;
mod state;

#[cfg(test)]
mod testing;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::extraction::PdfTextExtractor;
use crate::llm_client::{GeminiClient, RetryPolicy};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed numeric env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Screener API v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: {config:?}");

    // Initialize LLM client
    let llm = GeminiClient::new(config.gemini_api_key.clone(), config.gemini_model.clone())?
        .with_base_url(config.gemini_base_url.clone())
        .with_retry_policy(RetryPolicy {
            max_retries: config.llm_max_retries,
            ..RetryPolicy::default()
        });
    info!("LLM client initialized (model: {})", config.gemini_model);
    if config.gemini_api_key.is_none() {
        warn!("GEMINI_API_KEY is not set; every analysis request must supply api_key");
    }

    if config.access_code.is_some() {
        info!("Access gate enabled");
    } else {
        warn!("ACCESS_CODE is not set; sessions are open");
    }

    // Build app state
    let state = AppState::new(config.clone(), Arc::new(PdfTextExtractor), Arc::new(llm));

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS to the front-end origin once it is deployed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
