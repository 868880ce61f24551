use std::sync::Arc;

use crate::config::Config;
use crate::extraction::TextExtractor;
use crate::llm_client::CompletionProvider;
use crate::screening::batch::Throttle;
use crate::session::access::AccessGate;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sessions: SessionStore,
    pub gate: AccessGate,
    /// PDF text extraction. Default: `PdfTextExtractor`.
    pub extractor: Arc<dyn TextExtractor>,
    /// Model backend. Default: `GeminiClient`.
    pub llm: Arc<dyn CompletionProvider>,
    /// Spaces model requests of every batch on this server.
    pub throttle: Arc<Throttle>,
}

impl AppState {
    pub fn new(
        config: Config,
        extractor: Arc<dyn TextExtractor>,
        llm: Arc<dyn CompletionProvider>,
    ) -> Self {
        Self {
            gate: AccessGate::from_config(config.access_code.as_deref()),
            sessions: SessionStore::new(config.session_ttl),
            throttle: Arc::new(Throttle::new(config.request_interval)),
            config,
            extractor,
            llm,
        }
    }
}
