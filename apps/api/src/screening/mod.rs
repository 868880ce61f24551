// Résumé screening: extract → assess → rank/report → export.
// All model calls go through llm_client; nothing here talks to Gemini directly.

pub mod assessor;
pub mod batch;
pub mod export;
pub mod handlers;
pub mod leaderboard;
pub mod models;
pub mod prompts;
