pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::screening::handlers as screening;
use crate::session::handlers as session;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Sessions and access gate
        .route("/api/v1/sessions", post(session::handle_create_session))
        .route(
            "/api/v1/sessions/:id/access",
            post(session::handle_submit_access_code),
        )
        // Screening
        .route(
            "/api/v1/sessions/:id/analyze",
            post(screening::handle_analyze),
        )
        .route(
            "/api/v1/sessions/:id/leaderboard",
            get(screening::handle_get_leaderboard),
        )
        .route(
            "/api/v1/sessions/:id/leaderboard.csv",
            get(screening::handle_export_csv),
        )
        .route(
            "/api/v1/sessions/:id/reports",
            get(screening::handle_get_reports),
        )
        .route(
            "/api/v1/sessions/:id/results",
            delete(screening::handle_reset),
        )
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}
