use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub authenticated: bool,
    pub access_code_required: bool,
}

#[derive(Debug, Deserialize)]
pub struct AccessCodeRequest {
    pub access_code: String,
}

/// POST /api/v1/sessions
pub async fn handle_create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionResponse>) {
    let required = state.gate.requires_code();
    let session = state.sessions.create(!required).await;
    (
        StatusCode::CREATED,
        Json(SessionResponse {
            session_id: session.id,
            created_at: session.created_at,
            authenticated: session.authenticated,
            access_code_required: required,
        }),
    )
}

/// POST /api/v1/sessions/:id/access
///
/// A wrong code never touches the session, so an authenticated session stays authenticated.
pub async fn handle_submit_access_code(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AccessCodeRequest>,
) -> Result<StatusCode, AppError> {
    state.sessions.get(id).await?;

    if !state.gate.verify(&req.access_code) {
        warn!("Rejected access code for session {id}");
        return Err(AppError::Unauthorized);
    }

    state.sessions.authenticate(id).await?;
    info!("Session {id} authenticated");
    Ok(StatusCode::NO_CONTENT)
}
