//! Axum route handlers for the screening API.

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::screening::batch::{run_batch, AnalysisMode, BatchOutcome, BatchRequest, UploadedResume};
use crate::screening::export::{leaderboard_csv, CSV_CONTENT_TYPE, CSV_DISPOSITION};
use crate::screening::leaderboard::Leaderboard;
use crate::screening::models::{NarrativeReport, SkippedFile};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Raw multipart fields before validation.
#[derive(Debug, Default)]
struct AnalyzeForm {
    job_description: Option<String>,
    mode: Option<String>,
    api_key: Option<String>,
    files: Vec<UploadedResume>,
}

#[derive(Debug, Default, Serialize)]
pub struct LeaderboardResponse {
    pub leaderboard: Leaderboard,
    pub skipped: Vec<SkippedFile>,
}

#[derive(Debug, Default, Serialize)]
pub struct ReportsResponse {
    pub reports: Vec<NarrativeReport>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub mode: AnalysisMode,
    pub files_received: usize,
    #[serde(flatten)]
    pub leaderboard: Option<LeaderboardResponse>,
    #[serde(flatten)]
    pub reports: Option<ReportsResponse>,
}

impl LeaderboardResponse {
    fn from_outcome(outcome: Option<&BatchOutcome>) -> Self {
        match outcome {
            Some(BatchOutcome::Leaderboard {
                assessments,
                skipped,
            }) => Self {
                leaderboard: Leaderboard::from_assessments(assessments),
                skipped: skipped.clone(),
            },
            _ => Self::default(),
        }
    }
}

impl ReportsResponse {
    fn from_outcome(outcome: Option<&BatchOutcome>) -> Self {
        match outcome {
            Some(BatchOutcome::Report { reports }) => Self {
                reports: reports.clone(),
            },
            _ => Self::default(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions/:id/analyze
///
/// Multipart fields: `job_description`, `mode`, `api_key`, and one or more `files`.
/// Runs the whole batch before responding and replaces the session's results.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    state.sessions.require_access(id).await?;

    let form = read_form(multipart).await?;
    let request = validate_form(form, state.llm.has_default_key())?;
    let files_received = request.files.len();
    let mode = request.mode;

    let outcome = run_batch(
        state.extractor.as_ref(),
        state.llm.as_ref(),
        &state.throttle,
        request,
    )
    .await;

    state.sessions.replace_results(id, outcome.clone()).await?;
    info!("Session {id}: stored results for {files_received} uploads");

    let (leaderboard, reports) = match mode {
        AnalysisMode::Leaderboard => (Some(LeaderboardResponse::from_outcome(Some(&outcome))), None),
        AnalysisMode::Report => (None, Some(ReportsResponse::from_outcome(Some(&outcome)))),
    };

    Ok(Json(AnalyzeResponse {
        mode,
        files_received,
        leaderboard,
        reports,
    }))
}

/// GET /api/v1/sessions/:id/leaderboard
pub async fn handle_get_leaderboard(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    let session = state.sessions.require_access(id).await?;
    Ok(Json(LeaderboardResponse::from_outcome(session.results.as_ref())))
}

/// GET /api/v1/sessions/:id/leaderboard.csv
pub async fn handle_export_csv(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.sessions.require_access(id).await?;
    let view = LeaderboardResponse::from_outcome(session.results.as_ref());
    let body = leaderboard_csv(&view.leaderboard)?;

    Ok((
        [
            (header::CONTENT_TYPE, CSV_CONTENT_TYPE),
            (header::CONTENT_DISPOSITION, CSV_DISPOSITION),
        ],
        body,
    ))
}

/// GET /api/v1/sessions/:id/reports
pub async fn handle_get_reports(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReportsResponse>, AppError> {
    let session = state.sessions.require_access(id).await?;
    Ok(Json(ReportsResponse::from_outcome(session.results.as_ref())))
}

/// DELETE /api/v1/sessions/:id/results
pub async fn handle_reset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.require_access(id).await?;
    state.sessions.reset(id).await?;
    info!("Session {id}: results cleared");
    Ok(StatusCode::NO_CONTENT)
}

// ────────────────────────────────────────────────────────────────────────────
// Form handling
// ────────────────────────────────────────────────────────────────────────────

async fn read_form(mut multipart: Multipart) -> Result<AnalyzeForm, AppError> {
    let mut form = AnalyzeForm::default();

    while let Some(field) = multipart.next_field().await.map_err(bad_upload)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "job_description" => form.job_description = Some(field.text().await.map_err(bad_upload)?),
            "mode" => form.mode = Some(field.text().await.map_err(bad_upload)?),
            "api_key" => form.api_key = Some(field.text().await.map_err(bad_upload)?),
            "files" | "file" => {
                let given = field
                    .file_name()
                    .filter(|n| !n.trim().is_empty())
                    .map(String::from);
                if !is_pdf(given.as_deref(), field.content_type()) {
                    return Err(AppError::Validation(format!(
                        "'{}' is not a PDF",
                        given.as_deref().unwrap_or("unnamed upload")
                    )));
                }
                let filename =
                    given.unwrap_or_else(|| format!("resume-{}.pdf", form.files.len() + 1));
                let bytes = field.bytes().await.map_err(bad_upload)?;
                form.files.push(UploadedResume { filename, bytes });
            }
            other => debug!("Ignoring unknown form field '{other}'"),
        }
    }

    Ok(form)
}

/// Blocks the run before any processing when an input is missing.
fn validate_form(form: AnalyzeForm, has_default_key: bool) -> Result<BatchRequest, AppError> {
    if form.files.is_empty() {
        return Err(AppError::Validation(
            "Missing files: upload at least one PDF résumé".to_string(),
        ));
    }

    let job_description = form
        .job_description
        .map(|jd| jd.trim().to_string())
        .filter(|jd| !jd.is_empty())
        .ok_or_else(|| AppError::Validation("Missing job description".to_string()))?;

    let mode = form
        .mode
        .as_deref()
        .unwrap_or_default()
        .parse::<AnalysisMode>()
        .map_err(AppError::Validation)?;

    let api_key = form
        .api_key
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty());
    if api_key.is_none() && !has_default_key {
        return Err(AppError::Validation(
            "Missing API key: none is configured on the server, supply api_key".to_string(),
        ));
    }

    Ok(BatchRequest {
        job_description,
        mode,
        api_key,
        files: form.files,
    })
}

/// Accepts a `.pdf` name or an `application/pdf` part; an unnamed part needs the content type.
fn is_pdf(filename: Option<&str>, content_type: Option<&str>) -> bool {
    filename.is_some_and(|n| n.to_ascii_lowercase().ends_with(".pdf"))
        || content_type.is_some_and(|ct| ct.eq_ignore_ascii_case("application/pdf"))
}

fn bad_upload(e: MultipartError) -> AppError {
    AppError::Validation(format!("Malformed upload: {e}"))
}
