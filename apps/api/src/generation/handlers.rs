//! Axum route handlers for the artifact generation API.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::builder::GenerationTask;
use crate::generation::engine::{advise, generate_all, generate_artifact, refine_artifact};
use crate::generation::style::StyleConfig;
use crate::session::Artifact;
use crate::state::AppState;
use crate::suggestions::{ParserOptions, SuggestionRecord};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    /// Wire task identifier: summary | actions | prd | stories.
    pub task: String,
    pub notes: String,
    #[serde(default)]
    pub style: StyleConfig,
    #[serde(default = "default_use_memory")]
    pub use_memory: bool,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub artifact: Artifact,
}

#[derive(Debug, Deserialize)]
pub struct GenerateAllRequest {
    pub notes: String,
    #[serde(default)]
    pub style: StyleConfig,
    #[serde(default = "default_use_memory")]
    pub use_memory: bool,
}

#[derive(Debug, Serialize)]
pub struct GenerateAllResponse {
    pub artifacts: Vec<Artifact>,
}

#[derive(Debug, Deserialize)]
pub struct RefineRequest {
    pub task: String,
    pub instruction: String,
}

#[derive(Debug, Serialize)]
pub struct RefineResponse {
    pub artifact: Artifact,
}

/// Optional parser overrides for the advisory call; omitted fields fall back
/// to the parser defaults.
#[derive(Debug, Default, Deserialize)]
pub struct SuggestionsRequest {
    pub min_action_len: Option<usize>,
    pub require_confidence: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<SuggestionRecord>,
    pub cached: bool,
}

#[derive(Debug, Serialize)]
pub struct SessionArtifactsResponse {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub artifacts: Vec<Artifact>,
}

fn default_use_memory() -> bool {
    true
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
///
/// Opens a fresh session with no artifacts and empty memory.
pub async fn handle_create_session(State(state): State<AppState>) -> Json<CreateSessionResponse> {
    let session_id = state.sessions.create().await;
    Json(CreateSessionResponse { session_id })
}

/// GET /api/v1/sessions/:id/artifacts
///
/// Returns the session's current artifact set in fixed task order.
pub async fn handle_get_artifacts(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionArtifactsResponse>, AppError> {
    let overview = state.sessions.overview(session_id).await?;
    Ok(Json(SessionArtifactsResponse {
        session_id,
        created_at: overview.created_at,
        artifacts: overview.artifacts,
    }))
}

/// POST /api/v1/sessions/:id/generate
///
/// Generates one artifact from the supplied notes.
pub async fn handle_generate(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    if request.notes.trim().is_empty() {
        return Err(AppError::Validation("notes cannot be empty".to_string()));
    }
    let task: GenerationTask = request.task.parse()?;

    let artifact = generate_artifact(
        state.llm.as_ref(),
        &state.sessions,
        session_id,
        task,
        &request.style,
        &request.notes,
        request.use_memory,
    )
    .await?;

    Ok(Json(GenerateResponse { artifact }))
}

/// POST /api/v1/sessions/:id/generate-all
///
/// Generates all four artifacts sequentially against the same notes.
pub async fn handle_generate_all(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<GenerateAllRequest>,
) -> Result<Json<GenerateAllResponse>, AppError> {
    if request.notes.trim().is_empty() {
        return Err(AppError::Validation("notes cannot be empty".to_string()));
    }

    let artifacts = generate_all(
        state.llm.as_ref(),
        &state.sessions,
        session_id,
        &request.style,
        &request.notes,
        request.use_memory,
    )
    .await?;

    Ok(Json(GenerateAllResponse { artifacts }))
}

/// POST /api/v1/sessions/:id/refine
///
/// Transforms the stored artifact for a task per the caller's instruction.
pub async fn handle_refine(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<RefineRequest>,
) -> Result<Json<RefineResponse>, AppError> {
    if request.instruction.trim().is_empty() {
        return Err(AppError::Validation(
            "instruction cannot be empty".to_string(),
        ));
    }
    let task: GenerationTask = request.task.parse()?;

    let artifact = refine_artifact(
        state.llm.as_ref(),
        &state.sessions,
        session_id,
        task,
        &request.instruction,
    )
    .await?;

    Ok(Json(RefineResponse { artifact }))
}

/// POST /api/v1/sessions/:id/suggestions
///
/// Advisory call over the session's artifacts. Served from the response cache
/// when nothing relevant has changed since the last call.
pub async fn handle_suggestions(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    body: Option<Json<SuggestionsRequest>>,
) -> Result<Json<SuggestionsResponse>, AppError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let defaults = ParserOptions::default();
    let options = ParserOptions {
        min_action_len: request.min_action_len.unwrap_or(defaults.min_action_len),
        require_confidence: request
            .require_confidence
            .unwrap_or(defaults.require_confidence),
    };

    let outcome = advise(state.llm.as_ref(), &state.sessions, session_id, &options).await?;

    Ok(Json(SuggestionsResponse {
        suggestions: outcome.suggestions,
        cached: outcome.cached,
    }))
}
