//! HTTP request handlers

use super::types::{ErrorResponse, HistoryResponse, MessageRequest, ReplyResponse};
use super::AppState;
use crate::commands::Command;
use crate::pipeline::PipelineError;
use crate::stages::truncate_chars;
use crate::transcript::UserId;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Inbound chat messages
        .route("/api/messages", post(post_message))
        // Per-identity transcript access
        .route("/api/users/:id/history", get(get_history))
        .route("/api/users/:id/reset", post(reset_user))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Messages
// ============================================================

async fn post_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<MessageRequest>,
) -> Result<Json<ReplyResponse>, AppError> {
    authorize(&state, &headers)?;

    if req.author_id.trim().is_empty() {
        return Err(AppError::BadRequest("author_id must not be empty".to_string()));
    }
    if req.author_is_bot {
        return Ok(Json(ReplyResponse::silent()));
    }
    if req.content.trim().is_empty() {
        return Ok(Json(ReplyResponse::silent()));
    }

    let user = UserId::new(req.author_id);

    if let Some(command) = Command::parse(&state.command_prefix, &req.content) {
        let reply = command
            .execute(&user, state.orchestrator.store())
            .await
            .map(|text| truncate_chars(&text, state.max_message_characters));
        return Ok(Json(ReplyResponse { reply }));
    }

    // The turn runs detached so a dropped connection cannot cut it short
    // before the transcript is written.
    let orchestrator = Arc::clone(&state.orchestrator);
    let content = req.content;
    let reply = tokio::spawn(async move { orchestrator.handle_message(&user, &content).await })
        .await
        .map_err(|e| AppError::Internal(format!("Turn task failed: {e}")))??;

    Ok(Json(ReplyResponse::text(truncate_chars(
        &reply,
        state.max_message_characters,
    ))))
}

// ============================================================
// Transcripts
// ============================================================

async fn get_history(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<HistoryResponse>, AppError> {
    authorize(&state, &headers)?;

    let turns = state.orchestrator.store().get(&UserId::new(id)).await;
    Ok(Json(HistoryResponse { turns }))
}

async fn reset_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ReplyResponse>, AppError> {
    authorize(&state, &headers)?;

    let reply = Command::Reset
        .execute(&UserId::new(id), state.orchestrator.store())
        .await
        .map(|text| truncate_chars(&text, state.max_message_characters));
    Ok(Json(ReplyResponse { reply }))
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> &'static str {
    concat!("paper-assistant ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Auth
// ============================================================

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    let Some(expected) = state.platform_token.as_deref() else {
        return Ok(());
    };

    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match token {
        Some(t) if t == expected => Ok(()),
        _ => Err(AppError::Unauthorized),
    }
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    Unauthorized,
    /// A pipeline stage failed; no reply was produced
    Upstream(String),
    Internal(String),
}

impl From<PipelineError> for AppError {
    fn from(e: PipelineError) -> Self {
        AppError::Upstream(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
