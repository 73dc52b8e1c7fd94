//! Advisor handlers (insight and chat)
//!
//! The session lock is held across the advisor call so exchanges within one
//! session are recorded in the order they were asked.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use finsight_core::{AdvisorModel, ChatMessage};

use super::sessions::require_session;
use crate::{AppError, AppState};

/// Request body for an insight
#[derive(Debug, Default, Deserialize)]
pub struct InsightRequest {
    /// Model override (uses the configured default if not specified)
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InsightResponse {
    pub insight: String,
    pub model: AdvisorModel,
}

/// Request body for a chat question
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub question: String,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub model: AdvisorModel,
    /// Full conversation after this exchange
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub messages: Vec<ChatMessage>,
}

fn resolve_model(state: &AppState, requested: Option<&str>) -> Result<AdvisorModel, AppError> {
    match requested.map(str::trim).filter(|m| !m.is_empty()) {
        Some(id) => Ok(id.parse::<AdvisorModel>()?),
        None => Ok(state.config.model),
    }
}

/// POST /api/sessions/:id/insight - One-shot analysis of the dataset
///
/// The insight is not added to the conversation.
pub async fn generate_insight(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    payload: Option<Json<InsightRequest>>,
) -> Result<Json<InsightResponse>, AppError> {
    let request = payload.map(|Json(p)| p).unwrap_or_default();
    let model = resolve_model(&state, request.model.as_deref())?;
    let session = require_session(&state, &session_id).await?;

    let session = session.lock().await;
    let insight = state.advisor.insight(&session, model).await?;

    Ok(Json(InsightResponse { insight, model }))
}

/// GET /api/sessions/:id/chat - Conversation so far
pub async fn get_chat(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<ConversationResponse>, AppError> {
    let session = require_session(&state, &session_id).await?;
    let messages = session.lock().await.conversation().messages().to_vec();
    Ok(Json(ConversationResponse { messages }))
}

/// POST /api/sessions/:id/chat - Ask a follow-up question
///
/// The exchange is recorded only when the advisor replies.
pub async fn ask_question(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let model = resolve_model(&state, payload.model.as_deref())?;
    let session = require_session(&state, &session_id).await?;

    let mut session = session.lock().await;
    let reply = state
        .advisor
        .ask(&mut session, &payload.question, model)
        .await?;

    debug!(
        session_id = %session_id,
        messages = session.conversation().len(),
        "Chat exchange recorded"
    );

    Ok(Json(ChatResponse {
        reply,
        model,
        messages: session.conversation().messages().to_vec(),
    }))
}

/// POST /api/sessions/:id/chat/reset - Clear the conversation
pub async fn reset_chat(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<ConversationResponse>, AppError> {
    let session = require_session(&state, &session_id).await?;
    session.lock().await.on_reset_chat();
    Ok(Json(ConversationResponse {
        messages: Vec::new(),
    }))
}
