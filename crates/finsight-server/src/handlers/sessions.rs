//! Session handlers
//!
//! Sessions live in memory only. Each one owns its dataset and conversation
//! behind its own lock, so one slow advisor call never blocks other sessions.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Path, State},
    Json,
};
use rand::{rngs::OsRng, RngCore};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use finsight_core::Session;

use crate::{AppError, AppState};

/// Session timeout (30 minutes of inactivity)
const SESSION_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// `fin_` plus 32 hex digits (128 bits)
const SESSION_ID_LEN: usize = 36;

struct SessionEntry {
    created_at: Instant,
    last_activity: Instant,
    session: Arc<Mutex<Session>>,
}

impl SessionEntry {
    fn new(session: Session) -> Self {
        Self {
            created_at: Instant::now(),
            last_activity: Instant::now(),
            session: Arc::new(Mutex::new(session)),
        }
    }

    fn is_expired(&self) -> bool {
        self.last_activity.elapsed() > SESSION_TIMEOUT
    }
}

/// In-memory session manager
#[derive(Default)]
pub struct SessionManager {
    sessions: RwLock<HashMap<String, SessionEntry>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new session and return its ID
    ///
    /// The ID is the only credential for a session, so it comes from OS
    /// randomness rather than anything observable.
    pub async fn create(&self, session: Session) -> String {
        let mut sessions = self.sessions.write().await;

        // Clean up expired sessions while we're here
        sessions.retain(|_, s| !s.is_expired());

        let session_id = loop {
            let id = new_session_id();
            if !sessions.contains_key(&id) {
                break id;
            }
        };

        sessions.insert(session_id.clone(), SessionEntry::new(session));
        session_id
    }

    /// Look up a live session and mark it active
    pub async fn get(&self, session_id: &str) -> Option<Arc<Mutex<Session>>> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(session_id).filter(|s| !s.is_expired())?;
        entry.last_activity = Instant::now();
        Some(entry.session.clone())
    }

    /// Delete a session
    pub async fn delete(&self, session_id: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        sessions.remove(session_id).is_some()
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.values().filter(|s| !s.is_expired()).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn ages(&self, session_id: &str) -> Option<(u64, u64)> {
        let sessions = self.sessions.read().await;
        sessions.get(session_id).map(|s| {
            (
                s.created_at.elapsed().as_secs(),
                s.last_activity.elapsed().as_secs(),
            )
        })
    }
}

fn new_session_id() -> String {
    let mut seed = [0u8; 32];
    OsRng.fill_bytes(&mut seed);
    let hash = Sha256::digest(seed);
    format!("fin_{:x}", hash)[..SESSION_ID_LEN].to_string()
}

/// Resolve `session_id` or answer 404
pub(crate) async fn require_session(
    state: &AppState,
    session_id: &str,
) -> Result<Arc<Mutex<Session>>, AppError> {
    state
        .sessions
        .get(session_id)
        .await
        .ok_or_else(|| AppError::not_found("Session not found or expired"))
}

/// Session info response
#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub session_id: String,
    /// Source file of the active dataset, if any
    pub source: Option<String>,
    pub row_count: usize,
    /// Number of messages in the conversation (two per exchange)
    pub message_count: usize,
    pub preview_rows: usize,
    pub created_at_secs_ago: u64,
    pub last_activity_secs_ago: u64,
}

async fn session_info(state: &AppState, session_id: String) -> Result<SessionInfo, AppError> {
    let session = require_session(state, &session_id).await?;
    let (created, last) = state.sessions.ages(&session_id).await.unwrap_or_default();
    let session = session.lock().await;

    Ok(SessionInfo {
        source: session.dataset().map(|d| d.source.clone()),
        row_count: session.dataset().map(|d| d.len()).unwrap_or(0),
        message_count: session.conversation().len(),
        preview_rows: session.preview_limit(),
        created_at_secs_ago: created,
        last_activity_secs_ago: last,
        session_id,
    })
}

/// POST /api/sessions - Create a new empty session
pub async fn create_session(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionInfo>, AppError> {
    let session = Session::new(state.builder.clone(), state.config.preview_rows);
    let session_id = state.sessions.create(session).await;

    debug!(session_id = %session_id, "Created session");

    Ok(Json(session_info(&state, session_id).await?))
}

/// GET /api/sessions/:id - Get session info
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionInfo>, AppError> {
    Ok(Json(session_info(&state, session_id).await?))
}

/// DELETE /api/sessions/:id - Delete a session
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let deleted = state.sessions.delete(&session_id).await;

    debug!(session_id = %session_id, deleted = deleted, "Deleted session");

    Ok(Json(serde_json::json!({ "deleted": deleted })))
}
