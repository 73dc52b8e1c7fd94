//! Model listing and health handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use finsight_core::{AdvisorBackend, AdvisorModel};

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub id: AdvisorModel,
    pub is_default: bool,
}

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub default_model: AdvisorModel,
    pub models: Vec<ModelInfo>,
}

/// GET /api/models - Models a request may name
pub async fn list_models(State(state): State<Arc<AppState>>) -> Json<ModelsResponse> {
    let default_model = state.config.model;
    let models = AdvisorModel::all()
        .iter()
        .map(|&id| ModelInfo {
            id,
            is_default: id == default_model,
        })
        .collect();

    Json(ModelsResponse {
        default_model,
        models,
    })
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub advisor_host: String,
    pub advisor_reachable: bool,
    pub sessions: usize,
}

/// GET /api/health - Server and advisor backend status
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let client = state.advisor.client();

    Json(HealthResponse {
        status: "ok",
        advisor_host: client.host().to_string(),
        advisor_reachable: client.health_check().await,
        sessions: state.sessions.len().await,
    })
}
