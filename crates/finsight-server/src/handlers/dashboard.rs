//! Upload and dashboard handlers

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use tracing::info;

use finsight_core::DashboardReport;

use super::sessions::require_session;
use crate::{AppError, AppState, MAX_UPLOAD_SIZE};

/// POST /api/sessions/:id/upload - Upload a spreadsheet
///
/// Expects multipart form with:
/// - file: CSV or XLSX file (required, max 10MB); the file name picks the parser
///
/// A rejected upload leaves the previous dataset active.
pub async fn upload_sheet(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<DashboardReport>, AppError> {
    let session = require_session(&state, &session_id).await?;

    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(&format!("Failed to read form field: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field
            .file_name()
            .map(String::from)
            .ok_or_else(|| AppError::bad_request("File field has no file name"))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|_| AppError::bad_request("Failed to read file data"))?;

        if bytes.len() > MAX_UPLOAD_SIZE {
            return Err(AppError::bad_request(&format!(
                "File too large. Maximum size is {} MB",
                MAX_UPLOAD_SIZE / 1024 / 1024
            )));
        }

        upload = Some((file_name, bytes.to_vec()));
    }

    let (file_name, data) = upload.ok_or_else(|| AppError::bad_request("Missing file field"))?;

    let report = session.lock().await.on_upload(&file_name, &data)?;

    info!(
        session_id = %session_id,
        file = %file_name,
        rows = report.row_count,
        "Spreadsheet uploaded"
    );

    Ok(Json(report))
}

/// GET /api/sessions/:id/dashboard - Totals, breakdown and monthly series
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<DashboardReport>, AppError> {
    let session = require_session(&state, &session_id).await?;
    let report = session.lock().await.dashboard()?;
    Ok(Json(report))
}
