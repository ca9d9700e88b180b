use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use crate::utils::upload::receive_upload;
use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use utoipa::ToSchema;
use warden_core::{AppError, ScanReport};

#[derive(Debug, Deserialize, ToSchema)]
pub struct ScanPathRequest {
    /// Path as seen by both this service and the clamd daemon
    pub file_path: String,
}

#[utoipa::path(
    post,
    path = "/scan",
    tag = "scan",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Scan finished; see overall_safe", body = ScanReport),
        (status = 400, description = "Missing file field or blank filename", body = ErrorResponse),
        (status = 413, description = "Request body too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn scan_upload(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<ScanReport>, HttpAppError> {
    let upload = receive_upload(multipart).await?;

    let mut report = state.pipeline.scan(upload.path()).await;
    report.file_path = upload.original_filename.clone();

    tracing::info!(
        filename = %upload.original_filename,
        size = upload.size,
        overall_safe = report.overall_safe,
        "Uploaded file scanned"
    );

    Ok(Json(report))
}

#[utoipa::path(
    post,
    path = "/scan-path",
    tag = "scan",
    request_body = ScanPathRequest,
    responses(
        (status = 200, description = "Scan finished; see overall_safe", body = ScanReport),
        (status = 400, description = "Missing file_path", body = ErrorResponse),
        (status = 404, description = "File not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn scan_path(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<ScanPathRequest>,
) -> Result<Json<ScanReport>, HttpAppError> {
    if request.file_path.trim().is_empty() {
        return Err(AppError::InvalidInput("No file path provided".to_string()).into());
    }

    let path = PathBuf::from(&request.file_path);
    let exists = tokio::fs::try_exists(&path).await.unwrap_or(false);
    if !exists {
        return Err(AppError::NotFound("File not found".to_string()).into());
    }

    Ok(Json(state.pipeline.scan(&path).await))
}
