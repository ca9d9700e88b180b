use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::receive_upload;
use axum::{
    extract::{Multipart, State},
    Json,
};
use std::sync::Arc;
use warden_core::ValidationReport;

/// Type and size checks only; no malware scan.
#[utoipa::path(
    post,
    path = "/validate",
    tag = "scan",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Validation result", body = ValidationReport),
        (status = 400, description = "Missing file field or blank filename", body = ErrorResponse),
        (status = 413, description = "Request body too large", body = ErrorResponse)
    )
)]
pub async fn validate_upload(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<ValidationReport>, HttpAppError> {
    let upload = receive_upload(multipart).await?;
    let report = state.pipeline.validate(upload.path()).await;

    tracing::debug!(
        filename = %upload.original_filename,
        valid = report.valid,
        "Uploaded file validated"
    );

    Ok(Json(report))
}
