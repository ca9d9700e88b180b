//! OpenAPI documentation, served at `/api-docs/openapi.json`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use warden_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Warden API",
        version = "0.1.0",
        description = "File admission service: content-based type validation, size policy, ClamAV malware scanning and image heuristics."
    ),
    paths(
        handlers::health::health_check,
        handlers::scan::scan_upload,
        handlers::scan::scan_path,
        handlers::validate::validate_upload,
    ),
    components(
        schemas(
            models::ScanReport,
            models::ValidationReport,
            models::ScanVerdict,
            models::ContentVerdict,
            models::ImageInfo,
            models::FileCategory,
            models::MediaType,
            handlers::scan::ScanPathRequest,
            handlers::health::HealthCheckResponse,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "scan", description = "File scanning and validation"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;
