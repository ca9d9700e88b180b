//! Health check handler and response type.

use crate::state::AppState;
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use utoipa::ToSchema;

pub const SERVICE_NAME: &str = "warden";

/// Run an async check with timeout; returns status string "healthy", "timeout", or "{prefix}: {error}".
async fn run_check<F, E>(timeout: Duration, f: F, error_prefix: &str) -> String
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(())) => "healthy".to_string(),
        Ok(Err(e)) => format!("{}: {}", error_prefix, e),
        Err(_) => "timeout".to_string(),
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthCheckResponse {
    /// `healthy`, or `degraded` when the daemon is unreachable
    pub status: String,
    pub service: String,
    pub timestamp: DateTime<Utc>,
    pub clamav: String,
}

/// The service itself is up whenever this answers; daemon trouble only degrades it.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Service status", body = HealthCheckResponse))
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthCheckResponse> {
    const TIMEOUT: Duration = Duration::from_secs(5);

    let clamd = state.clamd.clone();
    let clamav = run_check(TIMEOUT, async move { clamd.ping().await }, "unhealthy").await;
    if clamav != "healthy" {
        tracing::warn!(clamav = %clamav, address = %state.clamd.address(), "clamd health check failed");
    }

    let status = if clamav == "healthy" {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthCheckResponse {
        status: status.to_string(),
        service: SERVICE_NAME.to_string(),
        timestamp: Utc::now(),
        clamav,
    })
}
