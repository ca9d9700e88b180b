//! Application setup and initialization

pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use warden_core::Config;

/// Initialize telemetry, shared state and routes.
pub fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry(crate::telemetry::json_requested())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    config.validate().context("Configuration validation failed")?;
    tracing::info!(
        environment = %config.server.environment,
        production = config.is_production(),
        "Configuration loaded and validated successfully"
    );

    let state = Arc::new(AppState::new(config.clone()));
    let router = routes::setup_routes(&config, state.clone());

    Ok((state, router))
}
