//! Application state shared by all handlers.

use std::sync::Arc;
use warden_core::Config;
use warden_scanner::{ClamdClient, ContentSniffer, ScanPipeline};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pipeline: Arc<ScanPipeline>,
    /// Same daemon the pipeline scans with; used by the health check.
    pub clamd: ClamdClient,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let clamd = ClamdClient::from_config(&config.scan);
        let pipeline = ScanPipeline::new(
            &config.scan,
            Arc::new(ContentSniffer::new()),
            Arc::new(clamd.clone()),
        );
        Self {
            config,
            pipeline: Arc::new(pipeline),
            clamd,
        }
    }
}
