//! Warden Core Library
//!
//! This crate provides the domain models, error types and configuration shared by the
//! scanning pipeline and the HTTP service.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{CategoryPolicy, Config, ScanConfig, ServerConfig};
pub use error::{AppError, ErrorMetadata, LogLevel, ScanError};
pub use models::{
    ContentVerdict, FileCategory, ImageInfo, MediaType, ScanReport, ScanVerdict, ValidationReport,
};
