use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::category::FileCategory;
use super::media_type::MediaType;
use super::verdict::{ContentVerdict, ImageInfo, ScanVerdict};

/// Aggregate result of one pipeline run.
///
/// Stage fields that were never reached keep their "not run" value: `None` for the
/// verdicts, `false` for the flags and `0` for the size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ScanReport {
    pub file_path: String,
    pub timestamp: DateTime<Utc>,
    /// Lowercase hex SHA-256; `None` when the file could not be read for hashing.
    pub file_hash: Option<String>,
    pub file_size: u64,
    pub file_category: Option<FileCategory>,
    pub mime_type: Option<MediaType>,
    pub file_type_valid: bool,
    pub size_valid: bool,
    pub malware_scan: Option<ScanVerdict>,
    pub content_analysis: Option<ContentVerdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageInfo>,
    pub overall_safe: bool,
    pub errors: Vec<String>,
}

impl ScanReport {
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            timestamp: Utc::now(),
            file_hash: None,
            file_size: 0,
            file_category: None,
            mime_type: None,
            file_type_valid: false,
            size_valid: false,
            malware_scan: None,
            content_analysis: None,
            image: None,
            overall_safe: false,
            errors: Vec::new(),
        }
    }

    /// Conjunction of every stage outcome recorded in this report.
    pub fn all_stages_passed(&self) -> bool {
        self.file_type_valid
            && self.size_valid
            && self.malware_scan.as_ref().is_some_and(ScanVerdict::is_clean)
            && self
                .content_analysis
                .as_ref()
                .is_some_and(ContentVerdict::is_safe)
    }
}

/// Result of the lightweight pre-scan check (type and size only).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ValidationReport {
    pub file_type_valid: bool,
    pub file_category: Option<FileCategory>,
    pub mime_type: Option<MediaType>,
    pub size_valid: bool,
    pub file_size: u64,
    pub valid: bool,
}
