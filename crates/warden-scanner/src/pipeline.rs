//! Scan pipeline: hash → type → size → malware → content → aggregate.
//!
//! A failing stage stops the run and records exactly one message in `ScanReport::errors`.
//! Fields of stages that never ran keep their "not run" value, and `overall_safe` is only set
//! once every stage has passed. The pipeline holds no per-scan state, so one instance can
//! serve any number of concurrent scans.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use warden_core::{
    ContentVerdict, FileCategory, ScanConfig, ScanReport, ScanVerdict, ValidationReport,
};

use crate::clamd::MalwareScanner;
use crate::hasher::hash_file;
use crate::image_heuristics::ImageHeuristics;
use crate::size::SizeValidator;
use crate::sniffer::ContentSniffer;
use crate::type_validator::{TypeRejection, TypeValidator};

/// Reason a run stopped early. The `Display` text is what lands in the report.
#[derive(Debug, thiserror::Error)]
enum StageFailure {
    #[error("Invalid file type: {0}")]
    InvalidType(TypeRejection),

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    TooLarge { size: u64, max: u64 },

    #[error("Malware detected: {0}")]
    Infected(String),

    #[error("Malware scan failed: {0}")]
    ScanFailed(String),

    #[error("Content issue: {0}")]
    UnsafeContent(String),
}

pub struct ScanPipeline {
    sniffer: Arc<ContentSniffer>,
    type_validator: TypeValidator,
    size_validator: SizeValidator,
    scanner: Arc<dyn MalwareScanner>,
    image_heuristics: ImageHeuristics,
}

impl ScanPipeline {
    pub fn new(
        config: &ScanConfig,
        sniffer: Arc<ContentSniffer>,
        scanner: Arc<dyn MalwareScanner>,
    ) -> Self {
        Self {
            sniffer,
            type_validator: TypeValidator::from_config(config),
            size_validator: SizeValidator::new(config.max_file_size_bytes),
            scanner,
            image_heuristics: ImageHeuristics::from_config(config),
        }
    }

    /// Run every stage against `path` and return the report. Never fails; faults are
    /// recorded in the report.
    pub async fn scan(&self, path: &Path) -> ScanReport {
        let start = Instant::now();
        let mut report = ScanReport::new(path.to_string_lossy());

        match self.run_stages(path, &mut report).await {
            Ok(()) => {
                report.overall_safe = report.all_stages_passed();
                tracing::info!(
                    path = %path.display(),
                    category = ?report.file_category,
                    overall_safe = report.overall_safe,
                    duration_ms = start.elapsed().as_millis(),
                    "File scan finished"
                );
            }
            Err(failure) => {
                tracing::warn!(
                    path = %path.display(),
                    reason = %failure,
                    duration_ms = start.elapsed().as_millis(),
                    "File rejected"
                );
                report.errors.push(failure.to_string());
            }
        }

        report
    }

    async fn run_stages(&self, path: &Path, report: &mut ScanReport) -> Result<(), StageFailure> {
        // Hash: a failure leaves file_hash unset and is not a rejection by itself.
        report.file_hash = hash_file(path).await;

        let category = self.check_type(path, report).await?;

        let size = self.size_validator.check(path).await;
        report.file_size = size.size;
        report.size_valid = size.within_limit;
        if !size.within_limit {
            return Err(StageFailure::TooLarge {
                size: size.size,
                max: self.size_validator.max_file_size_bytes(),
            });
        }

        let verdict = self.scanner.scan_path(path).await;
        report.malware_scan = Some(verdict.clone());
        match verdict {
            ScanVerdict::Clean => {}
            ScanVerdict::Infected { signature } => return Err(StageFailure::Infected(signature)),
            ScanVerdict::Error { message } => return Err(StageFailure::ScanFailed(message)),
        }

        let content = if category == FileCategory::Image {
            let (verdict, info) = self.image_heuristics.analyze(path).await;
            report.image = info;
            verdict
        } else {
            ContentVerdict::Safe
        };
        report.content_analysis = Some(content.clone());
        if let ContentVerdict::Unsafe { reason } = content {
            return Err(StageFailure::UnsafeContent(reason));
        }

        Ok(())
    }

    async fn check_type(
        &self,
        path: &Path,
        report: &mut ScanReport,
    ) -> Result<FileCategory, StageFailure> {
        let media_type = self
            .sniffer
            .sniff_path(path)
            .await
            .map_err(|e| StageFailure::InvalidType(TypeRejection::Unreadable(e)))?;
        report.mime_type = Some(media_type.clone());

        let category = self
            .type_validator
            .check(path, &media_type)
            .map_err(StageFailure::InvalidType)?;
        report.file_type_valid = true;
        report.file_category = Some(category);
        Ok(category)
    }

    /// Type and size checks only. Both always run so the caller sees every problem at once.
    pub async fn validate(&self, path: &Path) -> ValidationReport {
        let (file_type_valid, file_category, mime_type) =
            match self.sniffer.sniff_path(path).await {
                Ok(media_type) => match self.type_validator.check(path, &media_type) {
                    Ok(category) => (true, Some(category), Some(media_type)),
                    Err(e) => {
                        tracing::debug!(error = %e, "Validation: type check failed");
                        (false, None, Some(media_type))
                    }
                },
                Err(e) => {
                    tracing::debug!(error = %e, "Validation: file unreadable");
                    (false, None, None)
                }
            };

        let size = self.size_validator.check(path).await;

        ValidationReport {
            file_type_valid,
            file_category,
            mime_type,
            size_valid: size.within_limit,
            file_size: size.size,
            valid: file_type_valid && size.within_limit,
        }
    }
}
