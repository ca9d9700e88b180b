use std::path::Path;
use warden_core::ScanError;

/// Outcome of the size policy check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeCheck {
    pub within_limit: bool,
    pub size: u64,
}

/// Enforces the maximum accepted file size.
#[derive(Debug, Clone, Copy)]
pub struct SizeValidator {
    max_file_size_bytes: u64,
}

impl SizeValidator {
    pub fn new(max_file_size_bytes: u64) -> Self {
        Self {
            max_file_size_bytes,
        }
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_bytes
    }

    /// A file of exactly the maximum size is accepted.
    pub fn is_within_limit(&self, size: u64) -> bool {
        size <= self.max_file_size_bytes
    }

    pub async fn file_size(&self, path: &Path) -> Result<u64, ScanError> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| ScanError::io(path, e))?;
        Ok(metadata.len())
    }

    /// Stat the file and apply the limit. An unreadable file fails with size 0.
    pub async fn check(&self, path: &Path) -> SizeCheck {
        match self.file_size(path).await {
            Ok(size) => SizeCheck {
                within_limit: self.is_within_limit(size),
                size,
            },
            Err(e) => {
                tracing::error!(error = %e, "Error validating file size");
                SizeCheck {
                    within_limit: false,
                    size: 0,
                }
            }
        }
    }
}
