use std::path::Path;
use warden_core::{CategoryPolicy, FileCategory, MediaType, ScanConfig, ScanError};

/// Why a file failed the extension/content cross-check.
///
/// Every variant is the same "invalid file type" outcome for the pipeline; the variant only
/// adds detail for logs and the report's error message.
#[derive(Debug, thiserror::Error)]
pub enum TypeRejection {
    #[error("{0}")]
    Unreadable(#[source] ScanError),

    #[error("content type could not be determined")]
    UnknownMediaType,

    #[error("filename has no extension")]
    MissingExtension,

    #[error("extension '{0}' is not accepted")]
    UnsupportedExtension(String),

    #[error("extension '{extension}' does not match detected content '{media_type}'")]
    ContentMismatch {
        extension: String,
        media_type: MediaType,
    },
}

/// Cross-checks a filename extension against the sniffed media type.
///
/// The extension only selects candidate categories; acceptance always depends on the sniffed
/// content type matching one of the category's prefixes. This stops an executable renamed to
/// `.jpg` from being admitted as an image.
#[derive(Clone, Debug)]
pub struct TypeValidator {
    categories: Vec<CategoryPolicy>,
}

impl TypeValidator {
    pub fn new(categories: Vec<CategoryPolicy>) -> Self {
        Self { categories }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(config.categories.clone())
    }

    /// Returns the first category whose extension set contains the file's extension and whose
    /// prefixes match `media_type`.
    pub fn check(&self, path: &Path, media_type: &MediaType) -> Result<FileCategory, TypeRejection> {
        if media_type.is_unknown() {
            return Err(TypeRejection::UnknownMediaType);
        }

        let extension = extension_of(path).ok_or(TypeRejection::MissingExtension)?;

        let mut claimed = false;
        for policy in &self.categories {
            if !policy.extensions.iter().any(|e| *e == extension) {
                continue;
            }
            claimed = true;
            if media_type.matches_any_prefix(policy.mime_prefixes.as_slice()) {
                return Ok(policy.category);
            }
        }

        if claimed {
            Err(TypeRejection::ContentMismatch {
                extension,
                media_type: media_type.clone(),
            })
        } else {
            Err(TypeRejection::UnsupportedExtension(extension))
        }
    }
}

/// Lowercased extension without the leading dot.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .filter(|e| !e.is_empty())
}
