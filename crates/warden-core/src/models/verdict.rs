use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Outcome of the malware scanning stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ScanVerdict {
    Clean,
    Infected { signature: String },
    Error { message: String },
}

impl ScanVerdict {
    pub fn infected(signature: impl Into<String>) -> Self {
        ScanVerdict::Infected {
            signature: signature.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ScanVerdict::Error {
            message: message.into(),
        }
    }

    pub fn is_clean(&self) -> bool {
        matches!(self, ScanVerdict::Clean)
    }
}

/// Outcome of the content heuristics stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ContentVerdict {
    Safe,
    Unsafe { reason: String },
}

impl ContentVerdict {
    pub fn unsafe_because(reason: impl Into<String>) -> Self {
        ContentVerdict::Unsafe {
            reason: reason.into(),
        }
    }

    pub fn is_safe(&self) -> bool {
        matches!(self, ContentVerdict::Safe)
    }
}

/// Header facts observed while checking an image. Informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    /// Decoder color type, e.g. `Rgba8`.
    pub color_mode: String,
    pub has_alpha: bool,
}
