use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Coarse file classification used to pick which sniffed media types are acceptable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Image,
    Video,
    Document,
}

impl FileCategory {
    /// Lookup order used by the type validator.
    pub const ALL: [FileCategory; 3] = [
        FileCategory::Image,
        FileCategory::Video,
        FileCategory::Document,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileCategory::Image => "image",
            FileCategory::Video => "video",
            FileCategory::Document => "document",
        }
    }

    /// Filename extensions accepted for this category when nothing is configured.
    pub fn default_extensions(&self) -> &'static [&'static str] {
        match self {
            FileCategory::Image => &["jpg", "jpeg", "png", "gif", "bmp", "webp"],
            FileCategory::Video => &["mp4", "avi", "mov", "wmv", "flv", "webm"],
            FileCategory::Document => &["pdf", "doc", "docx", "txt", "rtf", "odt"],
        }
    }

    /// Media type prefixes the sniffed content must start with for this category.
    pub fn default_mime_prefixes(&self) -> &'static [&'static str] {
        match self {
            FileCategory::Image => &["image/"],
            FileCategory::Video => &["video/"],
            FileCategory::Document => &[
                "application/pdf",
                "application/msword",
                "text/",
                "application/vnd.",
            ],
        }
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
