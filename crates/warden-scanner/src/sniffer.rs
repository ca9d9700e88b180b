//! Content sniffing using magic number detection
//!
//! The media type is derived from the leading bytes of the file only. The filename is never
//! consulted here; cross-checking it against the sniffed type is the job of
//! [`TypeValidator`](crate::TypeValidator).

use infer::Infer;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncReadExt;
use warden_core::{MediaType, ScanError};

/// Bytes read from the start of a file for detection.
pub const DETECTION_WINDOW_BYTES: usize = 8192;

pub const EMPTY_MEDIA_TYPE: &str = "application/x-empty";
pub const TEXT_MEDIA_TYPE: &str = "text/plain";
pub const BINARY_MEDIA_TYPE: &str = "application/octet-stream";

/// Matcher names that differ from the libmagic names the category prefixes are written for.
const MEDIA_TYPE_ALIASES: &[(&str, &str)] = &[
    (
        "application/vnd.microsoft.portable-executable",
        "application/x-dosexec",
    ),
    ("application/vnd.android.dex", "application/x-dex"),
    ("application/vnd.rar", "application/x-rar"),
    ("application/rtf", "text/rtf"),
];

/// Long-lived sniffing handle. Build once at startup and share by reference.
pub struct ContentSniffer {
    infer: Infer,
    max_detection_bytes: usize,
}

impl ContentSniffer {
    pub fn new() -> Self {
        Self::with_window(DETECTION_WINDOW_BYTES)
    }

    pub fn with_window(max_detection_bytes: usize) -> Self {
        Self {
            infer: Infer::new(),
            max_detection_bytes: max_detection_bytes.max(1),
        }
    }

    /// Sniff the media type of the file at `path`.
    ///
    /// Fails only when the file cannot be opened or read.
    pub async fn sniff_path(&self, path: &Path) -> Result<MediaType, ScanError> {
        let mut file = fs::File::open(path)
            .await
            .map_err(|e| ScanError::io(path, e))?;

        let mut buffer = vec![0u8; self.max_detection_bytes];
        let mut filled = 0;
        while filled < buffer.len() {
            let read = file
                .read(&mut buffer[filled..])
                .await
                .map_err(|e| ScanError::io(path, e))?;
            if read == 0 {
                break;
            }
            filled += read;
        }
        buffer.truncate(filled);

        let media_type = self.sniff_bytes(&buffer);
        tracing::debug!(
            path = %path.display(),
            media_type = %media_type,
            bytes_inspected = filled,
            "Sniffed file content"
        );
        Ok(media_type)
    }

    /// Sniff the media type of an in-memory prefix of a file.
    pub fn sniff_bytes(&self, content: &[u8]) -> MediaType {
        if content.is_empty() {
            return MediaType::new(EMPTY_MEDIA_TYPE);
        }

        if let Some(kind) = self.infer.get(content) {
            let detected = kind.mime_type();
            let normalized = MEDIA_TYPE_ALIASES
                .iter()
                .find(|(from, _)| *from == detected)
                .map(|(_, to)| *to)
                .unwrap_or(detected);
            return MediaType::new(normalized);
        }

        if looks_like_text(content) {
            MediaType::new(TEXT_MEDIA_TYPE)
        } else {
            MediaType::new(BINARY_MEDIA_TYPE)
        }
    }
}

impl Default for ContentSniffer {
    fn default() -> Self {
        Self::new()
    }
}

/// No control bytes other than common whitespace. Bytes above 0x7F are accepted so that
/// Latin-1 and Windows-1252 text is recognised alongside UTF-8.
fn looks_like_text(content: &[u8]) -> bool {
    !content
        .iter()
        .any(|b| matches!(b, 0x00..=0x08 | 0x0e..=0x1a | 0x1c..=0x1f | 0x7f))
}
