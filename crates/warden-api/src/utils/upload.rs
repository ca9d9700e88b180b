//! Multipart upload handling
//!
//! The single `file` field is streamed into a named temp file that keeps the client's
//! extension, since the type check compares it with the file content. The temp file is
//! deleted when the returned [`Upload`] is dropped.

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use axum::http::StatusCode;
use std::path::Path;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use warden_core::AppError;

const MAX_EXTENSION_LEN: usize = 16;
#[cfg(unix)]
const UPLOAD_FILE_MODE: u32 = 0o644;

/// A received file, on disk for as long as this value lives.
#[derive(Debug)]
pub struct Upload {
    file: NamedTempFile,
    pub original_filename: String,
    pub size: u64,
}

impl Upload {
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Extract exactly one field named "file" from the form into a temp file.
pub async fn receive_upload(mut multipart: Multipart) -> Result<Upload, AppError> {
    let mut upload: Option<Upload> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        if upload.is_some() {
            return Err(AppError::InvalidInput(
                "Multiple file fields are not allowed; send exactly one field named 'file'"
                    .to_string(),
            ));
        }
        upload = Some(write_field(field).await?);
    }

    upload.ok_or_else(|| AppError::InvalidInput("No file provided".to_string()))
}

async fn write_field(mut field: Field<'_>) -> Result<Upload, AppError> {
    let original_filename = field
        .file_name()
        .map(str::to_string)
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| AppError::InvalidInput("No file selected".to_string()))?;

    let file = create_upload_file(&original_filename)?;

    let mut writer = tokio::fs::File::from_std(file.reopen()?);
    let mut size: u64 = 0;
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        writer.write_all(&chunk).await?;
        size += chunk.len() as u64;
    }
    writer.flush().await?;

    tracing::debug!(
        filename = %original_filename,
        size,
        temp_path = %file.path().display(),
        "Upload written to temp file"
    );

    Ok(Upload {
        file,
        original_filename,
        size,
    })
}

/// Temp file for an upload, readable by the clamd user so the daemon can open the same path.
fn create_upload_file(original_filename: &str) -> std::io::Result<NamedTempFile> {
    let suffix = safe_extension(original_filename).map(|ext| format!(".{}", ext));
    let mut builder = tempfile::Builder::new();
    builder.prefix("warden-upload-");
    if let Some(suffix) = &suffix {
        builder.suffix(suffix);
    }
    let file = builder.tempfile()?;
    // Set after creation so the process umask cannot narrow it.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.as_file()
            .set_permissions(std::fs::Permissions::from_mode(UPLOAD_FILE_MODE))?;
    }
    Ok(file)
}

/// The client's extension if it is short and plain ASCII alphanumeric, lowercased.
pub fn safe_extension(filename: &str) -> Option<String> {
    let base = Path::new(filename).file_name()?.to_str()?;
    let (stem, ext) = base.rsplit_once('.')?;
    if stem.is_empty()
        || ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("Request body too large: {}", err.body_text()))
    } else {
        AppError::InvalidInput(format!("Failed to read multipart: {}", err.body_text()))
    }
}
