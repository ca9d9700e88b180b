use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::io::AsyncReadExt;
use warden_core::ScanError;

const CHUNK_SIZE: usize = 4096;

/// Stream the file through SHA-256 and return the lowercase hex digest.
pub async fn sha256_file(path: &Path) -> Result<String, ScanError> {
    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(|e| ScanError::io(path, e))?;

    let mut hasher = Sha256::new();
    let mut chunk = vec![0u8; CHUNK_SIZE];
    loop {
        let read = file
            .read(&mut chunk)
            .await
            .map_err(|e| ScanError::io(path, e))?;
        if read == 0 {
            break;
        }
        hasher.update(&chunk[..read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Like [`sha256_file`], but a failure only yields `None`.
pub async fn hash_file(path: &Path) -> Option<String> {
    match sha256_file(path).await {
        Ok(digest) => Some(digest),
        Err(e) => {
            tracing::error!(error = %e, "Error generating file hash");
            None
        }
    }
}
