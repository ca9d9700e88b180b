use image::{ImageDecoder, ImageReader};
use std::path::{Path, PathBuf};
use warden_core::{ContentVerdict, ImageInfo, ScanConfig, ScanError};

/// Dimension sanity checks for files already classified as images.
///
/// Only the header is decoded, so a huge declared canvas costs nothing to inspect.
#[derive(Debug, Clone, Copy)]
pub struct ImageHeuristics {
    min_dimension: u32,
    max_dimension: u32,
}

impl ImageHeuristics {
    pub fn new(min_dimension: u32, max_dimension: u32) -> Self {
        Self {
            min_dimension,
            max_dimension,
        }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(config.image_min_dimension, config.image_max_dimension)
    }

    /// Read width, height and color mode from the image header.
    pub fn inspect(path: &Path) -> Result<ImageInfo, ScanError> {
        let decoder = ImageReader::open(path)
            .map_err(|e| ScanError::io(path, e))?
            .with_guessed_format()
            .map_err(|e| ScanError::io(path, e))?
            .into_decoder()
            .map_err(|e| ScanError::Decode(e.to_string()))?;

        let (width, height) = decoder.dimensions();
        let color = decoder.color_type();
        Ok(ImageInfo {
            width,
            height,
            color_mode: format!("{:?}", color),
            has_alpha: color.has_alpha(),
        })
    }

    /// Both bounds are inclusive; the lower bound is checked first.
    pub fn evaluate(&self, info: &ImageInfo) -> ContentVerdict {
        if info.width < self.min_dimension || info.height < self.min_dimension {
            return ContentVerdict::unsafe_because("Image too small");
        }
        if info.width > self.max_dimension || info.height > self.max_dimension {
            return ContentVerdict::unsafe_because("Image too large");
        }
        ContentVerdict::Safe
    }

    /// Inspect and evaluate off the async runtime. A file that cannot be decoded is unsafe.
    pub async fn analyze(&self, path: &Path) -> (ContentVerdict, Option<ImageInfo>) {
        let owned: PathBuf = path.to_path_buf();
        let inspected = match tokio::task::spawn_blocking(move || Self::inspect(&owned)).await {
            Ok(result) => result,
            Err(e) => Err(ScanError::Decode(format!("task join error: {}", e))),
        };

        match inspected {
            Ok(info) => {
                if info.has_alpha {
                    tracing::info!(
                        color_mode = %info.color_mode,
                        "Image has an alpha channel"
                    );
                }
                let verdict = self.evaluate(&info);
                if let ContentVerdict::Unsafe { reason } = &verdict {
                    tracing::warn!(
                        width = info.width,
                        height = info.height,
                        reason = %reason,
                        "Image failed content heuristics"
                    );
                }
                (verdict, Some(info))
            }
            Err(e) => {
                tracing::warn!(error = %e, path = %path.display(), "Image analysis failed");
                (
                    ContentVerdict::unsafe_because(format!("Analysis error: {}", e)),
                    None,
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, RgbImage, RgbaImage};

    fn heuristics() -> ImageHeuristics {
        ImageHeuristics::from_config(&ScanConfig::default())
    }

    #[tokio::test]
    async fn test_too_small() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.png");
        GrayImage::new(9, 9).save(&path).unwrap();

        let (verdict, info) = heuristics().analyze(&path).await;
        assert_eq!(verdict, ContentVerdict::unsafe_because("Image too small"));
        assert_eq!(info.unwrap().width, 9);
    }

    #[tokio::test]
    async fn test_minimum_is_inclusive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edge.png");
        RgbImage::new(10, 10).save(&path).unwrap();

        let (verdict, info) = heuristics().analyze(&path).await;
        assert_eq!(verdict, ContentVerdict::Safe);
        let info = info.unwrap();
        assert_eq!(info.color_mode, "Rgb8");
        assert!(!info.has_alpha);
    }

    #[tokio::test]
    async fn test_too_large() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("banner.png");
        GrayImage::new(10_001, 20).save(&path).unwrap();

        let (verdict, _) = heuristics().analyze(&path).await;
        assert_eq!(verdict, ContentVerdict::unsafe_because("Image too large"));
    }

    #[tokio::test]
    async fn test_alpha_is_informational() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overlay.png");
        RgbaImage::new(64, 32).save(&path).unwrap();

        let (verdict, info) = heuristics().analyze(&path).await;
        assert_eq!(verdict, ContentVerdict::Safe);
        let info = info.unwrap();
        assert!(info.has_alpha);
        assert_eq!((info.width, info.height), (64, 32));
    }

    #[tokio::test]
    async fn test_tiff_and_icon_are_decoded() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["scan.tiff", "favicon.ico"] {
            let path = dir.path().join(name);
            RgbaImage::new(32, 32).save(&path).unwrap();

            let (verdict, info) = heuristics().analyze(&path).await;
            assert_eq!(verdict, ContentVerdict::Safe, "{}", name);
            assert_eq!(info.unwrap().width, 32);
        }
    }

    #[tokio::test]
    async fn test_corrupt_image_is_unsafe() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        let mut bytes = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.extend_from_slice(b"definitely not an IHDR chunk");
        std::fs::write(&path, bytes).unwrap();

        let (verdict, info) = heuristics().analyze(&path).await;
        assert!(info.is_none());
        match verdict {
            ContentVerdict::Unsafe { reason } => assert!(reason.starts_with("Analysis error:")),
            other => panic!("expected Unsafe, got {:?}", other),
        }
    }

    #[test]
    fn test_small_checked_before_large() {
        let info = ImageInfo {
            width: 5,
            height: 20_000,
            color_mode: "L8".to_string(),
            has_alpha: false,
        };
        assert_eq!(
            heuristics().evaluate(&info),
            ContentVerdict::unsafe_because("Image too small")
        );
    }
}
