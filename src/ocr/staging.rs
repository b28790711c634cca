//! Staging uploaded image bytes on disk for path-based OCR engines.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use super::backend::OcrError;
use crate::utils::{detect_image_type, ImageType};

/// An uploaded image written to a temporary file.
///
/// The file is removed when the value is dropped or [`StagedImage::cleanup`]
/// is called.
pub struct StagedImage {
    file: NamedTempFile,
    image_type: ImageType,
}

impl StagedImage {
    /// Validate `bytes` as JPEG or PNG and write them to a temporary file.
    pub fn stage(bytes: &[u8]) -> Result<Self, OcrError> {
        if bytes.is_empty() {
            return Err(OcrError::UnsupportedImage("empty upload".to_string()));
        }
        let image_type = detect_image_type(bytes).ok_or_else(|| {
            OcrError::UnsupportedImage("expected a JPEG or PNG image".to_string())
        })?;

        let mut file = tempfile::Builder::new()
            .prefix("textsift-")
            .suffix(&format!(".{}", image_type.extension()))
            .tempfile()?;
        file.write_all(bytes)?;
        file.flush()?;

        tracing::debug!(
            "Staged {} byte {} upload at {}",
            bytes.len(),
            image_type.extension(),
            file.path().display()
        );
        Ok(Self { file, image_type })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn image_type(&self) -> ImageType {
        self.image_type
    }

    /// Delete the temporary file, logging (not failing) if removal fails.
    pub fn cleanup(self) {
        let path = self.file.path().to_path_buf();
        if let Err(e) = self.file.close() {
            tracing::warn!("Failed to remove staged image {}: {}", path.display(), e);
        }
    }
}

/// Stage `bytes`, run `f` on the staged path, then remove the file.
///
/// The file is removed whether `f` succeeds or fails.
pub fn with_staged_image<T, F>(bytes: &[u8], f: F) -> Result<T, OcrError>
where
    F: FnOnce(&Path) -> Result<T, OcrError>,
{
    let staged = StagedImage::stage(bytes)?;
    let result = f(staged.path());
    staged.cleanup();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];

    #[test]
    fn test_stage_png_uses_extension() {
        let staged = StagedImage::stage(PNG_MAGIC).unwrap();
        assert_eq!(staged.image_type(), ImageType::Png);
        assert_eq!(
            staged.path().extension().and_then(|e| e.to_str()),
            Some("png")
        );
        assert_eq!(std::fs::read(staged.path()).unwrap(), PNG_MAGIC);

        let path = staged.path().to_path_buf();
        staged.cleanup();
        assert!(!path.exists());
    }

    #[test]
    fn test_rejects_non_images() {
        let err = StagedImage::stage(b"just some text").err().unwrap();
        assert!(matches!(err, OcrError::UnsupportedImage(_)));

        let err = StagedImage::stage(b"").err().unwrap();
        assert!(matches!(err, OcrError::UnsupportedImage(_)));
    }

    #[test]
    fn test_file_removed_after_failure() {
        let mut seen = None;
        let result: Result<(), OcrError> = with_staged_image(PNG_MAGIC, |path| {
            seen = Some(path.to_path_buf());
            assert!(path.exists());
            Err(OcrError::OcrFailed("boom".to_string()))
        });
        assert!(result.is_err());
        assert!(!seen.unwrap().exists());
    }
}
