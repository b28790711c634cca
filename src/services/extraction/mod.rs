//! Image text extraction service.
//!
//! Validates the image, stages uploads on disk, picks the cached reader for
//! the requested backend and configuration, and joins the recognized
//! fragments. Shared by the CLI and the web server.

mod types;

use std::path::Path;
use std::sync::Arc;

use crate::ocr::{with_staged_image, OcrBackend, OcrError, OcrResult, ReaderCache};
use crate::utils::detect_image_type;

pub use types::{ExtractOptions, Extraction};

/// Service for running OCR on images.
#[derive(Clone)]
pub struct ExtractionService {
    readers: Arc<ReaderCache>,
}

impl ExtractionService {
    /// Create a new extraction service backed by `readers`.
    pub fn new(readers: Arc<ReaderCache>) -> Self {
        Self { readers }
    }

    pub fn readers(&self) -> &Arc<ReaderCache> {
        &self.readers
    }

    /// Extract text from uploaded image bytes. Blocks while OCR runs.
    pub fn extract_bytes(
        &self,
        bytes: &[u8],
        options: &ExtractOptions,
    ) -> Result<Extraction, OcrError> {
        let reader = self.readers.get(options.backend, &options.config);
        let result = with_staged_image(bytes, |path| reader.recognize(path))?;
        Ok(finish(result, options))
    }

    /// Extract text from an image file on disk. Blocks while OCR runs.
    pub fn extract_file(&self, path: &Path, options: &ExtractOptions) -> Result<Extraction, OcrError> {
        let bytes = std::fs::read(path)?;
        if detect_image_type(&bytes).is_none() {
            return Err(OcrError::UnsupportedImage(format!(
                "{} is not a JPEG or PNG image",
                path.display()
            )));
        }
        let reader = self.readers.get(options.backend, &options.config);
        let result = reader.recognize(path)?;
        Ok(finish(result, options))
    }

    /// Extract text from uploaded bytes on the blocking thread pool.
    pub async fn extract_upload(
        &self,
        bytes: Vec<u8>,
        options: ExtractOptions,
    ) -> Result<Extraction, OcrError> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.extract_bytes(&bytes, &options))
            .await
            .map_err(|e| OcrError::OcrFailed(format!("OCR task failed: {}", e)))?
    }

    /// Get the reader that `options` would use.
    pub fn reader(&self, options: &ExtractOptions) -> Arc<dyn OcrBackend> {
        self.readers.get(options.backend, &options.config)
    }
}

fn finish(result: OcrResult, options: &ExtractOptions) -> Extraction {
    tracing::info!(
        "{} recognized {} fragments in {}ms",
        result.backend,
        result.fragments.len(),
        result.processing_time_ms
    );
    Extraction {
        text: result.text(options.join),
        fragments: result.fragments,
        backend: result.backend,
        processing_time_ms: result.processing_time_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::ocr::{JoinPolicy, OcrBackendType, TextFragment};

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];

    /// Records the paths it was asked to read and returns fixed fragments.
    struct FixedBackend {
        seen: Mutex<Vec<std::path::PathBuf>>,
    }

    impl OcrBackend for FixedBackend {
        fn backend_type(&self) -> OcrBackendType {
            OcrBackendType::Tesseract
        }

        fn is_available(&self) -> bool {
            true
        }

        fn availability_hint(&self) -> String {
            String::new()
        }

        fn recognize(&self, image_path: &Path) -> Result<OcrResult, OcrError> {
            assert!(image_path.exists());
            self.seen.lock().unwrap().push(image_path.to_path_buf());
            Ok(OcrResult {
                fragments: vec![
                    TextFragment::from_rect(0.0, 0.0, 5.0, 5.0, "Hello".to_string(), 0.9),
                    TextFragment::from_rect(0.0, 6.0, 5.0, 9.0, "नमस्ते".to_string(), 0.8),
                ],
                backend: OcrBackendType::Tesseract,
                processing_time_ms: 3,
            })
        }
    }

    fn service() -> (ExtractionService, Arc<FixedBackend>) {
        let backend = Arc::new(FixedBackend {
            seen: Mutex::new(Vec::new()),
        });
        let shared = Arc::clone(&backend);
        let readers = ReaderCache::with_factory(move |_, _| shared.clone() as Arc<dyn OcrBackend>);
        (ExtractionService::new(Arc::new(readers)), backend)
    }

    #[test]
    fn test_extract_bytes_joins_and_cleans_up() {
        let (service, backend) = service();
        let options = ExtractOptions::default();

        let extraction = service.extract_bytes(PNG_MAGIC, &options).unwrap();
        assert_eq!(extraction.text, "Hello\nनमस्ते");
        assert_eq!(extraction.fragments.len(), 2);
        assert!(!extraction.is_empty());

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(!seen[0].exists());
    }

    #[test]
    fn test_space_join() {
        let (service, _) = service();
        let options = ExtractOptions {
            join: JoinPolicy::Space,
            ..Default::default()
        };
        let extraction = service.extract_bytes(PNG_MAGIC, &options).unwrap();
        assert_eq!(extraction.text, "Hello नमस्ते");
    }

    #[test]
    fn test_rejects_non_image_upload() {
        let (service, backend) = service();
        let err = service
            .extract_bytes(b"%PDF-1.4", &ExtractOptions::default())
            .unwrap_err();
        assert!(matches!(err, OcrError::UnsupportedImage(_)));
        assert!(backend.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_extract_file_reads_in_place() {
        let (service, backend) = service();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        std::fs::write(&path, PNG_MAGIC).unwrap();

        service.extract_file(&path, &ExtractOptions::default()).unwrap();
        assert_eq!(backend.seen.lock().unwrap()[0], path);

        let text_path = dir.path().join("notes.txt");
        std::fs::write(&text_path, "hello").unwrap();
        assert!(matches!(
            service.extract_file(&text_path, &ExtractOptions::default()),
            Err(OcrError::UnsupportedImage(_))
        ));
    }

    #[tokio::test]
    async fn test_extract_upload_off_thread() {
        let (service, _) = service();
        let extraction = service
            .extract_upload(PNG_MAGIC.to_vec(), ExtractOptions::default())
            .await
            .unwrap();
        assert_eq!(extraction.backend, OcrBackendType::Tesseract);
        assert_eq!(extraction.processing_time_ms, 3);
    }
}
