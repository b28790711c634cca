//! Lazily-initialized OCR readers.
//!
//! Engines are expensive to start (model loading), so one backend instance is
//! created per (backend type, configuration) on first use and reused for
//! every later request with the same configuration.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use super::backend::{OcrBackend, OcrBackendType, OcrConfig};
use super::easyocr::EasyOcrBackend;
use super::tesseract::TesseractBackend;

/// Cache key: backend type plus its full configuration.
type ReaderKey = (OcrBackendType, OcrConfig);

/// Builds a backend instance for a key.
pub type BackendFactory = dyn Fn(OcrBackendType, &OcrConfig) -> Arc<dyn OcrBackend> + Send + Sync;

/// Create a backend of the given type.
pub fn create_backend(
    backend: OcrBackendType,
    config: &OcrConfig,
    python: Option<&PathBuf>,
) -> Arc<dyn OcrBackend> {
    match backend {
        OcrBackendType::Tesseract => Arc::new(TesseractBackend::with_config(config.clone())),
        OcrBackendType::EasyOcr => {
            let easy = EasyOcrBackend::with_config(config.clone());
            match python {
                Some(path) => Arc::new(easy.with_python(path.clone())),
                None => Arc::new(easy),
            }
        }
    }
}

/// Reusable OCR readers keyed by backend and configuration.
pub struct ReaderCache {
    readers: RwLock<HashMap<ReaderKey, Arc<dyn OcrBackend>>>,
    factory: Box<BackendFactory>,
}

impl ReaderCache {
    /// Create a cache that builds the built-in backends.
    ///
    /// `python` overrides the interpreter used for EasyOCR.
    pub fn new(python: Option<PathBuf>) -> Self {
        Self::with_factory(move |backend, config| create_backend(backend, config, python.as_ref()))
    }

    /// Create a cache with a custom backend factory.
    pub fn with_factory<F>(factory: F) -> Self
    where
        F: Fn(OcrBackendType, &OcrConfig) -> Arc<dyn OcrBackend> + Send + Sync + 'static,
    {
        Self {
            readers: RwLock::new(HashMap::new()),
            factory: Box::new(factory),
        }
    }

    /// Get the reader for `backend` and `config`, creating it on first use.
    pub fn get(&self, backend: OcrBackendType, config: &OcrConfig) -> Arc<dyn OcrBackend> {
        let key = (backend, config.clone());

        if let Ok(readers) = self.readers.read() {
            if let Some(reader) = readers.get(&key) {
                return Arc::clone(reader);
            }
        }

        let mut readers = match self.readers.write() {
            Ok(r) => r,
            Err(poisoned) => poisoned.into_inner(),
        };
        // Another request may have created it while we waited for the lock.
        if let Some(reader) = readers.get(&key) {
            return Arc::clone(reader);
        }

        tracing::info!(
            "Initializing {} reader (languages: {}, gpu: {})",
            backend,
            config.languages.join(","),
            config.use_gpu
        );
        let reader = (self.factory)(backend, config);
        readers.insert(key, Arc::clone(&reader));
        reader
    }

    /// Number of initialized readers.
    pub fn len(&self) -> usize {
        self.readers.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ReaderCache {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::ocr::{OcrError, OcrResult};

    struct NullBackend;

    impl OcrBackend for NullBackend {
        fn backend_type(&self) -> OcrBackendType {
            OcrBackendType::Tesseract
        }

        fn is_available(&self) -> bool {
            true
        }

        fn availability_hint(&self) -> String {
            String::new()
        }

        fn recognize(&self, _image_path: &Path) -> Result<OcrResult, OcrError> {
            Ok(OcrResult {
                fragments: Vec::new(),
                backend: OcrBackendType::Tesseract,
                processing_time_ms: 0,
            })
        }
    }

    fn counting_cache() -> (ReaderCache, Arc<AtomicUsize>) {
        let created = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&created);
        let cache = ReaderCache::with_factory(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Arc::new(NullBackend)
        });
        (cache, created)
    }

    #[test]
    fn test_reuses_reader_for_same_config() {
        let (cache, created) = counting_cache();
        let config = OcrConfig::default();

        let a = cache.get(OcrBackendType::Tesseract, &config);
        let b = cache.get(OcrBackendType::Tesseract, &config);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(created.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_separate_readers_per_language_and_gpu() {
        let (cache, created) = counting_cache();
        assert!(cache.is_empty());

        cache.get(OcrBackendType::Tesseract, &OcrConfig::default());
        cache.get(OcrBackendType::Tesseract, &OcrConfig::new(vec!["en".into()], false));
        cache.get(OcrBackendType::Tesseract, &OcrConfig::new(Vec::new(), true));
        cache.get(OcrBackendType::EasyOcr, &OcrConfig::default());

        assert_eq!(created.load(Ordering::SeqCst), 4);
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn test_default_factory_builds_requested_backend() {
        let cache = ReaderCache::default();
        let reader = cache.get(OcrBackendType::EasyOcr, &OcrConfig::default());
        assert_eq!(reader.backend_type(), OcrBackendType::EasyOcr);
        let reader = cache.get(OcrBackendType::Tesseract, &OcrConfig::default());
        assert_eq!(reader.backend_type(), OcrBackendType::Tesseract);
    }
}
