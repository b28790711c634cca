//! Image type detection for uploaded files.

/// Image formats accepted for OCR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageType {
    Jpeg,
    Png,
}

impl ImageType {
    /// File extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }

    fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/jpeg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            _ => None,
        }
    }
}

/// Sniff the image type from file content. Returns `None` for anything that
/// is not a JPEG or PNG.
pub fn detect_image_type(bytes: &[u8]) -> Option<ImageType> {
    infer::get(bytes).and_then(|kind| ImageType::from_mime(kind.mime_type()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    const JPEG_MAGIC: &[u8] = b"\xFF\xD8\xFF\xE0\0\x10JFIF\0";

    #[test]
    fn test_detects_png_and_jpeg() {
        assert_eq!(detect_image_type(PNG_MAGIC), Some(ImageType::Png));
        assert_eq!(detect_image_type(JPEG_MAGIC), Some(ImageType::Jpeg));
    }

    #[test]
    fn test_rejects_other_content() {
        assert_eq!(detect_image_type(b"%PDF-1.7\n"), None);
        assert_eq!(detect_image_type(b"plain text"), None);
        assert_eq!(detect_image_type(b""), None);
    }

    #[test]
    fn test_extension() {
        assert_eq!(ImageType::Jpeg.extension(), "jpg");
        assert_eq!(ImageType::Png.extension(), "png");
    }
}
