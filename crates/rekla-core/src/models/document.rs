//! Input document model.

/// Declared media type of an input document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    /// PDF document (text layer and/or scanned pages).
    Pdf,
    /// Raster image (PNG, JPEG, TIFF, ...).
    Image,
}

/// An opaque document payload handed to the scanner.
///
/// Owned by the facade for the duration of a single parse call and never
/// persisted by the core.
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// Raw file bytes.
    pub bytes: Vec<u8>,
    /// Declared media type.
    pub media_type: MediaType,
}

impl RawDocument {
    /// Wrap PDF bytes.
    pub fn pdf(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            media_type: MediaType::Pdf,
        }
    }

    /// Wrap image bytes.
    pub fn image(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            media_type: MediaType::Image,
        }
    }
}
