//! Input classification and decoding.
//!
//! The media kind is resolved once when a document enters the pipeline;
//! everything downstream works on [`DocumentInput`].

use std::path::Path;

use image::RgbImage;
use tracing::warn;

use crate::ocr::OcrError;

/// File extensions accepted for upload.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tiff", "tif", "pdf"];

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Png,
    Jpeg,
    Bmp,
    Tiff,
    Pdf,
}

impl MediaKind {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "bmp" => Some(Self::Bmp),
            "tif" | "tiff" => Some(Self::Tiff),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.to_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/bmp" | "image/x-ms-bmp" => Some(Self::Bmp),
            "image/tiff" => Some(Self::Tiff),
            "application/pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Detect the kind from file content.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        infer::get(bytes).and_then(|kind| Self::from_mime(kind.mime_type()))
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Bmp => "image/bmp",
            Self::Tiff => "image/tiff",
            Self::Pdf => "application/pdf",
        }
    }

    pub fn is_pdf(&self) -> bool {
        matches!(self, Self::Pdf)
    }
}

/// A document ready for recognition.
#[derive(Debug, Clone)]
pub enum DocumentInput {
    /// A single decoded raster image.
    Image(RgbImage),
    /// Raw PDF bytes, rasterized page by page later.
    Pdf(Vec<u8>),
}

impl DocumentInput {
    /// Build an input from bytes and the kind the caller declared.
    ///
    /// When the content clearly belongs to the other family (a PDF uploaded
    /// with an image extension or the reverse) the content wins.
    pub fn from_bytes(bytes: Vec<u8>, declared: MediaKind) -> Result<Self, OcrError> {
        let kind = match MediaKind::sniff(&bytes) {
            Some(sniffed) if sniffed.is_pdf() != declared.is_pdf() => {
                warn!(
                    "Declared {} but content looks like {}, using content",
                    declared.mime_type(),
                    sniffed.mime_type()
                );
                sniffed
            }
            _ => declared,
        };

        if kind.is_pdf() {
            return Ok(Self::Pdf(bytes));
        }

        let image = image::load_from_memory(&bytes)
            .map_err(|e| OcrError::DocumentFormat(format!("Failed to decode image: {}", e)))?;
        Ok(Self::Image(image.to_rgb8()))
    }

    /// Read a file, taking the declared kind from its extension and falling
    /// back to content sniffing.
    pub fn from_path(path: &Path) -> Result<Self, OcrError> {
        let bytes = std::fs::read(path)?;
        let kind = MediaKind::from_path(path)
            .or_else(|| MediaKind::sniff(&bytes))
            .ok_or_else(|| {
                OcrError::DocumentFormat(format!(
                    "Unsupported file type: {} (expected one of: {})",
                    path.display(),
                    ACCEPTED_EXTENSIONS.join(", ")
                ))
            })?;
        Self::from_bytes(bytes, kind)
    }

    pub fn is_pdf(&self) -> bool {
        matches!(self, Self::Pdf(_))
    }
}
