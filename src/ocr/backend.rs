//! Recognition engine abstraction.
//!
//! An engine is bound to a fixed [`LanguageSet`] when it is constructed and
//! afterwards only recognizes raster images. Construction is expensive (model
//! loading), so engines are built through an [`EngineFactory`] and shared via
//! the [`EngineCache`](super::EngineCache).

use std::sync::Arc;

use image::RgbImage;
use thiserror::Error;

use super::languages::LanguageSet;
use super::tools::TESSERACT;

/// Errors from the document-to-text pipeline.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Invalid document: {0}")]
    DocumentFormat(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Unsupported language: {code}")]
    UnsupportedLanguage { code: String },

    #[error("Engine construction failed: {0}")]
    EngineConstruction(String),

    #[error("Recognition failed: {0}")]
    RecognitionFailed(String),

    #[error("Confidence {confidence} for region {text:?} is outside [0, 1]")]
    ConfidenceOutOfRange { text: String, confidence: f32 },

    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of [`OcrError`] for callers that translate errors
/// into user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    DocumentFormat,
    Configuration,
    UnsupportedLanguage,
    EngineConstruction,
    Runtime,
}

impl OcrError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OcrError::DocumentFormat(_) => ErrorKind::DocumentFormat,
            OcrError::Configuration(_) => ErrorKind::Configuration,
            OcrError::UnsupportedLanguage { .. } => ErrorKind::UnsupportedLanguage,
            OcrError::EngineConstruction(_) => ErrorKind::EngineConstruction,
            // Only the OCR binary is part of engine construction; missing
            // rasterizer tools are an environment problem.
            OcrError::ToolNotFound(tool) if tool == TESSERACT => ErrorKind::EngineConstruction,
            OcrError::ToolNotFound(_) => ErrorKind::Configuration,
            OcrError::RecognitionFailed(_)
            | OcrError::ConfidenceOutOfRange { .. }
            | OcrError::Io(_) => ErrorKind::Runtime,
        }
    }
}

/// A point in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle enclosing a region polygon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

/// One detected text region.
///
/// Regions come back in the engine's detection order, which is not
/// necessarily reading order.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedRegion {
    /// Quadrilateral corners, clockwise from top-left.
    pub polygon: [Point; 4],
    /// Recognized text.
    pub text: String,
    /// Recognition confidence (0.0 - 1.0).
    pub confidence: f32,
}

impl RecognizedRegion {
    /// Build a region from an axis-aligned box given as `(left, top, width, height)`.
    pub fn from_rect(
        left: f32,
        top: f32,
        width: f32,
        height: f32,
        text: String,
        confidence: f32,
    ) -> Self {
        let right = left + width;
        let bottom = top + height;
        Self {
            polygon: [
                Point::new(left, top),
                Point::new(right, top),
                Point::new(right, bottom),
                Point::new(left, bottom),
            ],
            text,
            confidence,
        }
    }

    /// Smallest axis-aligned rectangle containing every polygon point.
    pub fn bounding_box(&self) -> BoundingBox {
        let mut min = self.polygon[0];
        let mut max = self.polygon[0];
        for p in &self.polygon[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        BoundingBox { min, max }
    }

    /// Reject confidences the engine should never have produced.
    pub fn validate(&self) -> Result<(), OcrError> {
        if (0.0..=1.0).contains(&self.confidence) {
            Ok(())
        } else {
            Err(OcrError::ConfidenceOutOfRange {
                text: self.text.clone(),
                confidence: self.confidence,
            })
        }
    }
}

/// A constructed OCR engine bound to one language set.
pub trait RecognitionEngine: Send + Sync {
    /// Languages this engine was built for.
    fn languages(&self) -> &LanguageSet;

    /// Run detection and recognition over one image.
    ///
    /// An image without detectable text yields an empty vector.
    fn recognize(&self, image: &RgbImage) -> Result<Vec<RecognizedRegion>, OcrError>;
}

/// Builds engines. Construction may be slow, so callers go through the
/// engine cache.
pub trait EngineFactory: Send + Sync {
    /// Short backend name for logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Construct an engine configured for exactly `languages`.
    fn construct(&self, languages: &LanguageSet) -> Result<Arc<dyn RecognitionEngine>, OcrError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box_of_axis_aligned_polygon() {
        let region = RecognizedRegion {
            polygon: [
                Point::new(10.0, 20.0),
                Point::new(50.0, 20.0),
                Point::new(50.0, 40.0),
                Point::new(10.0, 40.0),
            ],
            text: "box".to_string(),
            confidence: 0.9,
        };
        let bbox = region.bounding_box();
        assert_eq!(bbox.min, Point::new(10.0, 20.0));
        assert_eq!(bbox.max, Point::new(50.0, 40.0));
    }

    #[test]
    fn test_bounding_box_of_rotated_polygon() {
        let region = RecognizedRegion {
            polygon: [
                Point::new(30.0, 5.0),
                Point::new(60.0, 25.0),
                Point::new(40.0, 55.0),
                Point::new(8.0, 30.0),
            ],
            text: "tilted".to_string(),
            confidence: 0.5,
        };
        let bbox = region.bounding_box();
        assert_eq!(bbox.min, Point::new(8.0, 5.0));
        assert_eq!(bbox.max, Point::new(60.0, 55.0));
    }

    #[test]
    fn test_from_rect_corners() {
        let region = RecognizedRegion::from_rect(1.0, 2.0, 3.0, 4.0, "x".to_string(), 1.0);
        assert_eq!(region.polygon[2], Point::new(4.0, 6.0));
        assert_eq!(region.polygon[3], Point::new(1.0, 6.0));
    }

    #[test]
    fn test_validate_confidence_bounds() {
        let mut region = RecognizedRegion::from_rect(0.0, 0.0, 1.0, 1.0, "a".to_string(), 0.0);
        assert!(region.validate().is_ok());
        region.confidence = 1.0;
        assert!(region.validate().is_ok());
        region.confidence = 1.01;
        assert!(matches!(
            region.validate(),
            Err(OcrError::ConfidenceOutOfRange { .. })
        ));
        region.confidence = -0.1;
        assert!(region.validate().is_err());
        region.confidence = f32::NAN;
        assert!(region.validate().is_err());
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            OcrError::UnsupportedLanguage {
                code: "xx".to_string()
            }
            .kind(),
            ErrorKind::UnsupportedLanguage
        );
        assert_eq!(
            OcrError::ToolNotFound("tesseract".to_string()).kind(),
            ErrorKind::EngineConstruction
        );
        assert_eq!(
            OcrError::DocumentFormat("bad".to_string()).kind(),
            ErrorKind::DocumentFormat
        );
    }

    #[test]
    fn test_missing_rasterizer_tool_is_configuration() {
        for tool in ["pdftoppm", "pdfinfo"] {
            assert_eq!(
                OcrError::ToolNotFound(tool.to_string()).kind(),
                ErrorKind::Configuration
            );
        }
    }

    #[test]
    fn test_unsupported_language_message_names_code() {
        let err = OcrError::UnsupportedLanguage {
            code: "klingon".to_string(),
        };
        assert!(err.to_string().contains("klingon"));
    }
}
