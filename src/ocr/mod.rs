//! OCR engines.
//!
//! Engines are built per [`LanguageSet`] by an [`EngineFactory`] and shared
//! through the [`EngineCache`]. Tesseract is the bundled backend.

mod backend;
mod cache;
mod languages;
mod tesseract;
pub mod tools;

pub use backend::{
    BoundingBox, EngineFactory, ErrorKind, OcrError, Point, RecognitionEngine, RecognizedRegion,
};
pub use cache::EngineCache;
pub use languages::{lookup, Language, LanguageSet, DEFAULT_LANGUAGES, LANGUAGES};
pub use tesseract::{TesseractEngine, TesseractFactory};
