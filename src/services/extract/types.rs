//! Extraction service types and events.

use image::RgbImage;

use crate::ocr::RecognizedRegion;
use crate::text::DocumentResult;

/// Events emitted while a document is processed.
#[derive(Debug, Clone)]
pub enum ExtractEvent {
    /// Engine for the requested languages is ready (built or cached).
    EngineReady { languages: String },
    /// Number of pages about to be recognized.
    PageCount { total: usize },
    /// Page recognition started
    PageStarted { page_number: u32 },
    /// Page recognition completed
    PageCompleted { page_number: u32, regions: usize },
    /// All pages recognized and assembled
    Finished { pages: usize, chars: usize },
}

/// Recognition output for one page.
#[derive(Debug, Clone)]
pub struct PageOutcome {
    pub page_number: u32,
    /// Regions in engine order.
    pub regions: Vec<RecognizedRegion>,
    /// Normalized page text.
    pub text: String,
    /// Annotated copy of the page, when annotations were requested.
    pub annotated: Option<RgbImage>,
}

/// Result of extracting one document.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Final assembled text.
    pub text: String,
    /// Per-page normalized text.
    pub document: DocumentResult,
    /// Per-page details in page order.
    pub pages: Vec<PageOutcome>,
    /// Whether the input was a PDF (and the text carries page delimiters).
    pub is_pdf: bool,
}
