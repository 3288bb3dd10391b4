//! Service layer for textgrab.
//!
//! Pipeline logic separated from UI concerns, usable from the CLI or any
//! other front end.

pub mod extract;

pub use extract::{ExtractEvent, Extraction, ExtractionService, PageOutcome};
