//! textgrab - extract plain text from scanned images and PDFs.
//!
//! Documents are rasterized page by page, run through a multi-language OCR
//! engine, normalized and assembled into one text with page delimiters.

pub mod annotate;
pub mod cli;
pub mod config;
pub mod document;
pub mod ocr;
pub mod services;
pub mod text;
