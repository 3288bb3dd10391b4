//! Text normalization and multi-page assembly.

use std::fmt;

use serde::Deserialize;

use crate::ocr::{OcrError, RecognizedRegion};

/// How page boundaries survive in the assembled document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PageBreaks {
    /// Collapse the whole document, delimiters included, onto one line.
    #[default]
    Flatten,
    /// Keep each delimiter on its own line and a blank line between pages.
    Preserve,
}

impl fmt::Display for PageBreaks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageBreaks::Flatten => write!(f, "flatten"),
            PageBreaks::Preserve => write!(f, "preserve"),
        }
    }
}

/// Collapse every run of whitespace into one space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// One line per region in engine order, then collapsed.
pub fn normalize_page(regions: &[RecognizedRegion]) -> String {
    let joined = regions
        .iter()
        .map(|r| r.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    collapse_whitespace(&joined)
}

/// Normalized text of one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub page_number: u32,
    pub text: String,
}

/// Per-page texts in page order, numbered contiguously from 1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentResult {
    pages: Vec<PageText>,
}

impl DocumentResult {
    /// Order pages by number and check there are no gaps.
    pub fn from_pages(mut pages: Vec<PageText>) -> Result<Self, OcrError> {
        pages.sort_by_key(|p| p.page_number);
        for (i, page) in pages.iter().enumerate() {
            let expected = i as u32 + 1;
            if page.page_number != expected {
                return Err(OcrError::RecognitionFailed(format!(
                    "page sequence broken: expected page {}, found page {}",
                    expected, page.page_number
                )));
            }
        }
        Ok(Self { pages })
    }

    pub fn pages(&self) -> &[PageText] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Join pages behind `=== Page N ===` delimiters.
    pub fn assemble(&self, page_breaks: PageBreaks) -> String {
        let joined = self
            .pages
            .iter()
            .map(|p| format!("=== Page {} ===\n{}", p.page_number, p.text))
            .collect::<Vec<_>>()
            .join("\n\n");

        match page_breaks {
            PageBreaks::Flatten => collapse_whitespace(&joined),
            PageBreaks::Preserve => joined,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(text: &str) -> RecognizedRegion {
        RecognizedRegion::from_rect(0.0, 0.0, 10.0, 10.0, text.to_string(), 0.9)
    }

    fn page(page_number: u32, text: &str) -> PageText {
        PageText {
            page_number,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \t b\n\n c  "), "a b c");
        assert_eq!(collapse_whitespace(""), "");
        assert_eq!(collapse_whitespace(" \n\t "), "");
        assert_eq!(collapse_whitespace("isang\u{00a0}salita"), "isang salita");
    }

    #[test]
    fn test_collapse_is_idempotent() {
        let samples = [
            "",
            "plain",
            "  leading and trailing  ",
            "line\nbreaks\r\nand\ttabs",
            "=== Page 1 ===\nHello\n\n=== Page 2 ===\nFoo",
            "\u{3000}wide\u{2003}spaces\u{205f}",
        ];
        for sample in samples {
            let once = collapse_whitespace(sample);
            assert_eq!(collapse_whitespace(&once), once, "{:?}", sample);
        }
    }

    #[test]
    fn test_normalize_page() {
        let regions = vec![region("Hello "), region("  World\n"), region("again")];
        assert_eq!(normalize_page(&regions), "Hello World again");
        assert_eq!(normalize_page(&[]), "");
    }

    #[test]
    fn test_assemble_flattened() {
        let doc = DocumentResult::from_pages(vec![page(1, "Hello World"), page(2, "Foo")]).unwrap();
        assert_eq!(
            doc.assemble(PageBreaks::Flatten),
            collapse_whitespace("=== Page 1 === Hello World  === Page 2 === Foo")
        );
        assert_eq!(
            doc.assemble(PageBreaks::Flatten),
            "=== Page 1 === Hello World === Page 2 === Foo"
        );
    }

    #[test]
    fn test_assemble_preserving_breaks() {
        let doc = DocumentResult::from_pages(vec![page(1, "Hello World"), page(2, "Foo")]).unwrap();
        assert_eq!(
            doc.assemble(PageBreaks::Preserve),
            "=== Page 1 ===\nHello World\n\n=== Page 2 ===\nFoo"
        );
    }

    #[test]
    fn test_empty_page_keeps_delimiter() {
        let doc = DocumentResult::from_pages(vec![page(1, ""), page(2, "Foo")]).unwrap();
        assert_eq!(
            doc.assemble(PageBreaks::Flatten),
            "=== Page 1 === === Page 2 === Foo"
        );
    }

    #[test]
    fn test_pages_are_reordered() {
        let doc =
            DocumentResult::from_pages(vec![page(3, "c"), page(1, "a"), page(2, "b")]).unwrap();
        let numbers: Vec<u32> = doc.pages().iter().map(|p| p.page_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_gap_is_rejected() {
        assert!(DocumentResult::from_pages(vec![page(1, "a"), page(3, "c")]).is_err());
        assert!(DocumentResult::from_pages(vec![page(0, "a")]).is_err());
    }

    #[test]
    fn test_no_pages() {
        let doc = DocumentResult::from_pages(Vec::new()).unwrap();
        assert!(doc.is_empty());
        assert_eq!(doc.assemble(PageBreaks::Flatten), "");
    }
}
