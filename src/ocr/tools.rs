//! Helpers for the external command-line tools the pipeline drives.

use std::path::PathBuf;
use std::process::Output;

use super::backend::OcrError;

pub const TESSERACT: &str = "tesseract";
pub const PDFTOPPM: &str = "pdftoppm";
pub const PDFINFO: &str = "pdfinfo";

/// Tools checked by `textgrab check`, with install hints.
pub const REQUIRED_TOOLS: &[(&str, &str)] = &[
    (TESSERACT, "apt install tesseract-ocr"),
    (PDFTOPPM, "apt install poppler-utils"),
    (PDFINFO, "apt install poppler-utils"),
];

/// Locate a binary in PATH.
pub fn find_binary(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Check if a binary is available in PATH.
pub fn check_binary(name: &str) -> bool {
    find_binary(name).is_some()
}

/// Availability of every required tool.
pub fn check_tools() -> Vec<(&'static str, bool)> {
    REQUIRED_TOOLS
        .iter()
        .map(|(tool, _)| (*tool, check_binary(tool)))
        .collect()
}

/// Turn a finished command into its stdout, or an error carrying stderr.
///
/// `on_failure` decides which error variant a non-zero exit maps to.
pub fn command_stdout(
    result: std::io::Result<Output>,
    tool_name: &str,
    on_failure: impl FnOnce(String) -> OcrError,
) -> Result<String, OcrError> {
    match result {
        Ok(output) if output.status.success() => {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        }
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(on_failure(format!("{} failed: {}", tool_name, stderr.trim())))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(OcrError::ToolNotFound(tool_name.to_string()))
        }
        Err(e) => Err(OcrError::Io(e)),
    }
}

/// Read the `Pages:` line from `pdfinfo` output.
pub fn parse_page_count(pdfinfo_output: &str) -> Option<u32> {
    pdfinfo_output
        .lines()
        .find(|line| line.starts_with("Pages:"))
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_tools() {
        let tools = check_tools();
        assert_eq!(tools.len(), REQUIRED_TOOLS.len());
        for (tool, available) in tools {
            println!("{}: {}", tool, if available { "found" } else { "missing" });
        }
    }

    #[test]
    fn test_parse_page_count() {
        let output = "Creator:        Writer\nProducer:       LibreOffice\nPages:          12\nEncrypted:      no\n";
        assert_eq!(parse_page_count(output), Some(12));
        assert_eq!(parse_page_count("Pages:          0\n"), Some(0));
        assert_eq!(parse_page_count("Title: nothing\n"), None);
    }

    #[test]
    fn test_missing_binary_maps_to_tool_not_found() {
        let result = std::process::Command::new("textgrab-no-such-binary").output();
        let err = command_stdout(result, "textgrab-no-such-binary", OcrError::RecognitionFailed)
            .unwrap_err();
        assert!(matches!(err, OcrError::ToolNotFound(_)));
    }
}
