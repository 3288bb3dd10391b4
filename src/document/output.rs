//! Output file naming and writing.

use std::path::{Path, PathBuf};

use image::RgbImage;

use crate::ocr::{OcrError, RecognizedRegion};

/// Name of the downloadable text file for an uploaded file name.
///
/// Only the last extension is stripped: `scan.v2.png` becomes
/// `scan.v2_ocr.txt`.
pub fn output_file_name(original_name: &str) -> String {
    format!("{}_ocr.txt", file_stem(original_name))
}

/// Name of the annotated image for one page.
pub fn annotated_file_name(original_name: &str, page_number: Option<u32>) -> String {
    match page_number {
        Some(n) => format!("{}_page{}.png", file_stem(original_name), n),
        None => format!("{}_annotated.png", file_stem(original_name)),
    }
}

fn file_stem(original_name: &str) -> &str {
    let name = Path::new(original_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(original_name);
    match name.rsplit_once('.') {
        Some((stem, _)) => stem,
        None => name,
    }
}

/// Markdown list of regions, one `` - `text` (conf: 0.873) `` line each.
pub fn region_listing(regions: &[RecognizedRegion]) -> String {
    regions
        .iter()
        .map(|r| format!("- `{}` (conf: {:.3})", r.text, r.confidence))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write the extracted text as UTF-8 into `dir`, returning the path.
pub fn write_text(dir: &Path, original_name: &str, text: &str) -> Result<PathBuf, OcrError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(output_file_name(original_name));
    std::fs::write(&path, text.as_bytes())?;
    Ok(path)
}

/// Save an annotated page as PNG.
pub fn write_annotated(
    dir: &Path,
    original_name: &str,
    page_number: Option<u32>,
    image: &RgbImage,
) -> Result<PathBuf, OcrError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(annotated_file_name(original_name, page_number));
    image
        .save(&path)
        .map_err(|e| OcrError::Io(std::io::Error::other(e)))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name("scan.png"), "scan_ocr.txt");
        assert_eq!(output_file_name("scan.v2.PDF"), "scan.v2_ocr.txt");
        assert_eq!(output_file_name("README"), "README_ocr.txt");
        assert_eq!(output_file_name("/tmp/in/report.pdf"), "report_ocr.txt");
    }

    #[test]
    fn test_annotated_file_name() {
        assert_eq!(annotated_file_name("doc.pdf", Some(3)), "doc_page3.png");
        assert_eq!(annotated_file_name("photo.jpg", None), "photo_annotated.png");
    }

    #[test]
    fn test_region_listing() {
        let regions = vec![
            RecognizedRegion::from_rect(0.0, 0.0, 5.0, 5.0, "Hello".to_string(), 0.8734),
            RecognizedRegion::from_rect(0.0, 9.0, 5.0, 5.0, "mundo".to_string(), 1.0),
        ];
        assert_eq!(
            region_listing(&regions),
            "- `Hello` (conf: 0.873)\n- `mundo` (conf: 1.000)"
        );
        assert_eq!(region_listing(&[]), "");
    }

    #[test]
    fn test_write_text_is_utf8() {
        let temp = TempDir::new().unwrap();
        let path = write_text(temp.path(), "liham.png", "Magandang umaga, señor").unwrap();
        assert_eq!(path.file_name().unwrap(), "liham_ocr.txt");
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Magandang umaga, señor"
        );
    }

    #[test]
    fn test_write_annotated_png() {
        let temp = TempDir::new().unwrap();
        let img = RgbImage::new(3, 3);
        let path = write_annotated(temp.path(), "doc.pdf", Some(1), &img).unwrap();
        assert!(path.exists());
        assert_eq!(image::open(&path).unwrap().to_rgb8().dimensions(), (3, 3));
    }
}
