//! PDF rasterization.
//!
//! Pages are rendered at `dpi / 72` times their native point size, the same
//! factor on both axes. Rendering itself is delegated to a [`PageRenderer`];
//! the bundled one drives Poppler's `pdftoppm`.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::time::Instant;

use image::RgbImage;
use tempfile::TempDir;
use tracing::{debug, info};

use crate::ocr::tools::{command_stdout, parse_page_count, PDFINFO, PDFTOPPM};
use crate::ocr::OcrError;

/// Resolution used when the caller does not pick one.
pub const DEFAULT_DPI: f32 = 180.0;

/// Native PDF coordinate space resolution.
pub const PDF_POINTS_PER_INCH: f32 = 72.0;

/// Scale applied to PDF user space for a target resolution.
pub fn scale_factor(dpi: f32) -> f32 {
    dpi / PDF_POINTS_PER_INCH
}

/// Raw output of a renderer for one page.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// Zero-based page index in the document.
    pub index: u32,
    pub width: u32,
    pub height: u32,
    /// Packed RGB8 pixels, row-major.
    pub pixels: Vec<u8>,
}

/// Renders every page of a PDF to RGB pixels at a given scale.
pub trait PageRenderer: Send + Sync {
    fn render(&self, pdf: &[u8], scale: f32) -> Result<Vec<RenderedPage>, OcrError>;
}

/// One rasterized page, numbered from 1 in document order.
#[derive(Debug, Clone)]
pub struct RasterPage {
    pub page_number: u32,
    pub image: RgbImage,
}

/// Converts PDF bytes into ordered page images.
#[derive(Clone)]
pub struct Rasterizer {
    renderer: Arc<dyn PageRenderer>,
    dpi: f32,
}

impl Rasterizer {
    pub fn new(renderer: Arc<dyn PageRenderer>, dpi: f32) -> Result<Self, OcrError> {
        if !dpi.is_finite() || dpi <= 0.0 {
            return Err(OcrError::Configuration(format!(
                "DPI must be a positive number, got {}",
                dpi
            )));
        }
        Ok(Self { renderer, dpi })
    }

    pub fn dpi(&self) -> f32 {
        self.dpi
    }

    pub fn scale(&self) -> f32 {
        scale_factor(self.dpi)
    }

    /// Rasterize every page. A PDF without pages yields an empty vector.
    pub fn rasterize(&self, pdf: &[u8]) -> Result<Vec<RasterPage>, OcrError> {
        let start = Instant::now();
        let mut rendered = self.renderer.render(pdf, self.scale())?;
        rendered.sort_by_key(|p| p.index);

        let pages = rendered
            .into_iter()
            .enumerate()
            .map(|(i, page)| {
                let index = page.index;
                let image = RgbImage::from_raw(page.width, page.height, page.pixels)
                    .ok_or_else(|| {
                        OcrError::DocumentFormat(format!(
                            "Renderer returned a short pixel buffer for page index {}",
                            index
                        ))
                    })?;
                Ok(RasterPage {
                    page_number: i as u32 + 1,
                    image,
                })
            })
            .collect::<Result<Vec<_>, OcrError>>()?;

        info!(
            "Rasterized {} page(s) at {} DPI in {}ms",
            pages.len(),
            self.dpi,
            start.elapsed().as_millis()
        );
        Ok(pages)
    }
}

/// Renders pages with Poppler's `pdfinfo` and `pdftoppm` binaries.
#[derive(Debug, Clone, Copy, Default)]
pub struct PopplerRenderer;

impl PopplerRenderer {
    fn page_count(pdf_path: &Path) -> Result<u32, OcrError> {
        let output = Command::new(PDFINFO).arg(pdf_path).output();
        let stdout = command_stdout(output, PDFINFO, OcrError::DocumentFormat)?;
        parse_page_count(&stdout).ok_or_else(|| {
            OcrError::DocumentFormat("pdfinfo did not report a page count".to_string())
        })
    }
}

impl PageRenderer for PopplerRenderer {
    fn render(&self, pdf: &[u8], scale: f32) -> Result<Vec<RenderedPage>, OcrError> {
        let temp_dir = TempDir::new()?;
        let pdf_path = temp_dir.path().join("input.pdf");
        std::fs::write(&pdf_path, pdf)?;

        let page_count = Self::page_count(&pdf_path)?;
        if page_count == 0 {
            return Ok(Vec::new());
        }

        let resolution = (scale * PDF_POINTS_PER_INCH).to_string();
        let output = Command::new(PDFTOPPM)
            .args(["-png", "-r", &resolution])
            .arg(&pdf_path)
            .arg(temp_dir.path().join("page"))
            .output();
        command_stdout(output, PDFTOPPM, OcrError::DocumentFormat)?;
        debug!("pdftoppm rendered {} page(s) at {} DPI", page_count, resolution);

        (1..=page_count)
            .map(|page_num| {
                let path = find_page_image(temp_dir.path(), page_num).ok_or_else(|| {
                    OcrError::DocumentFormat(format!("No image generated for page {}", page_num))
                })?;
                let image = image::open(&path)
                    .map_err(|e| {
                        OcrError::DocumentFormat(format!(
                            "Failed to read rendered page {}: {}",
                            page_num, e
                        ))
                    })?
                    .to_rgb8();
                let (width, height) = image.dimensions();
                Ok(RenderedPage {
                    index: page_num - 1,
                    width,
                    height,
                    pixels: image.into_raw(),
                })
            })
            .collect()
    }
}

/// Find the image file for a specific page number.
///
/// pdftoppm names files like page-1.png, page-01.png or page-001.png; the
/// padding width depends on the total page count.
fn find_page_image(dir: &Path, page_num: u32) -> Option<PathBuf> {
    (1..=4)
        .map(|digits| dir.join(format!("page-{:0width$}.png", page_num, width = digits)))
        .find(|path| path.exists())
}
