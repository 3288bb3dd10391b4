//! Annotated overlays for visually checking recognition results.
//!
//! Each region gets a red outline around its axis-aligned bounding box and,
//! optionally, a filled label above it reading `text (0.93)`.

use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use tracing::{debug, info};

use crate::config::AnnotateSettings;
use crate::ocr::{OcrError, RecognizedRegion};

const BOX_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

const LABEL_TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Fonts tried when no font path is configured.
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Drawing options for [`render_annotations`].
pub struct AnnotationStyle {
    /// Font for labels. Without one, only boxes are drawn.
    pub font: Option<FontVec>,
    pub font_size: f32,
    pub line_width: u32,
    pub labels: bool,
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self {
            font: None,
            font_size: 14.0,
            line_width: 2,
            labels: true,
        }
    }
}

impl AnnotationStyle {
    /// Build a style from settings, loading the configured or a system font.
    pub fn from_settings(settings: &AnnotateSettings) -> Result<Self, OcrError> {
        let font = match settings.font_path {
            Some(ref path) => Some(load_font(path)?),
            None => find_system_font(),
        };
        Ok(Self {
            font,
            font_size: settings.font_size,
            line_width: settings.line_width.max(1),
            labels: settings.labels,
        })
    }
}

fn load_font(path: &Path) -> Result<FontVec, OcrError> {
    let data = std::fs::read(path)?;
    FontVec::try_from_vec(data).map_err(|_| {
        OcrError::Configuration(format!("Failed to parse font file: {}", path.display()))
    })
}

fn find_system_font() -> Option<FontVec> {
    for path in SYSTEM_FONTS {
        if let Ok(data) = std::fs::read(path) {
            if let Ok(font) = FontVec::try_from_vec(data) {
                info!("Loaded label font: {}", path);
                return Some(font);
            }
        }
    }
    debug!("No system font found, labels will be skipped");
    None
}

/// Label drawn above a region.
pub fn region_label(region: &RecognizedRegion) -> String {
    format!("{} ({:.2})", region.text, region.confidence)
}

/// Draw region boxes (and labels) onto a copy of `source`.
///
/// Every region's confidence is checked before anything is drawn.
pub fn render_annotations(
    source: &RgbImage,
    regions: &[RecognizedRegion],
    style: &AnnotationStyle,
) -> Result<RgbImage, OcrError> {
    for region in regions {
        region.validate()?;
    }

    let mut img = source.clone();
    let scale = PxScale::from(style.font_size);

    for region in regions {
        let bbox = region.bounding_box();
        let x1 = bbox.min.x.floor() as i32;
        let y1 = bbox.min.y.floor() as i32;
        let x2 = bbox.max.x.ceil() as i32;
        let y2 = bbox.max.y.ceil() as i32;

        draw_outline(&mut img, x1, y1, x2, y2, style.line_width);

        if !style.labels {
            continue;
        }
        let Some(ref font) = style.font else {
            continue;
        };

        let label = region_label(region);
        let (tw, th) = text_size(scale, font, &label);
        let (tw, th) = (tw as i32, th as i32);

        // Above the box when it fits, otherwise pinned to the top edge.
        let label_top = (y1 - th - 4).max(0);
        let background = Rect::at(x1, label_top).of_size((tw + 7) as u32, (th + 5) as u32);
        draw_filled_rect_mut(&mut img, background, BOX_COLOR);
        draw_text_mut(&mut img, LABEL_TEXT_COLOR, x1 + 3, label_top + 1, scale, font, &label);
    }

    Ok(img)
}

/// Outline `(x1, y1)`-`(x2, y2)` inclusive, growing inward by `line_width`.
fn draw_outline(img: &mut RgbImage, x1: i32, y1: i32, x2: i32, y2: i32, line_width: u32) {
    for i in 0..line_width as i32 {
        let width = x2 - x1 + 1 - 2 * i;
        let height = y2 - y1 + 1 - 2 * i;
        if width <= 0 || height <= 0 {
            break;
        }
        let rect = Rect::at(x1 + i, y1 + i).of_size(width as u32, height as u32);
        draw_hollow_rect_mut(img, rect, BOX_COLOR);
    }
}
