//! Tesseract OCR backend implementation.
//!
//! Uses Tesseract via command-line. One engine is bound to a `+`-joined list
//! of language models (e.g. `eng+tgl`) and reports word boxes through the
//! TSV output mode, which are grouped back into text lines.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::time::Instant;

use image::RgbImage;
use tempfile::TempDir;
use tracing::debug;

use super::backend::{EngineFactory, OcrError, RecognitionEngine, RecognizedRegion};
use super::languages::LanguageSet;
use super::tools::{command_stdout, find_binary, TESSERACT};

/// Builds Tesseract engines after checking the binary and language models.
#[derive(Debug, Clone, Default)]
pub struct TesseractFactory {
    /// Overrides Tesseract's own tessdata lookup.
    tessdata_dir: Option<PathBuf>,
}

impl TesseractFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tessdata_dir(tessdata_dir: Option<PathBuf>) -> Self {
        Self { tessdata_dir }
    }

    /// Language models Tesseract reports as installed.
    pub fn installed_models(&self) -> Result<Vec<String>, OcrError> {
        let mut cmd = Command::new(TESSERACT);
        cmd.arg("--list-langs");
        if let Some(ref dir) = self.tessdata_dir {
            cmd.arg("--tessdata-dir").arg(dir);
        }
        let stdout = command_stdout(cmd.output(), TESSERACT, OcrError::EngineConstruction)?;
        Ok(parse_list_langs(&stdout))
    }
}

impl EngineFactory for TesseractFactory {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn construct(&self, languages: &LanguageSet) -> Result<Arc<dyn RecognitionEngine>, OcrError> {
        let binary = find_binary(TESSERACT).ok_or_else(|| {
            OcrError::EngineConstruction(
                "tesseract not found (install tesseract-ocr)".to_string(),
            )
        })?;

        let installed = self.installed_models()?;
        let missing: Vec<&str> = languages
            .languages()
            .iter()
            .map(|l| l.model)
            .filter(|model| !installed.iter().any(|m| m == model))
            .collect();
        if !missing.is_empty() {
            return Err(OcrError::EngineConstruction(format!(
                "missing Tesseract language data: {} (install tesseract-ocr-{})",
                missing.join(", "),
                missing.join(" tesseract-ocr-")
            )));
        }

        Ok(Arc::new(TesseractEngine {
            binary,
            languages: languages.clone(),
            tessdata_dir: self.tessdata_dir.clone(),
        }))
    }
}

/// A Tesseract invocation bound to one language set.
pub struct TesseractEngine {
    binary: PathBuf,
    languages: LanguageSet,
    tessdata_dir: Option<PathBuf>,
}

impl TesseractEngine {
    fn run_tesseract(&self, image_path: &Path) -> Result<String, OcrError> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg(image_path)
            .arg("stdout")
            .args(["-l", &self.languages.model_spec()]);
        if let Some(ref dir) = self.tessdata_dir {
            cmd.arg("--tessdata-dir").arg(dir);
        }
        cmd.arg("tsv");
        command_stdout(cmd.output(), TESSERACT, OcrError::RecognitionFailed)
    }
}

impl RecognitionEngine for TesseractEngine {
    fn languages(&self) -> &LanguageSet {
        &self.languages
    }

    fn recognize(&self, image: &RgbImage) -> Result<Vec<RecognizedRegion>, OcrError> {
        let start = Instant::now();
        let temp_dir = TempDir::new()?;
        let image_path = temp_dir.path().join("page.png");
        image
            .save(&image_path)
            .map_err(|e| OcrError::RecognitionFailed(format!("Failed to write image: {}", e)))?;

        let tsv = self.run_tesseract(&image_path)?;
        let regions = parse_tsv(&tsv);
        debug!(
            "tesseract [{}] found {} regions in {}ms",
            self.languages,
            regions.len(),
            start.elapsed().as_millis()
        );
        Ok(regions)
    }
}

/// Parse `tesseract --list-langs` output, skipping the header line.
fn parse_list_langs(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| !line.starts_with("List of available languages"))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Line being accumulated from word rows.
struct LineAccumulator {
    key: (u32, u32, u32, u32),
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
    words: Vec<String>,
    confidence_sum: f32,
}

impl LineAccumulator {
    fn into_region(self) -> RecognizedRegion {
        let confidence = self.confidence_sum / self.words.len() as f32 / 100.0;
        RecognizedRegion::from_rect(
            self.left,
            self.top,
            self.right - self.left,
            self.bottom - self.top,
            self.words.join(" "),
            confidence,
        )
    }
}

/// Group Tesseract TSV word rows (level 5) into one region per text line.
///
/// Columns: level, page_num, block_num, par_num, line_num, word_num, left,
/// top, width, height, conf, text. Confidence is reported on a 0-100 scale.
fn parse_tsv(tsv: &str) -> Vec<RecognizedRegion> {
    let mut lines: Vec<LineAccumulator> = Vec::new();

    for row in tsv.lines().skip(1) {
        let cols: Vec<&str> = row.splitn(12, '\t').collect();
        if cols.len() < 12 || cols[0] != "5" {
            continue;
        }
        let text = cols[11].trim();
        let conf: f32 = match cols[10].trim().parse() {
            Ok(c) if c >= 0.0 => c,
            _ => continue,
        };
        if text.is_empty() {
            continue;
        }

        let num = |i: usize| cols[i].trim().parse::<u32>().unwrap_or(0);
        let key = (num(1), num(2), num(3), num(4));
        let (left, top) = (num(6) as f32, num(7) as f32);
        let (width, height) = (num(8) as f32, num(9) as f32);

        match lines.iter_mut().find(|l| l.key == key) {
            Some(line) => {
                line.left = line.left.min(left);
                line.top = line.top.min(top);
                line.right = line.right.max(left + width);
                line.bottom = line.bottom.max(top + height);
                line.words.push(text.to_string());
                line.confidence_sum += conf;
            }
            None => lines.push(LineAccumulator {
                key,
                left,
                top,
                right: left + width,
                bottom: top + height,
                words: vec![text.to_string()],
                confidence_sum: conf,
            }),
        }
    }

    lines.into_iter().map(LineAccumulator::into_region).collect()
}
