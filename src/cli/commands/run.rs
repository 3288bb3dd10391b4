//! Extract text from one document.

use std::sync::Arc;

use anyhow::Context;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;

use super::RunArgs;
use crate::annotate::AnnotationStyle;
use crate::config::Settings;
use crate::document::{
    region_listing, write_annotated, write_text, DocumentInput, PopplerRenderer, Rasterizer,
};
use crate::ocr::{EngineCache, TesseractFactory};
use crate::services::{ExtractEvent, Extraction, ExtractionService};

/// Fold CLI flags over the loaded settings.
fn apply_args(settings: &mut Settings, args: &RunArgs) {
    if let Some(ref languages) = args.languages {
        settings.languages = languages
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
    }
    if let Some(dpi) = args.dpi {
        settings.dpi = dpi;
    }
    if let Some(workers) = args.workers {
        settings.workers = workers;
    }
    if let Some(page_breaks) = args.page_breaks {
        settings.page_breaks = page_breaks;
    }
    if args.tessdata_dir.is_some() {
        settings.tessdata_dir = args.tessdata_dir.clone();
    }
    if args.no_labels {
        settings.annotate.labels = false;
    }
}

/// Extract text from a document.
pub async fn cmd_run(mut settings: Settings, args: RunArgs) -> anyhow::Result<()> {
    apply_args(&mut settings, &args);
    settings.validate()?;
    let languages = settings.language_set()?;

    let original_name = args
        .file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document")
        .to_string();
    let input = DocumentInput::from_path(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let factory = TesseractFactory::with_tessdata_dir(settings.tessdata_dir.clone());
    let cache = Arc::new(EngineCache::new(Arc::new(factory)));
    let rasterizer = Rasterizer::new(Arc::new(PopplerRenderer), settings.dpi)?;

    let resolution = if input.is_pdf() {
        format!(" at {} DPI", rasterizer.dpi())
    } else {
        String::new()
    };
    eprintln!(
        "{} Extracting {} with {} [{}]{}",
        style("→").cyan(),
        original_name,
        cache.backend_name(),
        languages,
        resolution
    );

    let mut service = ExtractionService::from_settings(&settings, cache, rasterizer);
    if args.annotate.is_some() {
        service = service.with_annotations(AnnotationStyle::from_settings(&settings.annotate)?);
    }

    let (event_tx, event_rx) = mpsc::channel::<ExtractEvent>(100);
    let event_handler = tokio::spawn(render_progress(event_rx));

    let result = service.process(input, &languages, event_tx).await;
    let _ = event_handler.await;
    let extraction = result?;

    if args.regions {
        print_regions(&extraction);
    }

    if let Some(ref dir) = args.annotate {
        for page in &extraction.pages {
            let Some(ref image) = page.annotated else {
                continue;
            };
            let page_number = extraction.is_pdf.then_some(page.page_number);
            let path = write_annotated(dir, &original_name, page_number, image)?;
            eprintln!("  {} {}", style("→").dim(), path.display());
        }
    }

    match args.output {
        Some(ref dir) => {
            let path = write_text(dir, &original_name, &extraction.text)?;
            eprintln!("{} Wrote {}", style("✓").green(), path.display());
        }
        None => println!("{}", extraction.text),
    }

    Ok(())
}

/// Drive a progress bar from extraction events until the sender is dropped.
async fn render_progress(mut event_rx: mpsc::Receiver<ExtractEvent>) {
    let mut progress: Option<ProgressBar> = None;

    while let Some(event) = event_rx.recv().await {
        match event {
            ExtractEvent::EngineReady { languages } => {
                tracing::debug!("Engine ready for {}", languages);
            }
            ExtractEvent::PageCount { total } => {
                let pb = ProgressBar::new(total as u64);
                if let Ok(bar_style) = ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")
                {
                    pb.set_style(bar_style.progress_chars("█▓░"));
                }
                pb.set_message("Recognizing...");
                progress = Some(pb);
            }
            ExtractEvent::PageStarted { page_number } => {
                if let Some(ref pb) = progress {
                    pb.set_message(format!("Page {}", page_number));
                }
            }
            ExtractEvent::PageCompleted {
                page_number,
                regions,
            } => {
                if let Some(ref pb) = progress {
                    pb.set_message(format!("Page {}: {} region(s)", page_number, regions));
                    pb.inc(1);
                }
            }
            ExtractEvent::Finished { pages, chars } => {
                if let Some(pb) = progress.take() {
                    pb.finish_and_clear();
                }
                eprintln!(
                    "{} Recognized {} page(s), {} characters",
                    style("✓").green(),
                    pages,
                    chars
                );
            }
        }
    }

    // Sender dropped early on failure.
    if let Some(pb) = progress {
        pb.abandon();
    }
}

fn print_regions(extraction: &Extraction) {
    for page in &extraction.pages {
        if extraction.is_pdf {
            eprintln!("{}", style(format!("Page {}", page.page_number)).bold());
        }
        if page.regions.is_empty() {
            eprintln!("  {} no text detected", style("!").yellow());
        } else {
            eprintln!("{}", region_listing(&page.regions));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{load_settings_with_env, LoadOptions};
    use crate::text::PageBreaks;
    use std::path::PathBuf;

    fn args() -> RunArgs {
        RunArgs {
            file: PathBuf::from("scan.pdf"),
            languages: None,
            dpi: None,
            workers: None,
            page_breaks: None,
            tessdata_dir: None,
            annotate: None,
            no_labels: false,
            regions: false,
            output: None,
        }
    }

    #[test]
    fn test_flags_override_settings() {
        let mut settings = Settings::default();
        let args = RunArgs {
            languages: Some(" ja , en ,".to_string()),
            dpi: Some(300.0),
            workers: Some(4),
            page_breaks: Some(PageBreaks::Preserve),
            no_labels: true,
            ..args()
        };
        apply_args(&mut settings, &args);
        assert_eq!(settings.languages, vec!["ja", "en"]);
        assert_eq!(settings.dpi, 300.0);
        assert_eq!(settings.workers, 4);
        assert_eq!(settings.page_breaks, PageBreaks::Preserve);
        assert!(!settings.annotate.labels);
    }

    #[test]
    fn test_flags_fix_invalid_env_values() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("textgrab.toml");
        std::fs::write(&path, "").unwrap();
        let options = LoadOptions {
            config_path: Some(path),
        };
        let mut settings = load_settings_with_env(&options, |name| match name {
            "TEXTGRAB_LANGUAGES" => Some("xx".to_string()),
            "TEXTGRAB_DPI" => Some("0".to_string()),
            _ => None,
        })
        .unwrap();

        let args = RunArgs {
            languages: Some("en".to_string()),
            dpi: Some(300.0),
            ..args()
        };
        apply_args(&mut settings, &args);
        settings.validate().unwrap();
        assert_eq!(settings.language_set().unwrap().to_string(), "en");
        assert_eq!(settings.dpi, 300.0);
    }

    #[test]
    fn test_absent_flags_keep_settings() {
        let mut settings = Settings::default();
        apply_args(&mut settings, &args());
        assert_eq!(settings, Settings::default());
    }
}
