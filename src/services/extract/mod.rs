//! Document-to-text extraction service.
//!
//! Ties the pipeline together: engine lookup, rasterization, per-page
//! recognition, normalization, assembly and optional annotation. Progress is
//! reported as [`ExtractEvent`]s so UI concerns stay out of the service.

mod types;

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::annotate::{render_annotations, AnnotationStyle};
use crate::config::Settings;
use crate::document::{DocumentInput, RasterPage, Rasterizer};
use crate::ocr::{EngineCache, LanguageSet, OcrError, RecognitionEngine};
use crate::text::{normalize_page, DocumentResult, PageBreaks, PageText};

pub use types::{ExtractEvent, Extraction, PageOutcome};

/// Service for turning documents into text.
#[derive(Clone)]
pub struct ExtractionService {
    cache: Arc<EngineCache>,
    rasterizer: Rasterizer,
    workers: usize,
    page_breaks: PageBreaks,
    annotation: Option<Arc<AnnotationStyle>>,
}

impl ExtractionService {
    /// Create a service sharing `cache` with any other services.
    pub fn new(cache: Arc<EngineCache>, rasterizer: Rasterizer) -> Self {
        Self {
            cache,
            rasterizer,
            workers: 1,
            page_breaks: PageBreaks::default(),
            annotation: None,
        }
    }

    /// Configure workers and page breaks from settings.
    pub fn from_settings(
        settings: &Settings,
        cache: Arc<EngineCache>,
        rasterizer: Rasterizer,
    ) -> Self {
        Self::new(cache, rasterizer)
            .with_workers(settings.workers)
            .with_page_breaks(settings.page_breaks)
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_page_breaks(mut self, page_breaks: PageBreaks) -> Self {
        self.page_breaks = page_breaks;
        self
    }

    /// Render an annotated copy of every page.
    pub fn with_annotations(mut self, style: AnnotationStyle) -> Self {
        self.annotation = Some(Arc::new(style));
        self
    }

    /// Process a document on the calling thread, one page after another.
    pub fn process_blocking(
        &self,
        input: DocumentInput,
        languages: &LanguageSet,
    ) -> Result<Extraction, OcrError> {
        let engine = self.cache.get(languages)?;
        let (pages, is_pdf) = self.raster_pages(input)?;

        let outcomes = pages
            .into_iter()
            .map(|page| recognize_page(engine.as_ref(), page, self.annotation.as_deref()))
            .collect::<Result<Vec<_>, OcrError>>()?;

        self.finish(outcomes, is_pdf)
    }

    /// Process a document, recognizing up to `workers` pages at a time.
    ///
    /// The first failing page aborts the document.
    pub async fn process(
        &self,
        input: DocumentInput,
        languages: &LanguageSet,
        event_tx: mpsc::Sender<ExtractEvent>,
    ) -> Result<Extraction, OcrError> {
        // Engine construction and rasterization both block.
        let cache = self.cache.clone();
        let requested = languages.clone();
        let engine = tokio::task::spawn_blocking(move || cache.get(&requested))
            .await
            .map_err(join_error)??;
        let _ = event_tx
            .send(ExtractEvent::EngineReady {
                languages: languages.to_string(),
            })
            .await;

        let service = self.clone();
        let (pages, is_pdf) = tokio::task::spawn_blocking(move || service.raster_pages(input))
            .await
            .map_err(join_error)??;
        let _ = event_tx
            .send(ExtractEvent::PageCount { total: pages.len() })
            .await;

        let mut outcomes = Vec::with_capacity(pages.len());
        let mut handles = Vec::with_capacity(self.workers.min(pages.len()));

        for page in pages {
            let engine = engine.clone();
            let annotation = self.annotation.clone();
            let event_tx = event_tx.clone();

            let handle = tokio::task::spawn_blocking(move || {
                let page_number = page.page_number;
                let _ = futures::executor::block_on(
                    event_tx.send(ExtractEvent::PageStarted { page_number }),
                );

                let outcome = recognize_page(engine.as_ref(), page, annotation.as_deref())?;

                let _ = futures::executor::block_on(event_tx.send(
                    ExtractEvent::PageCompleted {
                        page_number,
                        regions: outcome.regions.len(),
                    },
                ));
                Ok::<_, OcrError>(outcome)
            });
            handles.push(handle);

            if handles.len() >= self.workers {
                for h in handles.drain(..) {
                    outcomes.push(h.await.map_err(join_error)??);
                }
            }
        }

        for h in handles {
            outcomes.push(h.await.map_err(join_error)??);
        }

        let extraction = self.finish(outcomes, is_pdf)?;
        let _ = event_tx
            .send(ExtractEvent::Finished {
                pages: extraction.pages.len(),
                chars: extraction.text.chars().count(),
            })
            .await;
        Ok(extraction)
    }

    fn raster_pages(&self, input: DocumentInput) -> Result<(Vec<RasterPage>, bool), OcrError> {
        match input {
            DocumentInput::Image(image) => Ok((
                vec![RasterPage {
                    page_number: 1,
                    image,
                }],
                false,
            )),
            DocumentInput::Pdf(bytes) => {
                let pages = self.rasterizer.rasterize(&bytes)?;
                info!("PDF has {} page(s)", pages.len());
                Ok((pages, true))
            }
        }
    }

    /// Order outcomes by page and assemble the final text.
    fn finish(&self, mut outcomes: Vec<PageOutcome>, is_pdf: bool) -> Result<Extraction, OcrError> {
        outcomes.sort_by_key(|o| o.page_number);

        let document = DocumentResult::from_pages(
            outcomes
                .iter()
                .map(|o| PageText {
                    page_number: o.page_number,
                    text: o.text.clone(),
                })
                .collect(),
        )?;

        let text = if is_pdf {
            document.assemble(self.page_breaks)
        } else {
            document
                .pages()
                .first()
                .map(|p| p.text.clone())
                .unwrap_or_default()
        };

        Ok(Extraction {
            text,
            document,
            pages: outcomes,
            is_pdf,
        })
    }
}

/// Recognize, normalize and optionally annotate one page.
fn recognize_page(
    engine: &dyn RecognitionEngine,
    page: RasterPage,
    annotation: Option<&AnnotationStyle>,
) -> Result<PageOutcome, OcrError> {
    let regions = engine.recognize(&page.image)?;
    for region in &regions {
        region.validate()?;
    }
    debug!(
        "Page {}: {} region(s) recognized",
        page.page_number,
        regions.len()
    );

    let annotated = match annotation {
        Some(style) => Some(render_annotations(&page.image, &regions, style)?),
        None => None,
    };

    Ok(PageOutcome {
        page_number: page.page_number,
        text: normalize_page(&regions),
        regions,
        annotated,
    })
}

fn join_error(e: tokio::task::JoinError) -> OcrError {
    OcrError::RecognitionFailed(format!("recognition task failed: {}", e))
}
