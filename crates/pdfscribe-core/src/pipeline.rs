use std::fmt;
use std::path::Path;

use crate::ExtractError;
use crate::backend::{OcrEngine, Rasterizer, TextLayerBackend};

/// Rasterization resolution used when nothing else is configured.
pub const DEFAULT_DPI: u32 = 200;

/// Which step produced the final text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMethod {
    Direct,
    Ocr,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::Direct => "direct",
            ExtractionMethod::Ocr => "ocr",
        }
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A page that OCR skipped under `keep_going`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    /// 0-based page index.
    pub index: usize,
    pub message: String,
}

/// Text pulled out of a document, plus how it was obtained.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub text: String,
    pub method: ExtractionMethod,
    pub page_count: usize,
    /// Always empty unless per-page OCR isolation is enabled.
    pub failed_pages: Vec<PageFailure>,
}

/// Progress events emitted during extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    TextLayerRead {
        pages: usize,
    },
    /// The text layer was blank; OCR is about to start.
    FallingBackToOcr,
    Rasterized {
        pages: usize,
        dpi: u32,
    },
    PageRecognized {
        index: usize,
        total: usize,
    },
    /// Recognition failed and the page was skipped (`keep_going` only).
    PageSkipped {
        index: usize,
        total: usize,
        message: String,
    },
}

fn no_progress(_: ProgressEvent) {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    pub dpi: u32,
    /// Skip pages whose recognition fails instead of failing the document.
    pub keep_going: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            keep_going: false,
        }
    }
}

/// Direct-then-OCR extraction over pluggable backends.
///
/// 1. Read the text layer; if it has any non-whitespace content, return it
///    as-is (pages concatenated with no separator).
/// 2. Otherwise rasterize every page and OCR each image, one line break
///    after each page, trimming the result.
///
/// A text-layer error ends the run without attempting OCR.
pub struct Pipeline<'a> {
    text_layer: &'a dyn TextLayerBackend,
    rasterizer: &'a dyn Rasterizer,
    ocr: &'a dyn OcrEngine,
    options: ExtractOptions,
    progress: &'a dyn Fn(ProgressEvent),
}

impl<'a> Pipeline<'a> {
    pub fn new(
        text_layer: &'a dyn TextLayerBackend,
        rasterizer: &'a dyn Rasterizer,
        ocr: &'a dyn OcrEngine,
    ) -> Self {
        Self {
            text_layer,
            rasterizer,
            ocr,
            options: ExtractOptions::default(),
            progress: &no_progress,
        }
    }

    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_progress(mut self, progress: &'a dyn Fn(ProgressEvent)) -> Self {
        self.progress = progress;
        self
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    pub fn extract(&self, path: &Path) -> Result<Extraction, ExtractError> {
        let direct = extract_direct(self.text_layer, path)?;
        (self.progress)(ProgressEvent::TextLayerRead {
            pages: direct.page_count,
        });
        if !direct.text.trim().is_empty() {
            tracing::info!(
                pages = direct.page_count,
                chars = direct.text.chars().count(),
                "Successfully extracted text from PDF using regular extraction"
            );
            return Ok(direct);
        }

        tracing::info!(pages = direct.page_count, "No text found in PDF, trying OCR...");
        (self.progress)(ProgressEvent::FallingBackToOcr);

        match extract_ocr(self.rasterizer, self.ocr, path, &self.options, self.progress) {
            Ok(extraction) => {
                if !extraction.failed_pages.is_empty() {
                    tracing::warn!(
                        failed = extraction.failed_pages.len(),
                        pages = extraction.page_count,
                        "OCR skipped pages that could not be recognized"
                    );
                }
                tracing::info!(
                    pages = extraction.page_count,
                    chars = extraction.text.chars().count(),
                    "Successfully extracted text using OCR"
                );
                Ok(extraction)
            }
            Err(err) => {
                if let ExtractError::Ocr(ref source) = err {
                    tracing::error!(error = %source, "Error during OCR");
                }
                Err(err)
            }
        }
    }
}

/// Concatenate the text layer of every page, in order, with nothing in
/// between.
pub fn extract_direct(
    backend: &dyn TextLayerBackend,
    path: &Path,
) -> Result<Extraction, ExtractError> {
    let pages = backend.page_texts(path).map_err(ExtractError::Direct)?;
    tracing::debug!(path = %path.display(), pages = pages.len(), "read text layer");

    Ok(Extraction {
        page_count: pages.len(),
        text: pages.concat(),
        method: ExtractionMethod::Direct,
        failed_pages: Vec::new(),
    })
}

/// Rasterize and recognize every page.
///
/// Without `keep_going` the first failing page fails the document. With it,
/// failing pages are recorded and skipped; the document only fails if no
/// page could be recognized. Blank output is [`ExtractError::OcrEmpty`].
pub fn extract_ocr(
    rasterizer: &dyn Rasterizer,
    engine: &dyn OcrEngine,
    path: &Path,
    options: &ExtractOptions,
    progress: &dyn Fn(ProgressEvent),
) -> Result<Extraction, ExtractError> {
    let rasters = rasterizer
        .rasterize(path, options.dpi)
        .map_err(ExtractError::Ocr)?;
    let total = rasters.len();
    tracing::debug!(pages = total, dpi = options.dpi, "rasterized document");
    progress(ProgressEvent::Rasterized {
        pages: total,
        dpi: options.dpi,
    });

    let mut text = String::new();
    let mut failed_pages = Vec::new();
    let mut last_error = None;

    for image in rasters.pages() {
        match engine.recognize(image) {
            Ok(page_text) => {
                tracing::trace!(page = image.index + 1, chars = page_text.len(), "page recognized");
                text.push_str(&page_text);
                text.push('\n');
                progress(ProgressEvent::PageRecognized {
                    index: image.index,
                    total,
                });
            }
            Err(err) if options.keep_going => {
                tracing::warn!(page = image.index + 1, error = %err, "skipping page");
                let message = err.to_string();
                progress(ProgressEvent::PageSkipped {
                    index: image.index,
                    total,
                    message: message.clone(),
                });
                failed_pages.push(PageFailure {
                    index: image.index,
                    message,
                });
                last_error = Some(err);
            }
            Err(err) => return Err(ExtractError::Ocr(err)),
        }
    }

    if failed_pages.len() == total
        && let Some(err) = last_error
    {
        return Err(ExtractError::Ocr(err));
    }

    let text = text.trim();
    if text.is_empty() {
        return Err(ExtractError::OcrEmpty);
    }

    Ok(Extraction {
        text: text.to_string(),
        method: ExtractionMethod::Ocr,
        page_count: total,
        failed_pages,
    })
}
