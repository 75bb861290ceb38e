use std::path::Path;

use thiserror::Error;

pub mod backend;
pub mod config_file;
pub mod fixtures;
pub mod mock;
pub mod pipeline;
pub mod settings;

// Re-export for convenience
pub use backend::{BackendError, OcrEngine, PageImage, RasterSet, Rasterizer, TextLayerBackend};
pub use config_file::{ConfigError, ConfigFile};
pub use pipeline::{
    DEFAULT_DPI, ExtractOptions, Extraction, ExtractionMethod, PageFailure, Pipeline,
    ProgressEvent,
};
pub use settings::{Settings, SettingsOverrides};

#[derive(Error, Debug)]
pub enum ExtractError {
    /// The text layer could not be read. OCR is not attempted.
    #[error("error extracting text from PDF: {0}")]
    Direct(#[source] BackendError),
    #[error("OCR extraction failed: {0}")]
    Ocr(#[source] BackendError),
    #[error("OCR extraction failed: no text recognized")]
    OcrEmpty,
}

/// Extract text from a PDF, falling back to OCR when it has no text layer.
///
/// See [`Pipeline`] for the exact fallback rules.
pub fn extract_text(
    path: &Path,
    text_layer: &dyn TextLayerBackend,
    rasterizer: &dyn Rasterizer,
    ocr: &dyn OcrEngine,
    options: ExtractOptions,
) -> Result<Extraction, ExtractError> {
    Pipeline::new(text_layer, rasterizer, ocr)
        .with_options(options)
        .extract(path)
}
