use std::path::{Path, PathBuf};

use tempfile::TempDir;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open PDF: {0}")]
    OpenError(String),
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
    #[error("failed to render page: {0}")]
    RenderError(String),
    #[error("OCR engine unavailable: {0}")]
    EngineUnavailable(String),
    #[error("OCR failed on page {page}: {message}")]
    RecognitionError { page: usize, message: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single rendered page, stored as a PNG inside the owning [`RasterSet`]'s
/// temporary directory.
#[derive(Debug, Clone)]
pub struct PageImage {
    /// 0-based page position in the document.
    pub index: usize,
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// The ordered page images of one document.
///
/// Owns the scratch directory the images live in; dropping the set removes
/// the files.
#[derive(Debug)]
pub struct RasterSet {
    pages: Vec<PageImage>,
    _scratch: Option<TempDir>,
}

impl RasterSet {
    pub fn new(pages: Vec<PageImage>, scratch: TempDir) -> Self {
        Self {
            pages,
            _scratch: Some(scratch),
        }
    }

    /// A set whose images are not owned by it (used by test doubles).
    pub fn unowned(pages: Vec<PageImage>) -> Self {
        Self {
            pages,
            _scratch: None,
        }
    }

    pub fn pages(&self) -> &[PageImage] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Reads the embedded text layer of a PDF.
pub trait TextLayerBackend {
    /// Text of every page, in page order. Pages without a text layer yield
    /// an empty string rather than an error.
    fn page_texts(&self, path: &Path) -> Result<Vec<String>, BackendError>;
}

/// Renders PDF pages to bitmaps.
pub trait Rasterizer {
    /// Render every page at `dpi`, in page order.
    fn rasterize(&self, path: &Path, dpi: u32) -> Result<RasterSet, BackendError>;
}

/// Recognizes text in a rendered page.
pub trait OcrEngine {
    fn recognize(&self, image: &PageImage) -> Result<String, BackendError>;
}
