//! Hand-rolled test doubles for the three extraction seams.
//!
//! Each mock counts its calls so tests can assert which path the pipeline
//! took (e.g. that OCR never ran when the text layer had content).

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::backend::{BackendError, OcrEngine, PageImage, RasterSet, Rasterizer, TextLayerBackend};

/// A configurable [`TextLayerBackend`].
pub struct MockTextLayer {
    /// `Err(message)` simulates an unreadable document.
    response: Result<Vec<String>, String>,
    call_count: AtomicUsize,
}

impl MockTextLayer {
    /// Return `pages` on every call.
    pub fn with_pages<S: Into<String>>(pages: Vec<S>) -> Self {
        Self {
            response: Ok(pages.into_iter().map(Into::into).collect()),
            call_count: AtomicUsize::new(0),
        }
    }

    /// Fail every call with [`BackendError::OpenError`].
    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            call_count: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

impl TextLayerBackend for MockTextLayer {
    fn page_texts(&self, _path: &Path) -> Result<Vec<String>, BackendError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.response
            .clone()
            .map_err(BackendError::OpenError)
    }
}

/// A [`Rasterizer`] that produces `page_count` placeholder images without
/// touching the filesystem.
pub struct MockRasterizer {
    page_count: usize,
    error: Option<String>,
    call_count: AtomicUsize,
    last_dpi: Mutex<Option<u32>>,
}

impl MockRasterizer {
    pub fn new(page_count: usize) -> Self {
        Self {
            page_count,
            error: None,
            call_count: AtomicUsize::new(0),
            last_dpi: Mutex::new(None),
        }
    }

    /// Fail every call with [`BackendError::RenderError`].
    pub fn failing(message: &str) -> Self {
        Self {
            error: Some(message.to_string()),
            ..Self::new(0)
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// DPI passed to the most recent `rasterize()` call.
    pub fn last_dpi(&self) -> Option<u32> {
        *self.last_dpi.lock().unwrap()
    }
}

impl Rasterizer for MockRasterizer {
    fn rasterize(&self, _path: &Path, dpi: u32) -> Result<RasterSet, BackendError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        *self.last_dpi.lock().unwrap() = Some(dpi);
        if let Some(ref msg) = self.error {
            return Err(BackendError::RenderError(msg.clone()));
        }
        let pages = (0..self.page_count)
            .map(|index| PageImage {
                index,
                path: PathBuf::from(format!("page-{}.png", index + 1)),
                width: 0,
                height: 0,
            })
            .collect();
        Ok(RasterSet::unowned(pages))
    }
}

/// Per-page response for [`MockOcr`].
#[derive(Clone, Debug)]
pub enum MockRecognition {
    Text(String),
    /// Recognition error on this page.
    Error(String),
    /// The engine binary is missing.
    Unavailable,
}

/// A configurable [`OcrEngine`]. Responses are looked up by page index;
/// pages past the end of the list reuse the fallback.
pub struct MockOcr {
    per_page: Vec<MockRecognition>,
    fallback: MockRecognition,
    call_count: AtomicUsize,
}

impl MockOcr {
    /// Recognize `pages[i]` on page `i`, empty text afterwards.
    pub fn with_pages<S: Into<String>>(pages: Vec<S>) -> Self {
        Self {
            per_page: pages
                .into_iter()
                .map(|p| MockRecognition::Text(p.into()))
                .collect(),
            fallback: MockRecognition::Text(String::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    pub fn with_responses(per_page: Vec<MockRecognition>) -> Self {
        Self {
            per_page,
            fallback: MockRecognition::Text(String::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    /// Every call fails as if the engine were not installed.
    pub fn unavailable() -> Self {
        Self {
            per_page: Vec::new(),
            fallback: MockRecognition::Unavailable,
            call_count: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

impl OcrEngine for MockOcr {
    fn recognize(&self, image: &PageImage) -> Result<String, BackendError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        let response = self
            .per_page
            .get(image.index)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone());
        match response {
            MockRecognition::Text(text) => Ok(text),
            MockRecognition::Error(message) => Err(BackendError::RecognitionError {
                page: image.index + 1,
                message,
            }),
            MockRecognition::Unavailable => Err(BackendError::EngineUnavailable(
                "mock engine not installed".into(),
            )),
        }
    }
}
