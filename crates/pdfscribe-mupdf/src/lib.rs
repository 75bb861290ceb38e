use std::path::Path;

use mupdf::{Colorspace, Document, ImageFormat, Matrix, TextPageFlags};

use pdfscribe_core::{BackendError, PageImage, RasterSet, Rasterizer, TextLayerBackend};

/// PDF points per inch; MuPDF renders at 72 DPI with an identity matrix.
const POINTS_PER_INCH: f32 = 72.0;

/// MuPDF-based implementation of [`TextLayerBackend`] and [`Rasterizer`].
///
/// This crate is the sole AGPL island: it isolates the mupdf dependency
/// (AGPL-3.0) from the rest of the workspace.
#[derive(Debug, Default, Clone, Copy)]
pub struct MupdfBackend;

impl MupdfBackend {
    pub fn new() -> Self {
        Self
    }
}

fn open(path: &Path) -> Result<Document, BackendError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| BackendError::OpenError("invalid path encoding".into()))?;
    Document::open(path_str).map_err(|e| BackendError::OpenError(e.to_string()))
}

impl TextLayerBackend for MupdfBackend {
    fn page_texts(&self, path: &Path) -> Result<Vec<String>, BackendError> {
        let document = open(path)?;

        let mut pages_text = Vec::new();

        for page_result in document
            .pages()
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?
        {
            let page = page_result.map_err(|e| BackendError::ExtractionError(e.to_string()))?;
            let text_page = page
                .to_text_page(TextPageFlags::empty())
                .map_err(|e| BackendError::ExtractionError(e.to_string()))?;

            let mut page_text = String::new();
            for block in text_page.blocks() {
                for line in block.lines() {
                    let line_text: String = line
                        .chars()
                        .map(|c| c.char().unwrap_or('\u{FFFD}'))
                        .collect();
                    page_text.push_str(&line_text);
                    page_text.push('\n');
                }
            }
            pages_text.push(page_text);
        }

        tracing::debug!(path = %path.display(), pages = pages_text.len(), "mupdf text layer read");
        Ok(pages_text)
    }
}

impl Rasterizer for MupdfBackend {
    fn rasterize(&self, path: &Path, dpi: u32) -> Result<RasterSet, BackendError> {
        let document = open(path)?;
        let scratch = tempfile::Builder::new().prefix("pdfscribe-").tempdir()?;

        let scale = dpi as f32 / POINTS_PER_INCH;
        let matrix = Matrix::new_scale(scale, scale);
        let colorspace = Colorspace::device_rgb();

        let mut images = Vec::new();
        for (index, page_result) in document
            .pages()
            .map_err(|e| BackendError::RenderError(e.to_string()))?
            .enumerate()
        {
            let page = page_result.map_err(|e| BackendError::RenderError(e.to_string()))?;
            // Opaque RGB, no annotations overlay.
            let pixmap = page
                .to_pixmap(&matrix, &colorspace, Default::default(), false)
                .map_err(|e| BackendError::RenderError(format!("page {}: {}", index + 1, e)))?;

            let image_path = scratch.path().join(format!("page-{:04}.png", index + 1));
            let image_str = image_path
                .to_str()
                .ok_or_else(|| BackendError::RenderError("invalid temp path encoding".into()))?;
            pixmap
                .save_as(image_str, ImageFormat::PNG)
                .map_err(|e| BackendError::RenderError(format!("page {}: {}", index + 1, e)))?;

            tracing::trace!(page = index + 1, path = %image_path.display(), "page rendered");
            images.push(PageImage {
                index,
                width: pixmap.width() as u32,
                height: pixmap.height() as u32,
                path: image_path,
            });
        }

        tracing::debug!(pages = images.len(), dpi, "mupdf rasterization complete");
        Ok(RasterSet::new(images, scratch))
    }
}

