//! MuPDF backend tests against PDFs generated at run time.

use std::path::PathBuf;

use pdfscribe_core::fixtures::{PAGE_HEIGHT_PT, PAGE_WIDTH_PT, write_minimal_pdf};
use pdfscribe_core::{BackendError, Rasterizer, TextLayerBackend};
use pdfscribe_mupdf::MupdfBackend;
use tempfile::TempDir;

fn pdf_with(pages: &[Option<&str>]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fixture.pdf");
    write_minimal_pdf(&path, pages).unwrap();
    (dir, path)
}

#[test]
fn reads_each_page_in_order() {
    let (_dir, path) = pdf_with(&[Some("Hello"), Some("World")]);
    let pages = MupdfBackend::new().page_texts(&path).unwrap();

    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].trim(), "Hello");
    assert_eq!(pages[1].trim(), "World");
}

#[test]
fn page_without_text_layer_is_blank() {
    let (_dir, path) = pdf_with(&[None, None]);
    let pages = MupdfBackend::new().page_texts(&path).unwrap();

    assert_eq!(pages.len(), 2);
    assert!(pages.iter().all(|p| p.trim().is_empty()));
}

#[test]
fn mixed_pages_keep_positions() {
    let (_dir, path) = pdf_with(&[None, Some("Only (this) page")]);
    let pages = MupdfBackend::new().page_texts(&path).unwrap();

    assert!(pages[0].trim().is_empty());
    assert_eq!(pages[1].trim(), "Only (this) page");
}

#[test]
fn missing_file_is_open_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = MupdfBackend::new()
        .page_texts(&dir.path().join("absent.pdf"))
        .unwrap_err();
    assert!(matches!(err, BackendError::OpenError(_)));
}

#[test]
fn garbage_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garbage.pdf");
    std::fs::write(&path, b"this is not a pdf at all").unwrap();

    assert!(MupdfBackend::new().page_texts(&path).is_err());
}

#[test]
fn rasterizes_one_png_per_page() {
    let (_dir, path) = pdf_with(&[Some("one"), None, Some("three")]);
    let rasters = MupdfBackend::new().rasterize(&path, 72).unwrap();

    assert_eq!(rasters.len(), 3);
    for (i, image) in rasters.pages().iter().enumerate() {
        assert_eq!(image.index, i);
        let bytes = std::fs::read(&image.path).unwrap();
        assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"), "page {i} is not a PNG");
    }
}

#[test]
fn raster_size_follows_dpi() {
    let (_dir, path) = pdf_with(&[Some("scale")]);
    let backend = MupdfBackend::new();

    let at_72 = backend.rasterize(&path, 72).unwrap();
    let at_144 = backend.rasterize(&path, 144).unwrap();
    let small = &at_72.pages()[0];
    let large = &at_144.pages()[0];

    assert!(small.width.abs_diff(PAGE_WIDTH_PT) <= 1);
    assert!(small.height.abs_diff(PAGE_HEIGHT_PT) <= 1);
    assert!(large.width.abs_diff(PAGE_WIDTH_PT * 2) <= 2);
    assert!(large.height.abs_diff(PAGE_HEIGHT_PT * 2) <= 2);
}

#[test]
fn rasters_are_removed_on_drop() {
    let (_dir, path) = pdf_with(&[None]);
    let rasters = MupdfBackend::new().rasterize(&path, 72).unwrap();
    let image = rasters.pages()[0].path.clone();
    assert!(image.exists());

    drop(rasters);
    assert!(!image.exists());
}
