//! Minimal, valid PDF documents for tests.
//!
//! Each page is US Letter. A page given as `Some(text)` draws `text` in
//! Helvetica; `None` gives a page with an empty content stream (no text
//! layer), which is what a scanned page looks like to a text extractor.

use std::io;
use std::path::Path;

pub const PAGE_WIDTH_PT: u32 = 612;
pub const PAGE_HEIGHT_PT: u32 = 792;

/// Build the bytes of a PDF with one page per entry of `pages`.
pub fn minimal_pdf(pages: &[Option<&str>]) -> Vec<u8> {
    // 1 = catalog, 2 = page tree, 3 = font, then (page, contents) pairs.
    let page_id = |i: usize| 4 + 2 * i;
    let total_objects = 3 + 2 * pages.len();

    let kids: Vec<String> = (0..pages.len())
        .map(|i| format!("{} 0 R", page_id(i)))
        .collect();

    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            pages.len()
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];

    for (i, page) in pages.iter().enumerate() {
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH_PT} {PAGE_HEIGHT_PT}] \
             /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
            page_id(i) + 1
        ));
        let stream = match page {
            Some(text) => format!("BT /F1 24 Tf 72 700 Td ({}) Tj ET", escape(text)),
            None => String::new(),
        };
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            stream.len(),
            stream
        ));
    }

    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(total_objects);
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_offset = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", total_objects + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in offsets {
        out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            total_objects + 1,
            xref_offset
        )
        .as_bytes(),
    );
    out
}

/// Write [`minimal_pdf`] to `path`.
pub fn write_minimal_pdf(path: &Path, pages: &[Option<&str>]) -> io::Result<()> {
    std::fs::write(path, minimal_pdf(pages))
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '(' | ')' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xref_offsets_point_at_objects() {
        let bytes = minimal_pdf(&[Some("Hello"), None]);
        let text = String::from_utf8(bytes.clone()).unwrap();

        let xref_at: usize = text
            .rsplit("startxref\n")
            .next()
            .and_then(|tail| tail.lines().next())
            .unwrap()
            .parse()
            .unwrap();
        assert!(text[xref_at..].starts_with("xref\n0 8\n"));

        for (n, line) in text[xref_at..].lines().skip(3).take(7).enumerate() {
            let offset: usize = line[..10].parse().unwrap();
            assert!(text[offset..].starts_with(&format!("{} 0 obj", n + 1)));
        }
    }

    #[test]
    fn text_is_escaped() {
        assert_eq!(escape(r"a(b)\c"), r"a\(b\)\\c");
    }

    #[test]
    fn page_count_is_recorded() {
        let text = String::from_utf8(minimal_pdf(&[None, None, None])).unwrap();
        assert!(text.contains("/Count 3"));
    }
}
