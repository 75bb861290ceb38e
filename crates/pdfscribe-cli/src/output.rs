use std::io::Write;
use std::path::Path;

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use pdfscribe_core::ProgressEvent;

/// Page counter shown on stderr while OCR runs. Hidden when disabled or
/// when stderr is not a terminal.
pub struct OcrProgress {
    bar: ProgressBar,
}

impl OcrProgress {
    pub fn new(enabled: bool) -> Self {
        let bar = if enabled {
            ProgressBar::new(0)
        } else {
            ProgressBar::hidden()
        };
        Self { bar }
    }

    pub fn handle(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::TextLayerRead { .. } => {}
            ProgressEvent::FallingBackToOcr => {
                let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner());
                self.bar.set_style(style);
                self.bar.set_message("Rendering pages...");
                self.bar.tick();
            }
            ProgressEvent::Rasterized { pages, dpi } => {
                let style = ProgressStyle::with_template(
                    "{spinner:.green} {msg} [{bar:40.green/dim}] {pos}/{len} pages (eta {eta})",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> ");
                self.bar.set_length(pages as u64);
                self.bar.set_style(style);
                self.bar.set_message(format!("OCR at {dpi} DPI"));
            }
            ProgressEvent::PageRecognized { .. } | ProgressEvent::PageSkipped { .. } => {
                self.bar.inc(1);
            }
        }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Write the extracted text followed by a newline, to `output` or stdout.
pub fn write_text(output: Option<&Path>, text: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, format!("{text}\n"))
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote extracted text");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{text}")?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// Render an error and its causes on one line, skipping causes whose text
/// the outer message already includes.
pub fn error_message(err: &anyhow::Error) -> String {
    let mut message = err.to_string();
    for cause in err.chain().skip(1) {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
    }
    message
}
