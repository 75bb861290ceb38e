use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use pdfscribe_core::{BackendError, OcrEngine, PageImage, Settings};

/// [`OcrEngine`] that shells out to the `tesseract` executable, one process
/// per page: `tesseract <image> stdout -l <lang> --dpi <dpi>`.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    binary: PathBuf,
    language: String,
    dpi: Option<u32>,
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self {
            binary: PathBuf::from(pdfscribe_core::settings::DEFAULT_TESSERACT),
            language: pdfscribe_core::settings::DEFAULT_LANGUAGE.to_string(),
            dpi: None,
        }
    }
}

impl TesseractEngine {
    pub fn new(binary: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            language: language.into(),
            dpi: None,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.tesseract_path, &settings.language).with_dpi(settings.dpi)
    }

    /// Tell tesseract the resolution the pages were rendered at. Rendered
    /// PNGs carry no density metadata, so without this tesseract guesses.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = Some(dpi);
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Whether the configured executable can be started at all.
    pub fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn command(&self, image: &Path) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg(image).arg("stdout").arg("-l").arg(&self.language);
        if let Some(dpi) = self.dpi {
            cmd.arg("--dpi").arg(dpi.to_string());
        }
        cmd
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(&self, image: &PageImage) -> Result<String, BackendError> {
        let page = image.index + 1;
        let output = self.command(&image.path).output().map_err(|e| match e.kind() {
            ErrorKind::NotFound | ErrorKind::PermissionDenied => BackendError::EngineUnavailable(
                format!("{}: {}", self.binary.display(), e),
            ),
            _ => BackendError::Io(e),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BackendError::RecognitionError {
                page,
                message: single_line(&stderr, output.status.code()),
            });
        }

        if !output.stderr.is_empty() {
            tracing::debug!(
                page,
                stderr = %single_line(&String::from_utf8_lossy(&output.stderr), None),
                "tesseract diagnostics"
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Collapse multi-line tool output into one line for error messages.
fn single_line(stderr: &str, code: Option<i32>) -> String {
    let joined = stderr.split_whitespace().collect::<Vec<_>>().join(" ");
    match (joined.is_empty(), code) {
        (true, Some(code)) => format!("tesseract exited with status {code}"),
        (true, None) => "tesseract was terminated by a signal".to_string(),
        (false, _) => joined,
    }
}
