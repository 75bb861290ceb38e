use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("DPI must be between {min} and {max}, got {value}")]
    InvalidDpi { value: u32, min: u32, max: u32 },
}

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub ocr: Option<OcrConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Tesseract language string, e.g. `eng` or `eng+deu`.
    pub language: Option<String>,
    pub dpi: Option<u32>,
    pub tesseract_path: Option<String>,
    pub keep_going: Option<bool>,
}

/// Platform config directory path: `<config_dir>/pdfscribe/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pdfscribe").join("config.toml"))
}

/// Load config by cascading CWD `.pdfscribe.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".pdfscribe.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    match load_strict(path) {
        Ok(config) => Some(config),
        Err(ConfigError::Read { .. }) => None,
        Err(e) => {
            tracing::debug!(error = %e, "ignoring unreadable config file");
            None
        }
    }
}

/// Load a config that the user asked for explicitly; any failure is an error.
pub fn load_strict(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let base = base.ocr.unwrap_or_default();
    let overlay = overlay.ocr.unwrap_or_default();
    ConfigFile {
        ocr: Some(OcrConfig {
            language: overlay.language.or(base.language),
            dpi: overlay.dpi.or(base.dpi),
            tesseract_path: overlay.tesseract_path.or(base.tesseract_path),
            keep_going: overlay.keep_going.or(base.keep_going),
        }),
    }
}
