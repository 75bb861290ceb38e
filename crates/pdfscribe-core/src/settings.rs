use std::path::PathBuf;

use crate::config_file::{ConfigError, ConfigFile};
use crate::pipeline::{DEFAULT_DPI, ExtractOptions};

pub const DEFAULT_LANGUAGE: &str = "eng";
pub const DEFAULT_TESSERACT: &str = "tesseract";
pub const MIN_DPI: u32 = 36;
pub const MAX_DPI: u32 = 1200;

pub const ENV_LANGUAGE: &str = "PDFSCRIBE_OCR_LANG";
pub const ENV_DPI: &str = "PDFSCRIBE_DPI";
pub const ENV_TESSERACT: &str = "PDFSCRIBE_TESSERACT";

/// Values given on the command line. `None` / `false` means "not given".
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub language: Option<String>,
    pub dpi: Option<u32>,
    pub tesseract_path: Option<PathBuf>,
    pub keep_going: bool,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub language: String,
    pub dpi: u32,
    pub tesseract_path: PathBuf,
    pub keep_going: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            dpi: DEFAULT_DPI,
            tesseract_path: PathBuf::from(DEFAULT_TESSERACT),
            keep_going: false,
        }
    }
}

impl Settings {
    /// Resolve configuration: CLI flags > env vars > config file > defaults.
    ///
    /// `env` looks up an environment variable; unparsable values are ignored.
    pub fn resolve(
        cli: SettingsOverrides,
        file: &ConfigFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let ocr = file.ocr.clone().unwrap_or_default();
        let defaults = Settings::default();

        let language = cli
            .language
            .or_else(|| env(ENV_LANGUAGE))
            .or(ocr.language)
            .filter(|l| !l.trim().is_empty())
            .unwrap_or(defaults.language);
        let dpi = cli
            .dpi
            .or_else(|| env(ENV_DPI).and_then(|v| v.trim().parse().ok()))
            .or(ocr.dpi)
            .unwrap_or(defaults.dpi);
        let tesseract_path = cli
            .tesseract_path
            .or_else(|| env(ENV_TESSERACT).map(PathBuf::from))
            .or_else(|| ocr.tesseract_path.map(PathBuf::from))
            .unwrap_or(defaults.tesseract_path);
        let keep_going = cli.keep_going || ocr.keep_going.unwrap_or(defaults.keep_going);

        if !(MIN_DPI..=MAX_DPI).contains(&dpi) {
            return Err(ConfigError::InvalidDpi {
                value: dpi,
                min: MIN_DPI,
                max: MAX_DPI,
            });
        }

        Ok(Self {
            language,
            dpi,
            tesseract_path,
            keep_going,
        })
    }

    /// Resolve against the real process environment.
    pub fn from_env(cli: SettingsOverrides, file: &ConfigFile) -> Result<Self, ConfigError> {
        Self::resolve(cli, file, |key| std::env::var(key).ok())
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            dpi: self.dpi,
            keep_going: self.keep_going,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config_file::OcrConfig;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn file_with(ocr: OcrConfig) -> ConfigFile {
        ConfigFile { ocr: Some(ocr) }
    }

    #[test]
    fn defaults_when_nothing_set() {
        let settings =
            Settings::resolve(SettingsOverrides::default(), &ConfigFile::default(), env_from(&[]))
                .unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.language, "eng");
        assert_eq!(settings.dpi, 200);
    }

    #[test]
    fn cli_beats_env_beats_file() {
        let file = file_with(OcrConfig {
            language: Some("fra".into()),
            dpi: Some(150),
            tesseract_path: Some("/file/tesseract".into()),
            keep_going: None,
        });
        let env = env_from(&[(ENV_LANGUAGE, "deu"), (ENV_DPI, "250")]);
        let cli = SettingsOverrides {
            dpi: Some(300),
            ..Default::default()
        };

        let settings = Settings::resolve(cli, &file, env).unwrap();
        assert_eq!(settings.dpi, 300);
        assert_eq!(settings.language, "deu");
        assert_eq!(settings.tesseract_path, PathBuf::from("/file/tesseract"));
    }

    #[test]
    fn unparsable_env_dpi_falls_through() {
        let file = file_with(OcrConfig {
            dpi: Some(150),
            ..Default::default()
        });
        let settings = Settings::resolve(
            SettingsOverrides::default(),
            &file,
            env_from(&[(ENV_DPI, "high")]),
        )
        .unwrap();
        assert_eq!(settings.dpi, 150);
    }

    #[test]
    fn blank_language_uses_default() {
        let file = file_with(OcrConfig {
            language: Some("  ".into()),
            ..Default::default()
        });
        let settings =
            Settings::resolve(SettingsOverrides::default(), &file, env_from(&[])).unwrap();
        assert_eq!(settings.language, DEFAULT_LANGUAGE);
    }

    #[test]
    fn keep_going_from_file_or_flag() {
        let file = file_with(OcrConfig {
            keep_going: Some(true),
            ..Default::default()
        });
        let from_file =
            Settings::resolve(SettingsOverrides::default(), &file, env_from(&[])).unwrap();
        assert!(from_file.keep_going);

        let from_flag = Settings::resolve(
            SettingsOverrides {
                keep_going: true,
                ..Default::default()
            },
            &ConfigFile::default(),
            env_from(&[]),
        )
        .unwrap();
        assert!(from_flag.extract_options().keep_going);
    }

    #[test]
    fn out_of_range_dpi_rejected() {
        for dpi in [0, 35, 1201] {
            let cli = SettingsOverrides {
                dpi: Some(dpi),
                ..Default::default()
            };
            let err = Settings::resolve(cli, &ConfigFile::default(), env_from(&[])).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidDpi { value, .. } if value == dpi));
        }
    }
}
