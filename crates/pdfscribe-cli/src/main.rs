use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use pdfscribe_core::{Pipeline, ProgressEvent, Settings, SettingsOverrides, config_file};
use pdfscribe_mupdf::MupdfBackend;
use pdfscribe_tesseract::TesseractEngine;

mod output;

use output::OcrProgress;

/// Extract text from a PDF, falling back to OCR when it has no text layer
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the PDF file
    pdf_path: PathBuf,

    /// Write the extracted text to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// OCR language(s) in tesseract syntax, e.g. eng or eng+deu
    #[arg(long, value_name = "LANGS")]
    lang: Option<String>,

    /// Resolution used to render pages for OCR
    #[arg(long)]
    dpi: Option<u32>,

    /// Skip pages that fail OCR instead of failing the whole document
    #[arg(long)]
    keep_going: bool,

    /// Path to the tesseract executable
    #[arg(long, value_name = "PATH")]
    tesseract: Option<PathBuf>,

    /// Load settings from this TOML file instead of the default locations
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    init_tracing(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{}", output::error_message(&err));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let file_config = match cli.config {
        Some(ref path) => config_file::load_strict(path)?,
        None => config_file::load_config(),
    };
    let settings = Settings::from_env(
        SettingsOverrides {
            language: cli.lang,
            dpi: cli.dpi,
            tesseract_path: cli.tesseract,
            keep_going: cli.keep_going,
        },
        &file_config,
    )?;
    tracing::debug!(?settings, "resolved settings");

    let backend = MupdfBackend::new();
    let ocr = TesseractEngine::from_settings(&settings);

    let progress = OcrProgress::new(!cli.quiet);
    let on_progress = |event: ProgressEvent| progress.handle(event);

    let result = Pipeline::new(&backend, &backend, &ocr)
        .with_options(settings.extract_options())
        .with_progress(&on_progress)
        .extract(&cli.pdf_path);
    progress.finish();

    let extraction = result?;
    tracing::debug!(
        method = %extraction.method,
        pages = extraction.page_count,
        skipped = extraction.failed_pages.len(),
        "extraction complete"
    );

    output::write_text(cli.output.as_deref(), &extraction.text)
}
