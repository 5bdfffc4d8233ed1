use anyhow::Context;
use clap::{Parser, Subcommand};
use nutriscan_ocr::analysis::DietProfile;
use nutriscan_ocr::config::{self, Config, OcrConfig};
use nutriscan_ocr::engines::EngineInfo;
use nutriscan_ocr::error::ErrorResponse;
use nutriscan_ocr::{scan_label, EngineRegistry, OcrProcessor, ScanLog, ScanRecord, ScanRequest};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "nutriscan")]
#[command(about = "Food-label OCR and scan history for NutriScan")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path of the append-only scan log
    #[arg(long, global = true, env = "SCAN_LOG_PATH", default_value = config::DEFAULT_LOG_PATH)]
    pub log_path: PathBuf,

    /// Language used when no hint is given (e.g., "eng", "deu", "fra")
    #[arg(long, global = true, env = "OCR_DEFAULT_LANGUAGE", default_value = config::DEFAULT_LANGUAGE)]
    pub default_language: String,

    /// Language always added to every recognition attempt
    #[arg(long, global = true, env = "OCR_FALLBACK_LANGUAGE", default_value = config::DEFAULT_FALLBACK_LANGUAGE)]
    pub fallback_language: String,

    /// OCR engine to use (defaults to the first compiled-in engine)
    #[arg(long, global = true, env = "OCR_ENGINE")]
    pub engine: Option<String>,

    /// Maximum image size in bytes (default: 50MB)
    #[arg(long, global = true, env = "OCR_MAX_FILE_SIZE", default_value = "52428800")]
    pub max_file_size: usize,

    /// Path to tessdata directory (uses TESSDATA_PREFIX env var if not set)
    #[arg(long, global = true, env = "TESSDATA_PREFIX")]
    pub tessdata_path: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract text from a label image
    Extract {
        image: PathBuf,
        /// Comma-separated language codes, e.g. "eng,fra"
        #[arg(long)]
        lang: Option<String>,
    },
    /// Extract, score and log a label image in one go
    Scan {
        image: PathBuf,
        #[arg(long)]
        lang: Option<String>,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Allergy keyword (repeatable, or comma-separated)
        #[arg(long = "allergy")]
        allergies: Vec<String>,
        #[arg(long)]
        diabetic: bool,
    },
    /// Append an already scored record to the scan log
    Log {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, allow_hyphen_values = true)]
        score: i64,
        /// Warning text (repeatable)
        #[arg(long = "warning")]
        warnings: Vec<String>,
        #[arg(long, default_value = "")]
        scan_text: String,
    },
    /// Print every logged scan, oldest first
    History,
    /// List the compiled-in OCR engines
    Engines,
}

impl From<&Args> for Config {
    fn from(args: &Args) -> Self {
        Self {
            ocr: OcrConfig {
                default_language: args.default_language.clone(),
                fallback_language: args.fallback_language.clone(),
                max_image_bytes: args.max_file_size,
                tessdata_path: args.tessdata_path.clone(),
            },
            log_path: args.log_path.clone(),
            engine: args.engine.clone(),
        }
    }
}

#[derive(Serialize)]
struct LogResponse {
    message: String,
    log_path: PathBuf,
}

#[derive(Serialize)]
struct HistoryResponse {
    logs: Vec<ScanRecord>,
    skipped: usize,
}

#[derive(Serialize)]
struct EnginesResponse {
    default_engine: String,
    available_engines: Vec<EngineInfo>,
    default_language: String,
    fallback_language: String,
    max_file_size_bytes: usize,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Logs go to stderr; stdout carries the JSON result
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("nutriscan v{}", env!("CARGO_PKG_VERSION"));

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{:#}", err);
            let body = ErrorResponse::from_anyhow(&err);
            match serde_json::to_string(&body) {
                Ok(json) => eprintln!("{}", json),
                Err(_) => eprintln!("{:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let config = Config::from(args);
    let log = ScanLog::new(&config.log_path);

    match &args.command {
        Command::Extract { image, lang } => {
            let processor = processor(&config)?;
            let bytes = read_image(image)?;
            print_json(&processor.extract_detailed(&bytes, lang.as_deref())?)
        }
        Command::Scan {
            image,
            lang,
            name,
            email,
            allergies,
            diabetic,
        } => {
            let processor = processor(&config)?;
            let bytes = read_image(image)?;
            let request = ScanRequest {
                name: name.clone(),
                email: email.clone(),
                language_hint: lang.clone(),
                profile: DietProfile::from_allergy_args(allergies, *diabetic),
            };
            print_json(&scan_label(&processor, &log, &bytes, &request)?)
        }
        Command::Log {
            name,
            email,
            score,
            warnings,
            scan_text,
        } => {
            let record = ScanRecord::new(
                name.as_str(),
                email.as_str(),
                scan_text.as_str(),
                *score,
                warnings.clone(),
            );
            log.append(&record)?;
            print_json(&LogResponse {
                message: "Scan logged successfully".to_string(),
                log_path: log.path().to_path_buf(),
            })
        }
        Command::History => {
            let report = log.scan()?;
            if !report.skipped.is_empty() {
                tracing::warn!(
                    "Skipped {} malformed line(s) in {:?}",
                    report.skipped.len(),
                    log.path()
                );
            }
            print_json(&HistoryResponse {
                skipped: report.skipped.len(),
                logs: report.records,
            })
        }
        Command::Engines => {
            let registry = EngineRegistry::new(&config.ocr)?;
            print_json(&EnginesResponse {
                default_engine: registry.default_name().to_string(),
                available_engines: registry.info(),
                default_language: config.ocr.default_language.clone(),
                fallback_language: config.ocr.fallback_language.clone(),
                max_file_size_bytes: config.ocr.max_image_bytes,
            })
        }
    }
}

fn processor(config: &Config) -> anyhow::Result<OcrProcessor> {
    let registry = EngineRegistry::new(&config.ocr)?;
    let engine = registry.select(config.engine.as_deref())?;
    tracing::info!("Using OCR engine {}", engine.name());
    Ok(OcrProcessor::new(engine, config.ocr.clone())?)
}

fn read_image(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read image {:?}", path))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
