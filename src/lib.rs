//! Food-label OCR and scan history for NutriScan
//!
//! - [`ocr::OcrProcessor`] turns image bytes and a language hint into text
//!   through a pluggable [`engine::OcrEngine`].
//! - [`store::ScanLog`] appends [`record::ScanRecord`]s to a line-oriented log
//!   and reads them back, skipping malformed lines.
//! - [`analysis`] derives a health score, warnings and advice from label text.
//! - [`scan::scan_label`] chains the three for one submission.

pub mod analysis;
pub mod config;
pub mod engine;
pub mod engines;
pub mod error;
pub mod language;
pub mod ocr;
pub mod record;
pub mod scan;
pub mod store;

pub use config::{Config, OcrConfig};
pub use engine::OcrEngine;
pub use engines::EngineRegistry;
pub use error::{OcrEngineError, ScanError, StoreError};
pub use language::LanguageSet;
pub use ocr::{Extraction, OcrProcessor};
pub use record::{ScanRecord, SCAN_TEXT_NOT_SAVED};
pub use scan::{scan_label, ScanOutcome, ScanRequest};
pub use store::{ScanLog, ScanReport, SkipReason};
