//! One complete label scan: extract, assess, append
//!
//! The assessed record keeps the full OCR text in memory; the log only keeps
//! the identity, score and warnings.

use crate::analysis::{self, DietProfile};
use crate::error::ScanError;
use crate::ocr::OcrProcessor;
use crate::record::ScanRecord;
use crate::store::ScanLog;
use serde::Serialize;

/// Who is scanning and how the label should be read
#[derive(Debug, Clone, Default)]
pub struct ScanRequest {
    pub name: String,
    pub email: String,
    pub language_hint: Option<String>,
    pub profile: DietProfile,
}

/// Result of a logged scan
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    pub record: ScanRecord,
    pub recommendations: Vec<String>,
    pub languages: Vec<String>,
    pub engine: String,
    pub processing_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Extract text from `image`, score it against the request's profile and
/// append the resulting record to `log`. Nothing is logged if extraction fails.
pub fn scan_label(
    processor: &OcrProcessor,
    log: &ScanLog,
    image: &[u8],
    request: &ScanRequest,
) -> Result<ScanOutcome, ScanError> {
    let extraction = processor.extract_detailed(image, request.language_hint.as_deref())?;
    let assessment = analysis::assess(&extraction.text, &request.profile);

    let record = ScanRecord::new(
        request.name.as_str(),
        request.email.as_str(),
        extraction.text,
        assessment.health_score,
        assessment.warnings,
    );
    log.append(&record)?;

    tracing::info!(
        score = record.health_score,
        warnings = record.warnings.len(),
        "Scan logged to {:?}",
        log.path()
    );

    Ok(ScanOutcome {
        record,
        recommendations: assessment.recommendations,
        languages: extraction.languages,
        engine: extraction.engine,
        processing_time_ms: extraction.processing_time_ms,
        message: extraction.message,
    })
}
