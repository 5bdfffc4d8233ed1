use nutriscan_ocr::analysis::{self, DietProfile};
use nutriscan_ocr::ocr::NO_TEXT_MESSAGE;
use nutriscan_ocr::{
    scan_label, LanguageSet, OcrConfig, OcrEngine, OcrEngineError, OcrProcessor, ScanLog,
    ScanRecord, ScanRequest, SkipReason, SCAN_TEXT_NOT_SAVED,
};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use std::sync::Arc;
use tempfile::TempDir;

/// Engine double that "reads" the image bytes as UTF-8 lines
struct TextEngine;

impl OcrEngine for TextEngine {
    fn name(&self) -> &'static str {
        "text"
    }

    fn description(&self) -> &'static str {
        "treats image bytes as text"
    }

    fn recognize(
        &self,
        image: &[u8],
        languages: &LanguageSet,
    ) -> Result<Vec<String>, OcrEngineError> {
        if let Some(code) = languages.iter().find(|c| *c == "xx") {
            return Err(OcrEngineError::UnsupportedLanguage {
                engine: "text",
                language: code.to_string(),
            });
        }
        let text = std::str::from_utf8(image)
            .map_err(|e| OcrEngineError::DecodeError(e.to_string()))?;
        Ok(text.lines().map(str::to_string).collect())
    }

    fn supported_languages(&self) -> Vec<String> {
        vec!["eng".to_string()]
    }
}

fn processor() -> OcrProcessor {
    OcrProcessor::new(Arc::new(TextEngine), OcrConfig::default()).unwrap()
}

#[test]
fn test_extract_score_log_and_read_back() {
    let dir = TempDir::new().unwrap();
    let log = ScanLog::new(dir.path().join("user_scans.log"));

    let text = processor()
        .extract(b"  Ingredients: sugar, milk\nE471\n\n", Some("eng"))
        .unwrap();
    assert_eq!(text, "Ingredients: sugar, milk\nE471");

    let profile = DietProfile::default().with_allergy_list("dairy");
    let assessment = analysis::assess(&text, &profile);
    let record = ScanRecord::new(
        "Ann",
        "a@x.com",
        text.as_str(),
        assessment.health_score,
        assessment.warnings.clone(),
    );
    log.append(&record).unwrap();

    let records = log.list_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].health_score, 30);
    assert_eq!(records[0].warnings, assessment.warnings);
    assert_eq!(records[0].scan_text, SCAN_TEXT_NOT_SAVED);
}

#[test]
fn test_blank_image_text_is_empty_string() {
    assert_eq!(processor().extract(b" \n \n", None).unwrap(), "");
}

#[test]
fn test_engine_errors_reach_the_caller() {
    let err = processor().extract(b"text", Some("xx")).unwrap_err();
    assert_eq!(err.code(), "UNSUPPORTED_LANGUAGE");

    let err = processor().extract(&[0xff, 0xfe], None).unwrap_err();
    assert_eq!(err.code(), "DECODE_ERROR");
}

#[test]
fn test_empty_text_carries_message() {
    let blank = processor().extract_detailed(b" \n \n", None).unwrap();
    assert!(blank.is_empty());
    assert_eq!(blank.message.as_deref(), Some(NO_TEXT_MESSAGE));

    let label = processor().extract_detailed(b"oats", None).unwrap();
    assert_eq!(label.text, "oats");
    assert_eq!(label.message, None);
}

fn request(allergy_args: &[&str], diabetic: bool) -> ScanRequest {
    ScanRequest {
        name: "Ann".to_string(),
        email: "a@x.com".to_string(),
        language_hint: Some("eng".to_string()),
        profile: DietProfile::from_allergy_args(allergy_args, diabetic),
    }
}

#[test]
fn test_scan_label_assesses_and_appends() {
    let dir = TempDir::new().unwrap();
    let log = ScanLog::new(dir.path().join("user_scans.log"));

    let outcome = scan_label(
        &processor(),
        &log,
        b"Ingredients: sugar, milk\nhazelnut paste",
        &request(&["dairy", "Nuts, sesame"], true),
    )
    .unwrap();

    assert_eq!(outcome.record.scan_text, "Ingredients: sugar, milk\nhazelnut paste");
    assert_eq!(outcome.record.health_score, 10);
    assert_eq!(
        outcome.record.warnings,
        vec![
            "⚠️ High sugar content",
            "⚠️ Contains allergen: milk",
            "⚠️ Contains allergen: hazelnut",
            "⚠️ Not suitable for diabetics",
        ]
    );
    assert_eq!(
        outcome.recommendations,
        vec!["🔄 This product contains sugar. Try sugar-free or low-GI options."]
    );
    assert_eq!(outcome.languages, vec!["eng"]);
    assert_eq!(outcome.engine, "text");
    assert_eq!(outcome.message, None);

    let records = log.list_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "Ann");
    assert_eq!(records[0].health_score, 10);
    assert_eq!(records[0].warnings, outcome.record.warnings);
    assert!(records[0].is_reconstructed());
}

#[test]
fn test_scan_label_blank_image_still_logged() {
    let dir = TempDir::new().unwrap();
    let log = ScanLog::new(dir.path().join("user_scans.log"));

    let outcome = scan_label(&processor(), &log, b"\n  \n", &request(&[], false)).unwrap();
    assert_eq!(outcome.record.health_score, 100);
    assert!(outcome.record.warnings.is_empty());
    assert_eq!(outcome.recommendations, vec!["✅ This item looks safe for you."]);
    assert_eq!(outcome.message.as_deref(), Some(NO_TEXT_MESSAGE));

    assert_eq!(log.list_all().unwrap().len(), 1);
}

#[test]
fn test_scan_label_failure_appends_nothing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("user_scans.log");
    let log = ScanLog::new(&path);

    let mut bad_hint = request(&[], false);
    bad_hint.language_hint = Some("xx".to_string());
    let err = scan_label(&processor(), &log, b"sugar", &bad_hint).unwrap_err();
    assert_eq!(err.code(), "UNSUPPORTED_LANGUAGE");

    let err = scan_label(&processor(), &log, b"", &request(&[], false)).unwrap_err();
    assert_eq!(err.code(), "EMPTY_IMAGE");

    assert!(!path.exists());
}

#[test]
fn test_scan_label_unwritable_log() {
    let dir = TempDir::new().unwrap();
    let log = ScanLog::new(dir.path().join("missing").join("user_scans.log"));

    let err = scan_label(&processor(), &log, b"oats", &request(&[], false)).unwrap_err();
    assert_eq!(err.code(), "STORE_IO_ERROR");
}

#[test]
fn test_store_round_trip_and_order() {
    let dir = TempDir::new().unwrap();
    let log = ScanLog::new(dir.path().join("scans.log"));

    log.append(&ScanRecord::new(
        "Ann",
        "a@x.com",
        "ignored",
        7,
        vec!["A".to_string(), "B".to_string()],
    ))
    .unwrap();
    log.append(&ScanRecord::new("Bo | Jr.", "b@x.com", "", 3, vec![]))
        .unwrap();

    let records = log.list_all().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].name, "Ann");
    assert_eq!(records[0].health_score, 7);
    assert_eq!(records[0].warnings, vec!["A", "B"]);
    assert_eq!(records[1].name, "Bo | Jr.");
    assert!(records[1].warnings.is_empty());
    assert!(records.iter().all(|r| r.scan_text == SCAN_TEXT_NOT_SAVED));
}

#[test]
fn test_store_skips_malformed_lines() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scans.log");
    fs::write(
        &path,
        "Ann | a@x.com | Score: 7 | Warnings: None\nBob | b@x.com | Score: ?? | Warnings: None\n",
    )
    .unwrap();

    let log = ScanLog::new(&path);
    assert_eq!(log.list_all().unwrap().len(), 1);

    let report = log.scan().unwrap();
    assert_eq!(report.skipped.len(), 1);
    assert!(matches!(report.skipped[0].reason, SkipReason::InvalidScore { .. }));
}

// ---------------------------------------------------------------------------
// Command-line tests
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    logs: Vec<ScanRecord>,
    skipped: usize,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct ErrorResponse {
    error: String,
    code: String,
}

fn nutriscan(log_path: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_nutriscan"))
        .args(args)
        .arg("--log-path")
        .arg(log_path)
        .env_remove("SCAN_LOG_PATH")
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to run nutriscan")
}

fn history(log_path: &Path) -> HistoryResponse {
    let output = nutriscan(log_path, &["history"]);
    assert!(output.status.success(), "history failed: {:?}", output);
    serde_json::from_slice(&output.stdout).expect("Failed to parse history output")
}

#[test]
fn test_cli_log_then_history() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scans.log");

    let output = nutriscan(
        &path,
        &[
            "log", "--name", "Ann", "--email", "a@x.com", "--score", "7", "--warning", "A",
            "--warning", "B",
        ],
    );
    assert!(output.status.success(), "log failed: {:?}", output);

    let output = nutriscan(
        &path,
        &["log", "--name", "Cy", "--email", "c@x.com", "--score", "-5"],
    );
    assert!(output.status.success(), "log failed: {:?}", output);

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "Ann | a@x.com | Score: 7 | Warnings: A, B\nCy | c@x.com | Score: -5 | Warnings: None\n"
    );

    let response = history(&path);
    assert_eq!(response.skipped, 0);
    assert_eq!(response.logs.len(), 2);
    assert_eq!(response.logs[0].warnings, vec!["A", "B"]);
    assert_eq!(response.logs[1].health_score, -5);
    assert_eq!(response.logs[1].scan_text, SCAN_TEXT_NOT_SAVED);
}

#[test]
fn test_cli_history_missing_log() {
    let dir = TempDir::new().unwrap();
    let response = history(&dir.path().join("nothing-here.log"));
    assert!(response.logs.is_empty());
    assert_eq!(response.skipped, 0);
}

#[test]
fn test_cli_history_reports_skipped_lines() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scans.log");
    fs::write(
        &path,
        "broken line\nAnn | a@x.com | Score: 7 | Warnings: None\nBob | b@x.com | Score: x\n",
    )
    .unwrap();

    let response = history(&path);
    assert_eq!(response.logs.len(), 1);
    assert_eq!(response.logs[0].name, "Ann");
    assert_eq!(response.skipped, 2);
}

#[test]
fn test_cli_log_to_unwritable_path_reports_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("no-such-dir").join("scans.log");

    let output = nutriscan(
        &path,
        &["log", "--name", "Ann", "--email", "a@x.com", "--score", "1"],
    );
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    let body: ErrorResponse = stderr
        .lines()
        .rev()
        .find_map(|line| serde_json::from_str(line).ok())
        .expect("Expected a JSON error on stderr");
    assert_eq!(body.code, "STORE_IO_ERROR");
}
