//! OCRS engine implementation
//!
//! Pure Rust OCR engine using the ocrs library. No system dependencies required.
//! Downloads neural network models automatically on first use. The stock
//! models only cover the Latin alphabet, so only English codes are accepted.

use super::download::{cache_dir, ensure_cached};
use crate::config::OcrConfig;
use crate::engine::{decode_image, OcrEngine};
use crate::error::OcrEngineError;
use crate::language::LanguageSet;
use ocrs::{DecodeMethod, ImageSource, OcrEngine as OcrsOcrEngine, OcrEngineParams};
use rten::Model;

/// Default model URLs from the ocrs project
const DETECTION_MODEL_URL: &str =
    "https://ocrs-models.s3-accelerate.amazonaws.com/text-detection.rten";
const RECOGNITION_MODEL_URL: &str =
    "https://ocrs-models.s3-accelerate.amazonaws.com/text-recognition.rten";

/// Language codes the stock ocrs models can read
const SUPPORTED_LANGUAGES: &[&str] = &["eng", "en"];

const ENGINE_NAME: &str = "ocrs";

/// OCR Engine wrapping the ocrs library
pub struct OcrsEngine {
    engine: OcrsOcrEngine,
}

impl OcrsEngine {
    /// Create a new engine, downloading models if needed.
    ///
    /// Fails before any download when the configured default or fallback
    /// language cannot be read by the stock models.
    pub fn new(config: &OcrConfig) -> Result<Self, OcrEngineError> {
        tracing::info!("Initializing ocrs OCR engine...");

        check_languages(&LanguageSet::resolve(
            None,
            &config.default_language,
            &config.fallback_language,
        ))?;

        let models = cache_dir(None);
        let detection_model_path =
            ensure_cached(DETECTION_MODEL_URL, &models, "text-detection.rten")?;
        let recognition_model_path =
            ensure_cached(RECOGNITION_MODEL_URL, &models, "text-recognition.rten")?;

        let detection_model = Model::load_file(&detection_model_path).map_err(|e| {
            OcrEngineError::InitializationError(format!("Failed to load detection model: {}", e))
        })?;
        let recognition_model = Model::load_file(&recognition_model_path).map_err(|e| {
            OcrEngineError::InitializationError(format!("Failed to load recognition model: {}", e))
        })?;

        let engine = OcrsOcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            decode_method: DecodeMethod::Greedy,
            ..Default::default()
        })
        .map_err(|e| {
            OcrEngineError::InitializationError(format!("Failed to create OCR engine: {}", e))
        })?;

        tracing::info!("ocrs engine initialized successfully");

        Ok(Self { engine })
    }
}

fn check_languages(languages: &LanguageSet) -> Result<(), OcrEngineError> {
    match languages.iter().find(|code| !SUPPORTED_LANGUAGES.contains(code)) {
        Some(code) => Err(OcrEngineError::UnsupportedLanguage {
            engine: ENGINE_NAME,
            language: code.to_string(),
        }),
        None => Ok(()),
    }
}

impl OcrEngine for OcrsEngine {
    fn name(&self) -> &'static str {
        ENGINE_NAME
    }

    fn description(&self) -> &'static str {
        "Pure Rust OCR engine - fast, no system dependencies required"
    }

    fn recognize(
        &self,
        image: &[u8],
        languages: &LanguageSet,
    ) -> Result<Vec<String>, OcrEngineError> {
        check_languages(languages)?;

        // ImageSource::from_bytes expects RGB8 in HWC layout
        let rgb_img = decode_image(image)?.into_rgb8();
        let dimensions = rgb_img.dimensions();

        let img_source = ImageSource::from_bytes(rgb_img.as_raw(), dimensions).map_err(|e| {
            OcrEngineError::DecodeError(format!("Failed to create image source: {}", e))
        })?;

        let ocr_input = self.engine.prepare_input(img_source).map_err(|e| {
            OcrEngineError::RecognitionError(format!("Failed to prepare input: {}", e))
        })?;

        let word_rects = self.engine.detect_words(&ocr_input).map_err(|e| {
            OcrEngineError::RecognitionError(format!("Failed to detect words: {}", e))
        })?;

        let line_rects = self.engine.find_text_lines(&ocr_input, &word_rects);

        let line_texts = self
            .engine
            .recognize_text(&ocr_input, &line_rects)
            .map_err(|e| OcrEngineError::RecognitionError(e.to_string()))?;

        // One fragment per recognized line, words joined by single spaces
        Ok(line_texts
            .iter()
            .filter_map(|line| line.as_ref())
            .map(|line| {
                line.words()
                    .map(|word| word.to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect())
    }

    fn supported_languages(&self) -> Vec<String> {
        SUPPORTED_LANGUAGES.iter().map(|s| s.to_string()).collect()
    }
}
