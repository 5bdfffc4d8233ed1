//! OCR orchestration
//!
//! [`OcrProcessor`] sits in front of a single [`OcrEngine`]. It resolves the
//! caller's language hint, guards the input size, delegates recognition and
//! normalizes the fragments into one string. Choosing or retrying engines is
//! left to the caller: build another processor with a different engine.

use crate::config::OcrConfig;
use crate::engine::OcrEngine;
use crate::error::OcrEngineError;
use crate::language::LanguageSet;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Note attached to an extraction that found no text
pub const NO_TEXT_MESSAGE: &str = "No text found in the image.";

/// Outcome of one extraction call
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    pub text: String,
    pub languages: Vec<String>,
    pub engine: String,
    pub processing_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

pub struct OcrProcessor {
    engine: Arc<dyn OcrEngine>,
    config: OcrConfig,
}

impl OcrProcessor {
    pub fn new(engine: Arc<dyn OcrEngine>, config: OcrConfig) -> Result<Self, OcrEngineError> {
        if config.fallback_language.trim().is_empty() {
            return Err(OcrEngineError::InitializationError(
                "Fallback language must not be empty".to_string(),
            ));
        }
        if config.default_language.trim().is_empty() {
            return Err(OcrEngineError::InitializationError(
                "Default language must not be empty".to_string(),
            ));
        }

        Ok(Self { engine, config })
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    pub fn config(&self) -> &OcrConfig {
        &self.config
    }

    /// Resolve a caller hint against this processor's default and fallback
    pub fn resolve_languages(&self, hint: Option<&str>) -> LanguageSet {
        LanguageSet::resolve(
            hint,
            &self.config.default_language,
            &self.config.fallback_language,
        )
    }

    /// Extract text from image bytes. An image without text yields `""`.
    pub fn extract(&self, image: &[u8], hint: Option<&str>) -> Result<String, OcrEngineError> {
        self.extract_detailed(image, hint).map(|e| e.text)
    }

    /// Extract text and report which languages and engine were used
    pub fn extract_detailed(
        &self,
        image: &[u8],
        hint: Option<&str>,
    ) -> Result<Extraction, OcrEngineError> {
        let start = Instant::now();

        if image.is_empty() {
            return Err(OcrEngineError::EmptyImage);
        }
        if image.len() > self.config.max_image_bytes {
            return Err(OcrEngineError::ImageTooLarge {
                size: image.len(),
                max: self.config.max_image_bytes,
            });
        }

        let languages = self.resolve_languages(hint);
        tracing::debug!(
            engine = self.engine.name(),
            languages = %languages,
            bytes = image.len(),
            "Running OCR"
        );

        let fragments = self.engine.recognize(image, &languages)?;
        let text = normalize_fragments(&fragments);
        let processing_time_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            "OCR completed in {}ms with {} ({}), text length: {}",
            processing_time_ms,
            self.engine.name(),
            languages,
            text.len()
        );

        let message = text.is_empty().then(|| NO_TEXT_MESSAGE.to_string());

        Ok(Extraction {
            text,
            languages: languages.to_vec(),
            engine: self.engine.name().to_string(),
            processing_time_ms,
            message,
        })
    }
}

/// Join fragments with newlines in the order given and trim the result
pub fn normalize_fragments<S: AsRef<str>>(fragments: &[S]) -> String {
    fragments
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
