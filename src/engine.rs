use crate::error::OcrEngineError;
use crate::language::LanguageSet;

/// Trait that all OCR engines must implement
pub trait OcrEngine: Send + Sync {
    /// Returns the engine identifier (e.g., "ocrs", "leptess")
    fn name(&self) -> &'static str;

    /// Returns a human-readable description of the engine
    fn description(&self) -> &'static str;

    /// Recognize text in an encoded image (PNG, JPEG, ...).
    ///
    /// Returns text fragments in reading order. An image without text yields
    /// an empty vector, not an error.
    fn recognize(
        &self,
        image: &[u8],
        languages: &LanguageSet,
    ) -> Result<Vec<String>, OcrEngineError>;

    /// Get supported languages
    fn supported_languages(&self) -> Vec<String>;
}

/// Decode image bytes with the `image` crate, mapping failures to a decode error
pub fn decode_image(image: &[u8]) -> Result<image::DynamicImage, OcrEngineError> {
    image::load_from_memory(image)
        .map_err(|e| OcrEngineError::DecodeError(format!("Failed to load image: {}", e)))
}
