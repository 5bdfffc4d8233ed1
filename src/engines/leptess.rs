//! Leptess/Tesseract engine implementation
//!
//! Tesseract-based OCR engine. Better for noisy/messy images like phone photos
//! of packaging, and the only engine that reads non-Latin scripts.
//! Uses tesseract-static crate for static linking (no system dependencies).
//! Downloads tessdata (training data) per language on first use.

use super::download::{cache_dir, ensure_cached};
use crate::config::OcrConfig;
use crate::engine::{decode_image, OcrEngine};
use crate::error::OcrEngineError;
use crate::language::LanguageSet;
use std::path::PathBuf;
use tesseract_static::tesseract::Tesseract;

/// Tesseract OCR Engine
pub struct LeptessEngine {
    /// Path to tessdata directory
    tessdata_dir: PathBuf,
    /// Whether missing languages may be downloaded into `tessdata_dir`
    managed: bool,
}

impl LeptessEngine {
    /// Create a new Tesseract-based OCR engine
    pub fn new(config: &OcrConfig) -> Result<Self, OcrEngineError> {
        let (tessdata_dir, managed) = match &config.tessdata_path {
            Some(path) => (PathBuf::from(path), false),
            None => (cache_dir(Some("tessdata")), true),
        };

        let engine = Self {
            tessdata_dir,
            managed,
        };

        // Validate that the default and fallback languages load
        let startup = LanguageSet::resolve(
            None,
            &config.default_language,
            &config.fallback_language,
        );
        engine.ensure_languages(&startup)?;
        let test_tess = engine.tesseract(&startup)?;
        drop(test_tess);

        tracing::info!(
            "Leptess engine initialized (tessdata: {:?}, languages: {})",
            engine.tessdata_dir,
            startup
        );

        Ok(engine)
    }

    /// Make sure a `.traineddata` file exists for every requested language
    fn ensure_languages(&self, languages: &LanguageSet) -> Result<(), OcrEngineError> {
        for code in languages.iter() {
            let filename = format!("{}.traineddata", code);
            if self.tessdata_dir.join(&filename).exists() {
                continue;
            }

            let unsupported = || OcrEngineError::UnsupportedLanguage {
                engine: "leptess",
                language: code.to_string(),
            };

            if !self.managed || !is_plausible_code(code) {
                return Err(unsupported());
            }

            ensure_cached(&tessdata_url(code), &self.tessdata_dir, &filename).map_err(|e| {
                tracing::warn!("No tessdata for '{}': {}", code, e);
                unsupported()
            })?;
        }
        Ok(())
    }

    fn tesseract(&self, languages: &LanguageSet) -> Result<Tesseract, OcrEngineError> {
        let datapath = self.tessdata_dir.to_str().ok_or_else(|| {
            OcrEngineError::InitializationError("Invalid tessdata path".to_string())
        })?;

        Tesseract::new(Some(datapath), Some(&languages.to_tesseract_spec())).map_err(|e| {
            OcrEngineError::InitializationError(format!("Failed to initialize Tesseract: {}", e))
        })
    }
}

impl OcrEngine for LeptessEngine {
    fn name(&self) -> &'static str {
        "leptess"
    }

    fn description(&self) -> &'static str {
        "Tesseract OCR engine - better for noisy/messy images like phone photos"
    }

    fn recognize(
        &self,
        image: &[u8],
        languages: &LanguageSet,
    ) -> Result<Vec<String>, OcrEngineError> {
        self.ensure_languages(languages)?;

        let rgb_img = decode_image(image)?.to_rgb8();
        let (width, height) = rgb_img.dimensions();

        // Re-encode as BMP in memory (BMP is always supported by leptonica)
        let mut bmp_data = Vec::new();
        rgb_img
            .write_to(&mut std::io::Cursor::new(&mut bmp_data), image::ImageFormat::Bmp)
            .map_err(|e| OcrEngineError::DecodeError(format!("Failed to convert to BMP: {}", e)))?;

        tracing::debug!(
            "Processing image: {}x{}, BMP size: {} bytes",
            width,
            height,
            bmp_data.len()
        );

        let mut tess = self.tesseract(languages)?;

        tess = tess.set_image_from_mem(&bmp_data).map_err(|e| {
            OcrEngineError::DecodeError(format!(
                "Failed to set image ({}x{}, {} bytes): {}",
                width,
                height,
                bmp_data.len(),
                e
            ))
        })?;

        tess = tess
            .recognize()
            .map_err(|e| OcrEngineError::RecognitionError(e.to_string()))?;

        let text = tess
            .get_text()
            .map_err(|e| OcrEngineError::RecognitionError(format!("Failed to get text: {}", e)))?;

        Ok(text.lines().map(str::to_string).collect())
    }

    fn supported_languages(&self) -> Vec<String> {
        // Tesseract supports many more; these are the common label languages
        vec![
            "eng".to_string(),     // English
            "deu".to_string(),     // German
            "fra".to_string(),     // French
            "spa".to_string(),     // Spanish
            "ita".to_string(),     // Italian
            "por".to_string(),     // Portuguese
            "nld".to_string(),     // Dutch
            "hin".to_string(),     // Hindi
            "jpn".to_string(),     // Japanese
            "chi_sim".to_string(), // Chinese Simplified
            "chi_tra".to_string(), // Chinese Traditional
            "kor".to_string(),     // Korean
            "ara".to_string(),     // Arabic
            "rus".to_string(),     // Russian
        ]
    }
}

/// Tessdata file names are ASCII letters and underscores (`eng`, `chi_sim`)
fn is_plausible_code(code: &str) -> bool {
    !code.is_empty() && code.chars().all(|c| c.is_ascii_lowercase() || c == '_')
}

/// Get tessdata download URL for a language
fn tessdata_url(language: &str) -> String {
    // Use tessdata_fast for smaller, faster downloads
    format!(
        "https://github.com/tesseract-ocr/tessdata_fast/raw/main/{}.traineddata",
        language
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plausible_codes() {
        assert!(is_plausible_code("eng"));
        assert!(is_plausible_code("chi_sim"));
        assert!(!is_plausible_code("../etc/passwd"));
        assert!(!is_plausible_code("en-us"));
        assert!(!is_plausible_code(""));
    }

    #[test]
    fn test_tessdata_url() {
        assert_eq!(
            tessdata_url("fra"),
            "https://github.com/tesseract-ocr/tessdata_fast/raw/main/fra.traineddata"
        );
    }

    #[test]
    fn test_unmanaged_dir_rejects_missing_language() {
        let dir = tempfile::tempdir().unwrap();
        let engine = LeptessEngine {
            tessdata_dir: dir.path().to_path_buf(),
            managed: false,
        };
        let set = LanguageSet::resolve(Some("fra"), "eng", "eng");
        let err = engine.ensure_languages(&set).unwrap_err();
        assert!(matches!(
            err,
            OcrEngineError::UnsupportedLanguage { ref language, .. } if language == "fra"
        ));
    }
}
