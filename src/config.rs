use std::path::PathBuf;

/// Default Tesseract-style language code used when a caller gives no hint
pub const DEFAULT_LANGUAGE: &str = "eng";

/// Default fallback language, always included in recognition attempts
pub const DEFAULT_FALLBACK_LANGUAGE: &str = "eng";

/// Default maximum accepted image size (50MB)
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 52_428_800;

/// Default location of the scan log
pub const DEFAULT_LOG_PATH: &str = "user_scans.log";

/// OCR orchestration settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrConfig {
    pub default_language: String,
    pub fallback_language: String,
    pub max_image_bytes: usize,
    pub tessdata_path: Option<String>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            default_language: DEFAULT_LANGUAGE.to_string(),
            fallback_language: DEFAULT_FALLBACK_LANGUAGE.to_string(),
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            tessdata_path: None,
        }
    }
}

impl OcrConfig {
    pub fn with_fallback_language(mut self, code: impl Into<String>) -> Self {
        self.fallback_language = code.into();
        self
    }

    pub fn with_default_language(mut self, code: impl Into<String>) -> Self {
        self.default_language = code.into();
        self
    }

    pub fn with_max_image_bytes(mut self, max: usize) -> Self {
        self.max_image_bytes = max;
        self
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub ocr: OcrConfig,
    pub log_path: PathBuf,
    pub engine: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ocr: OcrConfig::default(),
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            engine: None,
        }
    }
}
