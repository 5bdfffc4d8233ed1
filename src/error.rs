use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by an OCR engine or by the orchestrator in front of it.
#[derive(Error, Debug)]
pub enum OcrEngineError {
    #[error("Failed to initialize OCR engine: {0}")]
    InitializationError(String),

    #[error("Failed to decode image: {0}")]
    DecodeError(String),

    #[error("Engine '{engine}' does not support language '{language}'")]
    UnsupportedLanguage {
        engine: &'static str,
        language: String,
    },

    #[error("Failed to recognize text: {0}")]
    RecognitionError(String),

    #[error("Image too large: {size} bytes (max: {max} bytes)")]
    ImageTooLarge { size: usize, max: usize },

    #[error("Image is empty")]
    EmptyImage,

    #[error("Unknown OCR engine: {0}")]
    UnknownEngine(String),
}

impl OcrEngineError {
    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            OcrEngineError::InitializationError(_) => "INIT_ERROR",
            OcrEngineError::DecodeError(_) => "DECODE_ERROR",
            OcrEngineError::UnsupportedLanguage { .. } => "UNSUPPORTED_LANGUAGE",
            OcrEngineError::RecognitionError(_) => "RECOGNITION_ERROR",
            OcrEngineError::ImageTooLarge { .. } => "IMAGE_TOO_LARGE",
            OcrEngineError::EmptyImage => "EMPTY_IMAGE",
            OcrEngineError::UnknownEngine(_) => "UNKNOWN_ENGINE",
        }
    }
}

/// Failures raised by the scan log when the underlying file is unusable.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Scan log I/O failed on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Io { .. } => "STORE_IO_ERROR",
        }
    }
}

/// Failures of the combined extract, assess and log flow
#[derive(Error, Debug)]
pub enum ScanError {
    #[error(transparent)]
    Ocr(#[from] OcrEngineError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ScanError {
    pub fn code(&self) -> &'static str {
        match self {
            ScanError::Ocr(e) => e.code(),
            ScanError::Store(e) => e.code(),
        }
    }
}

/// JSON body printed by the CLI when a command fails
#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl From<&OcrEngineError> for ErrorResponse {
    fn from(err: &OcrEngineError) -> Self {
        Self {
            error: err.to_string(),
            code: err.code().to_string(),
        }
    }
}

impl From<&StoreError> for ErrorResponse {
    fn from(err: &StoreError) -> Self {
        Self {
            error: err.to_string(),
            code: err.code().to_string(),
        }
    }
}

impl ErrorResponse {
    /// Build a response from an arbitrary top-level error, keeping the typed
    /// code when the chain contains one of ours
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        if let Some(e) = err.downcast_ref::<OcrEngineError>() {
            return e.into();
        }
        if let Some(e) = err.downcast_ref::<StoreError>() {
            return e.into();
        }
        if let Some(e) = err.downcast_ref::<ScanError>() {
            return Self {
                error: e.to_string(),
                code: e.code().to_string(),
            };
        }
        Self {
            error: format!("{:#}", err),
            code: "INTERNAL_ERROR".to_string(),
        }
    }
}
