use serde::{Deserialize, Serialize};

/// Placeholder carried by records read back from the scan log. The log never
/// stores the full OCR text.
pub const SCAN_TEXT_NOT_SAVED: &str = "Full scan text not saved";

/// One completed scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub name: String,
    pub email: String,
    pub scan_text: String,
    pub health_score: i64,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl ScanRecord {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        scan_text: impl Into<String>,
        health_score: i64,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            scan_text: scan_text.into(),
            health_score,
            warnings,
        }
    }

    /// A record rebuilt from the log, with the scan text placeholder
    pub fn reconstructed(
        name: impl Into<String>,
        email: impl Into<String>,
        health_score: i64,
        warnings: Vec<String>,
    ) -> Self {
        Self::new(name, email, SCAN_TEXT_NOT_SAVED, health_score, warnings)
    }

    pub fn is_reconstructed(&self) -> bool {
        self.scan_text == SCAN_TEXT_NOT_SAVED
    }
}
