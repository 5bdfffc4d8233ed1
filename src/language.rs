//! Language hint resolution
//!
//! Callers pass a free-form, comma-separated hint such as `"eng, fra"`.
//! Engines receive a [`LanguageSet`]: lowercase, deduplicated, in first-seen
//! order, and always ending with the fallback code if the caller left it out.

use std::fmt;

/// Ordered, deduplicated set of language codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageSet {
    codes: Vec<String>,
}

impl LanguageSet {
    /// Resolve a caller hint into a language set.
    ///
    /// An empty or missing hint resolves to `default_language`. The fallback
    /// code is appended whenever it is not already present.
    pub fn resolve(hint: Option<&str>, default_language: &str, fallback_language: &str) -> Self {
        let mut set = Self { codes: Vec::new() };

        for token in hint.unwrap_or_default().split(',') {
            set.insert(token);
        }

        if set.codes.is_empty() {
            set.insert(default_language);
        }

        set.insert(fallback_language);
        set
    }

    fn insert(&mut self, raw: &str) {
        let code = raw.trim().to_lowercase();
        if !code.is_empty() && !self.codes.contains(&code) {
            self.codes.push(code);
        }
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.iter().any(|c| c == code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.codes.clone()
    }

    /// Join codes with `+`, Tesseract's multi-language syntax (e.g. `eng+fra`)
    pub fn to_tesseract_spec(&self) -> String {
        self.codes.join("+")
    }
}

impl fmt::Display for LanguageSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.codes.join(","))
    }
}
