//! Ingredient analysis for extracted label text
//!
//! Turns OCR output into a 0-100 health score and a list of warnings for a
//! given dietary profile. Callers feed the result into a [`ScanRecord`].
//!
//! [`ScanRecord`]: crate::record::ScanRecord

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

const BASE_SCORE: i64 = 100;
const SUGAR_PENALTY: i64 = 30;
const PALM_OIL_PENALTY: i64 = 20;
const ADDITIVE_PENALTY: i64 = 10;
const ALLERGEN_PENALTY: i64 = 30;

static E_NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"e\d+").unwrap());

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Allergy keyword -> ingredient terms that indicate it
const ALLERGY_SYNONYMS: &[(&str, &[&str])] = &[
    ("dairy", &["milk", "cheese", "butter", "yogurt", "cream"]),
    ("nuts", &["almond", "cashew", "peanut", "walnut", "hazelnut"]),
    ("gluten", &["wheat", "barley", "rye", "malt"]),
    ("soy", &["soy", "soya", "soybean"]),
    ("egg", &["egg", "albumen"]),
    ("shellfish", &["shrimp", "prawn", "crab", "lobster"]),
    ("fish", &["salmon", "tuna", "cod", "trout"]),
];

/// Dietary profile of the person scanning
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DietProfile {
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub diabetic: bool,
}

impl DietProfile {
    /// Parse a comma-separated allergy list such as `"Dairy, nuts"`
    pub fn with_allergy_list(mut self, list: &str) -> Self {
        self.allergies.extend(
            list.split(',')
                .map(|a| a.trim().to_lowercase())
                .filter(|a| !a.is_empty()),
        );
        self
    }

    /// Build a profile from repeated allergy arguments, each of which may
    /// itself be a comma-separated list
    pub fn from_allergy_args<S: AsRef<str>>(args: &[S], diabetic: bool) -> Self {
        let profile = Self {
            allergies: Vec::new(),
            diabetic,
        };
        args.iter()
            .fold(profile, |p, arg| p.with_allergy_list(arg.as_ref()))
    }
}

/// Score, warnings and advice for one label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelAssessment {
    pub health_score: i64,
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Score a label's text against a profile
pub fn assess(text: &str, profile: &DietProfile) -> LabelAssessment {
    let text = WHITESPACE_RE.replace_all(&text.to_lowercase(), " ").into_owned();

    let mut score = BASE_SCORE;
    let mut warnings = Vec::new();

    let has_sugar = text.contains("sugar");
    if has_sugar {
        score -= SUGAR_PENALTY;
        warnings.push("⚠️ High sugar content".to_string());
    }

    if has_palm_oil(&text) {
        score -= PALM_OIL_PENALTY;
        warnings.push("⚠️ Contains palm oil".to_string());
    }

    if E_NUMBER_RE.is_match(&text) {
        score -= ADDITIVE_PENALTY;
        warnings.push("⚠️ Additives present (E-numbers)".to_string());
    }

    for allergy in &profile.allergies {
        for term in allergen_terms(allergy) {
            if text.contains(term.as_str()) {
                tracing::debug!(allergy = %allergy, term = %term, "Allergen found");
                score -= ALLERGEN_PENALTY;
                warnings.push(format!("⚠️ Contains allergen: {}", term));
            }
        }
    }

    if profile.diabetic && has_sugar {
        warnings.push("⚠️ Not suitable for diabetics".to_string());
    }

    LabelAssessment {
        health_score: score.max(0),
        warnings,
        recommendations: recommend(&text, profile),
    }
}

/// Advice for a label. Allergies match on the keyword itself, not on its
/// synonyms. Always returns at least one entry.
pub fn recommend(text: &str, profile: &DietProfile) -> Vec<String> {
    let text = text.to_lowercase();
    let mut recs = Vec::new();

    if profile.diabetic && text.contains("sugar") {
        recs.push("🔄 This product contains sugar. Try sugar-free or low-GI options.".to_string());
    }

    if has_palm_oil(&text) {
        recs.push("🌻 Try sunflower or olive oil instead of palm oil.".to_string());
    }

    if E_NUMBER_RE.is_match(&text) {
        recs.push(
            "🚫 Avoid processed additives (E-numbers). Choose natural alternatives.".to_string(),
        );
    }

    let allergy_match = profile
        .allergies
        .iter()
        .map(|a| a.trim().to_lowercase())
        .any(|a| !a.is_empty() && text.contains(a.as_str()));
    if allergy_match {
        recs.push("⚠️ Contains ingredients that may trigger your listed allergies.".to_string());
    }

    if recs.is_empty() {
        recs.push("✅ This item looks safe for you.".to_string());
    }

    recs
}

fn has_palm_oil(text: &str) -> bool {
    text.contains("palm") || text.contains("paimai")
}

/// Ingredient terms for an allergy; unknown allergies match themselves
fn allergen_terms(allergy: &str) -> Vec<String> {
    let keyword = allergy.trim().to_lowercase();
    if keyword.is_empty() {
        return Vec::new();
    }

    ALLERGY_SYNONYMS
        .iter()
        .find(|(name, _)| *name == keyword)
        .map(|(_, terms)| terms.iter().map(|t| t.to_string()).collect())
        .unwrap_or_else(|| vec![keyword])
}
