//! Line format of the scan log
//!
//! ```text
//! name | email | Score: <int> | Warnings: <w1>, <w2>   (or "Warnings: None")
//! ```
//!
//! Values are backslash-escaped so they may contain any character:
//! `\\`, `\|` and the line breaks `\n`/`\r` everywhere, plus `\,` inside
//! warnings. Values without those characters are written verbatim, so lines
//! produced before escaping existed decode unchanged. A sole warning spelled
//! `None` is written as `\None` to keep it apart from the empty marker.
//!
//! Decoding trims each value, so surrounding whitespace is not preserved, and
//! blank warnings are dropped on encode.

use crate::record::ScanRecord;
use thiserror::Error;

const FIELD_SEPARATOR: &str = " | ";
const SCORE_PREFIX: &str = "Score:";
const WARNINGS_PREFIX: &str = "Warnings:";
const WARNING_SEPARATOR: &str = ", ";
const NO_WARNINGS: &str = "None";
const MAX_FIELDS: usize = 4;

/// Why a log line could not be turned into a record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("expected at least 3 fields, found {found}")]
    TooFewFields { found: usize },

    #[error("score is not an integer: {raw:?}")]
    InvalidScore { raw: String },

    #[error("line is not valid UTF-8")]
    InvalidUtf8,
}

/// Encode a record as one log line, without the trailing newline
pub fn encode_line(record: &ScanRecord) -> String {
    let mut line = String::new();
    line.push_str(&escape(&record.name, false));
    line.push_str(FIELD_SEPARATOR);
    line.push_str(&escape(&record.email, false));
    line.push_str(FIELD_SEPARATOR);
    line.push_str(SCORE_PREFIX);
    line.push(' ');
    line.push_str(&record.health_score.to_string());
    line.push_str(FIELD_SEPARATOR);
    line.push_str(WARNINGS_PREFIX);
    line.push(' ');
    line.push_str(&encode_warnings(&record.warnings));
    line
}

fn encode_warnings(warnings: &[String]) -> String {
    let kept: Vec<&str> = warnings
        .iter()
        .map(|w| w.trim())
        .filter(|w| !w.is_empty())
        .collect();

    match kept.as_slice() {
        [] => NO_WARNINGS.to_string(),
        [only] if *only == NO_WARNINGS => format!("\\{}", NO_WARNINGS),
        _ => kept
            .iter()
            .map(|w| escape(w, true))
            .collect::<Vec<_>>()
            .join(WARNING_SEPARATOR),
    }
}

/// Decode one log line (no trailing newline) into a reconstructed record
pub fn decode_line(line: &str) -> Result<ScanRecord, SkipReason> {
    let parts = split_unescaped(line, '|', MAX_FIELDS);
    if parts.len() < 3 {
        return Err(SkipReason::TooFewFields { found: parts.len() });
    }

    let name = unescape(parts[0].trim());
    let email = unescape(parts[1].trim());

    let score_field = parts[2].trim();
    let health_score = strip_label(score_field, SCORE_PREFIX)
        .parse::<i64>()
        .map_err(|_| SkipReason::InvalidScore {
            raw: score_field.to_string(),
        })?;

    let warnings = parts
        .get(3)
        .map(|field| decode_warnings(strip_label(field.trim(), WARNINGS_PREFIX)))
        .unwrap_or_default();

    Ok(ScanRecord::reconstructed(name, email, health_score, warnings))
}

fn decode_warnings(field: &str) -> Vec<String> {
    if field.is_empty() || field == NO_WARNINGS {
        return Vec::new();
    }

    split_unescaped(field, ',', usize::MAX)
        .into_iter()
        .map(|w| unescape(w.trim()))
        .collect()
}

/// Drop `label` from the front of `field` if present, then trim
fn strip_label<'a>(field: &'a str, label: &str) -> &'a str {
    field.strip_prefix(label).unwrap_or(field).trim()
}

fn escape(value: &str, in_list: bool) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '|' => out.push_str("\\|"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            ',' if in_list => out.push_str("\\,"),
            _ => out.push(c),
        }
    }
    out
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            // Dangling backslash from a hand-edited line
            None => out.push('\\'),
        }
    }
    out
}

/// Split on `delim` where it is not preceded by an escaping backslash,
/// producing at most `max` parts (the last part keeps the remainder)
fn split_unescaped(s: &str, delim: char, max: usize) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == delim && parts.len() + 1 < max {
            parts.push(&s[start..i]);
            start = i + c.len_utf8();
        }
    }
    parts.push(&s[start..]);
    parts
}
