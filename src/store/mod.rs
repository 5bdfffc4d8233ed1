//! Append-only scan log
//!
//! One record per line in a UTF-8 text file (see [`format`]). Appends open
//! the file in append mode and issue a single write per record; nothing here
//! serializes concurrent writers beyond what the OS gives append-mode writes.
//! Every read re-parses the whole file. Malformed lines are skipped and
//! reported, never fatal.

pub mod format;

use crate::error::StoreError;
use crate::record::ScanRecord;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

pub use format::SkipReason;

/// A log line that was not turned into a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number
    pub line: usize,
    pub reason: SkipReason,
}

/// Full result of reading the log
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub records: Vec<ScanRecord>,
    pub skipped: Vec<SkippedLine>,
}

/// Handle on the scan log file
#[derive(Debug, Clone)]
pub struct ScanLog {
    path: PathBuf,
}

impl ScanLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record as a single newline-terminated line
    pub fn append(&self, record: &ScanRecord) -> Result<(), StoreError> {
        let mut line = format::encode_line(record);
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StoreError::io(&self.path, e))?;

        file.write_all(line.as_bytes())
            .map_err(|e| StoreError::io(&self.path, e))?;

        tracing::debug!(
            path = %self.path.display(),
            score = record.health_score,
            warnings = record.warnings.len(),
            "Scan logged"
        );

        Ok(())
    }

    /// Read every record in file order, oldest first.
    ///
    /// A missing log yields an empty list. Malformed lines are dropped and
    /// counted in a warning; use [`ScanLog::scan`] to see them.
    pub fn list_all(&self) -> Result<Vec<ScanRecord>, StoreError> {
        let report = self.scan()?;

        if !report.skipped.is_empty() {
            tracing::warn!(
                path = %self.path.display(),
                skipped = report.skipped.len(),
                "Skipped malformed scan log lines"
            );
        }

        Ok(report.records)
    }

    /// Read the log and report both records and skipped lines
    pub fn scan(&self) -> Result<ScanReport, StoreError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ScanReport::default()),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        let mut lines: Vec<&[u8]> = bytes.split(|b| *b == b'\n').collect();
        // The terminating newline of the last record is not a line of its own
        if lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }

        let mut report = ScanReport::default();
        for (idx, raw) in lines.into_iter().enumerate() {
            let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
            let parsed = std::str::from_utf8(raw)
                .map_err(|_| SkipReason::InvalidUtf8)
                .and_then(format::decode_line);

            match parsed {
                Ok(record) => report.records.push(record),
                Err(reason) => {
                    tracing::debug!(line = idx + 1, %reason, "Skipping scan log line");
                    report.skipped.push(SkippedLine {
                        line: idx + 1,
                        reason,
                    });
                }
            }
        }

        Ok(report)
    }
}
