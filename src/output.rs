//! Result types returned by the extraction and batch entry points.
//!
//! Everything here is `Serialize` so a run can be dumped as a JSON report
//! (the CLI does this with `--json`) or logged as structured data.

use crate::elements::{DocumentElement, StructuredDocument};
use crate::error::PageError;
use serde::Serialize;
use std::path::PathBuf;

// ── Phase 1: per page / per PDF ──────────────────────────────────────────

/// Result for a single page.
#[derive(Debug, Clone, Serialize)]
pub struct PageResult {
    /// 1-indexed page number.
    pub page_num: usize,

    /// Elements extracted from this page; empty when `error` is set.
    pub elements: Vec<DocumentElement>,

    /// Input tokens reported by the provider.
    pub input_tokens: usize,

    /// Output tokens reported by the provider.
    pub output_tokens: usize,

    /// Wall-clock time spent on this page.
    pub duration_ms: u64,

    /// Error if this page failed. The rest of the document is unaffected.
    pub error: Option<PageError>,
}

impl PageResult {
    /// A page that produced nothing because of `error`.
    pub fn failed(page_num: usize, duration_ms: u64, error: PageError) -> Self {
        Self {
            page_num,
            elements: Vec::new(),
            input_tokens: 0,
            output_tokens: 0,
            duration_ms,
            error: Some(error),
        }
    }
}

/// Aggregate statistics for one extracted PDF.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionStats {
    pub total_pages: usize,
    pub processed_pages: usize,
    pub failed_pages: usize,
    pub total_elements: usize,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub total_duration_ms: u64,
}

/// Complete output of extracting one PDF.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionOutput {
    /// Merged elements of all successful pages, in page order.
    pub document: StructuredDocument,

    /// Per-page results in page order, including failed pages.
    pub pages: Vec<PageResult>,

    pub stats: ExtractionStats,
}

// ── Batches ──────────────────────────────────────────────────────────────

/// Why a file was not processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The output file exists and overwrite is off.
    OutputExists,
    /// The input file is empty or whitespace only.
    EmptyInput,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::OutputExists => f.write_str("output exists"),
            SkipReason::EmptyInput => f.write_str("empty input"),
        }
    }
}

/// What happened to one file of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Converted,
    Skipped { reason: SkipReason },
    Failed { error: String },
}

/// Per-file line of a [`BatchReport`].
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub outcome: FileOutcome,
}

/// Summary of a directory run. Files appear in processing order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
    pub duration_ms: u64,
}

impl BatchReport {
    /// Record one file and update the counters.
    pub fn record(&mut self, input: PathBuf, output: PathBuf, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Converted => self.converted += 1,
            FileOutcome::Skipped { .. } => self.skipped += 1,
            FileOutcome::Failed { .. } => self.failed += 1,
        }
        self.files.push(FileReport {
            input,
            output,
            outcome,
        });
    }

    pub fn total(&self) -> usize {
        self.files.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_page_has_no_elements() {
        let p = PageResult::failed(
            4,
            12,
            PageError::Timeout { page: 4, secs: 30 },
        );
        assert_eq!(p.page_num, 4);
        assert!(p.elements.is_empty());
        assert!(p.error.is_some());
    }

    #[test]
    fn failed_page_serialises_its_error() {
        let p = PageResult::failed(2, 5, PageError::Timeout { page: 2, secs: 30 });
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["error"]["Timeout"]["secs"], 30);
    }

    #[test]
    fn batch_report_counts_outcomes() {
        let mut report = BatchReport::default();
        report.record("a.json".into(), "a.docx".into(), FileOutcome::Converted);
        report.record(
            "b.json".into(),
            "b.docx".into(),
            FileOutcome::Skipped {
                reason: SkipReason::OutputExists,
            },
        );
        report.record(
            "c.json".into(),
            "c.docx".into(),
            FileOutcome::Failed {
                error: "bad".into(),
            },
        );
        assert_eq!(
            (report.converted, report.skipped, report.failed, report.total()),
            (1, 1, 1, 3)
        );
    }

    #[test]
    fn outcome_serialises_with_status_tag() {
        let v = serde_json::to_value(FileOutcome::Skipped {
            reason: SkipReason::EmptyInput,
        })
        .unwrap();
        assert_eq!(v["status"], "skipped");
        assert_eq!(v["reason"], "empty_input");
    }
}
