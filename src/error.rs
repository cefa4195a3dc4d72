//! Error types for the edgequake-pdf2docx library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Pdf2DocxError`] — the unit of work cannot complete. Depending on the
//!   variant that unit is the whole batch (missing input directory, bad
//!   configuration) or a single file (malformed JSON, unwritable output).
//!   Batch drivers record per-file errors in [`crate::output::FileReport`]
//!   and move on to the next file.
//!
//! * [`PageError`] — **Non-fatal**: one PDF page failed during extraction
//!   (render glitch, API error, unparseable model reply) while the other
//!   pages are fine. Stored inside [`crate::output::PageResult`].

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the edgequake-pdf2docx library.
#[derive(Debug, Error)]
pub enum Pdf2DocxError {
    // ── Structured-JSON validation ────────────────────────────────────────
    /// The input is not syntactically valid JSON.
    #[error("Malformed JSON: {source}")]
    MalformedJson {
        #[source]
        source: serde_json::Error,
    },

    /// The JSON parsed but has no `document_elements` array at the top level.
    #[error("'document_elements' key not found or not a list")]
    MissingElementsKey,

    /// A table block could not be materialised from its parsed grid.
    ///
    /// Recovered inside the renderer by emitting the raw Markdown instead;
    /// never surfaced as a file-level failure.
    #[error("Failed to build table: {detail}")]
    TableRenderFailure { detail: String },

    // ── File I/O ──────────────────────────────────────────────────────────
    /// The batch input directory does not exist or is not a directory.
    #[error("Input directory not found: '{path}'")]
    InputDirectoryNotFound { path: PathBuf },

    /// Could not read an input file (I/O error or invalid UTF-8).
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The finished DOCX package could not be written.
    #[error("Failed to write DOCX file '{path}': {source}")]
    PersistenceFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write an output JSON file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── PDF input ─────────────────────────────────────────────────────────
    /// Input PDF was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// The blocking render task for this PDF panicked or was cancelled.
    #[error("Rendering '{path}' aborted: {detail}")]
    RenderTaskFailed { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Install libpdfium system-wide or set PDFIUM_LIB_PATH to the directory containing it."
    )]
    PdfiumBindingFailed(String),

    // ── LLM ───────────────────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// Every page of a PDF failed; no JSON is written for it.
    #[error("All {total} pages failed.\nFirst error: {first_error}")]
    AllPagesFailed { total: usize, first_error: String },

    // ── Config ────────────────────────────────────────────────────────────
    /// An in-memory document could not be serialised (JSON or DOCX package).
    #[error("Failed to serialise {what}: {detail}")]
    SerializeFailed { what: &'static str, detail: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unexpected internal error that affects the whole batch.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Pdf2DocxError {
    /// `true` for errors that stop a whole batch rather than one file.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Pdf2DocxError::InputDirectoryNotFound { .. }
                | Pdf2DocxError::InvalidConfig(_)
                | Pdf2DocxError::ProviderNotConfigured { .. }
                | Pdf2DocxError::PdfiumBindingFailed(_)
                | Pdf2DocxError::Internal(_)
        )
    }
}

/// A non-fatal error for a single PDF page during extraction.
#[derive(Debug, Clone, Error, serde::Serialize)]
pub enum PageError {
    /// Page rasterisation or PNG encoding failed.
    #[error("Page {page}: rasterisation failed: {detail}")]
    RenderFailed { page: usize, detail: String },

    /// The LLM call returned an error.
    #[error("Page {page}: LLM call failed: {detail}")]
    LlmFailed { page: usize, detail: String },

    /// The LLM call exceeded `api_timeout_secs`.
    #[error("Page {page}: LLM call timed out after {secs}s")]
    Timeout { page: usize, secs: u64 },

    /// The model replied, but not with a usable `document_elements` object.
    #[error("Page {page}: unusable model response: {detail}")]
    InvalidResponse { page: usize, detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_elements_key_display() {
        let msg = Pdf2DocxError::MissingElementsKey.to_string();
        assert!(msg.contains("document_elements"), "got: {msg}");
    }

    #[test]
    fn malformed_json_keeps_parser_message() {
        let source = serde_json::from_str::<serde_json::Value>("{ nope").unwrap_err();
        let e = Pdf2DocxError::MalformedJson { source };
        assert!(e.to_string().starts_with("Malformed JSON:"));
        assert!(std::error::Error::source(&e).is_some());
    }

    #[test]
    fn persistence_failure_names_path() {
        let e = Pdf2DocxError::PersistenceFailure {
            path: PathBuf::from("/out/report.docx"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = e.to_string();
        assert!(msg.contains("report.docx"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn fatality_split() {
        assert!(Pdf2DocxError::InputDirectoryNotFound {
            path: PathBuf::from("in")
        }
        .is_fatal());
        assert!(!Pdf2DocxError::MissingElementsKey.is_fatal());
        assert!(Pdf2DocxError::Internal("runtime".into()).is_fatal());
        assert!(!Pdf2DocxError::TableRenderFailure {
            detail: "x".into()
        }
        .is_fatal());
    }

    #[test]
    fn per_file_failures_do_not_stop_the_batch() {
        let per_file = [
            Pdf2DocxError::RenderTaskFailed {
                path: PathBuf::from("bad.pdf"),
                detail: "task panicked".into(),
            },
            Pdf2DocxError::SerializeFailed {
                what: "elements",
                detail: "x".into(),
            },
            Pdf2DocxError::CorruptPdf {
                path: PathBuf::from("bad.pdf"),
                detail: "xref".into(),
            },
            Pdf2DocxError::AllPagesFailed {
                total: 2,
                first_error: "timeout".into(),
            },
            Pdf2DocxError::PersistenceFailure {
                path: PathBuf::from("out.docx"),
                source: std::io::Error::other("disk full"),
            },
        ];
        for e in &per_file {
            assert!(!e.is_fatal(), "{e} must stay per-file");
        }
    }

    #[test]
    fn render_task_failure_names_file() {
        let e = Pdf2DocxError::RenderTaskFailed {
            path: PathBuf::from("/in/scan.pdf"),
            detail: "task 7 panicked".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("scan.pdf") && msg.contains("panicked"), "got: {msg}");
    }

    #[test]
    fn page_timeout_display() {
        let e = PageError::Timeout { page: 3, secs: 60 };
        assert!(e.to_string().contains("Page 3"));
        assert!(e.to_string().contains("60s"));
    }
}
