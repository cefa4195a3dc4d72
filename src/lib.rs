//! # edgequake-pdf2docx
//!
//! Convert PDF documents to editable Word files in two phases, with a
//! structured JSON file as the hand-off between them.
//!
//! ## Why two phases?
//!
//! Reading a PDF's structure is the expensive, non-deterministic part: a
//! Vision Language Model looks at each rasterised page and labels headings,
//! paragraphs and tables. Building the DOCX from those labels is cheap and
//! fully deterministic. Persisting the labels as JSON lets the second phase be
//! rerun (or the JSON hand-edited) without paying for the model again.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Phase 1  PDF ──▶ rasterise ──▶ VLM per page ──▶ { "document_elements": [...] }
//! Phase 2  JSON ──▶ validate ──▶ render elements ──▶ tables ──▶ .docx
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdf2docx::{convert_json_dir, ConversionConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder().overwrite(true).build()?;
//!     let report = convert_json_dir(Path::new("json"), Path::new("docx"), &config)?;
//!     eprintln!("{} converted, {} failed", report.converted, report.failed);
//!     Ok(())
//! }
//! ```
//!
//! Phase 1 needs an LLM provider; like every edgequake tool it is picked up
//! from `OPENAI_API_KEY` / `ANTHROPIC_API_KEY` / `GEMINI_API_KEY` unless one
//! is named explicitly:
//!
//! ```rust,no_run
//! use edgequake_pdf2docx::{extract_pdf_dir, ExtractionConfig};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractionConfig::builder().delay_secs(1).build()?;
//!     let report = extract_pdf_dir(Path::new("pdf"), Path::new("json"), &config).await?;
//!     eprintln!("{} extracted", report.converted);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2docx` binary (clap + anyhow + indicatif + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod document;
pub mod elements;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    ConversionConfig, ConversionConfigBuilder, ExtractionConfig, ExtractionConfigBuilder,
};
pub use convert::{
    convert_json_dir, convert_json_file, extract_pdf_dir, extract_pdf_dir_sync, extract_pdf_file,
};
pub use document::{Block, OutputDocument, Paragraph, ParagraphStyle, Table};
pub use elements::{DocumentElement, StructuredDocument};
pub use error::{PageError, Pdf2DocxError};
pub use extract::{extract_pdf, resolve_provider};
pub use output::{
    BatchReport, ExtractionOutput, ExtractionStats, FileOutcome, FileReport, PageResult,
    SkipReason,
};
pub use pipeline::assemble::assemble;
pub use pipeline::docx::{to_docx_bytes, write_docx};
pub use pipeline::table::{parse_table, TableGrid};
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
