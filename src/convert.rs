//! Batch entry points for both phases.
//!
//! A batch walks one input directory, handles every matching file in name
//! order and never stops for a per-file failure: the error is logged, fed to
//! the progress callback and recorded in the [`BatchReport`]. Only problems
//! that would hit every file (missing input directory, unusable provider,
//! no pdfium) end the batch early with an `Err`.

use crate::config::{
    ConversionConfig, ExtractionConfig, DOCX_EXTENSION, JSON_EXTENSION, PDF_EXTENSION,
};
use crate::error::Pdf2DocxError;
use crate::extract::{self, resolve_provider};
use crate::output::{BatchReport, ExtractionStats, FileOutcome, SkipReason};
use crate::pipeline::{assemble, docx};
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

// ── Phase 2: JSON → DOCX ─────────────────────────────────────────────────

/// Convert one structured JSON file into a `.docx` at `output`.
///
/// Returns `Ok(None)` when the input is blank and nothing was written.
///
/// # Errors
/// `ReadFailed`, `MalformedJson`, `MissingElementsKey` or
/// `PersistenceFailure`. Validation errors leave no output file behind.
pub fn convert_json_file(input: &Path, output: &Path) -> Result<Option<usize>, Pdf2DocxError> {
    let text = std::fs::read_to_string(input).map_err(|source| Pdf2DocxError::ReadFailed {
        path: input.to_path_buf(),
        source,
    })?;
    if text.trim().is_empty() {
        return Ok(None);
    }

    let doc = assemble::assemble(&text)?;
    let blocks = doc.len();
    docx::write_docx(doc, output)?;
    Ok(Some(blocks))
}

/// Convert every `.json` file in `input_dir` into a `.docx` in `output_dir`.
///
/// Existing outputs are skipped unless `config.overwrite` is set. The output
/// directory is created if needed.
///
/// # Errors
/// [`Pdf2DocxError::InputDirectoryNotFound`] if `input_dir` is not a
/// directory; per-file problems only show up in the report.
pub fn convert_json_dir(
    input_dir: &Path,
    output_dir: &Path,
    config: &ConversionConfig,
) -> Result<BatchReport, Pdf2DocxError> {
    let start = Instant::now();
    let inputs = list_inputs(input_dir, JSON_EXTENSION)?;
    prepare_output_dir(output_dir)?;

    let total = inputs.len();
    info!(
        "Converting {} JSON files from {} to {}",
        total,
        input_dir.display(),
        output_dir.display()
    );
    let cb = config.progress_callback.as_ref();
    if let Some(cb) = cb {
        cb.on_batch_start(total);
    }

    let mut report = BatchReport::default();
    for (index, input) in inputs.into_iter().enumerate() {
        let output = output_path_for(&input, output_dir, DOCX_EXTENSION);

        if output.exists() && !config.overwrite {
            skip(&mut report, cb, index, total, input, output, SkipReason::OutputExists);
            continue;
        }

        if let Some(cb) = cb {
            cb.on_file_start(index, total, &input);
        }
        match convert_json_file(&input, &output) {
            Ok(Some(blocks)) => {
                info!("✓ {} → {} ({} blocks)", input.display(), output.display(), blocks);
                if let Some(cb) = cb {
                    cb.on_file_complete(index, total, &input);
                }
                report.record(input, output, FileOutcome::Converted);
            }
            Ok(None) => {
                skip(&mut report, cb, index, total, input, output, SkipReason::EmptyInput);
            }
            Err(e) => fail(&mut report, cb, index, total, input, output, &e),
        }
    }

    finish(&mut report, cb, start);
    Ok(report)
}

// ── Phase 1: PDF → JSON ──────────────────────────────────────────────────

/// Extract one PDF and write its structured JSON to `output`.
///
/// The JSON is written to a temporary sibling and renamed into place, so a
/// failed run never leaves a truncated file.
pub async fn extract_pdf_file(
    input: &Path,
    output: &Path,
    provider: &Arc<dyn LLMProvider>,
    config: &ExtractionConfig,
) -> Result<ExtractionStats, Pdf2DocxError> {
    let extracted = extract::extract_pdf(input, provider, config).await?;
    let json = extracted.document.to_json_pretty()?;
    persist_json(output, json).await?;
    Ok(extracted.stats)
}

/// Extract every `.pdf` in `input_dir` into a `.json` in `output_dir`.
///
/// PDFs are processed strictly one after another, pausing
/// `config.delay_secs` after each one that was attempted.
///
/// # Errors
/// Missing input directory, no usable provider, or any other fatal error
/// (see [`Pdf2DocxError::is_fatal`]) raised while processing a file.
pub async fn extract_pdf_dir(
    input_dir: &Path,
    output_dir: &Path,
    config: &ExtractionConfig,
) -> Result<BatchReport, Pdf2DocxError> {
    let start = Instant::now();
    let inputs = list_inputs(input_dir, PDF_EXTENSION)?;
    prepare_output_dir(output_dir)?;

    let total = inputs.len();
    info!(
        "Extracting {} PDFs from {} to {}",
        total,
        input_dir.display(),
        output_dir.display()
    );
    let cb = config.progress_callback.as_ref();
    if let Some(cb) = cb {
        cb.on_batch_start(total);
    }

    let mut report = BatchReport::default();
    let mut provider: Option<Arc<dyn LLMProvider>> = None;

    for (index, input) in inputs.into_iter().enumerate() {
        let output = output_path_for(&input, output_dir, JSON_EXTENSION);

        if output.exists() && !config.overwrite {
            skip(&mut report, cb, index, total, input, output, SkipReason::OutputExists);
            continue;
        }

        // Resolved lazily so an all-skipped batch needs no API key.
        let llm = match provider {
            Some(ref p) => Arc::clone(p),
            None => {
                let p = resolve_provider(config)?;
                info!(
                    "LLM provider ready ({})",
                    config.provider_name.as_deref().unwrap_or("auto")
                );
                provider = Some(Arc::clone(&p));
                p
            }
        };

        if let Some(cb) = cb {
            cb.on_file_start(index, total, &input);
        }
        match extract_pdf_file(&input, &output, &llm, config).await {
            Ok(stats) => {
                info!(
                    "✓ {} → {} ({} elements, {}/{} pages, {} in / {} out tokens)",
                    input.display(),
                    output.display(),
                    stats.total_elements,
                    stats.processed_pages,
                    stats.total_pages,
                    stats.total_input_tokens,
                    stats.total_output_tokens
                );
                if let Some(cb) = cb {
                    cb.on_file_complete(index, total, &input);
                }
                report.record(input, output, FileOutcome::Converted);
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => fail(&mut report, cb, index, total, input, output, &e),
        }

        if config.delay_secs > 0 && index + 1 < total {
            debug!("Sleeping {}s before the next file", config.delay_secs);
            tokio::time::sleep(Duration::from_secs(config.delay_secs)).await;
        }
    }

    finish(&mut report, cb, start);
    Ok(report)
}

/// Synchronous wrapper around [`extract_pdf_dir`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_pdf_dir_sync(
    input_dir: &Path,
    output_dir: &Path,
    config: &ExtractionConfig,
) -> Result<BatchReport, Pdf2DocxError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Pdf2DocxError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(extract_pdf_dir(input_dir, output_dir, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Regular files in `dir` whose extension matches `ext` case-insensitively,
/// sorted by file name.
pub(crate) fn list_inputs(dir: &Path, ext: &str) -> Result<Vec<PathBuf>, Pdf2DocxError> {
    if !dir.is_dir() {
        return Err(Pdf2DocxError::InputDirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }
    let entries = std::fs::read_dir(dir).map_err(|source| Pdf2DocxError::ReadFailed {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| readable_path(entry.map(|e| e.path()), dir))
        .filter(|p| p.is_file() && has_extension(p, ext))
        .collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Path of a directory entry, or `None` with a warning when it is unreadable.
fn readable_path(entry: std::io::Result<PathBuf>, dir: &Path) -> Option<PathBuf> {
    match entry {
        Ok(path) => Some(path),
        Err(e) => {
            warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
            None
        }
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

/// `output_dir/<input stem>.<ext>`.
pub(crate) fn output_path_for(input: &Path, output_dir: &Path, ext: &str) -> PathBuf {
    let mut name = input.file_stem().unwrap_or(input.as_os_str()).to_os_string();
    name.push(".");
    name.push(ext);
    output_dir.join(name)
}

/// Write `json` to a `.json.tmp` sibling, then rename it onto `output`.
/// The temporary file is removed when the rename fails.
async fn persist_json(output: &Path, json: String) -> Result<(), Pdf2DocxError> {
    let write_err = |source: std::io::Error| Pdf2DocxError::OutputWriteFailed {
        path: output.to_path_buf(),
        source,
    };
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = output.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, json).await.map_err(write_err)?;
    if let Err(source) = tokio::fs::rename(&tmp_path, output).await {
        if let Err(e) = tokio::fs::remove_file(&tmp_path).await {
            warn!("Could not remove {}: {}", tmp_path.display(), e);
        }
        return Err(write_err(source));
    }
    Ok(())
}

fn prepare_output_dir(dir: &Path) -> Result<(), Pdf2DocxError> {
    std::fs::create_dir_all(dir).map_err(|source| Pdf2DocxError::OutputWriteFailed {
        path: dir.to_path_buf(),
        source,
    })
}

fn skip(
    report: &mut BatchReport,
    cb: Option<&ProgressCallback>,
    index: usize,
    total: usize,
    input: PathBuf,
    output: PathBuf,
    reason: SkipReason,
) {
    info!("Skipping {} ({})", input.display(), reason);
    if let Some(cb) = cb {
        cb.on_file_skipped(index, total, &input, reason);
    }
    report.record(input, output, FileOutcome::Skipped { reason });
}

fn fail(
    report: &mut BatchReport,
    cb: Option<&ProgressCallback>,
    index: usize,
    total: usize,
    input: PathBuf,
    output: PathBuf,
    err: &Pdf2DocxError,
) {
    let msg = err.to_string();
    error!("✗ {}: {}", input.display(), msg);
    if let Some(cb) = cb {
        cb.on_file_error(index, total, &input, &msg);
    }
    report.record(input, output, FileOutcome::Failed { error: msg });
}

fn finish(report: &mut BatchReport, cb: Option<&ProgressCallback>, start: Instant) {
    report.duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Batch complete: {} converted, {} skipped, {} failed in {}ms",
        report.converted, report.skipped, report.failed, report.duration_ms
    );
    if let Some(cb) = cb {
        cb.on_batch_complete(report.converted, report.skipped, report.failed);
    }
}
