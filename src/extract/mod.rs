//! Phase 1 stages: PDF → structured JSON via a vision language model.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ rasterise ──▶ encode ──▶ llm ──▶ postprocess ──▶ merge
//! (%PDF)     (pdfium)     (base64)   (VLM)   (JSON cleanup)   (page order)
//! ```
//!
//! 1. [`input`]       — check the file exists and really is a PDF
//! 2. [`rasterise`]   — render every page; runs in `spawn_blocking`
//! 3. [`encode`]      — PNG + base64 for the multimodal request body
//! 4. [`llm`]         — one VLM call per page with a timeout, no retries
//! 5. [`postprocess`] — unwrap fences and commentary, validate the contract
//!
//! The LLM client is created here and nowhere else; the rendering pipeline
//! in [`crate::pipeline`] only ever sees JSON text.

pub mod encode;
pub mod input;
pub mod llm;
pub mod postprocess;
pub mod rasterise;

use crate::config::ExtractionConfig;
use crate::elements::StructuredDocument;
use crate::error::{PageError, Pdf2DocxError};
use crate::output::{ExtractionOutput, ExtractionStats, PageResult};
use edgequake_llm::{LLMProvider, ProviderFactory};
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Model used when a provider is named without a model.
pub const DEFAULT_MODEL: &str = "gpt-4.1-nano";

/// Extract the structured elements of one PDF.
///
/// Pages are sent to the model at most `config.concurrency` at a time and
/// merged back in page order.
///
/// # Errors
/// Fatal for this file: invalid input, unreadable PDF, or every page failed
/// ([`Pdf2DocxError::AllPagesFailed`]).
pub async fn extract_pdf(
    pdf_path: &Path,
    provider: &Arc<dyn LLMProvider>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, Pdf2DocxError> {
    let start = Instant::now();
    let pdf_path = input::validate_pdf(pdf_path)?;

    let rendered = rasterise::render_pages(&pdf_path, config).await?;
    let total_pages = rendered.len();
    info!("{}: {} pages to extract", pdf_path.display(), total_pages);

    let mut failed: Vec<PageResult> = Vec::new();
    let mut encoded = Vec::with_capacity(total_pages);
    for page in rendered {
        match page {
            Ok((page_num, image)) => match encode::encode_page(&image) {
                Ok(data) => encoded.push((page_num, data)),
                Err(e) => failed.push(PageResult::failed(
                    page_num,
                    0,
                    PageError::RenderFailed {
                        page: page_num,
                        detail: format!("PNG encoding failed: {e}"),
                    },
                )),
            },
            Err(e) => {
                let page_num = match &e {
                    PageError::RenderFailed { page, .. } => *page,
                    _ => 0,
                };
                failed.push(PageResult::failed(page_num, 0, e));
            }
        }
    }

    let mut pages: Vec<PageResult> = stream::iter(encoded.into_iter().map(|(page_num, data)| {
        let provider = Arc::clone(provider);
        async move { llm::process_page(&provider, page_num, total_pages, data, config).await }
    }))
    .buffered(config.concurrency)
    .collect()
    .await;

    pages.extend(failed);
    pages.sort_by_key(|p| p.page_num);

    let document = merge_pages(&pages);
    let processed = pages.iter().filter(|p| p.error.is_none()).count();
    let failed_pages = pages.len() - processed;

    if processed == 0 && !pages.is_empty() {
        let first_error = pages
            .iter()
            .find_map(|p| p.error.as_ref())
            .map(|e| e.to_string())
            .unwrap_or_else(|| "Unknown error".to_string());
        return Err(Pdf2DocxError::AllPagesFailed {
            total: pages.len(),
            first_error,
        });
    }
    if failed_pages > 0 {
        warn!(
            "{}: {}/{} pages failed and are missing from the output",
            pdf_path.display(),
            failed_pages,
            pages.len()
        );
    }

    let stats = ExtractionStats {
        total_pages,
        processed_pages: processed,
        failed_pages,
        total_elements: document.len(),
        total_input_tokens: pages.iter().map(|p| p.input_tokens as u64).sum(),
        total_output_tokens: pages.iter().map(|p| p.output_tokens as u64).sum(),
        total_duration_ms: start.elapsed().as_millis() as u64,
    };
    debug!("Extraction stats: {:?}", stats);

    Ok(ExtractionOutput {
        document,
        pages,
        stats,
    })
}

/// Concatenate successful pages' elements in page order.
pub fn merge_pages(pages: &[PageResult]) -> StructuredDocument {
    let elements = pages
        .iter()
        .filter(|p| p.error.is_none())
        .flat_map(|p| p.elements.iter().cloned())
        .collect();
    StructuredDocument { elements }
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`) — used as-is.
/// 2. **Named provider** (`config.provider_name`) — created through
///    [`ProviderFactory::create_llm_provider`] with `config.model` or
///    [`DEFAULT_MODEL`]; the factory reads the matching API key.
/// 3. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`).
/// 4. **Auto-detection** (`ProviderFactory::from_env`).
pub fn resolve_provider(config: &ExtractionConfig) -> Result<Arc<dyn LLMProvider>, Pdf2DocxError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
        return create_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_provider(&prov, &model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| Pdf2DocxError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, GEMINI_API_KEY, or pass --provider.\n\
                Error: {e}"
            ),
        })?;

    Ok(llm_provider)
}

fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, Pdf2DocxError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        Pdf2DocxError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}
