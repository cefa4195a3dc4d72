//! VLM interaction: send one page image, get its structural elements back.
//!
//! Prompt text lives in [`crate::prompts`]; reply cleanup lives in
//! [`super::postprocess`]. This module only builds the request, enforces the
//! per-call timeout and folds every outcome into a [`PageResult`].
//!
//! Failed calls are not retried. A failed page is recorded and the document
//! continues with the pages that did convert.

use crate::config::ExtractionConfig;
use crate::error::PageError;
use crate::extract::postprocess::parse_page_response;
use crate::output::PageResult;
use crate::prompts::{page_instruction, DEFAULT_SYSTEM_PROMPT};
use edgequake_llm::{ChatMessage, CompletionOptions, ImageData, LLMProvider};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

/// Extract the elements of a single rasterised page.
///
/// ## Message Layout
///
/// 1. **System message** — the structured-JSON prompt (or the caller's override)
/// 2. **User message** — a short page-position instruction plus the page PNG
///
/// Never returns an error: failures land in `PageResult::error` so one bad
/// page does not abort the document.
pub async fn process_page(
    provider: &Arc<dyn LLMProvider>,
    page_num: usize,
    total_pages: usize,
    image_data: ImageData,
    config: &ExtractionConfig,
) -> PageResult {
    let start = Instant::now();
    let system_prompt = config
        .system_prompt
        .as_deref()
        .unwrap_or(DEFAULT_SYSTEM_PROMPT);

    let messages = vec![
        ChatMessage::system(system_prompt),
        ChatMessage::user_with_images(&page_instruction(page_num, total_pages), vec![image_data]),
    ];
    let options = build_options(config);

    let call = provider.chat(&messages, Some(&options));
    let outcome = match timeout(Duration::from_secs(config.api_timeout_secs), call).await {
        Err(_) => Err(PageError::Timeout {
            page: page_num,
            secs: config.api_timeout_secs,
        }),
        Ok(Err(e)) => Err(PageError::LlmFailed {
            page: page_num,
            detail: e.to_string(),
        }),
        Ok(Ok(response)) => {
            debug!(
                "Page {}: {} input tokens, {} output tokens",
                page_num, response.prompt_tokens, response.completion_tokens
            );
            let tokens = (
                response.prompt_tokens as usize,
                response.completion_tokens as usize,
            );
            parse_page_response(&response.content)
                .map(|doc| (doc.elements, tokens))
                .map_err(|detail| PageError::InvalidResponse {
                    page: page_num,
                    detail,
                })
        }
    };

    let duration_ms = start.elapsed().as_millis() as u64;
    match outcome {
        Ok((elements, (input_tokens, output_tokens))) => PageResult {
            page_num,
            elements,
            input_tokens,
            output_tokens,
            duration_ms,
            error: None,
        },
        Err(e) => {
            warn!("{}", e);
            PageResult::failed(page_num, duration_ms, e)
        }
    }
}

/// Build `CompletionOptions` from the extraction config.
fn build_options(config: &ExtractionConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_options_defaults() {
        let config = ExtractionConfig::default();
        let opts = build_options(&config);
        assert_eq!(opts.temperature, Some(0.1));
        assert_eq!(opts.max_tokens, Some(8192));
    }
}
