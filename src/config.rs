//! Configuration types for both conversion phases.
//!
//! * [`ConversionConfig`] — structured JSON → DOCX batches. Pure local work,
//!   so only the overwrite policy and a progress sink.
//! * [`ExtractionConfig`] — PDF → structured JSON batches. Carries the LLM
//!   provider selection, rasterisation and request knobs.
//!
//! Both are built via a builder whose `build()` validates ranges and returns
//! [`Pdf2DocxError::InvalidConfig`] on nonsense values.

use crate::error::Pdf2DocxError;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::sync::Arc;

/// Extension of structured JSON files (Phase 1 output, Phase 2 input).
pub const JSON_EXTENSION: &str = "json";

/// Extension of produced Word documents.
pub const DOCX_EXTENSION: &str = "docx";

/// Extension of source PDFs.
pub const PDF_EXTENSION: &str = "pdf";

// ── Phase 2 ──────────────────────────────────────────────────────────────

/// Configuration for a JSON → DOCX batch.
///
/// # Example
/// ```rust
/// use edgequake_pdf2docx::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .overwrite(true)
///     .build()
///     .unwrap();
/// assert!(config.overwrite);
/// ```
#[derive(Clone, Default)]
pub struct ConversionConfig {
    /// Replace existing `.docx` files instead of skipping them. Default: false.
    pub overwrite: bool,

    /// Optional per-file progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("overwrite", &self.overwrite)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn BatchProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn overwrite(mut self, v: bool) -> Self {
        self.config.overwrite = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Finish the builder. Every combination of fields is valid.
    pub fn build(self) -> Result<ConversionConfig, Pdf2DocxError> {
        Ok(self.config)
    }
}

// ── Phase 1 ──────────────────────────────────────────────────────────────

/// Configuration for a PDF → structured JSON batch.
///
/// # Example
/// ```rust
/// use edgequake_pdf2docx::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .provider_name("openai")
///     .model("gpt-4.1-mini")
///     .delay_secs(2)
///     .build()
///     .unwrap();
/// assert_eq!(config.concurrency, 1);
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// LLM model identifier, e.g. "gpt-4.1-nano", "claude-sonnet-4-20250514".
    /// If None with a named provider, `gpt-4.1-nano` is used.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "gemini", "ollama").
    /// If None along with `provider`, the environment decides.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Longest edge of a rendered page in pixels. Range: 100–10000. Default: 2000.
    pub max_rendered_pixels: u32,

    /// Page requests in flight for one PDF. Range: 1–64. Default: 1.
    ///
    /// PDFs themselves are always processed one after another.
    pub concurrency: usize,

    /// Sampling temperature. Range: 0.0–2.0. Default: 0.1.
    pub temperature: f32,

    /// Maximum tokens the model may generate per page. Default: 8192.
    ///
    /// A dense page of JSON-wrapped text costs noticeably more tokens than the
    /// same page as plain Markdown.
    pub max_tokens: usize,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Custom system prompt. If None, uses [`crate::prompts::DEFAULT_SYSTEM_PROMPT`].
    pub system_prompt: Option<String>,

    /// Replace existing `.json` files instead of skipping them. Default: false.
    pub overwrite: bool,

    /// Pause after each processed PDF, in seconds. Default: 0.
    ///
    /// Helps stay under per-minute rate limits on free API tiers.
    pub delay_secs: u64,

    /// Per-VLM-call timeout in seconds. Default: 120.
    pub api_timeout_secs: u64,

    /// Optional per-file progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            provider: None,
            max_rendered_pixels: 2000,
            concurrency: 1,
            temperature: 0.1,
            max_tokens: 8192,
            password: None,
            system_prompt: None,
            overwrite: false,
            delay_secs: 0,
            api_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("concurrency", &self.concurrency)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("system_prompt", &self.system_prompt.as_ref().map(|p| p.len()))
            .field("overwrite", &self.overwrite)
            .field("delay_secs", &self.delay_secs)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .finish()
    }
}

impl ExtractionConfig {
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n;
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t;
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn overwrite(mut self, v: bool) -> Self {
        self.config.overwrite = v;
        self
    }

    pub fn delay_secs(mut self, secs: u64) -> Self {
        self.config.delay_secs = secs;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, Pdf2DocxError> {
        let c = &self.config;
        if !(100..=10_000).contains(&c.max_rendered_pixels) {
            return Err(Pdf2DocxError::InvalidConfig(format!(
                "max_rendered_pixels must be 100–10000, got {}",
                c.max_rendered_pixels
            )));
        }
        if c.concurrency == 0 || c.concurrency > 64 {
            return Err(Pdf2DocxError::InvalidConfig(format!(
                "Concurrency must be 1–64, got {}",
                c.concurrency
            )));
        }
        if !(0.0..=2.0).contains(&c.temperature) {
            return Err(Pdf2DocxError::InvalidConfig(format!(
                "Temperature must be 0.0–2.0, got {}",
                c.temperature
            )));
        }
        if c.max_tokens == 0 {
            return Err(Pdf2DocxError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.api_timeout_secs == 0 {
            return Err(Pdf2DocxError::InvalidConfig(
                "api_timeout_secs must be ≥ 1".into(),
            ));
        }
        if matches!(c.system_prompt.as_deref(), Some(p) if p.trim().is_empty()) {
            return Err(Pdf2DocxError::InvalidConfig(
                "system_prompt must not be blank".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_defaults() {
        let c = ExtractionConfig::default();
        assert_eq!(c.concurrency, 1);
        assert_eq!(c.max_rendered_pixels, 2000);
        assert_eq!(c.delay_secs, 0);
        assert!(!c.overwrite);
        assert!(c.provider.is_none());
    }

    #[test]
    fn builder_sets_fields() {
        let c = ExtractionConfig::builder()
            .provider_name("anthropic")
            .model("claude-sonnet-4-20250514")
            .concurrency(4)
            .delay_secs(3)
            .overwrite(true)
            .build()
            .unwrap();
        assert_eq!(c.provider_name.as_deref(), Some("anthropic"));
        assert_eq!(c.model.as_deref(), Some("claude-sonnet-4-20250514"));
        assert_eq!(c.concurrency, 4);
        assert_eq!(c.delay_secs, 3);
        assert!(c.overwrite);
    }

    #[test]
    fn zero_concurrency_rejected() {
        let err = ExtractionConfig::builder().concurrency(0).build().unwrap_err();
        assert!(matches!(err, Pdf2DocxError::InvalidConfig(_)));
    }

    #[test]
    fn out_of_range_values_rejected() {
        assert!(ExtractionConfig::builder().max_rendered_pixels(50).build().is_err());
        assert!(ExtractionConfig::builder().temperature(3.5).build().is_err());
        assert!(ExtractionConfig::builder().max_tokens(0).build().is_err());
        assert!(ExtractionConfig::builder().api_timeout_secs(0).build().is_err());
        assert!(ExtractionConfig::builder().system_prompt("   ").build().is_err());
    }

    #[test]
    fn debug_hides_secrets() {
        let c = ExtractionConfig::builder().password("hunter2").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn conversion_builder() {
        let c = ConversionConfig::builder().overwrite(true).build().unwrap();
        assert!(c.overwrite);
        assert!(!ConversionConfig::default().overwrite);
    }
}
