//! CLI binary for edgequake-pdf2docx.
//!
//! A thin shim over the library crate that maps CLI flags onto
//! `ConversionConfig` / `ExtractionConfig` and prints a batch summary.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use edgequake_pdf2docx::{
    convert_json_dir, extract_pdf_dir, BatchProgressCallback, BatchReport, ConversionConfig,
    ExtractionConfig, ProgressCallback, SkipReason,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a bar over the files of the batch plus one
/// log line per file.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Verb shown as the bar prefix once the batch starts.
    verb: &'static str,
    file_started: Mutex<Option<Instant>>,
}

impl CliProgressCallback {
    fn new(verb: &'static str) -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Scanning");
        bar.set_message("input directory…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            verb,
            file_started: Mutex::new(None),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix(self.verb);
        self.bar.set_message("");
    }

    fn elapsed(&self) -> String {
        let secs = self
            .file_started
            .lock()
            .ok()
            .and_then(|mut t| t.take())
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        dim(&format!("{secs:.1}s"))
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total: usize) {
        self.activate_bar(total);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("{} {total} files…", self.verb))
        ));
    }

    fn on_file_start(&self, _index: usize, _total: usize, input: &Path) {
        if let Ok(mut t) = self.file_started.lock() {
            *t = Some(Instant::now());
        }
        self.bar.set_message(file_name(input));
    }

    fn on_file_complete(&self, index: usize, total: usize, input: &Path) {
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            green("✓"),
            index + 1,
            total,
            file_name(input),
            self.elapsed(),
        ));
        self.bar.inc(1);
    }

    fn on_file_skipped(&self, index: usize, total: usize, input: &Path, reason: SkipReason) {
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            yellow("–"),
            index + 1,
            total,
            file_name(input),
            dim(&format!("skipped: {reason}")),
        ));
        self.bar.inc(1);
    }

    fn on_file_error(&self, index: usize, total: usize, input: &Path, error: &str) {
        // Only the first line; long provider errors span several.
        let first_line = error.lines().next().unwrap_or(error);
        let msg = if first_line.chars().count() > 80 {
            let cut: String = first_line.chars().take(79).collect();
            format!("{cut}\u{2026}")
        } else {
            first_line.to_string()
        };

        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}  {}",
            red("✗"),
            index + 1,
            total,
            file_name(input),
            red(&msg),
            self.elapsed(),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, _converted: usize, _skipped: usize, _failed: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Phase 1: extract structured JSON from every PDF in ./pdf
  pdf2docx pdf2json ./pdf ./json

  # Same, with a specific model and a pause between files
  pdf2docx pdf2json --provider openai --model gpt-4.1-mini --delay 2 ./pdf ./json

  # Phase 2: build .docx files from the JSON
  pdf2docx json2docx ./json ./docx

  # Rebuild everything, machine-readable report on stdout
  pdf2docx --json json2docx --overwrite ./json ./docx > report.json

STRUCTURED JSON FORMAT:
  { "document_elements": [
      { "type": "heading_1", "content": "Title" },
      { "type": "paragraph", "content": "Body text" },
      { "type": "table_markdown", "content": "| A | B |\n|---|---|\n| 1 | 2 |" } ] }

  Types: heading_1, heading_2, heading_3, paragraph, table_markdown.
  Anything else is kept as a visible "[Unknown type: …]" paragraph.

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  EDGEQUAKE_LLM_PROVIDER  Provider used when --provider is absent (with EDGEQUAKE_MODEL)
  EDGEQUAKE_MODEL         Model used when --provider is absent (with EDGEQUAKE_LLM_PROVIDER)
  PDFIUM_LIB_PATH         libpdfium file or directory; default is the system library
  RUST_LOG                Overrides the log filter chosen by --verbose / --quiet
"#;

/// Convert PDFs to Word documents through a structured JSON intermediate.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2docx",
    version,
    about = "Convert PDFs to Word documents via Vision LLM structure extraction",
    long_about = "Two-phase PDF to DOCX conversion. `pdf2json` asks a Vision Language Model to \
label the headings, paragraphs and tables of every page and stores them as JSON; `json2docx` \
turns that JSON into styled .docx files without any network access.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Disable progress bar.
    #[arg(long, global = true, env = "PDF2DOCX_NO_PROGRESS")]
    no_progress: bool,

    /// Print the batch report as JSON on stdout.
    #[arg(long, global = true, env = "PDF2DOCX_JSON")]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "PDF2DOCX_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "PDF2DOCX_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build .docx files from structured JSON files.
    Json2docx(Json2DocxArgs),
    /// Extract structured JSON from PDF files with a Vision LLM.
    Pdf2json(Pdf2JsonArgs),
}

#[derive(Args, Debug)]
struct Json2DocxArgs {
    /// Directory containing .json files.
    input_dir: PathBuf,

    /// Directory for the .docx files (created if missing).
    output_dir: PathBuf,

    /// Replace existing .docx files instead of skipping them.
    #[arg(long, env = "PDF2DOCX_OVERWRITE")]
    overwrite: bool,
}

#[derive(Args, Debug)]
struct Pdf2JsonArgs {
    /// Directory containing .pdf files.
    input_dir: PathBuf,

    /// Directory for the .json files (created if missing).
    output_dir: PathBuf,

    /// Replace existing .json files instead of skipping them.
    #[arg(long, env = "PDF2DOCX_OVERWRITE")]
    overwrite: bool,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(
        long,
        env = "PDF2DOCX_PROVIDER",
        long_help = "LLM provider. Auto-detected from API key env vars if not set.\n\
          Supported: openai, anthropic, gemini, azure, ollama, or any OpenAI-compatible URL."
    )]
    provider: Option<String>,

    /// LLM model ID (e.g. gpt-4.1-nano, gpt-4.1, claude-sonnet-4-20250514).
    #[arg(long, env = "PDF2DOCX_MODEL")]
    model: Option<String>,

    /// Seconds to wait after each PDF (rate limiting).
    #[arg(long, env = "PDF2DOCX_DELAY", default_value_t = 0)]
    delay: u64,

    /// Page requests in flight per PDF.
    #[arg(short, long, env = "PDF2DOCX_CONCURRENCY", default_value_t = 1)]
    concurrency: usize,

    /// Longest edge of a rendered page, in pixels.
    #[arg(long, env = "PDF2DOCX_MAX_RENDERED_PIXELS", default_value_t = 2000)]
    max_rendered_pixels: u32,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2DOCX_PASSWORD")]
    password: Option<String>,

    /// Path to a text file containing a custom system prompt.
    #[arg(long, env = "PDF2DOCX_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// Max LLM output tokens per page.
    #[arg(long, env = "PDF2DOCX_MAX_TOKENS", default_value_t = 8192)]
    max_tokens: usize,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "PDF2DOCX_TEMPERATURE", default_value_t = 0.1)]
    temperature: f32,

    /// Per-page LLM call timeout in seconds.
    #[arg(long, env = "PDF2DOCX_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let verb = match &cli.command {
        Command::Json2docx(_) => "Converting",
        Command::Pdf2json(_) => "Extracting",
    };
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new(verb) as Arc<dyn BatchProgressCallback>)
    } else {
        None
    };

    // ── Run batch ────────────────────────────────────────────────────────
    let report = match &cli.command {
        Command::Json2docx(args) => {
            let mut builder = ConversionConfig::builder().overwrite(args.overwrite);
            if let Some(cb) = progress_cb {
                builder = builder.progress_callback(cb);
            }
            let config = builder.build().context("Invalid configuration")?;

            // Pure CPU + local I/O; keep it off the async workers.
            let (input_dir, output_dir) = (args.input_dir.clone(), args.output_dir.clone());
            tokio::task::spawn_blocking(move || convert_json_dir(&input_dir, &output_dir, &config))
                .await
                .context("Conversion task panicked")?
                .context("Conversion failed")?
        }
        Command::Pdf2json(args) => {
            let config = build_extraction_config(args, progress_cb).await?;
            extract_pdf_dir(&args.input_dir, &args.output_dir, &config)
                .await
                .context("Extraction failed")?
        }
    };

    // ── Summary ──────────────────────────────────────────────────────────
    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    } else if !cli.quiet {
        print_summary(&report);
    }

    Ok(())
}

/// Map CLI args to `ExtractionConfig`.
async fn build_extraction_config(
    args: &Pdf2JsonArgs,
    progress: Option<ProgressCallback>,
) -> Result<ExtractionConfig> {
    let mut builder = ExtractionConfig::builder()
        .overwrite(args.overwrite)
        .delay_secs(args.delay)
        .concurrency(args.concurrency)
        .max_rendered_pixels(args.max_rendered_pixels)
        .max_tokens(args.max_tokens)
        .temperature(args.temperature)
        .api_timeout_secs(args.api_timeout);

    if let Some(ref path) = args.system_prompt {
        let prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read system prompt from {:?}", path))?;
        builder = builder.system_prompt(prompt);
    }
    if let Some(ref provider) = args.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(ref model) = args.model {
        builder = builder.model(model);
    }
    if let Some(ref password) = args.password {
        builder = builder.password(password);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_summary(report: &BatchReport) {
    let mark = if report.failed == 0 {
        green("✔")
    } else if report.converted == 0 && report.total() > 0 {
        red("✘")
    } else {
        cyan("⚠")
    };
    eprintln!(
        "{}  {} converted  {} skipped  {} failed  {}",
        mark,
        bold(&report.converted.to_string()),
        report.skipped,
        if report.failed == 0 {
            report.failed.to_string()
        } else {
            red(&report.failed.to_string())
        },
        dim(&format!("{}ms", report.duration_ms)),
    );
}
