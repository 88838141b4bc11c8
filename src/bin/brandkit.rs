//! CLI binary for edgequake-brandkit.
//!
//! A thin shim over the library crate that maps CLI flags to `KitConfig`,
//! prints the generated copy and palette, and writes the kit archive.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use edgequake_brandkit::{
    generate_to_dir, BrandBrief, BrandKit, HexColor, ImageBackend, KitConfig,
    KitProgressCallback, ProgressCallback, Stage, TextBackend, Vibe,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
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

/// A true-colour block followed by the hex code.
fn swatch(color: HexColor) -> String {
    format!(
        "\x1b[48;2;{};{};{}m      \x1b[0m {}",
        color.r, color.g, color.b, color
    )
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner with one log line per finished stage. Copy and logo run at the
/// same time, so lines may arrive in either order.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        Self::with_bar(ProgressBar::new_spinner())
    }

    fn with_bar(bar: ProgressBar) -> Arc<Self> {
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }

    /// Remove the spinner line. Also used when the run fails before
    /// `on_kit_complete`.
    fn clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl KitProgressCallback for CliProgressCallback {
    fn on_kit_start(&self, brand_name: &str) {
        self.bar.set_prefix("Generating");
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Building branding kit for {brand_name}…"))
        ));
    }

    fn on_stage_start(&self, stage: Stage) {
        self.bar.set_message(format!("{stage}…"));
    }

    fn on_stage_complete(&self, stage: Stage) {
        self.bar.println(format!("  {} {}", green("✓"), stage));
    }

    fn on_stage_warning(&self, stage: Stage, message: &str) {
        let msg = if message.chars().count() > 80 {
            format!("{}\u{2026}", message.chars().take(79).collect::<String>())
        } else {
            message.to_string()
        };
        self.bar
            .println(format!("  {} {}  {}", yellow("⚠"), stage, dim(&msg)));
    }

    fn on_kit_complete(&self, _warnings: usize) {
        self.clear();
    }
}

const AFTER_HELP: &str = r##"EXAMPLES:
  # Interactive: prompts for brand name and industry
  brandkit generate

  # Fully specified
  brandkit generate --brand-name "Bean There" --industry Coffee \
      --vibe eco-friendly --color "#6F4E37" -o kits/

  # Copy from an edgequake-llm provider, logo from OpenAI
  brandkit generate --brand-name Acme --industry Rockets \
      --text-backend llm --provider openai --text-model gpt-4.1-mini \
      --image-backend openai

  # JSON summary for scripts
  brandkit generate --brand-name Acme --industry Rockets --json

  # Web form on http://127.0.0.1:8501
  brandkit serve

VIBES:
  Luxury (default), Fun, Eco-Friendly, Minimalist, Techy

ENVIRONMENT VARIABLES:
  HF_API_KEY / HF_TOKEN   Hugging Face access token (text and image)
  OPENAI_API_KEY          OpenAI key (images, or copy via --text-backend llm)
  ANTHROPIC_API_KEY, GEMINI_API_KEY, …
                          Other edgequake-llm providers for the copy
  EDGEQUAKE_LLM_PROVIDER  Provider name for auto-detected copy backends
  EDGEQUAKE_MODEL         Model for auto-detected copy backends
  PDFIUM_LIB_PATH         pdfium library file or directory
  RUST_LOG                Log filter (overrides -v / -q)
  BRANDKIT_*              Every flag, e.g. BRANDKIT_BRAND_NAME, BRANDKIT_COLOR
"##;

/// Generate AI branding kits: copy, logo, brand-guide PDF, zip.
#[derive(Parser, Debug)]
#[command(
    name = "brandkit",
    version,
    about = "Generate AI branding kits (copy, logo, brand-guide PDF) from a short brief",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "BRANDKIT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the results.
    #[arg(short, long, global = true, env = "BRANDKIT_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate one branding kit and write `<brand>_kit.zip`.
    Generate(GenerateArgs),
    /// Serve the brief form over HTTP.
    #[cfg(feature = "server")]
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Brand name (prompted for when omitted on a terminal).
    #[arg(long, env = "BRANDKIT_BRAND_NAME")]
    brand_name: Option<String>,

    /// Industry, e.g. "Coffee" (prompted for when omitted on a terminal).
    #[arg(long, env = "BRANDKIT_INDUSTRY")]
    industry: Option<String>,

    /// Brand vibe: luxury, fun, eco-friendly, minimalist, techy.
    #[arg(long, env = "BRANDKIT_VIBE", default_value = "Luxury", value_parser = parse_vibe)]
    vibe: Vibe,

    /// Theme colour as #RRGGBB.
    #[arg(long, env = "BRANDKIT_COLOR", default_value = "#FF5733", value_parser = parse_color)]
    color: HexColor,

    /// Directory for the kit archive.
    #[arg(short, long, env = "BRANDKIT_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Print a JSON summary instead of the copy and palette.
    #[arg(long, env = "BRANDKIT_JSON")]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "BRANDKIT_NO_PROGRESS")]
    no_progress: bool,

    #[command(flatten)]
    backend: BackendArgs,
}

#[cfg(feature = "server")]
#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to listen on.
    #[arg(long, env = "BRANDKIT_ADDR", default_value = "127.0.0.1:8501")]
    addr: std::net::SocketAddr,

    #[command(flatten)]
    backend: BackendArgs,
}

/// Backend and generation knobs shared by `generate` and `serve`.
#[derive(Args, Debug)]
struct BackendArgs {
    /// Text backend: auto, huggingface, llm.
    #[arg(long, env = "BRANDKIT_TEXT_BACKEND", default_value = "auto", value_parser = parse_text_backend)]
    text_backend: TextBackend,

    /// Text model ID (Hugging Face repo or provider model).
    #[arg(long, env = "BRANDKIT_TEXT_MODEL")]
    text_model: Option<String>,

    /// edgequake-llm provider for the copy: openai, anthropic, gemini, ollama, …
    #[arg(long, env = "BRANDKIT_PROVIDER")]
    provider: Option<String>,

    /// Image backend: auto, huggingface, openai.
    #[arg(long, env = "BRANDKIT_IMAGE_BACKEND", default_value = "auto", value_parser = parse_image_backend)]
    image_backend: ImageBackend,

    /// Image model ID.
    #[arg(long, env = "BRANDKIT_IMAGE_MODEL")]
    image_model: Option<String>,

    /// Sampling temperature for the copy (0.0–2.0).
    #[arg(long, env = "BRANDKIT_TEMPERATURE", default_value_t = 0.7)]
    temperature: f32,

    /// Maximum new tokens for the copy.
    #[arg(long, env = "BRANDKIT_MAX_TOKENS", default_value_t = 400)]
    max_tokens: usize,

    /// Retries per asset on transient backend failures.
    #[arg(long, env = "BRANDKIT_MAX_RETRIES", default_value_t = 2)]
    max_retries: u32,

    /// Per-call timeout in seconds.
    #[arg(long, env = "BRANDKIT_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,
}

fn parse_vibe(s: &str) -> Result<Vibe, String> {
    s.parse().map_err(|e: edgequake_brandkit::BrandKitError| e.to_string())
}

fn parse_color(s: &str) -> Result<HexColor, String> {
    s.parse().map_err(|e: edgequake_brandkit::BrandKitError| e.to_string())
}

fn parse_text_backend(s: &str) -> Result<TextBackend, String> {
    s.parse().map_err(|e: edgequake_brandkit::BrandKitError| e.to_string())
}

fn parse_image_backend(s: &str) -> Result<ImageBackend, String> {
    s.parse().map_err(|e: edgequake_brandkit::BrandKitError| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner provides all the feedback that matters; INFO logs would
    // only tear it.
    let show_progress = match &cli.command {
        Command::Generate(args) => !cli.quiet && !args.no_progress && !args.json,
        #[cfg(feature = "server")]
        Command::Serve(_) => false,
    };
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

    match cli.command {
        Command::Generate(args) => run_generate(args, cli.quiet, show_progress).await,
        #[cfg(feature = "server")]
        Command::Serve(args) => {
            let config = build_config(&args.backend, None)?;
            edgequake_brandkit::server::serve(args.addr, config)
                .await
                .context("Server failed")
        }
    }
}

async fn run_generate(args: GenerateArgs, quiet: bool, show_progress: bool) -> Result<()> {
    let brand_name = required_field(args.brand_name, "Brand Name", "--brand-name")?;
    let industry = required_field(args.industry, "Industry", "--industry")?;
    let brief = BrandBrief::new(brand_name, industry, args.vibe, args.color)
        .context("Invalid brief")?;

    let spinner = show_progress.then(CliProgressCallback::new);
    let progress = spinner.clone().map(|cb| cb as ProgressCallback);
    let config = build_config(&args.backend, progress)?;

    let result = generate_to_dir(&brief, &args.output_dir, &config).await;
    if let (Err(_), Some(spinner)) = (&result, &spinner) {
        spinner.clear();
    }
    let kit = result.context("Brand kit generation failed")?;
    let archive_path = args.output_dir.join(&kit.archive_file_name);

    if args.json {
        let summary = serde_json::json!({
            "archive": archive_path,
            "kit": &kit,
            "warnings": kit.warnings(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
        );
        return Ok(());
    }

    print_kit(&kit).context("Failed to write to stdout")?;

    for warning in kit.warnings() {
        eprintln!("{} {}", yellow("⚠"), warning);
    }
    if !quiet {
        print_summary(&kit, &archive_path);
    }
    Ok(())
}

/// Map CLI args to `KitConfig`.
fn build_config(args: &BackendArgs, progress: Option<ProgressCallback>) -> Result<KitConfig> {
    let mut builder = KitConfig::builder()
        .text_backend(args.text_backend)
        .image_backend(args.image_backend)
        .temperature(args.temperature)
        .max_tokens(args.max_tokens)
        .max_retries(args.max_retries)
        .api_timeout_secs(args.api_timeout);

    if let Some(model) = &args.text_model {
        builder = builder.text_model(model);
    }
    if let Some(provider) = &args.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(model) = &args.image_model {
        builder = builder.image_model(model);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Use `value` when given, otherwise ask on an interactive terminal.
fn required_field(value: Option<String>, label: &str, flag: &str) -> Result<String> {
    if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
        return Ok(v);
    }
    if !io::stdin().is_terminal() {
        anyhow::bail!("{flag} is required when stdin is not a terminal");
    }
    loop {
        eprint!("{}: ", bold(label));
        io::stderr().flush().ok();
        let mut line = String::new();
        let read = io::stdin()
            .read_line(&mut line)
            .with_context(|| format!("Failed to read {label}"))?;
        if read == 0 {
            anyhow::bail!("{flag} is required");
        }
        let line = line.trim();
        if !line.is_empty() {
            return Ok(line.to_string());
        }
        eprintln!("{}", yellow(&format!("{label} cannot be empty.")));
    }
}

fn print_kit(kit: &BrandKit) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", kit.copy.text)?;
    writeln!(out)?;
    writeln!(out, "Palette:")?;
    for color in kit.palette.colors() {
        writeln!(out, "  {}", swatch(*color))?;
    }
    Ok(())
}

fn print_summary(kit: &BrandKit, archive_path: &Path) {
    let stats = &kit.stats;
    eprintln!(
        "{}  {}  {}ms  →  {}",
        if stats.warnings == 0 {
            green("✔")
        } else {
            yellow("⚠")
        },
        if kit.has_logo() {
            "copy + logo + guide"
        } else {
            "copy + guide (no logo)"
        },
        stats.total_duration_ms,
        bold(&archive_path.display().to_string()),
    );
    eprintln!(
        "   {} tokens in  /  {} tokens out",
        dim(&stats.input_tokens.to_string()),
        dim(&stats.output_tokens.to_string()),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
        assert!(AFTER_HELP.contains(r##"--color "#6F4E37""##));
        assert!(AFTER_HELP.trim_end().ends_with("BRANDKIT_COLOR"));
    }

    #[test]
    fn generate_flags_parse() {
        let cli = Cli::try_parse_from([
            "brandkit",
            "generate",
            "--brand-name",
            "Bean There",
            "--industry",
            "Coffee",
            "--color",
            "#6F4E37",
        ])
        .unwrap();
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.color, HexColor::new(0x6F, 0x4E, 0x37));
    }

    #[test]
    fn clear_finishes_the_spinner() {
        let progress = CliProgressCallback::with_bar(ProgressBar::hidden());
        assert!(!progress.bar.is_finished());
        progress.clear();
        assert!(progress.bar.is_finished());
    }
}
