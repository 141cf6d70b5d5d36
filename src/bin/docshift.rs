//! CLI binary for docshift.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints the outcome.

use anyhow::{Context, Result};
use clap::Parser;
use docshift::{
    convert, plan, support_matrix, ConversionConfig, ConversionOutcome, ConversionProgressCallback,
    ConversionRequest, FormatToken, ProgressCallback, KNOWN_FORMATS,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner on stderr. PDF rasterisation also reports `page n/total`.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, source: &FormatToken, target: &FormatToken) {
        self.bar.set_prefix("Converting");
        self.bar.set_message(format!("{source} → {target}"));
    }

    fn on_page_rendered(&self, page_num: usize, total_pages: usize) {
        self.bar.set_message(format!("page {page_num}/{total_pages}"));
    }

    fn on_conversion_complete(&self, _outcome: &ConversionOutcome) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Image re-encode (source format taken from the extension)
  docshift photo.png --to jpg

  # PDF pages as a zip of PNGs
  docshift report.pdf --to png -o out/

  # Office documents through LibreOffice
  docshift letter.docx --to odt --office-timeout 60

  # Declared source format, JSON outcome
  docshift upload.bin --from xlsx --to pdf --json

  # What would happen, without doing it
  docshift slides.pptx --to png --dry-run

  # Print the full support matrix
  docshift --matrix

EXIT STATUS:
  0  converted (or dry run resolved a strategy)
  1  conversion failed (identical formats, unsupported, tool failure)
  2  invalid arguments or configuration

ENVIRONMENT VARIABLES:
  DOCSHIFT_OUTPUT_DIR      Where deliverables are written
  DOCSHIFT_SCRATCH_DIR     Parent of per-conversion workspaces
  DOCSHIFT_OFFICE_BINARY   Office converter executable (default: soffice)
  PDFIUM_LIB_PATH          Path to libpdfium for PDF → image
  RUST_LOG                 Overrides the log filter
"#;

/// Convert documents between image, PDF and office formats.
#[derive(Parser, Debug)]
#[command(
    name = "docshift",
    version,
    about = "Convert documents between image, PDF and office formats",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// File to convert.
    #[arg(required_unless_present = "matrix")]
    input: Option<PathBuf>,

    /// Target format token (png, jpg, pdf, docx, …).
    #[arg(short, long = "to", value_name = "FMT", required_unless_present = "matrix")]
    to: Option<String>,

    /// Source format token. Default: the input's extension.
    #[arg(long = "from", value_name = "FMT")]
    from: Option<String>,

    /// Directory that receives the converted file.
    #[arg(short, long, env = "DOCSHIFT_OUTPUT_DIR", default_value = "converted")]
    output_dir: PathBuf,

    /// Parent directory for temporary workspaces.
    #[arg(long, env = "DOCSHIFT_SCRATCH_DIR")]
    scratch_dir: Option<PathBuf>,

    /// Rasterisation DPI for PDF → image (72–600).
    #[arg(long, env = "DOCSHIFT_DPI", default_value_t = 200,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// Pixels per inch assumed for image → PDF page size.
    #[arg(long, env = "DOCSHIFT_IMAGE_PDF_DPI", default_value_t = 100.0)]
    image_pdf_dpi: f32,

    /// Office converter executable.
    #[arg(long, env = "DOCSHIFT_OFFICE_BINARY", default_value = "soffice")]
    office_binary: PathBuf,

    /// Seconds before a hung office conversion is killed.
    #[arg(long, env = "DOCSHIFT_OFFICE_TIMEOUT", default_value_t = 120)]
    office_timeout: u64,

    /// Share the default office user profile instead of one per run.
    #[arg(long, env = "DOCSHIFT_NO_ISOLATED_PROFILE")]
    no_isolated_profile: bool,

    /// Path to libpdfium.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Print the outcome as JSON on stdout.
    #[arg(long, env = "DOCSHIFT_JSON")]
    json: bool,

    /// Resolve the strategy and stop.
    #[arg(long)]
    dry_run: bool,

    /// Print the support matrix (S supported, N not supported, # identical).
    #[arg(long)]
    matrix: bool,

    /// Disable the spinner.
    #[arg(long, env = "DOCSHIFT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOCSHIFT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DOCSHIFT_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner is the feedback when it is shown, so library INFO logs are
    // held back unless asked for.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.dry_run;
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

    match run(cli, show_progress).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e:#}", red("error:"));
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli, show_progress: bool) -> Result<ExitCode> {
    if cli.matrix {
        print_matrix(cli.json)?;
        return Ok(ExitCode::SUCCESS);
    }

    let input = cli.input.clone().context("missing INPUT")?;
    let target = cli.to.clone().context("missing --to")?;
    let request = match &cli.from {
        Some(source) => ConversionRequest::new(input, source.as_str(), target.as_str()),
        None => ConversionRequest::from_path(input, target.as_str()),
    };

    // ── Dry run ──────────────────────────────────────────────────────────
    if cli.dry_run {
        let planned = plan(&request);
        if cli.json {
            let value = match &planned {
                Ok(strategy) => serde_json::json!({ "status": "planned", "strategy": strategy }),
                Err(outcome) => serde_json::to_value(outcome).context("Failed to serialise outcome")?,
            };
            println!("{}", serde_json::to_string_pretty(&value)?);
        } else {
            match &planned {
                Ok(strategy) => println!("{} → {}: {}", request.source(), request.target(), strategy),
                Err(outcome) => eprintln!("{}", outcome.message().unwrap_or_default()),
            }
        }
        return Ok(if planned.is_ok() {
            ExitCode::SUCCESS
        } else {
            ExitCode::from(1)
        });
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Run conversion ───────────────────────────────────────────────────
    let outcome = convert(&request, &config).await;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&outcome).context("Failed to serialise outcome")?
        );
    } else {
        match &outcome {
            ConversionOutcome::Converted { output_path } => {
                println!("{}", output_path.display());
                if !cli.quiet {
                    eprintln!("{} {}", green("✔"), bold("converted"));
                }
            }
            ConversionOutcome::Failed { cause, message } => {
                eprintln!("{} [{}] {}", red("✘"), cause, message);
            }
        }
    }

    Ok(if outcome.is_converted() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .output_dir(&cli.output_dir)
        .raster_dpi(cli.dpi)
        .image_pdf_dpi(cli.image_pdf_dpi)
        .office_binary(&cli.office_binary)
        .office_timeout_secs(cli.office_timeout)
        .isolated_office_profile(!cli.no_isolated_profile);

    if let Some(ref dir) = cli.scratch_dir {
        builder = builder.scratch_dir(dir);
    }
    if let Some(ref lib) = cli.pdfium_lib {
        builder = builder.pdfium_library(lib);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_matrix(json: bool) -> Result<()> {
    let cells = support_matrix();
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&cells).context("Failed to serialise matrix")?
        );
        return Ok(());
    }

    let width = KNOWN_FORMATS.len();
    print!("{:>6}", "");
    for (name, _) in KNOWN_FORMATS {
        print!("{name:>6}");
    }
    println!();
    for row in cells.chunks(width) {
        print!("{:>6}", row[0].source.as_str());
        for cell in row {
            print!("{:>6}", cell.support.code());
        }
        println!();
    }
    Ok(())
}
