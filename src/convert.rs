//! Conversion entry points.
//!
//! ```text
//! Received ─ plan ─┬─ identical tokens ──────────────► Failed{IdenticalFormats}
//!                  ├─ unknown token / no matrix entry ► Failed{Unsupported}
//!                  └─ Resolved{strategy}
//!                        │ input readable?  no ───────► Failed{DecodeFailed}
//!                        │ workspace
//!                        │ strategy::execute ─ Err ───► Failed{<tool cause>}
//!                        │ deliver to output_dir
//!                        └ workspace removed ─────────► Converted{path}
//! ```
//!
//! [`convert`] never returns `Err` and never panics on tool failure: every
//! exit is a [`ConversionOutcome`]. The workspace is removed on every path,
//! including a caller dropping the future mid-way.

use crate::adapters::office::{OfficeConverter, SofficeConverter};
use crate::config::ConversionConfig;
use crate::error::FailureCause;
use crate::matrix::{self, Strategy};
use crate::outcome::{self, ConversionOutcome, ConversionRequest};
use crate::strategy::{self, StrategyContext};
use crate::workspace::{self, Workspace};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Convert one file.
///
/// # Example
/// ```rust,no_run
/// use docshift::{convert, ConversionConfig, ConversionRequest};
///
/// # #[tokio::main]
/// # async fn main() {
/// let config = ConversionConfig::builder().output_dir("out").build().unwrap();
/// let request = ConversionRequest::new("photo.png", "png", "jpg");
/// match convert(&request, &config).await.into_result() {
///     Ok(path) => println!("wrote {}", path.display()),
///     Err(e) => eprintln!("{e}"),
/// }
/// # }
/// ```
pub async fn convert(request: &ConversionRequest, config: &ConversionConfig) -> ConversionOutcome {
    let start = Instant::now();
    info!(
        "Starting conversion: {} ({} → {})",
        request.input().display(),
        request.source(),
        request.target()
    );

    let outcome = match plan(request) {
        Ok(strategy) => {
            debug!("Resolved strategy: {}", strategy);
            if let Some(ref cb) = config.progress_callback {
                cb.on_conversion_start(request.source(), request.target());
            }
            run(request, strategy, config).await
        }
        Err(rejected) => rejected,
    };

    match &outcome {
        ConversionOutcome::Converted { output_path } => info!(
            "Conversion complete: {} in {}ms",
            output_path.display(),
            start.elapsed().as_millis()
        ),
        ConversionOutcome::Failed { cause, message } => {
            warn!("Conversion failed [{}]: {}", cause, message)
        }
    }

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(&outcome);
    }
    outcome
}

/// Blocking wrapper around [`convert`].
///
/// Creates a private tokio runtime, so it must not be called from inside one.
pub fn convert_sync(request: &ConversionRequest, config: &ConversionConfig) -> ConversionOutcome {
    match tokio::runtime::Runtime::new() {
        Ok(rt) => rt.block_on(convert(request, config)),
        Err(e) => outcome::failed_with(
            request,
            FailureCause::ToolNonZeroExit,
            &format!("internal: failed to create tokio runtime: {e}"),
        ),
    }
}

/// Side-effect free routing: identical check, classification, matrix lookup.
///
/// The identical check compares the case-folded tokens as given, before any
/// synonym collapsing, so `jpg → jpeg` is a re-encode and not a no-op.
pub fn plan(request: &ConversionRequest) -> Result<Strategy, ConversionOutcome> {
    if request.source() == request.target() {
        return Err(outcome::identical(request));
    }

    let source = request.source().family();
    let target = request.target().family();
    let (source, target) = match (source, target) {
        (Ok(s), Ok(t)) => (s, t),
        (Err(e), _) | (_, Err(e)) => {
            debug!("Rejecting request: {}", e);
            return Err(outcome::unsupported(request));
        }
    };

    matrix::resolve(source, target).ok_or_else(|| outcome::unsupported(request))
}

async fn run(
    request: &ConversionRequest,
    strategy: Strategy,
    config: &ConversionConfig,
) -> ConversionOutcome {
    if let Err(e) = check_readable(request.input()).await {
        return outcome::failed_with(
            request,
            FailureCause::DecodeFailed,
            &format!("cannot read input '{}': {e}", request.input().display()),
        );
    }

    let ws = match Workspace::create(&config.scratch_dir).await {
        Ok(ws) => ws,
        Err(e) => {
            return outcome::failed_with(
                request,
                FailureCause::OutputNotProduced,
                &format!(
                    "cannot create workspace under '{}': {e}",
                    config.scratch_dir.display()
                ),
            )
        }
    };

    let office = resolve_office_converter(config);
    let ctx = StrategyContext {
        request,
        config,
        workspace: ws.path(),
        office: office.as_ref(),
    };

    let outcome = match strategy::execute(strategy, &ctx).await {
        Ok(artifact) => {
            let name = deliverable_name(request, strategy);
            match workspace::deliver(&artifact, &config.output_dir, &name).await {
                Ok(output_path) => ConversionOutcome::Converted { output_path },
                Err(e) => outcome::failed_with(
                    request,
                    FailureCause::OutputNotProduced,
                    &format!(
                        "cannot deliver '{name}' to '{}': {e}",
                        config.output_dir.display()
                    ),
                ),
            }
        }
        Err(e) => outcome::failed(request, &e),
    };

    ws.close().await;
    outcome
}

async fn check_readable(path: &Path) -> std::io::Result<()> {
    let meta = tokio::fs::metadata(path).await?;
    if !meta.is_file() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "not a regular file",
        ));
    }
    tokio::fs::File::open(path).await.map(|_| ())
}

/// `<stem>.<target token>`, or `<stem>.zip` when pages are bundled.
fn deliverable_name(request: &ConversionRequest, strategy: Strategy) -> String {
    let stem = workspace::sanitize_stem(&request.input_stem());
    match strategy {
        Strategy::PdfToImages => format!("{stem}.zip"),
        _ => format!("{stem}.{}", request.target().extension()),
    }
}

/// Config override first, otherwise `soffice` built from the config fields.
fn resolve_office_converter(config: &ConversionConfig) -> Arc<dyn OfficeConverter> {
    if let Some(ref converter) = config.office_converter {
        return Arc::clone(converter);
    }
    Arc::new(
        SofficeConverter::new(config.office_binary.clone())
            .with_timeout(config.office_timeout())
            .with_isolated_profile(config.isolated_office_profile),
    )
}
