//! # docshift
//!
//! Convert one file between image, PDF, word-processing, spreadsheet and
//! presentation formats, and get back either the path of exactly one
//! deliverable or a classified failure.
//!
//! ## Pipeline Overview
//!
//! ```text
//! ConversionRequest (input path, source token, target token)
//!  │
//!  ├─ 1. Plan      identical check → classify tokens → matrix lookup
//!  ├─ 2. Isolate   fresh workspace under the scratch dir
//!  ├─ 3. Execute   strategy drives adapters (image, lopdf, pdfium, soffice)
//!  ├─ 4. Deliver   move artifact (or page zip) into the output dir
//!  └─ 5. Report    ConversionOutcome::{Converted, Failed{cause, message}}
//! ```
//!
//! Every external process runs under a timeout and every workspace is removed
//! before [`convert`] returns, whichever way it returns.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docshift::{convert, ConversionConfig, ConversionRequest, FailureCause};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ConversionConfig::default();
//!     let request = ConversionRequest::from_path("report.pdf", "png");
//!     match convert(&request, &config).await {
//!         docshift::ConversionOutcome::Converted { output_path } => {
//!             println!("pages bundled in {}", output_path.display());
//!         }
//!         docshift::ConversionOutcome::Failed { cause: FailureCause::Unsupported, message } => {
//!             eprintln!("not possible: {message}");
//!         }
//!         docshift::ConversionOutcome::Failed { message, .. } => eprintln!("{message}"),
//!     }
//! }
//! ```
//!
//! ## Supported Pairs
//!
//! | Source family | Target family | Strategy |
//! |---------------|---------------|----------|
//! | Image | Image | re-encode via the `image` crate |
//! | Image | PDF | single page, built-in PDF writer |
//! | Document / Spreadsheet / Presentation | PDF | `txt` and `xlsx` built in, others via `soffice` |
//! | Same office family | Same office family | `soffice --convert-to` |
//! | PDF | Image | pdfium per page, bundled as `page_<n>.<ext>` in a zip |
//!
//! Nothing is chained: `pptx → png` is unsupported even though
//! `pptx → pdf → png` would be possible.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docshift` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! ```toml
//! docshift = { version = "0.1", default-features = false }
//! ```
//!
//! ## Runtime Requirements
//!
//! * PDF → Image needs a pdfium shared library (`PDFIUM_LIB_PATH` or the
//!   system library path).
//! * `docx`, `odt` and `pptx` conversions need LibreOffice's `soffice`.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod adapters;
pub mod config;
pub mod convert;
pub mod error;
pub mod format;
pub mod matrix;
pub mod outcome;
pub mod progress;
mod strategy;
pub mod workspace;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use adapters::office::{OfficeConverter, SofficeConverter};
pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert, convert_sync, plan};
pub use error::{DocshiftError, FailureCause, ToolError};
pub use format::{classify, FormatFamily, FormatToken, InvalidFormat, KNOWN_FORMATS};
pub use matrix::{support_matrix, MatrixCell, Strategy, Support};
pub use outcome::{ConversionOutcome, ConversionRequest};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
