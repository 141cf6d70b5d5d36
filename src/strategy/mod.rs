//! Conversion strategies, one per matrix entry.
//!
//! A strategy receives the request and a live workspace and returns the path
//! of the single artifact it wrote inside that workspace. It never touches the
//! output directory and never builds an outcome; both are the engine's job.
//!
//! ```text
//! ImageToImage        raster::decode_rgb → raster::encode
//! ImageToPdf          raster::decode_rgb → pdf_writer::write_image_pdf
//! DocumentToPdf       txt  → pdf_writer::write_text_pdf
//!                     xlsx → calamine rows → pdf_writer::write_text_pdf
//!                     else → OfficeConverter("pdf")
//! DocumentToDocument  OfficeConverter(<target>)
//! PdfToImages         pdfium::rasterize_pages → workspace::bundle_pages
//! ```

mod from_document;
mod from_image;
mod from_pdf;

use crate::adapters::office::OfficeConverter;
use crate::config::ConversionConfig;
use crate::error::ToolError;
use crate::matrix::Strategy;
use crate::outcome::ConversionRequest;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Everything a strategy may use.
pub(crate) struct StrategyContext<'a> {
    pub request: &'a ConversionRequest,
    pub config: &'a ConversionConfig,
    pub workspace: &'a Path,
    pub office: &'a dyn OfficeConverter,
}

/// Run `strategy` and return the artifact it left in the workspace.
pub(crate) async fn execute(
    strategy: Strategy,
    ctx: &StrategyContext<'_>,
) -> Result<PathBuf, ToolError> {
    debug!(
        "Executing {} for {} in {}",
        strategy,
        ctx.request.input().display(),
        ctx.workspace.display()
    );
    match strategy {
        Strategy::ImageToImage => from_image::to_image(ctx).await,
        Strategy::ImageToPdf => from_image::to_pdf(ctx).await,
        Strategy::DocumentToPdf => from_document::to_pdf(ctx).await,
        Strategy::DocumentToDocument => from_document::to_document(ctx).await,
        Strategy::PdfToImages => from_pdf::to_images(ctx).await,
    }
}

/// Delegate to the office converter and re-check its output.
///
/// Converters are allowed to be wrong about success; the file on disk is the
/// only evidence accepted.
async fn via_office(ctx: &StrategyContext<'_>, target: &str) -> Result<PathBuf, ToolError> {
    let produced = ctx
        .office
        .convert(ctx.request.input(), ctx.workspace, target)
        .await?;
    crate::adapters::ensure_produced(produced)
}
