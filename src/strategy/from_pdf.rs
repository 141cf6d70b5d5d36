use super::StrategyContext;
use crate::adapters::{self, pdfium, raster};
use crate::error::ToolError;
use crate::workspace;
use std::path::PathBuf;
use tracing::info;

/// Rasterise every page, then bundle them into one zip.
///
/// The archive is only written once every page exists; a failed page leaves
/// nothing to deliver.
pub(super) async fn to_images(ctx: &StrategyContext<'_>) -> Result<PathBuf, ToolError> {
    let target = ctx.request.target();
    let format = target.image_format().ok_or_else(|| ToolError::UnsupportedByTool {
        tool: raster::TOOL.into(),
        format: target.to_string(),
    })?;
    let ext = target.extension().to_string();

    let pages_dir = ctx.workspace.join("pages");
    tokio::fs::create_dir_all(&pages_dir)
        .await
        .map_err(|_| ToolError::OutputNotProduced {
            path: pages_dir.clone(),
        })?;

    let settings = pdfium::RasterSettings {
        dpi: ctx.config.raster_dpi,
        max_pixels: ctx.config.max_rendered_pixels,
        library: ctx.config.pdfium_library.clone(),
    };
    let input = ctx.request.input().to_path_buf();
    let progress = ctx.config.progress_callback.clone();
    let archive = ctx.workspace.join("pages.zip");

    adapters::blocking(pdfium::TOOL, move || {
        let pages =
            pdfium::rasterize_pages(&input, &pages_dir, &ext, format, &settings, progress.as_ref())?;
        info!("Rasterised {} pages, bundling", pages.len());
        workspace::bundle_pages(&pages, &ext, &archive)
    })
    .await
}
