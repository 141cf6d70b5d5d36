use super::StrategyContext;
use crate::adapters::{self, pdf_writer, raster};
use crate::error::ToolError;
use std::path::PathBuf;

/// Re-encode with the encoder the target token names (`jpg` selects JPEG).
pub(super) async fn to_image(ctx: &StrategyContext<'_>) -> Result<PathBuf, ToolError> {
    let target = ctx.request.target();
    let format = target.image_format().ok_or_else(|| ToolError::UnsupportedByTool {
        tool: raster::TOOL.into(),
        format: target.to_string(),
    })?;

    let input = ctx.request.input().to_path_buf();
    let out_dir = ctx.workspace.to_path_buf();
    let name = format!("converted.{}", target.extension());
    adapters::blocking(raster::TOOL, move || {
        raster::convert_one_file(&input, &out_dir, &name, format)
    })
    .await
}

/// Single page sized to the image at `image_pdf_dpi`.
pub(super) async fn to_pdf(ctx: &StrategyContext<'_>) -> Result<PathBuf, ToolError> {
    let input = ctx.request.input().to_path_buf();
    let output = ctx.workspace.join("converted.pdf");
    let ppi = ctx.config.image_pdf_dpi;
    adapters::blocking(pdf_writer::TOOL, move || {
        let img = raster::decode_rgb(&input)?;
        pdf_writer::write_image_pdf(&img, ppi, &output)?;
        adapters::ensure_produced(output)
    })
    .await
}
