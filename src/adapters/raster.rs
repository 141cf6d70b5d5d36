//! Image decode/encode via the `image` crate.
//!
//! Every image is forced to 8-bit RGB before encoding. Palette and alpha
//! inputs otherwise trip encoders that cannot represent them (JPEG has no
//! alpha, for instance).

use crate::error::ToolError;
use image::{DynamicImage, ImageFormat, ImageReader, RgbImage};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const TOOL: &str = "image";

/// Decode any supported image file and force RGB.
pub fn decode_rgb(input: &Path) -> Result<RgbImage, ToolError> {
    let reader = ImageReader::open(input)
        .map_err(|e| ToolError::DecodeFailed(format!("{}: {e}", input.display())))?
        .with_guessed_format()
        .map_err(|e| ToolError::DecodeFailed(format!("{}: {e}", input.display())))?;

    let img = reader
        .decode()
        .map_err(|e| ToolError::DecodeFailed(format!("{}: {e}", input.display())))?;

    debug!(
        "Decoded {} → {}x{} {:?}",
        input.display(),
        img.width(),
        img.height(),
        img.color()
    );
    Ok(img.to_rgb8())
}

/// Encode `img` to `output` with the given encoder.
pub fn encode(img: &RgbImage, output: &Path, format: ImageFormat) -> Result<(), ToolError> {
    if !format.writing_enabled() {
        return Err(ToolError::UnsupportedByTool {
            tool: TOOL.into(),
            format: format!("{format:?}"),
        });
    }
    DynamicImage::ImageRgb8(img.clone())
        .save_with_format(output, format)
        .map_err(|e| ToolError::EncodeFailed(format!("{format:?}: {e}")))?;
    debug!("Encoded {} as {:?}", output.display(), format);
    Ok(())
}

/// Decode `input`, re-encode into `out_dir/<name>`.
pub fn convert_one_file(
    input: &Path,
    out_dir: &Path,
    name: &str,
    format: ImageFormat,
) -> Result<PathBuf, ToolError> {
    let img = decode_rgb(input)?;
    let output = out_dir.join(name);
    encode(&img, &output, format)?;
    super::ensure_produced(output)
}
