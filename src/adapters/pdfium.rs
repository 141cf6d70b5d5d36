//! PDF rasterisation via pdfium.
//!
//! `pdfium-render` wraps the pdfium C++ library, which is not safe to drive
//! from async code. Callers run [`rasterize_pages`] through
//! [`super::blocking`].
//!
//! The library is bound per call, in this order: explicit path from the
//! config, `PDFIUM_LIB_PATH`, then the platform's library search path. A
//! failed bind is [`ToolError::NotFound`].

use crate::error::ToolError;
use crate::progress::ProgressCallback;
use image::ImageFormat;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const TOOL: &str = "pdfium";

/// One rasterised page on disk. `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageArtifact {
    pub page: usize,
    pub path: PathBuf,
}

/// Settings for one rasterisation run.
#[derive(Debug, Clone)]
pub struct RasterSettings {
    pub dpi: u32,
    pub max_pixels: u32,
    pub library: Option<PathBuf>,
}

/// Bind pdfium or report it missing.
pub fn bind(library: Option<&Path>) -> Result<Pdfium, ToolError> {
    let explicit = library
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from));

    let bindings = match &explicit {
        Some(path) => Pdfium::bind_to_library(path).map_err(|e| ToolError::NotFound {
            tool: TOOL.into(),
            detail: format!("cannot load '{}': {e}", path.display()),
        })?,
        None => Pdfium::bind_to_system_library().map_err(|e| ToolError::NotFound {
            tool: TOOL.into(),
            detail: format!("no system libpdfium: {e}"),
        })?,
    };
    Ok(Pdfium::new(bindings))
}

/// Render every page of `pdf` into `out_dir` as `page_<n>.<ext>`.
///
/// All-or-nothing: the first page that fails to render or save aborts the run.
/// Zero pages is reported as [`ToolError::OutputNotProduced`].
pub fn rasterize_pages(
    pdf: &Path,
    out_dir: &Path,
    ext: &str,
    format: ImageFormat,
    settings: &RasterSettings,
    progress: Option<&ProgressCallback>,
) -> Result<Vec<PageArtifact>, ToolError> {
    let pdfium = bind(settings.library.as_deref())?;

    let document = pdfium
        .load_pdf_from_file(pdf, None)
        .map_err(|e| ToolError::DecodeFailed(format!("{}: {e:?}", pdf.display())))?;

    let pages = document.pages();
    let total = pages.len() as usize;
    info!("PDF loaded: {} pages", total);
    if total == 0 {
        return Err(ToolError::OutputNotProduced {
            path: out_dir.join(format!("page_1.{ext}")),
        });
    }

    let render_config = PdfRenderConfig::new()
        .scale_page_by_factor(settings.dpi as f32 / 72.0)
        .set_maximum_width(settings.max_pixels as i32)
        .set_maximum_height(settings.max_pixels as i32);

    let mut artifacts = Vec::with_capacity(total);
    for (idx, page) in pages.iter().enumerate() {
        let page_num = idx + 1;
        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| ToolError::DecodeFailed(format!("page {page_num}: {e:?}")))?;

        let rgb = bitmap.as_image().to_rgb8();
        debug!("Rendered page {} → {}x{} px", page_num, rgb.width(), rgb.height());

        let path = out_dir.join(format!("page_{page_num}.{ext}"));
        super::raster::encode(&rgb, &path, format).map_err(|e| match e {
            ToolError::EncodeFailed(detail) => {
                ToolError::EncodeFailed(format!("page {page_num}: {detail}"))
            }
            other => other,
        })?;
        let path = super::ensure_produced(path)?;

        if let Some(cb) = progress {
            cb.on_page_rendered(page_num, total);
        }
        artifacts.push(PageArtifact {
            page: page_num,
            path,
        });
    }

    Ok(artifacts)
}
