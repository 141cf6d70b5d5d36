//! External tool adapters.
//!
//! Each submodule wraps exactly one tool or library behind a narrow call that
//! returns `Result<_, ToolError>`. Strategies only ever talk to these, never
//! to the underlying crates or processes.
//!
//! ```text
//! raster     image crate        decode / force RGB / encode
//! pdf_writer lopdf              text pages, image page
//! pdfium     pdfium-render      PDF pages → image files
//! office     soffice process    office formats → pdf / office formats
//! ```
//!
//! Native libraries (image codecs, pdfium, lopdf) are CPU-bound and not async
//! aware; they run through [`blocking`], which moves them onto tokio's blocking
//! pool and turns a worker panic into a [`ToolError`].

pub mod office;
pub mod pdf_writer;
pub mod pdfium;
pub mod raster;

use crate::error::ToolError;
use std::path::{Path, PathBuf};

/// Run a CPU-bound adapter call on the blocking pool.
pub(crate) async fn blocking<T, F>(tool: &str, f: F) -> Result<T, ToolError>
where
    F: FnOnce() -> Result<T, ToolError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ToolError::worker_crashed(tool, e))?
}

/// Post-condition for every adapter that writes a file: the file must exist.
pub(crate) fn ensure_produced(path: PathBuf) -> Result<PathBuf, ToolError> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(ToolError::OutputNotProduced { path })
    }
}

/// `<dir>/<stem of input>.<ext>`, the name office-style tools write to.
pub(crate) fn sibling_output(input: &Path, out_dir: &Path, ext: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    out_dir.join(format!("{stem}.{ext}"))
}
