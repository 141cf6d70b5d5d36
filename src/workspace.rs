//! Per-conversion scratch directories.
//!
//! A [`Workspace`] is a uniquely named directory under the configured scratch
//! root, owned by exactly one conversion. It is removed when
//! [`Workspace::close`] is called or, failing that, when it is dropped, which
//! also covers panics and cancelled futures. Two conversions of files with the
//! same name never see each other's intermediates.

use crate::adapters::pdfium::PageArtifact;
use crate::error::ToolError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const PREFIX: &str = "docshift-";

static UNSAFE_NAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("static regex"));

/// Scratch directory for one conversion.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a fresh directory under `root` (created if missing).
    pub async fn create(root: &Path) -> io::Result<Self> {
        tokio::fs::create_dir_all(root).await?;
        let root = root.to_path_buf();
        let dir = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new().prefix(PREFIX).tempdir_in(&root)
        })
        .await
        .map_err(io::Error::other)??;
        debug!("Workspace created: {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the directory on a blocking worker, logging instead of failing
    /// if that is not possible.
    ///
    /// Dropping the workspace without calling this still removes it, inline
    /// on the dropping thread.
    pub async fn close(self) {
        let path = self.dir.path().to_path_buf();
        let dir = self.dir;
        match tokio::task::spawn_blocking(move || dir.close()).await {
            Ok(Ok(())) => debug!("Workspace removed: {}", path.display()),
            Ok(Err(e)) => warn!("Failed to remove workspace {}: {}", path.display(), e),
            Err(e) => warn!("Workspace teardown for {} did not finish: {}", path.display(), e),
        }
    }
}

/// Bundle page files into one zip at `archive`.
///
/// Entries are named `page_<n>.<ext>` and written in page order, so the same
/// pages always produce the same entry list.
pub fn bundle_pages(pages: &[PageArtifact], ext: &str, archive: &Path) -> Result<PathBuf, ToolError> {
    write_zip(pages, ext, archive).map_err(|e| {
        warn!("Archive write failed: {}", e);
        ToolError::OutputNotProduced {
            path: archive.to_path_buf(),
        }
    })?;
    debug!("Bundled {} pages into {}", pages.len(), archive.display());
    crate::adapters::ensure_produced(archive.to_path_buf())
}

fn write_zip(pages: &[PageArtifact], ext: &str, archive: &Path) -> zip::result::ZipResult<()> {
    let mut zip = ZipWriter::new(File::create(archive)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut ordered: Vec<&PageArtifact> = pages.iter().collect();
    ordered.sort_by_key(|p| p.page);

    for page in ordered {
        zip.start_file(format!("page_{}.{ext}", page.page), options)?;
        let mut reader = BufReader::new(File::open(&page.path)?);
        io::copy(&mut reader, &mut zip)?;
    }
    zip.finish()?;
    Ok(())
}

/// Portable file stem: runs of characters outside `[A-Za-z0-9._-]` become `_`.
pub fn sanitize_stem(stem: &str) -> String {
    let cleaned = UNSAFE_NAME_CHARS.replace_all(stem, "_");
    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        "output".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Move `artifact` out of the workspace to `output_dir/file_name`, replacing
/// any existing file. Returns the absolute destination.
pub async fn deliver(artifact: &Path, output_dir: &Path, file_name: &str) -> io::Result<PathBuf> {
    tokio::fs::create_dir_all(output_dir).await?;
    let output_dir = tokio::fs::canonicalize(output_dir).await?;
    let dest = output_dir.join(file_name);

    if tokio::fs::rename(artifact, &dest).await.is_err() {
        // Different filesystems: copy, then let workspace teardown remove the source.
        tokio::fs::copy(artifact, &dest).await?;
    }
    debug!("Delivered {}", dest.display());
    Ok(dest)
}
