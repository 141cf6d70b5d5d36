//! Configuration for document conversion.
//!
//! All behaviour is controlled through [`ConversionConfig`], built via its
//! [`ConversionConfigBuilder`]. One config is typically shared by many
//! concurrent conversions; nothing in it is mutated during a conversion.

use crate::adapters::office::OfficeConverter;
use crate::error::DocshiftError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Configuration for a conversion.
///
/// # Example
/// ```rust
/// use docshift::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .output_dir("/srv/converted")
///     .raster_dpi(150)
///     .office_timeout_secs(60)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Directory that receives finished deliverables. Default: `./converted`.
    pub output_dir: PathBuf,

    /// Parent directory for per-conversion workspaces. Default: the system temp dir.
    pub scratch_dir: PathBuf,

    /// DPI used when rasterising PDF pages. Range: 72–600. Default: 200.
    pub raster_dpi: u32,

    /// Cap on the longest edge of a rasterised page, in pixels. Default: 4000.
    ///
    /// A 200-DPI render of an A0 poster would otherwise allocate hundreds of
    /// megabytes per page.
    pub max_rendered_pixels: u32,

    /// Pixels per inch assumed when an image becomes a PDF page. Default: 100.
    pub image_pdf_dpi: f32,

    /// Office converter executable. Default: `soffice`.
    pub office_binary: PathBuf,

    /// Hard bound on one office-converter run, in seconds. Default: 120.
    ///
    /// Office suites can block forever on a lock file left by a crashed
    /// instance; the process is killed when this expires.
    pub office_timeout_secs: u64,

    /// Give every office run its own user profile inside the workspace. Default: true.
    pub isolated_office_profile: bool,

    /// Explicit libpdfium path. When `None`, `PDFIUM_LIB_PATH` is consulted,
    /// then the system library search path.
    pub pdfium_library: Option<PathBuf>,

    /// Pre-constructed office converter. Takes precedence over `office_binary`.
    pub office_converter: Option<Arc<dyn OfficeConverter>>,

    /// Optional progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("converted"),
            scratch_dir: std::env::temp_dir(),
            raster_dpi: 200,
            max_rendered_pixels: 4000,
            image_pdf_dpi: 100.0,
            office_binary: PathBuf::from("soffice"),
            office_timeout_secs: 120,
            isolated_office_profile: true,
            pdfium_library: None,
            office_converter: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("output_dir", &self.output_dir)
            .field("scratch_dir", &self.scratch_dir)
            .field("raster_dpi", &self.raster_dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("image_pdf_dpi", &self.image_pdf_dpi)
            .field("office_binary", &self.office_binary)
            .field("office_timeout_secs", &self.office_timeout_secs)
            .field("isolated_office_profile", &self.isolated_office_profile)
            .field("pdfium_library", &self.pdfium_library)
            .field(
                "office_converter",
                &self.office_converter.as_ref().map(|_| "<dyn OfficeConverter>"),
            )
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    pub fn office_timeout(&self) -> Duration {
        Duration::from_secs(self.office_timeout_secs)
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.scratch_dir = dir.into();
        self
    }

    pub fn raster_dpi(mut self, dpi: u32) -> Self {
        self.config.raster_dpi = dpi.clamp(72, 600);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn image_pdf_dpi(mut self, dpi: f32) -> Self {
        self.config.image_pdf_dpi = dpi;
        self
    }

    pub fn office_binary(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.office_binary = path.into();
        self
    }

    pub fn office_timeout_secs(mut self, secs: u64) -> Self {
        self.config.office_timeout_secs = secs.max(1);
        self
    }

    pub fn isolated_office_profile(mut self, v: bool) -> Self {
        self.config.isolated_office_profile = v;
        self
    }

    pub fn pdfium_library(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library = Some(path.into());
        self
    }

    pub fn office_converter(mut self, converter: Arc<dyn OfficeConverter>) -> Self {
        self.config.office_converter = Some(converter);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, DocshiftError> {
        let c = &self.config;
        if !(c.image_pdf_dpi.is_finite() && c.image_pdf_dpi > 0.0) {
            return Err(DocshiftError::InvalidConfig(format!(
                "image_pdf_dpi must be a positive number, got {}",
                c.image_pdf_dpi
            )));
        }
        if c.output_dir.as_os_str().is_empty() {
            return Err(DocshiftError::InvalidConfig(
                "output_dir must not be empty".into(),
            ));
        }
        if c.office_binary.as_os_str().is_empty() {
            return Err(DocshiftError::InvalidConfig(
                "office_binary must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
