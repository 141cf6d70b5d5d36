//! Progress-callback trait for conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`]. Most
//! conversions are a single step, so the only per-item event is
//! [`ConversionProgressCallback::on_page_rendered`] from PDF rasterisation.
//!
//! # Example
//!
//! ```rust
//! use docshift::{ConversionConfig, ConversionProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct PageCounter(AtomicUsize);
//!
//! impl ConversionProgressCallback for PageCounter {
//!     fn on_page_rendered(&self, _page: usize, _total: usize) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(Arc::new(PageCounter(AtomicUsize::new(0))))
//!     .build()
//!     .unwrap();
//! ```

use crate::format::FormatToken;
use crate::outcome::ConversionOutcome;
use std::sync::Arc;

/// Called by the engine as a conversion advances.
///
/// Implementations must be `Send + Sync`: rasterisation runs on a blocking
/// worker thread and several conversions may share one callback.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once routing has resolved a strategy, before the workspace
    /// exists. Rejected requests (identical or unsupported) skip it and only
    /// see [`on_conversion_complete`](Self::on_conversion_complete).
    fn on_conversion_start(&self, source: &FormatToken, target: &FormatToken) {
        let _ = (source, target);
    }

    /// Called after each PDF page is rasterised and saved (1-indexed).
    fn on_page_rendered(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called once with the final outcome, after the workspace is gone.
    fn on_conversion_complete(&self, outcome: &ConversionOutcome) {
        let _ = outcome;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
