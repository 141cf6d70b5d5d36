//! Error types for the docshift library.
//!
//! Three types cover three layers:
//!
//! * [`ToolError`] — what an adapter reports when the tool or library it wraps
//!   fails (process missing, hung, exited non-zero, wrote nothing, could not
//!   decode/encode). Adapters classify into this set; the raw tool text only
//!   ever travels as the `detail` string.
//!
//! * [`FailureCause`] — the stable, caller-facing tag carried by
//!   [`crate::outcome::ConversionOutcome::Failed`]. Callers pattern-match on it.
//!
//! * [`DocshiftError`] — ordinary `Err` values for the parts of the API that
//!   are allowed to fail the Rust way: config validation and
//!   [`crate::outcome::ConversionOutcome::into_result`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Caller-facing failure category of a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCause {
    /// Source and target tokens are the same; nothing to do.
    IdenticalFormats,
    /// No matrix entry for the pair (or a token is unknown).
    Unsupported,
    /// The external tool or native library could not be located.
    ToolNotFound,
    /// The external tool did not finish within its time bound.
    ToolTimeout,
    /// The external tool exited unsuccessfully (or crashed).
    ToolNonZeroExit,
    /// The tool reported success but the expected output is missing.
    OutputNotProduced,
    /// The source could not be read or decoded.
    DecodeFailed,
    /// The target encoder rejected the data.
    EncodeFailed,
}

impl FailureCause {
    /// Stable snake_case name, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureCause::IdenticalFormats => "identical_formats",
            FailureCause::Unsupported => "unsupported",
            FailureCause::ToolNotFound => "tool_not_found",
            FailureCause::ToolTimeout => "tool_timeout",
            FailureCause::ToolNonZeroExit => "tool_non_zero_exit",
            FailureCause::OutputNotProduced => "output_not_produced",
            FailureCause::DecodeFailed => "decode_failed",
            FailureCause::EncodeFailed => "encode_failed",
        }
    }
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by an external tool adapter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ToolError {
    /// Executable or shared library is missing.
    #[error("{tool} not found: {detail}")]
    NotFound { tool: String, detail: String },

    /// Bounded wait expired; the process was killed.
    #[error("{tool} did not finish within {secs}s")]
    Timeout { tool: String, secs: u64 },

    /// Process exited unsuccessfully. `code` is `None` when it was killed by a
    /// signal or when an in-process worker panicked.
    #[error("{tool} failed (exit code {}): {detail}", code.map(|c| c.to_string()).unwrap_or_else(|| "none".into()))]
    NonZeroExit {
        tool: String,
        code: Option<i32>,
        detail: String,
    },

    /// The tool claimed success, but nothing was written at `path`.
    #[error("expected output was not produced at '{}'", path.display())]
    OutputNotProduced { path: PathBuf },

    /// The tool cannot handle the requested format.
    #[error("{tool} does not support '{format}'")]
    UnsupportedByTool { tool: String, format: String },

    /// Source could not be read or decoded.
    #[error("decode failed: {0}")]
    DecodeFailed(String),

    /// Target encoder rejected the data.
    #[error("encode failed: {0}")]
    EncodeFailed(String),
}

impl ToolError {
    /// Map the adapter failure onto the caller-facing taxonomy.
    pub fn cause(&self) -> FailureCause {
        match self {
            ToolError::NotFound { .. } => FailureCause::ToolNotFound,
            ToolError::Timeout { .. } => FailureCause::ToolTimeout,
            ToolError::NonZeroExit { .. } => FailureCause::ToolNonZeroExit,
            ToolError::OutputNotProduced { .. } => FailureCause::OutputNotProduced,
            ToolError::UnsupportedByTool { .. } => FailureCause::Unsupported,
            ToolError::DecodeFailed(_) => FailureCause::DecodeFailed,
            ToolError::EncodeFailed(_) => FailureCause::EncodeFailed,
        }
    }

    /// A blocking worker panicked or was cancelled.
    pub(crate) fn worker_crashed(tool: &str, err: tokio::task::JoinError) -> Self {
        ToolError::NonZeroExit {
            tool: tool.to_string(),
            code: None,
            detail: format!("worker task aborted: {err}"),
        }
    }
}

/// Errors returned through `Result` by the docshift library.
#[derive(Debug, Error)]
pub enum DocshiftError {
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A conversion finished with a `Failed` outcome.
    #[error("[{cause}] {message}")]
    ConversionFailed { cause: FailureCause, message: String },
}
