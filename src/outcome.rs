//! Request and outcome values, plus the fixed message templates.
//!
//! Callers that only need the category match on [`FailureCause`]; callers
//! that match on text can rely on the prefixes [`IDENTICAL_PREFIX`],
//! [`UNSUPPORTED_PREFIX`] and [`FAILED_PREFIX`].

use crate::error::{DocshiftError, FailureCause, ToolError};
use crate::format::FormatToken;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const IDENTICAL_PREFIX: &str = "Source and target formats are the same";
pub const UNSUPPORTED_PREFIX: &str = "Unsupported conversion:";
pub const FAILED_PREFIX: &str = "Error during";

/// One conversion to perform. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    input: PathBuf,
    source: FormatToken,
    target: FormatToken,
}

impl ConversionRequest {
    pub fn new(
        input: impl Into<PathBuf>,
        source: impl Into<FormatToken>,
        target: impl Into<FormatToken>,
    ) -> Self {
        Self {
            input: input.into(),
            source: source.into(),
            target: target.into(),
        }
    }

    /// Build a request whose source token is the input's file extension.
    /// A file without an extension gets an empty token, which never classifies.
    pub fn from_path(input: impl Into<PathBuf>, target: impl Into<FormatToken>) -> Self {
        let input = input.into();
        let source = input
            .extension()
            .and_then(|e| e.to_str())
            .map(FormatToken::new)
            .unwrap_or_else(|| FormatToken::new(""));
        Self {
            input,
            source,
            target: target.into(),
        }
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn source(&self) -> &FormatToken {
        &self.source
    }

    pub fn target(&self) -> &FormatToken {
        &self.target
    }

    /// Input file name without extension, used to name the deliverable.
    pub fn input_stem(&self) -> String {
        self.input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Result of one conversion. Exactly one variant holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConversionOutcome {
    Converted { output_path: PathBuf },
    Failed { cause: FailureCause, message: String },
}

impl ConversionOutcome {
    pub fn is_converted(&self) -> bool {
        matches!(self, ConversionOutcome::Converted { .. })
    }

    pub fn output_path(&self) -> Option<&Path> {
        match self {
            ConversionOutcome::Converted { output_path } => Some(output_path),
            ConversionOutcome::Failed { .. } => None,
        }
    }

    pub fn cause(&self) -> Option<FailureCause> {
        match self {
            ConversionOutcome::Converted { .. } => None,
            ConversionOutcome::Failed { cause, .. } => Some(*cause),
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            ConversionOutcome::Converted { .. } => None,
            ConversionOutcome::Failed { message, .. } => Some(message),
        }
    }

    /// Convert into a `Result` for callers that want `?`.
    pub fn into_result(self) -> Result<PathBuf, DocshiftError> {
        match self {
            ConversionOutcome::Converted { output_path } => Ok(output_path),
            ConversionOutcome::Failed { cause, message } => {
                Err(DocshiftError::ConversionFailed { cause, message })
            }
        }
    }
}

// ── Reporter ─────────────────────────────────────────────────────────────

pub(crate) fn identical(request: &ConversionRequest) -> ConversionOutcome {
    ConversionOutcome::Failed {
        cause: FailureCause::IdenticalFormats,
        message: format!(
            "{IDENTICAL_PREFIX} ({}). No conversion needed.",
            request.source()
        ),
    }
}

pub(crate) fn unsupported(request: &ConversionRequest) -> ConversionOutcome {
    ConversionOutcome::Failed {
        cause: FailureCause::Unsupported,
        message: format!(
            "{UNSUPPORTED_PREFIX} {} to {}",
            request.source(),
            request.target()
        ),
    }
}

pub(crate) fn failed(request: &ConversionRequest, err: &ToolError) -> ConversionOutcome {
    failed_with(request, err.cause(), &err.to_string())
}

pub(crate) fn failed_with(
    request: &ConversionRequest,
    cause: FailureCause,
    detail: &str,
) -> ConversionOutcome {
    if cause == FailureCause::Unsupported {
        return ConversionOutcome::Failed {
            cause,
            message: format!(
                "{UNSUPPORTED_PREFIX} {} to {} ({detail})",
                request.source(),
                request.target()
            ),
        };
    }
    ConversionOutcome::Failed {
        cause,
        message: format!(
            "{FAILED_PREFIX} {} to {} conversion: {detail}",
            request.source(),
            request.target()
        ),
    }
}
