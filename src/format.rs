//! Format tokens and the families they belong to.
//!
//! A [`FormatToken`] is the caller's declared format, case-folded. It keeps
//! the literal spelling (`jpg` stays `jpg`) because the output file name uses
//! it; [`FormatToken::canonical`] collapses synonyms when the encoding is what
//! matters.

use image::ImageFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Coarse category of a format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatFamily {
    Image,
    Pdf,
    Document,
    Spreadsheet,
    Presentation,
}

/// Every token the engine understands, in display order.
pub const KNOWN_FORMATS: &[(&str, FormatFamily)] = &[
    ("png", FormatFamily::Image),
    ("jpeg", FormatFamily::Image),
    ("jpg", FormatFamily::Image),
    ("bmp", FormatFamily::Image),
    ("tiff", FormatFamily::Image),
    ("gif", FormatFamily::Image),
    ("webp", FormatFamily::Image),
    ("ico", FormatFamily::Image),
    ("docx", FormatFamily::Document),
    ("odt", FormatFamily::Document),
    ("txt", FormatFamily::Document),
    ("xlsx", FormatFamily::Spreadsheet),
    ("pptx", FormatFamily::Presentation),
    ("pdf", FormatFamily::Pdf),
];

/// The token is not in [`KNOWN_FORMATS`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown format '{0}'")]
pub struct InvalidFormat(pub String);

/// Classify a raw token (case-insensitive).
pub fn classify(token: &str) -> Result<FormatFamily, InvalidFormat> {
    let folded = token.trim().to_ascii_lowercase();
    KNOWN_FORMATS
        .iter()
        .find(|(name, _)| *name == folded)
        .map(|(_, family)| *family)
        .ok_or(InvalidFormat(folded))
}

/// A case-folded format token.
///
/// Deserialising goes through [`FormatToken::new`], so tokens read from JSON
/// are folded the same way as tokens built in code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct FormatToken(String);

impl FormatToken {
    /// Fold case and strip whitespace and a leading dot (`".PNG"` → `"png"`).
    pub fn new(raw: impl AsRef<str>) -> Self {
        let folded = raw.as_ref().trim().trim_start_matches('.').to_ascii_lowercase();
        Self(folded)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn family(&self) -> Result<FormatFamily, InvalidFormat> {
        classify(&self.0)
    }

    /// Synonym-collapsed name (`jpg` → `jpeg`).
    pub fn canonical(&self) -> &str {
        match self.0.as_str() {
            "jpg" => "jpeg",
            other => other,
        }
    }

    /// File extension for outputs. This is the literal token.
    pub fn extension(&self) -> &str {
        &self.0
    }

    /// Encoder selected by this token, for image-family tokens only.
    ///
    /// The encoder name differs from the extension for `jpg`, which selects
    /// the JPEG encoder.
    pub fn image_format(&self) -> Option<ImageFormat> {
        match self.canonical() {
            "png" => Some(ImageFormat::Png),
            "jpeg" => Some(ImageFormat::Jpeg),
            "bmp" => Some(ImageFormat::Bmp),
            "tiff" => Some(ImageFormat::Tiff),
            "gif" => Some(ImageFormat::Gif),
            "webp" => Some(ImageFormat::WebP),
            "ico" => Some(ImageFormat::Ico),
            _ => None,
        }
    }
}

impl fmt::Display for FormatToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FormatToken {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for FormatToken {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<FormatToken> for String {
    fn from(token: FormatToken) -> Self {
        token.0
    }
}
