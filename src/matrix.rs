//! Compatibility matrix: (source family, target family) → strategy.
//!
//! The legal pairs live in one static table. Anything absent is unsupported;
//! there is no chaining through an intermediate format.

use crate::format::{FormatFamily, FormatToken, KNOWN_FORMATS};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Conversion algorithm selected for a family pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    ImageToImage,
    ImageToPdf,
    DocumentToPdf,
    DocumentToDocument,
    PdfToImages,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::ImageToImage => "image→image",
            Strategy::ImageToPdf => "image→pdf",
            Strategy::DocumentToPdf => "document→pdf",
            Strategy::DocumentToDocument => "document→document",
            Strategy::PdfToImages => "pdf→images",
        };
        f.write_str(name)
    }
}

use FormatFamily::*;

const TABLE: &[(FormatFamily, FormatFamily, Strategy)] = &[
    (Image, Image, Strategy::ImageToImage),
    (Image, Pdf, Strategy::ImageToPdf),
    (Document, Pdf, Strategy::DocumentToPdf),
    (Spreadsheet, Pdf, Strategy::DocumentToPdf),
    (Presentation, Pdf, Strategy::DocumentToPdf),
    (Document, Document, Strategy::DocumentToDocument),
    (Spreadsheet, Spreadsheet, Strategy::DocumentToDocument),
    (Presentation, Presentation, Strategy::DocumentToDocument),
    (Pdf, Image, Strategy::PdfToImages),
];

/// Look up the strategy for a family pair. `None` means unsupported.
pub fn resolve(source: FormatFamily, target: FormatFamily) -> Option<Strategy> {
    TABLE
        .iter()
        .find(|(s, t, _)| *s == source && *t == target)
        .map(|(_, _, strategy)| *strategy)
}

/// Verdict for one token pair in [`support_matrix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "strategy", rename_all = "snake_case")]
pub enum Support {
    Identical,
    Supported(Strategy),
    Unsupported,
}

impl Support {
    /// One-letter code: `#` identical, `S` supported, `N` not supported.
    pub fn code(&self) -> char {
        match self {
            Support::Identical => '#',
            Support::Supported(_) => 'S',
            Support::Unsupported => 'N',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixCell {
    pub source: FormatToken,
    pub target: FormatToken,
    pub support: Support,
}

/// Verdict for a token pair, applying the identical-token check first.
pub fn support_for(source: &FormatToken, target: &FormatToken) -> Support {
    if source == target {
        return Support::Identical;
    }
    match (source.family(), target.family()) {
        (Ok(s), Ok(t)) => resolve(s, t).map_or(Support::Unsupported, Support::Supported),
        _ => Support::Unsupported,
    }
}

/// Every pair over the known tokens, row-major in [`KNOWN_FORMATS`] order.
pub fn support_matrix() -> Vec<MatrixCell> {
    let mut cells = Vec::with_capacity(KNOWN_FORMATS.len() * KNOWN_FORMATS.len());
    for (src, _) in KNOWN_FORMATS {
        for (tgt, _) in KNOWN_FORMATS {
            let source = FormatToken::new(src);
            let target = FormatToken::new(tgt);
            let support = support_for(&source, &target);
            cells.push(MatrixCell {
                source,
                target,
                support,
            });
        }
    }
    cells
}
