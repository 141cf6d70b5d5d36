//! Minimal PDF writer built on `lopdf`.
//!
//! Two page kinds are produced:
//!
//! * **Text pages** — one visual line per logical line in 12 pt Helvetica on
//!   A4, no wrapping or reflow. Lines that do not fit horizontally are clipped
//!   by the page edge. A new page starts when the current one is full.
//! * **Image page** — a single page sized to the image at a fixed pixels per
//!   inch, with the RGB pixels embedded as a Flate-compressed XObject.
//!
//! Helvetica is one of the standard 14 fonts, so nothing is embedded; text is
//! written with WinAnsiEncoding and characters outside Latin-1 become `?`.

use crate::error::ToolError;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::RgbImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use std::io::Write;
use std::path::Path;
use tracing::debug;

pub const TOOL: &str = "pdf-writer";

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 50.0;
const FONT_SIZE: f32 = 12.0;
const LINE_HEIGHT: f32 = 14.0;

/// Lines that fit on one text page.
pub fn lines_per_page() -> usize {
    ((PAGE_HEIGHT - 2.0 * MARGIN) / LINE_HEIGHT).floor() as usize
}

/// Lay out `lines` onto A4 pages and save to `output`.
///
/// An empty input still yields one blank page.
pub fn write_text_pdf(lines: &[String], output: &Path) -> Result<(), ToolError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let per_page = lines_per_page();
    let mut kids: Vec<Object> = Vec::new();
    let chunks: Vec<&[String]> = if lines.is_empty() {
        vec![&[]]
    } else {
        lines.chunks(per_page).collect()
    };

    for chunk in chunks {
        let content = text_page_content(chunk);
        let bytes = content.encode().map_err(encode_err)?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, bytes));
        let page_id = add_page(&mut doc, pages_id, content_id, resources_id, PAGE_WIDTH, PAGE_HEIGHT);
        kids.push(page_id.into());
    }

    finish(&mut doc, pages_id, kids, output)?;
    debug!("Wrote text PDF {} ({} lines)", output.display(), lines.len());
    Ok(())
}

/// Write `img` as a single page at `ppi` pixels per inch.
pub fn write_image_pdf(img: &RgbImage, ppi: f32, output: &Path) -> Result<(), ToolError> {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return Err(ToolError::EncodeFailed("image has zero size".into()));
    }
    let page_w = w as f32 * 72.0 / ppi;
    let page_h = h as f32 * 72.0 / ppi;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(img.as_raw())
        .and_then(|_| encoder.flush())
        .map_err(|e| ToolError::EncodeFailed(format!("compress pixels: {e}")))?;
    let pixels = encoder
        .finish()
        .map_err(|e| ToolError::EncodeFailed(format!("compress pixels: {e}")))?;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => w as i64,
            "Height" => h as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        },
        pixels,
    ));
    let resources_id = doc.add_object(dictionary! {
        "XObject" => dictionary! { "Im0" => image_id },
    });

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![page_w.into(), 0.into(), 0.into(), page_h.into(), 0.into(), 0.into()],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let bytes = content.encode().map_err(encode_err)?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, bytes));
    let page_id = add_page(&mut doc, pages_id, content_id, resources_id, page_w, page_h);

    finish(&mut doc, pages_id, vec![page_id.into()], output)?;
    debug!(
        "Wrote image PDF {} ({}x{} px → {:.1}x{:.1} pt)",
        output.display(),
        w,
        h,
        page_w,
        page_h
    );
    Ok(())
}

fn text_page_content(lines: &[String]) -> Content {
    let mut ops = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]),
        Operation::new("TL", vec![LINE_HEIGHT.into()]),
        Operation::new(
            "Td",
            vec![MARGIN.into(), (PAGE_HEIGHT - MARGIN - FONT_SIZE).into()],
        ),
    ];
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            ops.push(Operation::new("T*", vec![]));
        }
        ops.push(Operation::new(
            "Tj",
            vec![Object::string_literal(to_win_ansi(line))],
        ));
    }
    ops.push(Operation::new("ET", vec![]));
    Content { operations: ops }
}

fn add_page(
    doc: &mut Document,
    pages_id: ObjectId,
    content_id: ObjectId,
    resources_id: ObjectId,
    width: f32,
    height: f32,
) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
        "Contents" => content_id,
        "Resources" => resources_id,
    })
}

fn finish(
    doc: &mut Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
    output: &Path,
) -> Result<(), ToolError> {
    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();
    doc.save(output)
        .map_err(|e| ToolError::EncodeFailed(format!("write {}: {e}", output.display())))?;
    Ok(())
}

fn encode_err(e: lopdf::Error) -> ToolError {
    ToolError::EncodeFailed(format!("PDF content stream: {e}"))
}

/// Latin-1 bytes for the WinAnsi font; everything else becomes `?`.
fn to_win_ansi(line: &str) -> Vec<u8> {
    line.chars()
        .filter(|c| *c != '\r' && *c != '\n')
        .map(|c| match c {
            '\t' => b' ',
            c if (c as u32) < 0x20 => b' ',
            c if (c as u32) <= 0xFF => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}
