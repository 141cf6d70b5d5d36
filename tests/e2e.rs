//! End-to-end tests for docshift.
//!
//! Every fixture is generated in a temp dir. Tests that need libpdfium skip
//! themselves when it cannot be bound; office conversions are exercised with
//! stand-in executables, so LibreOffice is never required.
//!
//! Run with:
//!   PDFIUM_LIB_PATH=/path/to/libpdfium.so cargo test --test e2e -- --nocapture

use docshift::{
    convert, convert_sync, support_matrix, ConversionConfig, ConversionOutcome, ConversionRequest,
    FailureCause, OfficeConverter, Support, ToolError,
};
use futures::future::BoxFuture;
use image::{ImageFormat, Rgb, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Library logs go to the test writer; `RUST_LOG=docshift=debug` to see them.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Temp root holding `out/`, `scratch/` and fixtures.
struct Sandbox {
    root: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        init_tracing();
        Self {
            root: tempfile::tempdir().unwrap(),
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.path().join(name)
    }

    fn config(&self) -> ConversionConfig {
        self.builder().build().unwrap()
    }

    fn builder(&self) -> docshift::ConversionConfigBuilder {
        ConversionConfig::builder()
            .output_dir(self.path("out"))
            .scratch_dir(self.path("scratch"))
    }

    /// No workspace left behind.
    fn assert_scratch_clean(&self) {
        let leftovers: Vec<_> = match std::fs::read_dir(self.path("scratch")) {
            Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
            Err(_) => Vec::new(),
        };
        assert!(leftovers.is_empty(), "workspaces left behind: {leftovers:?}");
    }
}

/// Skip this test unless libpdfium can be bound.
macro_rules! skip_unless_pdfium {
    () => {{
        if let Err(e) = docshift::adapters::pdfium::bind(None) {
            println!("SKIP — {e}");
            println!("       Set PDFIUM_LIB_PATH to run PDF rasterisation tests");
            return;
        }
    }};
}

fn gradient(w: u32, h: u32) -> RgbImage {
    RgbImage::from_fn(w, h, |x, y| Rgb([(x * 7) as u8, (y * 5) as u8, ((x + y) * 3) as u8]))
}

fn write_png(path: &Path, w: u32, h: u32) -> RgbImage {
    let img = gradient(w, h);
    img.save_with_format(path, ImageFormat::Png).unwrap();
    img
}

/// PDF with `pages` Letter pages, each showing its number.
fn write_pdf(path: &Path, pages: usize) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for n in 1..=pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 48.into()]),
                Operation::new("Td", vec![100.into(), 600.into()]),
                Operation::new("Tj", vec![Object::string_literal(format!("Page {n}"))]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

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
    doc.save(path).unwrap();
}

/// Text drawn with `Tj`, per page.
fn pdf_lines(path: &Path) -> Vec<Vec<String>> {
    let doc = Document::load(path).unwrap();
    doc.get_pages()
        .values()
        .map(|&id| {
            let content = Content::decode(&doc.get_page_content(id).unwrap()).unwrap();
            content
                .operations
                .iter()
                .filter(|op| op.operator == "Tj")
                .map(|op| match &op.operands[0] {
                    Object::String(bytes, _) => String::from_utf8_lossy(bytes).into_owned(),
                    other => panic!("unexpected operand {other:?}"),
                })
                .collect()
        })
        .collect()
}

/// One-sheet XLSX with inline strings and numbers.
fn write_xlsx(path: &Path, sheet: &str, rows: &[&[&str]]) {
    let mut zip = zip::ZipWriter::new(std::fs::File::create(path).unwrap());
    let opts = zip::write::SimpleFileOptions::default();

    let parts = [
        (
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#.to_string(),
        ),
        (
            "_rels/.rels",
            r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#.to_string(),
        ),
        (
            "xl/workbook.xml",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="{sheet}" sheetId="1" r:id="rId1"/></sheets></workbook>"#
            ),
        ),
        (
            "xl/_rels/workbook.xml.rels",
            r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#.to_string(),
        ),
    ];
    for (name, body) in parts {
        zip.start_file(name, opts).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }

    let mut data = String::new();
    for (r, row) in rows.iter().enumerate() {
        let rn = r + 1;
        data.push_str(&format!(r#"<row r="{rn}">"#));
        for (c, value) in row.iter().enumerate() {
            let col = (b'A' + c as u8) as char;
            if value.parse::<f64>().is_ok() {
                data.push_str(&format!(r#"<c r="{col}{rn}"><v>{value}</v></c>"#));
            } else {
                data.push_str(&format!(
                    r#"<c r="{col}{rn}" t="inlineStr"><is><t>{value}</t></is></c>"#
                ));
            }
        }
        data.push_str("</row>");
    }
    zip.start_file("xl/worksheets/sheet1.xml", opts).unwrap();
    write!(
        zip,
        r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{data}</sheetData></worksheet>"#
    )
    .unwrap();
    zip.finish().unwrap();
}

fn zip_entries(path: &Path) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(std::fs::File::open(path).unwrap()).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

fn expect_converted(outcome: &ConversionOutcome) -> PathBuf {
    match outcome {
        ConversionOutcome::Converted { output_path } => output_path.clone(),
        ConversionOutcome::Failed { cause, message } => {
            panic!("expected Converted, got [{cause}] {message}")
        }
    }
}

// ── Image conversions ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_png_to_jpeg_keeps_dimensions() {
    let sb = Sandbox::new();
    let input = sb.path("photo.png");
    write_png(&input, 64, 48);

    let outcome = convert(&ConversionRequest::new(&input, "png", "jpeg"), &sb.config()).await;
    let out = expect_converted(&outcome);

    assert!(out.is_absolute());
    assert_eq!(out.file_name().unwrap(), "photo.jpeg");
    let decoded = image::open(&out).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (64, 48));
    assert_eq!(image::ImageFormat::from_path(&out).unwrap(), ImageFormat::Jpeg);
    sb.assert_scratch_clean();
}

#[tokio::test]
async fn test_jpg_and_jpeg_reencode_with_literal_extension() {
    let sb = Sandbox::new();
    let input = sb.path("cat.jpg");
    gradient(30, 20)
        .save_with_format(&input, ImageFormat::Jpeg)
        .unwrap();

    let outcome = convert(&ConversionRequest::new(&input, "jpg", "jpeg"), &sb.config()).await;
    let out = expect_converted(&outcome);
    assert_eq!(out.extension().unwrap(), "jpeg");
    assert_eq!(image::open(&out).unwrap().width(), 30);
}

#[tokio::test]
async fn test_png_bmp_round_trip_is_lossless() {
    let sb = Sandbox::new();
    let input = sb.path("tile.png");
    let original = write_png(&input, 17, 9);
    let config = sb.config();

    let bmp = expect_converted(&convert(&ConversionRequest::new(&input, "png", "bmp"), &config).await);
    let back_cfg = sb.builder().output_dir(sb.path("back")).build().unwrap();
    let png = expect_converted(&convert(&ConversionRequest::new(&bmp, "bmp", "png"), &back_cfg).await);

    let decoded = image::open(&png).unwrap().to_rgb8();
    assert_eq!(decoded, original);
}

#[tokio::test]
async fn test_repeated_request_is_stable() {
    let sb = Sandbox::new();
    let input = sb.path("same.png");
    write_png(&input, 40, 40);
    let req = ConversionRequest::new(&input, "png", "jpg");

    let a = expect_converted(
        &convert(&req, &sb.builder().output_dir(sb.path("a")).build().unwrap()).await,
    );
    let b = expect_converted(
        &convert(&req, &sb.builder().output_dir(sb.path("b")).build().unwrap()).await,
    );

    assert_eq!(
        std::fs::metadata(&a).unwrap().len(),
        std::fs::metadata(&b).unwrap().len()
    );
    assert_eq!(
        image::image_dimensions(&a).unwrap(),
        image::image_dimensions(&b).unwrap()
    );
}

#[tokio::test]
async fn test_corrupt_image_is_decode_failure() {
    let sb = Sandbox::new();
    let input = sb.path("broken.png");
    std::fs::write(&input, b"\x89PNG but not really").unwrap();

    let outcome = convert(&ConversionRequest::new(&input, "png", "gif"), &sb.config()).await;
    assert_eq!(outcome.cause(), Some(FailureCause::DecodeFailed));
    assert!(outcome.message().unwrap().starts_with("Error during png to gif conversion"));
    assert!(!sb.path("out").join("broken.gif").exists());
    sb.assert_scratch_clean();
}

#[tokio::test]
async fn test_image_to_pdf_single_page() {
    let sb = Sandbox::new();
    let input = sb.path("scan.png");
    write_png(&input, 300, 150);

    let config = sb.builder().image_pdf_dpi(150.0).build().unwrap();
    let out = expect_converted(&convert(&ConversionRequest::new(&input, "png", "pdf"), &config).await);

    let doc = Document::load(&out).unwrap();
    let pages = doc.get_pages();
    assert_eq!(pages.len(), 1);
    let page = doc.get_dictionary(pages[&1]).unwrap();
    let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
    assert!((media_box[2].as_float().unwrap() - 144.0).abs() < 0.01);
    assert!((media_box[3].as_float().unwrap() - 72.0).abs() < 0.01);
}

// ── Document conversions ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_txt_to_txt_is_identical_formats() {
    let sb = Sandbox::new();
    let input = sb.path("notes.txt");
    std::fs::write(&input, "hello\n").unwrap();

    let outcome = convert(&ConversionRequest::new(&input, "txt", "TXT"), &sb.config()).await;
    assert_eq!(outcome.cause(), Some(FailureCause::IdenticalFormats));
    assert!(outcome
        .message()
        .unwrap()
        .starts_with(docshift::outcome::IDENTICAL_PREFIX));
    assert!(!sb.path("scratch").exists(), "no workspace for a no-op");
}

#[tokio::test]
async fn test_pptx_to_png_is_unsupported() {
    let sb = Sandbox::new();
    let input = sb.path("slides.pptx");
    std::fs::write(&input, b"PK").unwrap();

    let outcome = convert(&ConversionRequest::new(&input, "pptx", "png"), &sb.config()).await;
    assert_eq!(outcome.cause(), Some(FailureCause::Unsupported));
    assert_eq!(outcome.message(), Some("Unsupported conversion: pptx to png"));
}

#[tokio::test]
async fn test_unknown_tokens_are_unsupported() {
    let sb = Sandbox::new();
    let input = sb.path("vector.svg");
    std::fs::write(&input, b"<svg/>").unwrap();

    for (src, tgt) in [("svg", "png"), ("png", "svg"), ("doc", "pdf")] {
        let outcome = convert(&ConversionRequest::new(&input, src, tgt), &sb.config()).await;
        assert_eq!(outcome.cause(), Some(FailureCause::Unsupported), "{src}->{tgt}");
    }
}

#[tokio::test]
async fn test_txt_to_pdf_one_line_per_line() {
    let sb = Sandbox::new();
    let input = sb.path("poem.txt");
    std::fs::write(&input, "roses are red\r\n\r\nviolets are blue\n").unwrap();

    let out = expect_converted(&convert(&ConversionRequest::from_path(&input, "pdf"), &sb.config()).await);
    assert_eq!(out.file_name().unwrap(), "poem.pdf");
    assert_eq!(
        pdf_lines(&out),
        vec![vec!["roses are red", "", "violets are blue"]]
    );
}

#[tokio::test]
async fn test_xlsx_to_pdf_flattens_rows() {
    let sb = Sandbox::new();
    let input = sb.path("sheet.xlsx");
    let rows: &[&[&str]] = &[&["Name", "Qty"], &["bolts", "40"], &["nuts", "2.5"]];
    write_xlsx(&input, "Stock", rows);

    let out = expect_converted(&convert(&ConversionRequest::new(&input, "xlsx", "pdf"), &sb.config()).await);
    let lines: Vec<String> = pdf_lines(&out).into_iter().flatten().collect();
    assert_eq!(
        lines,
        vec!["Sheet: Stock", "Name | Qty", "bolts | 40", "nuts | 2.5"]
    );
}

// ── PDF → images ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_three_page_pdf_to_png_zip() {
    skip_unless_pdfium!();
    let sb = Sandbox::new();
    let input = sb.path("report.pdf");
    write_pdf(&input, 3);

    let config = sb.builder().raster_dpi(72).build().unwrap();
    let out = expect_converted(&convert(&ConversionRequest::new(&input, "pdf", "png"), &config).await);

    assert_eq!(out.file_name().unwrap(), "report.zip");
    assert_eq!(zip_entries(&out), ["page_1.png", "page_2.png", "page_3.png"]);

    let mut archive = zip::ZipArchive::new(std::fs::File::open(&out).unwrap()).unwrap();
    let mut bytes = Vec::new();
    archive
        .by_name("page_2.png")
        .unwrap()
        .read_to_end(&mut bytes)
        .unwrap();
    let page = image::load_from_memory_with_format(&bytes, ImageFormat::Png).unwrap();
    assert_eq!((page.width(), page.height()), (612, 792));
    sb.assert_scratch_clean();
}

#[tokio::test]
async fn test_pdf_to_jpg_names_entries_by_token() {
    skip_unless_pdfium!();
    let sb = Sandbox::new();
    let input = sb.path("one.pdf");
    write_pdf(&input, 1);

    let config = sb.builder().raster_dpi(72).build().unwrap();
    let out = expect_converted(&convert(&ConversionRequest::new(&input, "pdf", "jpg"), &config).await);
    assert_eq!(zip_entries(&out), ["page_1.jpg"]);
}

#[tokio::test]
async fn test_failed_page_leaves_no_partial_archive() {
    skip_unless_pdfium!();
    let sb = Sandbox::new();
    let input = sb.path("poster.pdf");
    write_pdf(&input, 2);

    // Letter pages at 200 DPI are far beyond the 256 px ICO limit.
    let outcome = convert(&ConversionRequest::new(&input, "pdf", "ico"), &sb.config()).await;
    assert_eq!(outcome.cause(), Some(FailureCause::EncodeFailed), "got {outcome:?}");
    assert!(outcome.message().unwrap().contains("page 1"));
    assert!(!sb.path("out").join("poster.zip").exists());
    sb.assert_scratch_clean();
}

#[tokio::test]
async fn test_zero_page_pdf_is_never_converted() {
    skip_unless_pdfium!();
    let sb = Sandbox::new();
    let input = sb.path("empty.pdf");
    write_pdf(&input, 0);

    let outcome = convert(&ConversionRequest::new(&input, "pdf", "jpg"), &sb.config()).await;
    assert!(!outcome.is_converted());
    assert!(
        matches!(
            outcome.cause(),
            Some(FailureCause::OutputNotProduced) | Some(FailureCause::DecodeFailed)
        ),
        "got {outcome:?}"
    );
    assert!(!sb.path("out").join("empty.zip").exists());
    sb.assert_scratch_clean();
}

#[tokio::test]
async fn test_missing_pdfium_is_tool_not_found() {
    let sb = Sandbox::new();
    let input = sb.path("doc.pdf");
    write_pdf(&input, 1);

    let config = sb
        .builder()
        .pdfium_library("/definitely/not/libpdfium.so")
        .build()
        .unwrap();
    let outcome = convert(&ConversionRequest::new(&input, "pdf", "png"), &config).await;
    assert_eq!(outcome.cause(), Some(FailureCause::ToolNotFound));
    sb.assert_scratch_clean();
}

// ── Office converter ─────────────────────────────────────────────────────────

/// Claims success without writing anything.
struct LyingOffice;

impl OfficeConverter for LyingOffice {
    fn convert<'a>(
        &'a self,
        input: &'a Path,
        out_dir: &'a Path,
        target: &'a str,
    ) -> BoxFuture<'a, Result<PathBuf, ToolError>> {
        Box::pin(async move {
            let stem = input.file_stem().unwrap().to_string_lossy().into_owned();
            Ok(out_dir.join(format!("{stem}.{target}")))
        })
    }
}

#[tokio::test]
async fn test_office_success_without_output_is_output_not_produced() {
    let sb = Sandbox::new();
    let input = sb.path("memo.docx");
    std::fs::write(&input, b"PK").unwrap();

    let config = sb.builder().office_converter(Arc::new(LyingOffice)).build().unwrap();
    let outcome = convert(&ConversionRequest::new(&input, "docx", "pdf"), &config).await;
    assert_eq!(outcome.cause(), Some(FailureCause::OutputNotProduced));
    sb.assert_scratch_clean();
}

#[tokio::test]
async fn test_missing_office_binary_is_tool_not_found() {
    let sb = Sandbox::new();
    let input = sb.path("memo.odt");
    std::fs::write(&input, b"PK").unwrap();

    let config = sb
        .builder()
        .office_binary("/definitely/not/soffice")
        .build()
        .unwrap();
    let outcome = convert(&ConversionRequest::new(&input, "odt", "docx"), &config).await;
    assert_eq!(outcome.cause(), Some(FailureCause::ToolNotFound));
}

#[cfg(unix)]
mod stand_in {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    /// Executable shell script at `dir/name`.
    pub fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    /// Writes `<outdir>/<stem>.<fmt>` like the real converter.
    pub const WORKING: &str = r#"fmt=""; out=""; last=""
while [ $# -gt 0 ]; do
  case "$1" in
    --convert-to) fmt="$2"; shift 2 ;;
    --outdir) out="$2"; shift 2 ;;
    *) last="$1"; shift ;;
  esac
done
base=$(basename "$last")
printf 'converted by stand-in\n' > "$out/${base%.*}.$fmt""#;
}

#[cfg(unix)]
#[tokio::test]
async fn test_docx_to_odt_through_office_binary() {
    let sb = Sandbox::new();
    let bin = stand_in::script(sb.root.path(), "soffice", stand_in::WORKING);
    let input = sb.path("letter.docx");
    std::fs::write(&input, b"PK").unwrap();

    let config = sb.builder().office_binary(&bin).build().unwrap();
    let out = expect_converted(&convert(&ConversionRequest::new(&input, "docx", "odt"), &config).await);
    assert_eq!(out.file_name().unwrap(), "letter.odt");
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "converted by stand-in\n");
    sb.assert_scratch_clean();
}

#[cfg(unix)]
#[tokio::test]
async fn test_hung_office_binary_times_out() {
    let sb = Sandbox::new();
    let bin = stand_in::script(sb.root.path(), "soffice", "exec sleep 30");
    let input = sb.path("deck.pptx");
    std::fs::write(&input, b"PK").unwrap();

    let config = sb
        .builder()
        .office_binary(&bin)
        .office_timeout_secs(1)
        .build()
        .unwrap();
    let started = std::time::Instant::now();
    let outcome = convert(&ConversionRequest::new(&input, "pptx", "pdf"), &config).await;

    assert_eq!(outcome.cause(), Some(FailureCause::ToolTimeout));
    assert!(started.elapsed() < std::time::Duration::from_secs(10));
    sb.assert_scratch_clean();
}

#[cfg(unix)]
#[tokio::test]
async fn test_timeout_kills_helpers_forked_by_office_binary() {
    let sb = Sandbox::new();
    let marker = sb.path("late-write");
    let body = format!(
        "( sleep 2; touch '{}' ) &\nexec sleep 30",
        marker.display()
    );
    let bin = stand_in::script(sb.root.path(), "soffice", &body);
    let input = sb.path("deck.pptx");
    std::fs::write(&input, b"PK").unwrap();

    let config = sb
        .builder()
        .office_binary(&bin)
        .office_timeout_secs(1)
        .build()
        .unwrap();
    let outcome = convert(&ConversionRequest::new(&input, "pptx", "pdf"), &config).await;
    assert_eq!(outcome.cause(), Some(FailureCause::ToolTimeout));

    tokio::time::sleep(std::time::Duration::from_secs(3)).await;
    assert!(!marker.exists(), "forked helper outlived the timeout");
    sb.assert_scratch_clean();
}

#[cfg(unix)]
#[tokio::test]
async fn test_failing_office_binary_is_non_zero_exit() {
    let sb = Sandbox::new();
    let bin = stand_in::script(
        sb.root.path(),
        "soffice",
        "echo 'Error: source file could not be loaded' >&2\nexit 3",
    );
    let input = sb.path("report.odt");
    std::fs::write(&input, b"PK").unwrap();

    let config = sb.builder().office_binary(&bin).build().unwrap();
    let outcome = convert(&ConversionRequest::new(&input, "odt", "pdf"), &config).await;

    assert_eq!(outcome.cause(), Some(FailureCause::ToolNonZeroExit));
    let msg = outcome.message().unwrap();
    assert!(msg.contains("exit code 3"), "got: {msg}");
    assert!(msg.contains("could not be loaded"), "got: {msg}");
}

#[cfg(unix)]
#[tokio::test]
async fn test_silent_office_binary_is_output_not_produced() {
    let sb = Sandbox::new();
    let bin = stand_in::script(sb.root.path(), "soffice", "exit 0");
    let input = sb.path("report.docx");
    std::fs::write(&input, b"PK").unwrap();

    let config = sb.builder().office_binary(&bin).build().unwrap();
    let outcome = convert(&ConversionRequest::new(&input, "docx", "txt"), &config).await;
    assert_eq!(outcome.cause(), Some(FailureCause::OutputNotProduced));
}

// ── Concurrency and API surface ──────────────────────────────────────────────

#[tokio::test]
async fn test_same_file_name_concurrently_does_not_collide() {
    let sb = Sandbox::new();
    std::fs::create_dir_all(sb.path("a")).unwrap();
    std::fs::create_dir_all(sb.path("b")).unwrap();
    let first = sb.path("a/img.png");
    let second = sb.path("b/img.png");
    write_png(&first, 10, 10);
    write_png(&second, 20, 20);

    let cfg_a = sb.builder().output_dir(sb.path("out_a")).build().unwrap();
    let cfg_b = sb.builder().output_dir(sb.path("out_b")).build().unwrap();
    let req_a = ConversionRequest::new(&first, "png", "bmp");
    let req_b = ConversionRequest::new(&second, "png", "bmp");

    let (a, b) = tokio::join!(convert(&req_a, &cfg_a), convert(&req_b, &cfg_b));
    assert_eq!(image::image_dimensions(expect_converted(&a)).unwrap(), (10, 10));
    assert_eq!(image::image_dimensions(expect_converted(&b)).unwrap(), (20, 20));
    sb.assert_scratch_clean();
}

#[test]
fn test_convert_sync_outside_runtime() {
    let sb = Sandbox::new();
    let input = sb.path("s.png");
    write_png(&input, 8, 8);

    let outcome = convert_sync(&ConversionRequest::new(&input, "png", "tiff"), &sb.config());
    let out = expect_converted(&outcome);
    assert_eq!(image::image_dimensions(out).unwrap(), (8, 8));
}

#[test]
fn test_support_matrix_covers_every_pair() {
    let cells = support_matrix();
    let n = docshift::KNOWN_FORMATS.len();
    assert_eq!(cells.len(), n * n);

    let identical = cells.iter().filter(|c| c.support == Support::Identical).count();
    assert_eq!(identical, n);

    let lookup = |s: &str, t: &str| {
        cells
            .iter()
            .find(|c| c.source.as_str() == s && c.target.as_str() == t)
            .unwrap()
            .support
            .code()
    };
    assert_eq!(lookup("pptx", "png"), 'N');
    assert_eq!(lookup("pptx", "pdf"), 'S');
    assert_eq!(lookup("jpg", "jpeg"), 'S');
    assert_eq!(lookup("pdf", "pdf"), '#');
    assert_eq!(lookup("xlsx", "docx"), 'N');
}

#[test]
fn test_outcome_json_is_tagged() {
    let out = ConversionOutcome::Failed {
        cause: FailureCause::ToolTimeout,
        message: "Error during docx to pdf conversion: soffice did not finish within 120s".into(),
    };
    let json = serde_json::to_string(&out).unwrap();
    assert!(json.contains(r#""status":"failed""#));
    assert!(json.contains(r#""cause":"tool_timeout""#));
}
