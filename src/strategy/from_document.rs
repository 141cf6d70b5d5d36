use super::{via_office, StrategyContext};
use crate::adapters::{self, pdf_writer};
use crate::error::ToolError;
use calamine::{open_workbook_auto, Data, Reader};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Plain text and spreadsheets are laid out by the built-in writer; every
/// other office format goes through the office converter.
pub(super) async fn to_pdf(ctx: &StrategyContext<'_>) -> Result<PathBuf, ToolError> {
    let input = ctx.request.input().to_path_buf();
    let output = ctx.workspace.join("converted.pdf");

    match ctx.request.source().as_str() {
        "txt" => {
            adapters::blocking(pdf_writer::TOOL, move || {
                let lines = text_lines(&input)?;
                pdf_writer::write_text_pdf(&lines, &output)?;
                adapters::ensure_produced(output)
            })
            .await
        }
        "xlsx" => {
            adapters::blocking("calamine", move || {
                let lines = sheet_lines(&input)?;
                pdf_writer::write_text_pdf(&lines, &output)?;
                adapters::ensure_produced(output)
            })
            .await
        }
        _ => via_office(ctx, "pdf").await,
    }
}

pub(super) async fn to_document(ctx: &StrategyContext<'_>) -> Result<PathBuf, ToolError> {
    via_office(ctx, ctx.request.target().as_str()).await
}

/// Logical lines of a text file. Invalid UTF-8 is replaced, not rejected.
fn text_lines(path: &Path) -> Result<Vec<String>, ToolError> {
    let bytes = std::fs::read(path)
        .map_err(|e| ToolError::DecodeFailed(format!("{}: {e}", path.display())))?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(text.lines().map(str::to_string).collect())
}

/// `Sheet: <name>` followed by one `a | b | c` line per row, for every sheet
/// in workbook order.
fn sheet_lines(path: &Path) -> Result<Vec<String>, ToolError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| ToolError::DecodeFailed(format!("{}: {e}", path.display())))?;

    let mut lines = Vec::new();
    for name in workbook.sheet_names().to_vec() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| ToolError::DecodeFailed(format!("sheet '{name}': {e}")))?;
        lines.push(format!("Sheet: {name}"));
        for row in range.rows() {
            let cells: Vec<String> = row.iter().map(cell_text).collect();
            lines.push(cells.join(" | "));
        }
        debug!("Flattened sheet '{}' ({} rows)", name, range.height());
    }
    Ok(lines)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::Error(e) => format!("#ERR:{e:?}"),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}
