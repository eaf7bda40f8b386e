use calamine::{open_workbook_auto, DataType, Reader};
use rust_xlsxwriter::{Color, Format, Workbook, Worksheet, XlsxError};
use std::path::{Path, PathBuf};

use crate::error::ExportError;
use crate::types::ScanRow;

pub const EXPORT_FILE_NAME: &str = "groundnut_dispatch_scans.xlsx";
pub const EXPORT_SHEET_NAME: &str = "QR-Data";

/// Outcome of `export_rows`. An empty row log is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Written { path: PathBuf, rows: usize },
    NothingToExport,
}

/// Column keys across all rows, in order of first occurrence.
pub fn export_columns(rows: &[ScanRow]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for row in rows {
        for column in row.columns() {
            if !columns.iter().any(|c| c == column) {
                columns.push(column.to_string());
            }
        }
    }
    columns
}

/// Remove characters that can corrupt the sheet XML. Keeps tab, newline and CR.
fn sanitize_cell(s: &str) -> String {
    s.chars()
        .filter(|&c| {
            let u = c as u32;
            c == '\t' || c == '\n' || c == '\r' || !(u < 0x20 || u == 0x7F || u == 0xFFFE || u == 0xFFFF)
        })
        .collect()
}

/// Estimate column width from text length (char count × 1.2, clamped 10–50).
fn estimate_text_width(text: &str) -> f64 {
    let w = text.chars().count() as f64 * 1.2;
    w.clamp(10.0, 50.0)
}

fn calculate_column_widths(columns: &[String], rows: &[ScanRow]) -> Vec<f64> {
    columns
        .iter()
        .map(|column| {
            rows.iter()
                .filter_map(|row| row.get(column))
                .map(estimate_text_width)
                .fold(estimate_text_width(column), f64::max)
        })
        .collect()
}

fn write_text_cell_safe(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    text: &str,
    format: &Format,
) -> Result<(), XlsxError> {
    let cleaned = sanitize_cell(text);
    worksheet.write_string_with_format(row, col, &cleaned, format).map(|_| ())
}

/// Build the `QR-Data` workbook: header row of column keys, then one row per scan.
fn build_workbook(rows: &[ScanRow]) -> Result<Workbook, XlsxError> {
    let columns = export_columns(rows);

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(EXPORT_SHEET_NAME)?;

    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0x15803D))
        .set_font_color(Color::RGB(0xFFFFFF));
    let text_format = Format::new();

    for (col, &w) in calculate_column_widths(&columns, rows).iter().enumerate() {
        worksheet.set_column_width(col as u16, w)?;
    }

    for (col, header) in columns.iter().enumerate() {
        write_text_cell_safe(worksheet, 0, col as u16, header, &header_format)?;
    }

    for (row_idx, scan) in rows.iter().enumerate() {
        let row = (row_idx + 1) as u32;
        for (col, column) in columns.iter().enumerate() {
            let value = scan.get(column).unwrap_or("");
            write_text_cell_safe(worksheet, row, col as u16, value, &text_format)?;
        }
    }

    worksheet.set_freeze_panes(1, 0)?;
    Ok(workbook)
}

/// Workbook bytes for `rows`, or `None` when there is nothing to export.
pub fn render_workbook(rows: &[ScanRow]) -> Result<Option<Vec<u8>>, ExportError> {
    if rows.is_empty() {
        return Ok(None);
    }
    let mut workbook = build_workbook(rows)?;
    Ok(Some(workbook.save_to_buffer()?))
}

/// Write `rows` to `path` (an `.xlsx` extension is enforced). No file is touched when `rows` is empty.
pub fn export_rows(rows: &[ScanRow], path: &Path) -> Result<ExportOutcome, ExportError> {
    if rows.is_empty() {
        tracing::info!("nothing to export");
        return Ok(ExportOutcome::NothingToExport);
    }

    let mut path = path.to_path_buf();
    if path.file_name().is_none() {
        return Err(ExportError::InvalidPath(path.display().to_string()));
    }
    if path.extension().and_then(|e| e.to_str()) != Some("xlsx") {
        path.set_extension("xlsx");
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut workbook = build_workbook(rows)?;
    workbook.save(&path)?;
    tracing::info!(path = %path.display(), rows = rows.len(), "exported scans");
    Ok(ExportOutcome::Written {
        path,
        rows: rows.len(),
    })
}

/// `<dir>/groundnut_dispatch_scans.xlsx`. Without a directory: Downloads, then Desktop, then the working dir.
pub fn default_export_path(dir: Option<&Path>) -> PathBuf {
    let dir = match dir {
        Some(d) => d.to_path_buf(),
        None => dirs::download_dir()
            .or_else(dirs::desktop_dir)
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    dir.join(EXPORT_FILE_NAME)
}

/// Read every row of `sheet_name` as strings (header row included).
pub fn read_sheet_rows(path: &Path, sheet_name: &str) -> Result<Vec<Vec<String>>, ExportError> {
    if !path.exists() {
        return Err(ExportError::InvalidPath(path.display().to_string()));
    }
    let mut workbook = open_workbook_auto(path)?;
    if !workbook.sheet_names().iter().any(|s| s == sheet_name) {
        return Err(ExportError::SheetNotFound(sheet_name.to_string()));
    }
    let range = workbook.worksheet_range(sheet_name)?;
    Ok(range
        .rows()
        .map(|row| {
            row.iter()
                .map(|c| c.as_string().unwrap_or_default())
                .collect()
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_dispatch, parse_society};

    #[test]
    fn columns_are_union_in_first_seen_order() {
        let rows = vec![parse_dispatch("Dispatch ID:1"), parse_society("AGY")];
        let columns = export_columns(&rows);
        assert_eq!(columns[0], "dispatch_id");
        assert_eq!(columns[7], "timestamp");
        assert_eq!(columns[8], "agency");
        assert_eq!(columns.len(), 8 + 8);
        assert_eq!(columns.iter().filter(|c| *c == "dispatch_id").count(), 1);
    }

    #[test]
    fn sanitize_drops_control_chars() {
        assert_eq!(sanitize_cell("a\u{1}b\tc"), "ab\tc");
        assert_eq!(sanitize_cell("Bags & Qty <1>"), "Bags & Qty <1>");
    }

    #[test]
    fn empty_rows_render_nothing() {
        assert!(render_workbook(&[]).unwrap().is_none());
    }

    #[test]
    fn render_produces_zip_bytes() {
        let bytes = render_workbook(&[parse_dispatch("Dispatch ID:1")]).unwrap().unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn default_path_uses_fixed_name() {
        let path = default_export_path(Some(Path::new("/tmp/out")));
        assert_eq!(path, PathBuf::from("/tmp/out/groundnut_dispatch_scans.xlsx"));
    }

    #[test]
    fn widths_cover_header_and_values() {
        let rows = vec![parse_dispatch("Vehicle No:KA01AB1234KA01AB1234KA01AB1234KA01AB1234")];
        let columns = export_columns(&rows);
        let widths = calculate_column_widths(&columns, &rows);
        assert_eq!(widths.len(), columns.len());
        assert!(widths[2] > 40.0);
        assert!(widths.iter().all(|w| (10.0..=50.0).contains(w)));
    }
}
