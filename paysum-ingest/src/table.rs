//! Raw row access for delimited-text and spreadsheet exports.
//!
//! Rows come back as plain cell text with no header interpretation, so the
//! header locator and the adapters see the same row numbering.

use std::path::Path;

use calamine::{open_workbook, Data, DataType, Reader, Xlsx};
use paysum_core::format_timestamp;

use crate::error::{IngestError, Result};

/// Tabular encodings accepted by the adapters, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Xlsx,
}

impl TableFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| IngestError::format(path, "file has no extension"))?;

        match ext.as_str() {
            "csv" => Ok(TableFormat::Csv),
            "xlsx" => Ok(TableFormat::Xlsx),
            other => Err(IngestError::format(
                path,
                format!("unsupported file format .{other} (expected .csv or .xlsx)"),
            )),
        }
    }
}

/// Read rows as text. `limit` caps how many rows are read.
///
/// Blank lines in delimited text are skipped. Spreadsheet rows keep their
/// physical numbering, including blank rows above the first used cell.
pub fn read_rows(path: &Path, limit: Option<usize>) -> Result<Vec<Vec<String>>> {
    match TableFormat::from_path(path)? {
        TableFormat::Csv => read_csv_rows(path, limit),
        TableFormat::Xlsx => read_xlsx_rows(path, limit),
    }
}

fn read_csv_rows(path: &Path, limit: Option<usize>) -> Result<Vec<Vec<String>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| IngestError::format(path, format!("cannot open csv: {e}")))?;

    let mut rows = Vec::new();
    for result in rdr.records() {
        if limit.is_some_and(|n| rows.len() >= n) {
            break;
        }
        let record = result.map_err(|e| IngestError::format(path, format!("cannot parse csv: {e}")))?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

fn read_xlsx_rows(path: &Path, limit: Option<usize>) -> Result<Vec<Vec<String>>> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .map_err(|e| IngestError::format(path, format!("cannot open workbook: {e}")))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| IngestError::format(path, "workbook has no sheets"))?
        .map_err(|e| IngestError::format(path, format!("cannot read first sheet: {e}")))?;

    // calamine ranges start at the first used cell; pad back to A1
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let limit = limit.unwrap_or(usize::MAX);

    let leading = std::iter::repeat_with(Vec::new).take(start_row as usize);
    let body = range.rows().map(|cells| {
        let mut row = vec![String::new(); start_col as usize];
        row.extend(cells.iter().map(cell_text));
        row
    });

    Ok(leading.chain(body).take(limit).collect())
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_datetime()
            .map(|ts| format_timestamp(&ts))
            .unwrap_or_else(|| cell.to_string()),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_format_by_extension() {
        assert_eq!(TableFormat::from_path(Path::new("a/支付宝.csv")).unwrap(), TableFormat::Csv);
        assert_eq!(TableFormat::from_path(Path::new("b.XLSX")).unwrap(), TableFormat::Xlsx);
        assert!(TableFormat::from_path(Path::new("c.xls")).is_err());
        assert!(TableFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_csv_rows_are_ragged_and_capped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bill.csv");
        fs::write(&path, "导出信息\n\n交易时间,金额\n2024-01-01 10:00:00,1.00\n2024-01-02 10:00:00,2.00\n").unwrap();

        let all = read_rows(&path, None).unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0], vec!["导出信息".to_string()]);
        assert_eq!(all[1], vec!["交易时间".to_string(), "金额".to_string()]);

        let capped = read_rows(&path, Some(2)).unwrap();
        assert_eq!(capped.len(), 2);
    }

    #[test]
    fn test_unreadable_xlsx_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("微信支付账单.xlsx");
        fs::write(&path, "not a zip archive").unwrap();

        let err = read_rows(&path, None).unwrap_err();
        assert!(matches!(err, IngestError::Format { .. }));
    }

    #[test]
    fn test_missing_csv_is_format_error() {
        let err = read_rows(Path::new("/nonexistent/支付宝.csv"), None).unwrap_err();
        assert!(matches!(err, IngestError::Format { .. }));
    }
}
