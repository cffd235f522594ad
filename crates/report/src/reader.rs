use crate::error::ReportError;
use crate::writer::SHEET_NAME;
use calamine::{open_workbook, Reader, Xlsx};
use std::path::Path;

/// Counts the data rows (everything below the header) of a finished report.
pub fn count_data_rows(path: &Path) -> Result<usize, ReportError> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = workbook.worksheet_range(SHEET_NAME)?;

    // The header sits on row 0, so the last used row index equals the data row count.
    Ok(range.end().map(|(row, _)| row as usize).unwrap_or(0))
}
