use crate::error::ReportError;
use crate::table::{ratio_formula, ReportTable};
use chrono::{Datelike, Timelike};
use core_types::RateRecord;
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{ColNum, ExcelDateTime, Format, Formula, RowNum, Workbook, Worksheet};

/// Name of the single worksheet in every report.
pub const SHEET_NAME: &str = "Report";

const DATE_FORMAT: &str = "dd.mm.yyyy";
const TIME_FORMAT: &str = "hh:mm:ss";
const RATIO_COLUMN: ColNum = 6;

/// Serializes the table into an in-memory `.xlsx` file.
///
/// Row 1 holds the header. Data starts at row 2 with each pair's `[date, rate, time]`
/// block left to right, and the seventh column holds a live `=B{n}/E{n}` formula
/// wherever both rates are present.
pub fn write_workbook(table: &ReportTable) -> Result<Vec<u8>, ReportError> {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format(DATE_FORMAT);
    let time_format = Format::new().set_num_format(TIME_FORMAT);

    {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME)?;

        for (col, label) in table.header().iter().enumerate() {
            worksheet.write_string(0, col as ColNum, label)?;
        }

        for (index, row) in table.rows().iter().enumerate() {
            let sheet_row = index as RowNum + 1;

            if let Some(record) = &row.first {
                write_record(worksheet, sheet_row, 0, record, &date_format, &time_format)?;
            }
            if let Some(record) = &row.second {
                write_record(worksheet, sheet_row, 3, record, &date_format, &time_format)?;
            }

            if row.is_complete() {
                // Cells are zero-based here, formulas use one-based row numbers.
                let mut formula = Formula::new(ratio_formula(sheet_row + 1));
                if let Some(ratio) = row.ratio() {
                    formula = formula.set_result(ratio.to_string());
                }
                worksheet.write_formula(sheet_row, RATIO_COLUMN, formula)?;
            }
        }

        worksheet.autofit();
    }

    Ok(workbook.save_to_buffer()?)
}

fn write_record(
    worksheet: &mut Worksheet,
    row: RowNum,
    col: ColNum,
    record: &RateRecord,
    date_format: &Format,
    time_format: &Format,
) -> Result<(), ReportError> {
    let year = u16::try_from(record.date.year())
        .map_err(|_| ReportError::InvalidValue(format!("date {}", record.date)))?;
    let date = ExcelDateTime::from_ymd(
        year,
        record.date.month() as u8,
        record.date.day() as u8,
    )?;
    let time = ExcelDateTime::from_hms(
        record.time.hour() as u16,
        record.time.minute() as u8,
        record.time.second(),
    )?;
    let value = record
        .value
        .to_f64()
        .ok_or_else(|| ReportError::InvalidValue(record.value.to_string()))?;

    worksheet.write_datetime_with_format(row, col, &date, date_format)?;
    worksheet.write_number(row, col + 1, value)?;
    worksheet.write_datetime_with_format(row, col + 2, &time, time_format)?;
    Ok(())
}
