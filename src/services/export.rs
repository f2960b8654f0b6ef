// src/services/export.rs
use anyhow::Result;
use rust_xlsxwriter::{Format, Workbook};

use crate::models::{ReportRow, REPORT_HEADERS};

pub const XLSX_FILENAME: &str = "datos_empresas.xlsx";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const CSV_FILENAME: &str = "datos_empresas.csv";
pub const CSV_MIME: &str = "text/csv; charset=utf-8";

const SHEET_NAME: &str = "Sheet1";

/// Single-sheet workbook: header row, then one row per ticker.
pub fn to_xlsx(rows: &[ReportRow]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, header) in REPORT_HEADERS.iter().enumerate() {
        let col = col as u16;
        worksheet.write_string_with_format(0, col, *header, &header_format)?;
        worksheet.set_column_width(col, 18.0)?;
    }

    for (i, row) in rows.iter().enumerate() {
        let sheet_row = i as u32 + 1;
        for (col, cell) in row.cells().iter().enumerate() {
            worksheet.write_string(sheet_row, col as u16, *cell)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

pub fn to_csv(rows: &[ReportRow]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(REPORT_HEADERS)?;
    for row in rows {
        writer.write_record(row.cells())?;
    }
    let bytes = writer.into_inner().map_err(|e| anyhow::anyhow!(e.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}
