//! Writers for the reconciled table.
//!
//! The output has one header row and one row per transaction, in input order:
//!
//! | Column | Source |
//! |--------|--------|
//! | transaction date | normalized date, written as an Excel date |
//! | registration | as read |
//! | carrier | matched carrier(s), blank when unmatched |
//! | trip code | matched trip code(s), blank when unmatched |
//! | method | match method label, blank when unmatched |
//!
//! Header names come from [`ColumnMapping`]; method labels from [`LabelStyle`].

use std::path::Path;

use chrono::{Datelike, NaiveDate};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook, Worksheet, XlsxError};

use crate::core::transaction::ReconciledRow;
use crate::core::types::LabelStyle;
use crate::parsing::normalize::{ColumnMapping, DEFAULT_DATE_FORMAT};

/// Excel number format for the transaction date column
pub const EXCEL_DATE_FORMAT: &str = "dd/mm/yyyy";

/// MIME type of the xlsx result
pub const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Name of the single result worksheet
const RESULT_SHEET: &str = "Result";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to write workbook: {0}")]
    Xlsx(#[from] XlsxError),

    #[error("Failed to write delimited output: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// How the result table is rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputOptions {
    pub columns: ColumnMapping,
    pub label_style: LabelStyle,
    /// `chrono` format for dates in delimited output
    pub date_format: String,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            columns: ColumnMapping::default(),
            label_style: LabelStyle::default(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl OutputOptions {
    fn headers(&self) -> [&str; 5] {
        [
            self.columns.transaction_date.as_str(),
            self.columns.registration.as_str(),
            self.columns.output_carrier.as_str(),
            self.columns.output_trip_code.as_str(),
            self.columns.output_method.as_str(),
        ]
    }
}

/// Render the result table as an xlsx workbook
///
/// # Errors
///
/// Returns `ExportError::Xlsx` if the workbook cannot be assembled.
pub fn write_xlsx(rows: &[ReconciledRow], options: &OutputOptions) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(RESULT_SHEET)?;

    let header_format = Format::new().set_bold();
    let date_format = Format::new().set_num_format(EXCEL_DATE_FORMAT);

    for (col, header) in (0u16..).zip(options.headers()) {
        worksheet.write_string_with_format(0, col, header, &header_format)?;
    }

    for (row_num, row) in (1u32..).zip(rows) {
        if let Some(date) = row.transaction.transaction_date {
            write_date(worksheet, row_num, 0, date, &date_format, options)?;
        }
        if let Some(registration) = row.transaction.registration.as_deref() {
            worksheet.write_string(row_num, 1, registration)?;
        }
        if let Some(annotation) = &row.annotation {
            worksheet.write_string(row_num, 2, &annotation.carrier)?;
            worksheet.write_string(row_num, 3, &annotation.trip_code)?;
            worksheet.write_string(row_num, 4, annotation.method.label(options.label_style))?;
        }
    }

    worksheet.set_column_width(0, 12)?;
    worksheet.set_column_width(2, 24)?;
    worksheet.set_column_width(3, 16)?;
    worksheet.set_column_width(4, 24)?;
    worksheet.set_freeze_panes(1, 0)?;

    let bytes = workbook.save_to_buffer()?;
    tracing::debug!(rows = rows.len(), bytes = bytes.len(), "wrote result workbook");
    Ok(bytes)
}

fn write_date(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    date: NaiveDate,
    format: &Format,
    options: &OutputOptions,
) -> Result<(), XlsxError> {
    match to_excel_date(date) {
        Some(datetime) => {
            worksheet.write_datetime_with_format(row, col, &datetime, format)?;
        }
        // Outside Excel's calendar; keep the value readable as text
        None => {
            worksheet.write_string(row, col, date.format(&options.date_format).to_string())?;
        }
    }
    Ok(())
}

fn to_excel_date(date: NaiveDate) -> Option<ExcelDateTime> {
    let year = u16::try_from(date.year()).ok()?;
    let month = u8::try_from(date.month()).ok()?;
    let day = u8::try_from(date.day()).ok()?;
    ExcelDateTime::from_ymd(year, month, day).ok()
}

/// Render the result table as delimited text
///
/// # Errors
///
/// Returns `ExportError::Csv` or `ExportError::Io` if a record cannot be written.
pub fn write_delimited(
    rows: &[ReconciledRow],
    options: &OutputOptions,
    delimiter: u8,
) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(options.headers())?;

    for row in rows {
        let date = row
            .transaction
            .transaction_date
            .map(|d| d.format(&options.date_format).to_string())
            .unwrap_or_default();
        let registration = row.transaction.registration.as_deref().unwrap_or_default();
        let method = row
            .method()
            .map(|m| m.label(options.label_style))
            .unwrap_or_default();

        writer.write_record([
            date.as_str(),
            registration,
            row.carrier().unwrap_or_default(),
            row.trip_code().unwrap_or_default(),
            method,
        ])?;
    }

    writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}

/// Write the result to `path`: delimited text for `.csv`/`.tsv`, xlsx otherwise
///
/// # Errors
///
/// Returns an `ExportError` if rendering or writing the file fails.
pub fn write_result_file(
    path: &Path,
    rows: &[ReconciledRow],
    options: &OutputOptions,
) -> Result<(), ExportError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    let bytes = match extension.as_deref() {
        Some("csv") => write_delimited(rows, options, b',')?,
        Some("tsv") => write_delimited(rows, options, b'\t')?,
        _ => write_xlsx(rows, options)?,
    };

    std::fs::write(path, bytes)?;
    Ok(())
}
