//! Readers and the table normalizer feeding the reconciliation engine.
//!
//! This module provides:
//!
//! - **Workbooks** (xlsx, xlsm, xlsb, xls, ods): one sheet read through `calamine`
//! - **Delimited text** (csv, tsv): read through `csv`
//! - **Normalization**: column projection, date parsing and text coercion into
//!   [`TransactionRow`] and [`DeliveryRow`] tables
//!
//! ## Example
//!
//! ```rust,no_run
//! use fuel_recon::parsing::{load_deliveries, load_transactions};
//! use fuel_recon::parsing::normalize::InputSettings;
//!
//! let settings = InputSettings::default();
//! let transactions = load_transactions(std::fs::read("fuel.xlsx")?, Some("fuel.xlsx"), &settings)?;
//! let deliveries = load_deliveries(std::fs::read("trips.xlsx")?, Some("trips.xlsx"), &settings)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Date columns
//!
//! | Cell type | Result |
//! |-----------|--------|
//! | Excel date | its calendar date |
//! | Text | parsed with the configured format (default `%d/%m/%Y`) |
//! | Anything else, or unparseable text | missing |

pub mod delimited;
pub mod normalize;
pub mod table;
pub mod workbook;

use crate::core::delivery::DeliveryRow;
use crate::core::transaction::TransactionRow;
use crate::web::format_detection::{detect_format, TableFormat};

use normalize::{normalize_deliveries, normalize_transactions, InputSettings};
use table::{RawTable, SheetSelector, TableError};

/// Read a table from in-memory content of a known format
///
/// # Errors
///
/// Returns any error from the workbook or delimited reader.
pub fn read_table(
    bytes: Vec<u8>,
    format: TableFormat,
    sheet: &SheetSelector,
    skip_rows: usize,
) -> Result<RawTable, TableError> {
    match format.delimiter() {
        Some(delimiter) => delimited::parse_delimited(&bytes, delimiter, skip_rows),
        None => workbook::parse_workbook(bytes, sheet, skip_rows),
    }
}

/// Detect the format of `bytes` and read a table from it
///
/// # Errors
///
/// Returns `TableError::UnsupportedFormat` if the format cannot be detected,
/// or any error from the reader.
pub fn read_table_detected(
    bytes: Vec<u8>,
    filename: Option<&str>,
    sheet: &SheetSelector,
    skip_rows: usize,
) -> Result<RawTable, TableError> {
    let format = detect_format(&bytes, filename)
        .map_err(|e| TableError::UnsupportedFormat(e.to_string()))?;
    tracing::debug!(format = format.display_name(), ?filename, "detected table format");
    read_table(bytes, format, sheet, skip_rows)
}

/// Read and normalize the transaction table
///
/// # Errors
///
/// Returns an input-shape error if the file cannot be read or lacks a required column.
pub fn load_transactions(
    bytes: Vec<u8>,
    filename: Option<&str>,
    settings: &InputSettings,
) -> Result<Vec<TransactionRow>, TableError> {
    let table = read_table_detected(
        bytes,
        filename,
        &settings.transaction_sheet,
        settings.transaction_skip_rows,
    )?;
    normalize_transactions(&table, &settings.columns, &settings.date_format)
}

/// Read and normalize the delivery table
///
/// # Errors
///
/// Returns an input-shape error if the file cannot be read or lacks a required column.
pub fn load_deliveries(
    bytes: Vec<u8>,
    filename: Option<&str>,
    settings: &InputSettings,
) -> Result<Vec<DeliveryRow>, TableError> {
    let table = read_table_detected(
        bytes,
        filename,
        &settings.delivery_sheet,
        settings.delivery_skip_rows,
    )?;
    normalize_deliveries(&table, &settings.columns, &settings.date_format)
}
