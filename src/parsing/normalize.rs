use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::delivery::DeliveryRow;
use crate::core::transaction::TransactionRow;
use crate::parsing::table::{RawTable, SheetSelector, TableError};

/// Default format for text dates, day first
pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y";

/// Header names of the input columns and of the appended output columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub transaction_date: String,
    pub registration: String,

    pub departure_date: String,
    pub unload_date: String,
    pub carrier: String,
    pub secondary_carrier: String,
    pub vehicle_number: String,
    pub head_plate: String,
    pub trip_code: String,

    pub output_carrier: String,
    pub output_trip_code: String,
    pub output_method: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            transaction_date: "TranDate".to_string(),
            registration: "ทะเบียน".to_string(),
            departure_date: "ออก LDT".to_string(),
            unload_date: "ลงสินค้า".to_string(),
            carrier: "พจส".to_string(),
            secondary_carrier: "พจส2".to_string(),
            vehicle_number: "เลขรถ".to_string(),
            head_plate: "หัว".to_string(),
            trip_code: "LDT".to_string(),
            output_carrier: "พจส".to_string(),
            output_trip_code: "LDT".to_string(),
            // Spelling matches the column consumed downstream
            output_method: "Medthod".to_string(),
        }
    }
}

impl ColumnMapping {
    /// Load a mapping from a JSON file; omitted fields keep their defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mapping: Self = serde_json::from_str(&content)?;
        Ok(mapping)
    }
}

/// Everything needed to turn two uploaded files into normalized tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSettings {
    pub columns: ColumnMapping,
    /// `chrono` format for text dates
    pub date_format: String,
    pub transaction_sheet: SheetSelector,
    pub delivery_sheet: SheetSelector,
    /// Rows above the header row in the transaction sheet
    pub transaction_skip_rows: usize,
    /// Rows above the header row in the delivery sheet
    pub delivery_skip_rows: usize,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            columns: ColumnMapping::default(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            transaction_sheet: SheetSelector::First,
            delivery_sheet: SheetSelector::First,
            transaction_skip_rows: 0,
            // Delivery exports carry a title line above the header
            delivery_skip_rows: 1,
        }
    }
}

fn require_column(table: &RawTable, name: &str, table_name: &'static str) -> Result<usize, TableError> {
    table.column_index(name).ok_or_else(|| TableError::MissingColumn {
        table: table_name,
        column: name.to_string(),
    })
}

/// Project a raw transaction table to normalized rows.
///
/// Unparseable dates and blank registrations become `None`; they are not errors.
///
/// # Errors
///
/// Returns `TableError::MissingColumn` if the date or registration column is absent.
pub fn normalize_transactions(
    table: &RawTable,
    columns: &ColumnMapping,
    date_format: &str,
) -> Result<Vec<TransactionRow>, TableError> {
    let date_col = require_column(table, &columns.transaction_date, "Transaction")?;
    let reg_col = require_column(table, &columns.registration, "Transaction")?;

    let rows = (0..table.len())
        .map(|i| TransactionRow {
            transaction_date: table.cell(i, date_col).to_date(date_format),
            registration: table.cell(i, reg_col).to_text(),
        })
        .collect();

    Ok(rows)
}

/// Project a raw delivery table to normalized rows.
///
/// Trip codes are always rendered as text. A blank carrier or trip code is
/// kept as an empty string.
///
/// # Errors
///
/// Returns `TableError::MissingColumn` if any delivery column is absent.
pub fn normalize_deliveries(
    table: &RawTable,
    columns: &ColumnMapping,
    date_format: &str,
) -> Result<Vec<DeliveryRow>, TableError> {
    let departure_col = require_column(table, &columns.departure_date, "Delivery")?;
    let unload_col = require_column(table, &columns.unload_date, "Delivery")?;
    let carrier_col = require_column(table, &columns.carrier, "Delivery")?;
    let secondary_col = require_column(table, &columns.secondary_carrier, "Delivery")?;
    let vehicle_col = require_column(table, &columns.vehicle_number, "Delivery")?;
    let plate_col = require_column(table, &columns.head_plate, "Delivery")?;
    let trip_col = require_column(table, &columns.trip_code, "Delivery")?;

    let rows = (0..table.len())
        .map(|i| DeliveryRow {
            departure_date: table.cell(i, departure_col).to_date(date_format),
            head_plate: table.cell(i, plate_col).to_text(),
            carrier: table.cell(i, carrier_col).to_text().unwrap_or_default(),
            trip_code: table.cell(i, trip_col).to_text().unwrap_or_default(),
            unload_date: table.cell(i, unload_col).to_text(),
            secondary_carrier: table.cell(i, secondary_col).to_text(),
            vehicle_number: table.cell(i, vehicle_col).to_text(),
        })
        .collect();

    Ok(rows)
}
