use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};

use crate::parsing::table::{Cell, RawTable, SheetSelector, TableError};

/// Read one sheet of an in-memory workbook.
///
/// `skip_rows` rows are dropped from the top of the sheet; the next row is
/// the header. The workbook type is detected from its content.
///
/// # Errors
///
/// Returns `TableError::Workbook` if the bytes are not a readable workbook,
/// `TableError::NoSheets`/`TableError::SheetNotFound` if the sheet cannot be
/// selected, `TableError::MissingHeader` if no row is left for the header, or
/// `TableError::TooManyRows` if the row limit is exceeded.
pub fn parse_workbook(
    bytes: Vec<u8>,
    sheet: &SheetSelector,
    skip_rows: usize,
) -> Result<RawTable, TableError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| TableError::Workbook(e.to_string()))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let sheet_name = sheet.resolve(&sheet_names)?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| TableError::Workbook(format!("sheet '{sheet_name}': {e}")))?;

    // The range starts at the first used row, which is not always row 0
    let (start_row, _) = range.start().unwrap_or((0, 0));
    let skip_in_range = skip_rows.saturating_sub(start_row as usize);

    let mut rows = range
        .rows()
        .skip(skip_in_range)
        .map(|row| row.iter().map(convert_cell).collect::<Vec<_>>());

    let header = rows.next().ok_or(TableError::MissingHeader(skip_rows))?;
    let table = RawTable::from_rows(&header, rows)?;

    tracing::debug!(
        sheet = %sheet_name,
        columns = table.headers.len(),
        rows = table.len(),
        "read worksheet"
    );

    Ok(table)
}

fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Int(n) => Cell::Int(*n),
        Data::Float(n) => Cell::Float(*n),
        Data::Bool(b) => Cell::Bool(*b),
        Data::Error(e) => Cell::Error(format!("#{e:?}")),
        // calamine applies the workbook's 1900/1904 date system
        Data::DateTime(dt) => dt
            .as_datetime()
            .map_or_else(|| Cell::Float(dt.as_f64()), Cell::DateTime),
        Data::DateTimeIso(s) => parse_iso_datetime(s).map_or_else(|| Cell::Text(s.clone()), Cell::DateTime),
        Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

fn parse_iso_datetime(s: &str) -> Option<chrono::NaiveDateTime> {
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
