use crate::parsing::table::{Cell, RawTable, TableError};

/// Parse delimited text. After `skip_rows` records, the next record is the header.
///
/// Every non-empty field becomes a text cell; dates and numbers are left to
/// the normalizer. Records may have differing field counts.
///
/// # Errors
///
/// Returns `TableError::Delimited` for malformed input (including invalid
/// UTF-8), `TableError::MissingHeader` if no record is left for the header,
/// or `TableError::TooManyRows` if the row limit is exceeded.
pub fn parse_delimited(bytes: &[u8], delimiter: u8, skip_rows: usize) -> Result<RawTable, TableError> {
    // A UTF-8 BOM is common in spreadsheet CSV exports
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut records = reader.records().skip(skip_rows);

    let header = match records.next() {
        Some(record) => to_cells(&record?),
        None => return Err(TableError::MissingHeader(skip_rows)),
    };

    let mut rows = Vec::new();
    for record in records {
        rows.push(to_cells(&record?));
    }

    RawTable::from_rows(&header, rows)
}

fn to_cells(record: &csv::StringRecord) -> Vec<Cell> {
    record
        .iter()
        .map(|field| {
            if field.is_empty() {
                Cell::Empty
            } else {
                Cell::Text(field.to_string())
            }
        })
        .collect()
}
