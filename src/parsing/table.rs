use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Maximum number of data rows accepted from a single table (DOS protection)
pub const MAX_TABLE_ROWS: usize = 1_000_000;

/// Errors raised while reading or projecting a table
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("Unable to read workbook: {0}")]
    Workbook(String),

    #[error("Unable to read delimited file: {0}")]
    Delimited(#[from] csv::Error),

    #[error("Workbook contains no sheets")]
    NoSheets,

    #[error("Sheet '{name}' not found (available: {})", .available.join(", "))]
    SheetNotFound { name: String, available: Vec<String> },

    #[error("No header row found after skipping {0} rows")]
    MissingHeader(usize),

    #[error("{table} table is missing required column '{column}'")]
    MissingColumn { table: &'static str, column: String },

    #[error("Too many rows: exceeds maximum of {MAX_TABLE_ROWS}")]
    TooManyRows,

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
}

/// Which sheet of a workbook to read
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SheetSelector {
    /// The first sheet in workbook order
    #[default]
    First,
    /// A sheet by exact name
    Named(String),
}

impl SheetSelector {
    /// `None` or an empty name selects the first sheet
    #[must_use]
    pub fn from_name(name: Option<&str>) -> Self {
        match name.map(str::trim) {
            Some(n) if !n.is_empty() => Self::Named(n.to_string()),
            _ => Self::First,
        }
    }

    /// Pick the sheet name to open from the workbook's sheet list
    ///
    /// # Errors
    ///
    /// Returns `TableError::NoSheets` for an empty workbook, or
    /// `TableError::SheetNotFound` if a named sheet does not exist.
    pub fn resolve(&self, sheet_names: &[String]) -> Result<String, TableError> {
        match self {
            Self::First => sheet_names.first().cloned().ok_or(TableError::NoSheets),
            Self::Named(name) => {
                if sheet_names.iter().any(|s| s == name) {
                    Ok(name.clone())
                } else {
                    Err(TableError::SheetNotFound {
                        name: name.clone(),
                        available: sheet_names.to_vec(),
                    })
                }
            }
        }
    }
}

/// A single cell value as read from a source file
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    Error(String),
}

static EMPTY_CELL: Cell = Cell::Empty;

impl Cell {
    /// Blank cells and whitespace-only text count as missing
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Textual rendering of the cell, `None` when blank.
    ///
    /// Integral floats lose their fraction so numeric codes read back as
    /// typed (`12345.0` becomes `12345`). Text is returned verbatim.
    #[must_use]
    pub fn to_text(&self) -> Option<String> {
        if self.is_blank() {
            return None;
        }
        let text = match self {
            Cell::Empty => return None,
            Cell::Text(s) => s.clone(),
            Cell::Int(n) => n.to_string(),
            Cell::Float(n) => format_float(*n),
            Cell::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
            Cell::DateTime(dt) => {
                if dt.time() == NaiveTime::MIN {
                    dt.date().format("%Y-%m-%d").to_string()
                } else {
                    dt.format("%Y-%m-%d %H:%M:%S").to_string()
                }
            }
            Cell::Error(e) => e.clone(),
        };
        Some(text)
    }

    /// Calendar date of the cell.
    ///
    /// Date cells yield their date; text is parsed with `format` after
    /// trimming. Everything else, and unparseable text, yields `None`.
    #[must_use]
    pub fn to_date(&self, format: &str) -> Option<NaiveDate> {
        match self {
            Cell::DateTime(dt) => Some(dt.date()),
            Cell::Text(s) => NaiveDate::parse_from_str(s.trim(), format).ok(),
            _ => None,
        }
    }
}

#[allow(clippy::cast_possible_truncation)] // Guarded by the magnitude check
fn format_float(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// A header row plus data rows, as read from one sheet or file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    /// Build a table from a header row and the rows that follow it.
    ///
    /// Header names are trimmed. Rows that are entirely blank are dropped.
    ///
    /// # Errors
    ///
    /// Returns `TableError::TooManyRows` if the row limit is exceeded.
    pub fn from_rows(header: &[Cell], rows: impl IntoIterator<Item = Vec<Cell>>) -> Result<Self, TableError> {
        let headers = header
            .iter()
            .map(|c| c.to_text().map(|s| s.trim().to_string()).unwrap_or_default())
            .collect();

        let mut data = Vec::new();
        for row in rows {
            if row.iter().all(Cell::is_blank) {
                continue;
            }
            if data.len() >= MAX_TABLE_ROWS {
                return Err(TableError::TooManyRows);
            }
            data.push(row);
        }

        Ok(Self {
            headers,
            rows: data,
        })
    }

    /// Index of the first column with this header
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell at `(row, col)`; short rows read as blank
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
