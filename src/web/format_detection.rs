use std::path::Path;

/// Magic number shared by all zip containers (xlsx, xlsb, ods)
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Magic number of OLE2 compound documents (legacy xls)
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// `OpenDocument` zips store this mimetype uncompressed at a fixed offset
const ODS_MIMETYPE: &[u8] = b"mimetypeapplication/vnd.oasis.opendocument.spreadsheet";

/// Supported input table formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// Office Open XML workbook
    Xlsx,
    /// Excel binary workbook
    Xlsb,
    /// Legacy Excel 97-2003 workbook
    Xls,
    /// `OpenDocument` spreadsheet
    Ods,
    /// Comma-separated values
    Csv,
    /// Tab-separated values
    Tsv,
}

/// Errors that can occur during format detection
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum FormatError {
    #[error("Unable to detect table format from content and filename")]
    UnknownFormat,
    #[error("File appears to be binary but is not a supported workbook")]
    UnsupportedBinary,
}

impl TableFormat {
    /// Get the display name for this format
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            TableFormat::Xlsx => "Excel Workbook",
            TableFormat::Xlsb => "Excel Binary Workbook",
            TableFormat::Xls => "Excel 97-2003 Workbook",
            TableFormat::Ods => "OpenDocument Spreadsheet",
            TableFormat::Csv => "CSV Table",
            TableFormat::Tsv => "TSV Table",
        }
    }

    /// Whether the format is a spreadsheet container read through calamine
    #[must_use]
    pub fn is_workbook(self) -> bool {
        matches!(
            self,
            TableFormat::Xlsx | TableFormat::Xlsb | TableFormat::Xls | TableFormat::Ods
        )
    }

    /// Field delimiter for delimited text formats
    #[must_use]
    pub fn delimiter(self) -> Option<u8> {
        match self {
            TableFormat::Csv => Some(b','),
            TableFormat::Tsv => Some(b'\t'),
            _ => None,
        }
    }
}

/// Detect table format from content and optional filename
///
/// Content signatures take precedence; the filename only disambiguates
/// between formats sharing a container.
///
/// # Errors
///
/// Returns `FormatError::UnsupportedBinary` for binary content that is not a
/// known workbook, or `FormatError::UnknownFormat` for empty content.
pub fn detect_format(content: &[u8], filename: Option<&str>) -> Result<TableFormat, FormatError> {
    let from_name = filename.and_then(detect_format_from_filename);

    if content.starts_with(ZIP_MAGIC) {
        if content.get(30..30 + ODS_MIMETYPE.len()) == Some(ODS_MIMETYPE) {
            return Ok(TableFormat::Ods);
        }
        return Ok(match from_name {
            Some(TableFormat::Xlsb) => TableFormat::Xlsb,
            Some(TableFormat::Ods) => TableFormat::Ods,
            _ => TableFormat::Xlsx,
        });
    }

    if content.starts_with(OLE_MAGIC) {
        return Ok(TableFormat::Xls);
    }

    if content.is_empty() {
        return Err(FormatError::UnknownFormat);
    }

    let Ok(text) = std::str::from_utf8(content) else {
        return Err(FormatError::UnsupportedBinary);
    };

    match from_name {
        Some(format @ (TableFormat::Csv | TableFormat::Tsv)) => Ok(format),
        Some(_) => Err(FormatError::UnsupportedBinary),
        None => Ok(detect_delimiter(text)),
    }
}

/// Detect format based on filename extension
#[must_use]
pub fn detect_format_from_filename(filename: &str) -> Option<TableFormat> {
    let extension = Path::new(filename).extension()?.to_str()?.to_lowercase();

    match extension.as_str() {
        "xlsx" | "xlsm" => Some(TableFormat::Xlsx),
        "xlsb" => Some(TableFormat::Xlsb),
        "xls" => Some(TableFormat::Xls),
        "ods" => Some(TableFormat::Ods),
        "csv" => Some(TableFormat::Csv),
        "tsv" | "tab" => Some(TableFormat::Tsv),
        _ => None,
    }
}

/// Pick comma or tab by which appears more often in the first few lines
fn detect_delimiter(text: &str) -> TableFormat {
    let head: Vec<&str> = text.lines().take(5).collect();
    let tabs: usize = head.iter().map(|l| l.matches('\t').count()).sum();
    let commas: usize = head.iter().map(|l| l.matches(',').count()).sum();

    if tabs > commas {
        TableFormat::Tsv
    } else {
        TableFormat::Csv
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_zip_defaults_to_xlsx() {
        let content = b"PK\x03\x04rest-of-zip";
        assert_eq!(detect_format(content, None), Ok(TableFormat::Xlsx));
        assert_eq!(detect_format(content, Some("trips.xlsx")), Ok(TableFormat::Xlsx));
        assert_eq!(detect_format(content, Some("trips.xlsb")), Ok(TableFormat::Xlsb));
    }

    #[test]
    fn test_detect_ods_by_mimetype() {
        let mut content = b"PK\x03\x04".to_vec();
        content.resize(30, 0);
        content.extend_from_slice(ODS_MIMETYPE);
        assert_eq!(detect_format(&content, Some("trips.xlsx")), Ok(TableFormat::Ods));
    }

    #[test]
    fn test_detect_xls_by_ole_magic() {
        let mut content = OLE_MAGIC.to_vec();
        content.extend_from_slice(&[0u8; 16]);
        assert_eq!(detect_format(&content, None), Ok(TableFormat::Xls));
    }

    #[test]
    fn test_detect_delimited_text() {
        assert_eq!(
            detect_format(b"TranDate,reg\n05/01/2024,AB-123\n", None),
            Ok(TableFormat::Csv)
        );
        assert_eq!(
            detect_format(b"TranDate\treg\n05/01/2024\tAB-123\n", None),
            Ok(TableFormat::Tsv)
        );
        assert_eq!(
            detect_format(b"a,b\n", Some("fuel.tsv")),
            Ok(TableFormat::Tsv)
        );
    }

    #[test]
    fn test_detect_rejects_unknown_binary() {
        assert_eq!(
            detect_format(&[0xFF, 0xFE, 0x00, 0x81], None),
            Err(FormatError::UnsupportedBinary)
        );
        assert_eq!(detect_format(b"", None), Err(FormatError::UnknownFormat));
        // Text claiming to be a workbook
        assert_eq!(
            detect_format(b"not a workbook", Some("fuel.xlsx")),
            Err(FormatError::UnsupportedBinary)
        );
    }

    #[test]
    fn test_detect_format_from_filename() {
        assert_eq!(detect_format_from_filename("A.XLSX"), Some(TableFormat::Xlsx));
        assert_eq!(detect_format_from_filename("legacy.xls"), Some(TableFormat::Xls));
        assert_eq!(detect_format_from_filename("notes.txt"), None);
        assert_eq!(detect_format_from_filename("noext"), None);
    }
}
