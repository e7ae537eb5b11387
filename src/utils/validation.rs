//! Centralized validation of uploaded tables.

use crate::web::format_detection::{detect_format, TableFormat};

/// Security-related constants for input validation
pub const MAX_FILENAME_LENGTH: usize = 255;
pub const MIN_FILE_CONTENT_SIZE: usize = 1;

/// Security validation error types
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Filename too long: exceeds {MAX_FILENAME_LENGTH} characters")]
    FilenameTooLong,
    #[error("Invalid filename: contains path traversal or invalid characters")]
    InvalidFilename,
    #[error("Empty filename provided")]
    EmptyFilename,
    #[error("File content appears malformed or invalid")]
    InvalidFileContent,
    #[error("File format validation failed")]
    FormatValidationFailed,
}

/// An upload that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUpload {
    /// Sanitized filename, if one was supplied
    pub filename: Option<String>,
    /// Format detected from content and filename
    pub format: TableFormat,
}

/// Secure filename validation to prevent directory traversal and other attacks
///
/// Validates and sanitizes filenames by:
/// - Checking length limits
/// - Preventing directory traversal (../, ..\\)
/// - Removing potentially dangerous characters
/// - Ensuring filename is not empty after sanitization
///
/// Letters outside ASCII are kept, so Thai report names survive sanitization.
///
/// # Errors
///
/// Returns `ValidationError::EmptyFilename` if the filename is empty,
/// `ValidationError::FilenameTooLong` if it exceeds the limit, or
/// `ValidationError::InvalidFilename` if it contains invalid characters.
pub fn validate_filename(filename: &str) -> Result<String, ValidationError> {
    if filename.trim().is_empty() {
        return Err(ValidationError::EmptyFilename);
    }

    if filename.len() > MAX_FILENAME_LENGTH {
        return Err(ValidationError::FilenameTooLong);
    }

    // Prevent directory traversal attacks
    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        return Err(ValidationError::InvalidFilename);
    }

    if filename.chars().any(char::is_control) {
        return Err(ValidationError::InvalidFilename);
    }

    let sanitized = filename
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '.' | '-' | '_' | ' ' | '(' | ')'))
        .collect::<String>();

    if sanitized.trim().is_empty() {
        return Err(ValidationError::InvalidFilename);
    }

    // Hidden files only pass when they still name a table
    if sanitized.starts_with('.') && !has_known_extension(&sanitized) {
        return Err(ValidationError::InvalidFilename);
    }

    Ok(sanitized)
}

/// Check if filename has a known table extension
fn has_known_extension(filename: &str) -> bool {
    let safe_extensions = [
        ".xlsx", ".xlsm", ".xlsb", ".xls", ".ods", ".csv", ".tsv", ".tab",
    ];

    let lower = filename.to_lowercase();
    safe_extensions.iter().any(|ext| lower.ends_with(ext))
}

/// Validate file content using magic numbers for known container formats
///
/// Guards against an upload whose bytes disagree with the format it will be
/// read as.
#[must_use]
pub fn validate_file_format(content: &[u8], expected_format: TableFormat) -> bool {
    if content.is_empty() {
        return false;
    }

    match expected_format {
        TableFormat::Xlsx | TableFormat::Xlsb | TableFormat::Ods => {
            content.len() >= 4 && content.starts_with(b"PK\x03\x04")
        }
        TableFormat::Xls => {
            content.len() >= 8 && content.starts_with(&[0xD0, 0xCF, 0x11, 0xE0])
        }
        TableFormat::Csv | TableFormat::Tsv => std::str::from_utf8(content).is_ok(),
    }
}

/// Validate that file content is not malicious or malformed
///
/// For text formats, rejects content that is not UTF-8 or that carries
/// too many control bytes. Bytes above ASCII are not counted, since Thai
/// text is multi-byte UTF-8.
///
/// # Errors
///
/// Returns `ValidationError::InvalidFileContent` if the content is too small,
/// contains unexpected binary data for text formats, or fails UTF-8 validation.
pub fn validate_file_content(content: &[u8], expected_text: bool) -> Result<(), ValidationError> {
    if content.len() < MIN_FILE_CONTENT_SIZE {
        return Err(ValidationError::InvalidFileContent);
    }

    if expected_text {
        let control_count = content
            .iter()
            .filter(|&&b| b < 9 || (b > 13 && b < 32) || b == 127)
            .count();

        // Allow up to 5% control bytes for text files
        if content.len() > 100 && control_count > content.len() / 20 {
            return Err(ValidationError::InvalidFileContent);
        }

        if std::str::from_utf8(content).is_err() {
            return Err(ValidationError::InvalidFileContent);
        }
    }

    Ok(())
}

/// Comprehensive input validation combining filename and content checks
///
/// Performs complete validation for a table upload:
/// - Filename sanitization and security checks
/// - Format detection from content, disambiguated by filename
/// - Content integrity and magic number checks for the detected format
///
/// # Errors
///
/// Returns a `ValidationError` if filename validation fails, the format
/// cannot be detected or does not match the content, or content validation fails.
pub fn validate_upload(
    filename: Option<&str>,
    content: &[u8],
) -> Result<ValidatedUpload, ValidationError> {
    let validated_filename = filename.map(validate_filename).transpose()?;

    if content.len() < MIN_FILE_CONTENT_SIZE {
        return Err(ValidationError::InvalidFileContent);
    }

    let format = detect_format(content, validated_filename.as_deref())
        .map_err(|_| ValidationError::FormatValidationFailed)?;

    validate_file_content(content, !format.is_workbook())?;

    if !validate_file_format(content, format) {
        return Err(ValidationError::FormatValidationFailed);
    }

    Ok(ValidatedUpload {
        filename: validated_filename,
        format,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_filename_safe() {
        assert!(validate_filename("fuel.xlsx").is_ok());
        assert!(validate_filename("trips-march.csv").is_ok());
        assert!(validate_filename("report_2024.xls").is_ok());
        assert!(validate_filename("fleet 12.ods").is_ok());
    }

    #[test]
    fn test_validate_filename_dangerous() {
        // Directory traversal attempts
        assert!(validate_filename("../etc/passwd").is_err());
        assert!(validate_filename("..\\windows\\system32").is_err());
        assert!(validate_filename("test/../../secret").is_err());

        // Null bytes and control characters
        assert!(validate_filename("test\0.xlsx").is_err());
        assert!(validate_filename("test\x01.xlsx").is_err());

        let long_name = "a".repeat(300);
        assert!(validate_filename(&long_name).is_err());

        assert!(validate_filename("").is_err());
        assert!(validate_filename("   ").is_err());

        // Hidden files without known extensions
        assert!(validate_filename(".hidden").is_err());
    }

    #[test]
    fn test_validate_filename_sanitization() {
        let result = validate_filename("fuel@#$%log.xlsx").unwrap();
        assert_eq!(result, "fuellog.xlsx");

        let result = validate_filename("trips_(copy)-1.csv").unwrap();
        assert_eq!(result, "trips_(copy)-1.csv");
    }

    #[test]
    fn test_validate_filename_keeps_thai_letters() {
        let result = validate_filename("รถ 2024.xlsx").unwrap();
        assert!(result.ends_with("2024.xlsx"));
        assert!(result.starts_with('ร'));
    }

    #[test]
    fn test_validate_file_format_workbooks() {
        assert!(validate_file_format(b"PK\x03\x04rest", TableFormat::Xlsx));
        assert!(!validate_file_format(b"NOTAZIP", TableFormat::Xlsx));

        let ole = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1, 0x00];
        assert!(validate_file_format(&ole, TableFormat::Xls));
        assert!(!validate_file_format(b"PK\x03\x04rest", TableFormat::Xls));
    }

    #[test]
    fn test_validate_file_format_text() {
        assert!(validate_file_format(b"TranDate,reg\n", TableFormat::Csv));
        assert!(!validate_file_format(&[0xFF, 0xFE, 0x81], TableFormat::Tsv));
        assert!(!validate_file_format(b"", TableFormat::Csv));
    }

    #[test]
    fn test_validate_file_content_text() {
        let valid_text = "TranDate,ทะเบียน\n05/01/2024,กข-1234\n".repeat(10);
        assert!(validate_file_content(valid_text.as_bytes(), true).is_ok());

        // Too much binary data for text format
        let binary_data = vec![0u8; 1000];
        assert!(validate_file_content(&binary_data, true).is_err());

        assert!(validate_file_content(b"", true).is_err());
    }

    #[test]
    fn test_validate_file_content_binary() {
        let binary_data = vec![0xABu8; 100];
        assert!(validate_file_content(&binary_data, false).is_ok());

        assert!(validate_file_content(b"", false).is_err());
    }

    #[test]
    fn test_validate_upload_complete() {
        let csv = b"TranDate,reg\n05/01/2024,AB-123\n";

        let upload = validate_upload(Some("fuel.csv"), csv).unwrap();
        assert_eq!(upload.filename.as_deref(), Some("fuel.csv"));
        assert_eq!(upload.format, TableFormat::Csv);

        let upload = validate_upload(None, csv).unwrap();
        assert!(upload.filename.is_none());

        assert!(matches!(
            validate_upload(Some("../etc/passwd"), csv),
            Err(ValidationError::InvalidFilename)
        ));

        // Text posing as a workbook
        assert!(matches!(
            validate_upload(Some("fuel.xlsx"), csv),
            Err(ValidationError::FormatValidationFailed)
        ));

        assert!(matches!(
            validate_upload(Some("fuel.csv"), b""),
            Err(ValidationError::InvalidFileContent)
        ));
    }

    #[test]
    fn test_has_known_extension() {
        assert!(has_known_extension(".xlsx"));
        assert!(has_known_extension("trips.CSV"));
        assert!(has_known_extension(".tsv"));

        assert!(!has_known_extension(".exe"));
        assert!(!has_known_extension(".hidden"));
        assert!(!has_known_extension(".config"));
    }
}
