// file: src/utils/validation.rs
// description: request and file validation helpers
// reference: input validation patterns

use crate::error::{RepositoryError, Result};
use crate::models::DocumentId;
use std::path::Path;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

pub struct Validator;

impl Validator {
    /// Trimmed serial, or `InvalidInput` when it is missing or blank.
    pub fn validate_serial(serial: Option<&str>) -> Result<String> {
        match serial.map(str::trim) {
            Some(serial) if !serial.is_empty() => Ok(serial.to_string()),
            _ => Err(RepositoryError::InvalidInput(
                "Query parameter 'serial' is required".to_string(),
            )),
        }
    }

    pub fn parse_document_id(raw: &str) -> Result<DocumentId> {
        match raw.trim().parse::<DocumentId>() {
            Ok(id) if id > 0 => Ok(id),
            _ => Err(RepositoryError::InvalidInput(format!(
                "Invalid document id: {}",
                raw
            ))),
        }
    }

    /// Parses a page number. Zero parses fine; range checks belong to the lookup.
    pub fn parse_page_number(raw: &str) -> Result<u32> {
        raw.trim().parse::<u32>().map_err(|_| {
            RepositoryError::InvalidInput(format!("Invalid page number: {}", raw))
        })
    }

    pub fn validate_pdf_upload(
        content_type: Option<&str>,
        size: usize,
        max_bytes: usize,
    ) -> Result<()> {
        let is_pdf = content_type
            .map(|ct| ct.split(';').next().unwrap_or("").trim())
            .is_some_and(|ct| ct.eq_ignore_ascii_case(PDF_CONTENT_TYPE));
        if !is_pdf {
            return Err(RepositoryError::InvalidInput(
                "Only PDF files are accepted".to_string(),
            ));
        }

        if size == 0 {
            return Err(RepositoryError::InvalidInput(
                "Uploaded file is empty".to_string(),
            ));
        }

        if size > max_bytes {
            return Err(RepositoryError::InvalidInput(format!(
                "File too large ({} bytes, max {})",
                size, max_bytes
            )));
        }

        Ok(())
    }

    pub fn validate_directory(path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(RepositoryError::InvalidInput(format!(
                "Directory does not exist: {}",
                path.display()
            )));
        }

        if !path.is_dir() {
            return Err(RepositoryError::InvalidInput(format!(
                "Path is not a directory: {}",
                path.display()
            )));
        }

        Ok(())
    }

    pub fn is_pdf_path(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
    }

    /// Keeps only the final path segment of a client-supplied file name.
    pub fn sanitize_file_name(name: &str) -> String {
        let base = name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or("")
            .trim();

        if base.is_empty() {
            "documento.pdf".to_string()
        } else {
            base.to_string()
        }
    }

    pub fn truncate_text(text: &str, max_chars: usize) -> String {
        if text.chars().count() <= max_chars {
            text.to_string()
        } else {
            let head: String = text.chars().take(max_chars).collect();
            format!("{}...", head)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_validate_serial() {
        assert_eq!(Validator::validate_serial(Some(" 123 ")).unwrap(), "123");
        assert!(Validator::validate_serial(Some("   ")).is_err());
        assert!(Validator::validate_serial(None).is_err());
    }

    #[test]
    fn test_parse_document_id() {
        assert_eq!(Validator::parse_document_id("42").unwrap(), 42);
        assert!(Validator::parse_document_id("0").is_err());
        assert!(Validator::parse_document_id("-3").is_err());
        assert!(Validator::parse_document_id("abc").is_err());
    }

    #[test]
    fn test_parse_page_number() {
        assert_eq!(Validator::parse_page_number("3").unwrap(), 3);
        assert_eq!(Validator::parse_page_number("0").unwrap(), 0);
        assert!(Validator::parse_page_number("abc").is_err());
        assert!(Validator::parse_page_number("-1").is_err());
    }

    #[test]
    fn test_validate_pdf_upload() {
        let max = 1024;
        assert!(Validator::validate_pdf_upload(Some("application/pdf"), 10, max).is_ok());
        assert!(Validator::validate_pdf_upload(Some("application/PDF; charset=binary"), 10, max).is_ok());
        assert!(Validator::validate_pdf_upload(Some("image/png"), 10, max).is_err());
        assert!(Validator::validate_pdf_upload(None, 10, max).is_err());
        assert!(Validator::validate_pdf_upload(Some("application/pdf"), 0, max).is_err());
        assert!(Validator::validate_pdf_upload(Some("application/pdf"), 2048, max).is_err());
    }

    #[test]
    fn test_validate_directory() {
        let temp = TempDir::new().unwrap();
        assert!(Validator::validate_directory(temp.path()).is_ok());
        assert!(Validator::validate_directory(Path::new("/nonexistent/dir")).is_err());
    }

    #[test]
    fn test_is_pdf_path() {
        assert!(Validator::is_pdf_path(Path::new("a/b/manual.PDF")));
        assert!(!Validator::is_pdf_path(Path::new("notes.txt")));
        assert!(!Validator::is_pdf_path(Path::new("pdf")));
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(Validator::sanitize_file_name("C:\\docs\\acta.pdf"), "acta.pdf");
        assert_eq!(Validator::sanitize_file_name("../../etc/x.pdf"), "x.pdf");
        assert_eq!(Validator::sanitize_file_name("  "), "documento.pdf");
        assert_eq!(Validator::sanitize_file_name("dir/"), "documento.pdf");
    }

    #[test]
    fn test_truncate_text_is_char_safe() {
        assert_eq!(Validator::truncate_text("short", 10), "short");
        assert_eq!(Validator::truncate_text("ñandú veloz", 5), "ñandú...");
    }
}
