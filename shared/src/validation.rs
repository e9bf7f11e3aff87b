//! Input validation functions
//!
//! Rules for book uploads. Registration input is validated through the
//! `validator` derive on [`crate::types::RegisterRequest`].

use crate::errors::FieldError;

/// Only PDF uploads are accepted
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Minimum description length, in characters
pub const MIN_DESCRIPTION_LEN: usize = 10;

/// Validate a book title
pub fn validate_title(title: &str) -> Result<(), FieldError> {
    if title.trim().is_empty() {
        return Err(FieldError::new("title", "Title is required"));
    }
    if title.chars().count() > 300 {
        return Err(FieldError::new("title", "Title too long"));
    }
    Ok(())
}

/// Validate a book description
pub fn validate_description(description: &str) -> Result<(), FieldError> {
    if description.trim().is_empty() {
        return Err(FieldError::new("description", "Description is required"));
    }
    if description.chars().count() < MIN_DESCRIPTION_LEN {
        return Err(FieldError::new(
            "description",
            "Description should be at least 10 characters long",
        ));
    }
    Ok(())
}

/// Validate an uploaded file's declared type and size
pub fn validate_pdf_upload(content_type: Option<&str>, size: usize) -> Result<(), FieldError> {
    if size < 1 {
        return Err(FieldError::new(
            "file",
            "File size should be greater than 1 bytes",
        ));
    }
    // Ignore parameters such as `; charset=binary`
    let mime = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase());
    match mime.as_deref() {
        Some(PDF_MIME_TYPE) => Ok(()),
        Some(_) => Err(FieldError::new("mimetype", "File must be a pdf file")),
        None => Err(FieldError::new(
            "mimetype",
            "File mimetype is required and should be of type application/pdf",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("Dune", true)]
    #[case("   ", false)]
    #[case("", false)]
    fn test_validate_title(#[case] title: &str, #[case] ok: bool) {
        assert_eq!(validate_title(title).is_ok(), ok);
    }

    #[rstest]
    #[case("A desert planet saga", true)]
    #[case("0123456789", true)]
    #[case("too short", false)]
    #[case("", false)]
    fn test_validate_description(#[case] description: &str, #[case] ok: bool) {
        assert_eq!(validate_description(description).is_ok(), ok);
    }

    #[rstest]
    #[case(Some("application/pdf"), 10, true)]
    #[case(Some("Application/PDF; charset=binary"), 10, true)]
    #[case(Some("image/png"), 10, false)]
    #[case(None, 10, false)]
    #[case(Some("application/pdf"), 0, false)]
    fn test_validate_pdf_upload(
        #[case] content_type: Option<&str>,
        #[case] size: usize,
        #[case] ok: bool,
    ) {
        assert_eq!(validate_pdf_upload(content_type, size).is_ok(), ok);
    }

    #[test]
    fn test_wrong_mime_reports_mimetype_field() {
        let err = validate_pdf_upload(Some("text/plain"), 3).unwrap_err();
        assert_eq!(err.field, "mimetype");
        assert_eq!(err.message, "File must be a pdf file");
    }

    proptest! {
        #[test]
        fn prop_descriptions_of_ten_or_more_chars_pass(s in "[a-zA-Z]{10,200}") {
            prop_assert!(validate_description(&s).is_ok());
        }

        #[test]
        fn prop_short_descriptions_fail(s in "[a-zA-Z]{1,9}") {
            prop_assert!(validate_description(&s).is_err());
        }
    }
}
