//! Error types for the filter pipeline

use thiserror::Error;

/// Fatal error for one filter request
#[derive(Debug, Error)]
pub enum SiftError {
    /// The request itself is unusable; reported back to the caller as-is
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The upload could not be opened as a workbook
    #[error("Failed to read workbook: {0}")]
    Workbook(#[from] calamine::XlsxError),

    #[error("Failed to read workbook archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("XML parsing error in {part}: {source}")]
    Xml {
        part: String,
        #[source]
        source: quick_xml::Error,
    },

    /// The output workbook could not be built
    #[error("Failed to write workbook: {0}")]
    Encode(#[from] rust_xlsxwriter::XlsxError),

    #[error("Failed to serialize projection: {0}")]
    Json(#[from] serde_json::Error),
}

/// Request validation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("No file uploaded")]
    NoFile,
    #[error("Worksheet is empty")]
    EmptyWorksheet,
    #[error("ColumnName is required")]
    ColumnNameRequired,
    #[error("Column '{0}' not found")]
    ColumnNotFound(String),
}

/// Failure to recover the payload of a single image anchor.
///
/// Never fatal: the anchor is skipped and the request goes on.
#[derive(Debug, Error)]
pub enum AnchorError {
    #[error("picture has no embedded image reference")]
    MissingEmbed,
    #[error("relationship {0} does not resolve to an image part")]
    UnresolvedRelationship(String),
    #[error("image part {path} could not be read: {reason}")]
    UnreadablePart { path: String, reason: String },
    #[error("image part {0} is empty")]
    EmptyPayload(String),
}

pub type Result<T> = std::result::Result<T, SiftError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages() {
        assert_eq!(ValidationError::NoFile.to_string(), "No file uploaded");
        assert_eq!(
            ValidationError::ColumnNameRequired.to_string(),
            "ColumnName is required"
        );
        assert_eq!(
            ValidationError::ColumnNotFound("Dept".to_string()).to_string(),
            "Column 'Dept' not found"
        );
    }

    #[test]
    fn test_validation_is_transparent() {
        let err: SiftError = ValidationError::EmptyWorksheet.into();
        assert_eq!(err.to_string(), "Worksheet is empty");
    }
}
