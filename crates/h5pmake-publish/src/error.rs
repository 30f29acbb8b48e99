//! Error types for the publish pipeline

use h5pmake::{H5pError, ValidationError};
use thiserror::Error;

use crate::upload::UploadError;

/// Pipeline errors, one per failure class the HTTP layer distinguishes
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Packaging failed: {0}")]
    PackagingFailed(String),

    #[error("Upload failed: {0}")]
    UploadFailed(#[from] UploadError),
}

impl From<H5pError> for PublishError {
    fn from(error: H5pError) -> Self {
        match error {
            H5pError::Validation(e) => PublishError::Validation(e),
            H5pError::Template(e) => PublishError::TemplateNotFound(e.to_string()),
            other => PublishError::PackagingFailed(other.to_string()),
        }
    }
}

impl PublishError {
    /// True when the caller sent bad input
    pub fn is_client_error(&self) -> bool {
        matches!(self, PublishError::Validation(_))
    }
}

/// Result type for publish operations
pub type Result<T> = std::result::Result<T, PublishError>;

#[cfg(test)]
mod tests {
    use super::*;
    use h5pmake::{PackagingError, TemplateError};

    #[test]
    fn test_core_error_mapping() {
        let err: PublishError = H5pError::from(ValidationError::new("text", "must not be empty")).into();
        assert!(err.is_client_error());

        let err: PublishError = H5pError::Template(TemplateError::NotFound {
            path: "templates/crossword/h5p.json".into(),
        })
        .into();
        assert!(matches!(err, PublishError::TemplateNotFound(_)));
        assert!(!err.is_client_error());

        let err: PublishError = H5pError::Packaging(PackagingError::Archive("bad entry".into())).into();
        assert!(matches!(err, PublishError::PackagingFailed(_)));
        assert!(!err.is_client_error());
    }
}
