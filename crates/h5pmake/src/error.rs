//! Error types for the h5pmake library
//!
//! Errors are grouped by the pipeline stage that raises them so callers can
//! tell user mistakes (validation) apart from deployment or I/O problems.

use thiserror::Error;

/// Main error type for the h5pmake library
#[derive(Error, Debug)]
pub enum H5pError {
    /// The submitted payload was rejected before any file I/O happened
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Template lookup and parsing errors
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    /// Scratch workspace, copy and archive errors
    #[error("Packaging error: {0}")]
    Packaging(#[from] PackagingError),

    /// JSON serialization errors
    #[error("Data error: {0}")]
    Data(#[from] DataError),
}

/// A rejected field of a request payload
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Template-related errors
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template not found: {path}")]
    NotFound { path: String },

    #[error("Invalid template structure: {path} - {message}")]
    InvalidStructure { path: String, message: String },

    #[error("Unknown content type: {0}")]
    UnknownContentType(String),
}

/// Packaging errors
///
/// Any of these abort the pipeline; the scratch workspace is still removed.
#[derive(Error, Debug)]
pub enum PackagingError {
    #[error("Failed to create scratch workspace: {0}")]
    Workspace(String),

    #[error("Failed to copy {path}: {reason}")]
    Copy { path: String, reason: String },

    #[error("Failed to write {path}: {reason}")]
    Write { path: String, reason: String },

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Packaging task failed: {0}")]
    Task(String),
}

/// Data serialization errors
#[derive(Error, Debug)]
pub enum DataError {
    #[error("JSON serialization failed: {reason}")]
    Serialization { reason: String },

    #[error("JSON deserialization failed: {reason}")]
    Deserialization { reason: String },
}

/// Shorthand result type for h5pmake operations
pub type Result<T> = std::result::Result<T, H5pError>;

/// Create a template error for a missing file
pub fn template_not_found<S: Into<String>>(path: S) -> H5pError {
    H5pError::Template(TemplateError::NotFound { path: path.into() })
}

// ============================================================================
// From Implementations for External Error Types
// ============================================================================

/// I/O failures outside the loader only happen while packaging
impl From<std::io::Error> for H5pError {
    fn from(error: std::io::Error) -> Self {
        H5pError::Packaging(PackagingError::Write {
            path: "<unknown>".to_string(),
            reason: error.to_string(),
        })
    }
}

impl From<serde_json::Error> for H5pError {
    fn from(error: serde_json::Error) -> Self {
        let reason = error.to_string();
        if error.is_syntax() || error.is_data() || error.is_eof() {
            H5pError::Data(DataError::Deserialization { reason })
        } else {
            H5pError::Data(DataError::Serialization { reason })
        }
    }
}

impl From<zip::result::ZipError> for H5pError {
    fn from(error: zip::result::ZipError) -> Self {
        H5pError::Packaging(PackagingError::Archive(error.to_string()))
    }
}

impl From<walkdir::Error> for H5pError {
    fn from(error: walkdir::Error) -> Self {
        let path = error
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<unknown>".to_string());
        H5pError::Packaging(PackagingError::Copy {
            path,
            reason: error.to_string(),
        })
    }
}

impl From<tokio::task::JoinError> for H5pError {
    fn from(error: tokio::task::JoinError) -> Self {
        H5pError::Packaging(PackagingError::Task(error.to_string()))
    }
}

// ============================================================================
// Error Helper Functions
// ============================================================================

impl H5pError {
    /// True when the caller sent bad input rather than the server failing
    pub fn is_client_error(&self) -> bool {
        matches!(self, H5pError::Validation(_))
    }

    /// True when a stock template is missing or unreadable
    pub fn is_template_missing(&self) -> bool {
        matches!(
            self,
            H5pError::Template(TemplateError::NotFound { .. })
                | H5pError::Template(TemplateError::InvalidStructure { .. })
        )
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            H5pError::Validation(e) => e.to_string(),
            _ => "processing failed".to_string(),
        }
    }
}
