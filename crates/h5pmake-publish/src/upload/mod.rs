//! Upload abstraction for finished packages

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod memory;

pub use memory::MemoryUploader;

// UploadThing implementation
#[cfg(feature = "uploadthing")]
pub mod uploadthing;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Upload rejected: {0}")]
    Rejected(String),

    #[error("Upload backend error: {0}")]
    Backend(String),

    #[error("Upload timed out after {0} seconds")]
    Timeout(u64),

    #[error("Upload returned no files")]
    Empty,

    #[error("Invalid upload credentials: {0}")]
    Credentials(String),
}

/// A named byte buffer handed to an uploader
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// A file the hosting service has accepted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub key: String,
    pub name: String,
    pub size: usize,
    /// Publicly resolvable download URL
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_url: Option<String>,
}

/// Abstraction over file-hosting backends
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Upload one file and return what the service reports back
    async fn upload(&self, file: UploadFile) -> Result<Vec<UploadedFile>, UploadError>;
}
