//! In-memory uploader for tests and local development

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use super::{UploadError, UploadFile, UploadedFile, Uploader};

/// Keeps uploaded files in a map and hands out `memory://` URLs
#[derive(Debug, Default)]
pub struct MemoryUploader {
    files: Mutex<HashMap<String, UploadFile>>,
    fail_with: Option<String>,
    delay: Option<Duration>,
}

impl MemoryUploader {
    pub fn new() -> Self {
        Self::default()
    }

    /// An uploader that rejects every file
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            fail_with: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Sleep before answering, to simulate a slow service
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get a stored file by key
    pub fn get(&self, key: &str) -> Option<UploadFile> {
        self.files.lock().unwrap().get(key).cloned()
    }

    /// Get number of stored files
    pub fn len(&self) -> usize {
        self.files.lock().unwrap().len()
    }

    /// Check if nothing has been uploaded
    pub fn is_empty(&self) -> bool {
        self.files.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl Uploader for MemoryUploader {
    async fn upload(&self, file: UploadFile) -> Result<Vec<UploadedFile>, UploadError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(reason) = &self.fail_with {
            return Err(UploadError::Rejected(reason.clone()));
        }

        let key = uuid::Uuid::new_v4().simple().to_string();
        let uploaded = UploadedFile {
            key: key.clone(),
            name: file.name.clone(),
            size: file.size(),
            url: format!("memory://{}/{}", key, file.name),
            app_url: None,
        };

        self.files.lock().unwrap().insert(key, file);
        Ok(vec![uploaded])
    }
}
