//! Server configuration management

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::{ApiError, Result};

/// Server configuration
#[derive(Debug)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Directory holding the stock templates
    pub templates_dir: PathBuf,

    /// Where per-request scratch workspaces are created
    pub scratch_dir: PathBuf,

    /// Upper bound on a single upload call
    pub upload_timeout_seconds: u64,

    /// CORS allowed origins
    pub cors_origins: Vec<String>,

    /// UploadThing credential, required at startup
    pub upload_token: SecretString,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let upload_token = std::env::var("UPLOADTHING_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ApiError::Config("UPLOADTHING_TOKEN is not set".to_string()))?;

        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| ApiError::Config("Invalid PORT value".to_string()))?,
            templates_dir: std::env::var("TEMPLATES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("templates")),
            scratch_dir: std::env::var("SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| std::env::temp_dir()),
            upload_timeout_seconds: std::env::var("UPLOAD_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .map_err(|_| ApiError::Config("Invalid UPLOAD_TIMEOUT_SECONDS value".to_string()))?,
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            upload_token: SecretString::from(upload_token),
        })
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_seconds)
    }
}
