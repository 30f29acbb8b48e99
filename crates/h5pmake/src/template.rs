//! Stock template loading
//!
//! A template is a directory laid out like an unpacked `.h5p` file:
//!
//! ```text
//! <root>/<template_dir>/
//!     h5p.json
//!     content/content.json
//!     ...any libraries or media, copied as-is
//! ```

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tokio::fs;
use tracing::debug;

use crate::content::ContentType;
use crate::descriptor::{ContentDescriptor, Manifest};
use crate::error::{H5pError, Result, TemplateError, template_not_found};

/// Manifest path, relative to the template directory
pub const MANIFEST_FILE: &str = "h5p.json";

/// Content descriptor path, relative to the template directory
pub const CONTENT_FILE: &str = "content/content.json";

/// A stock template read into memory
#[derive(Debug, Clone)]
pub struct LoadedTemplate {
    pub content_type: ContentType,
    /// Directory whose whole tree ends up in the package
    pub root: PathBuf,
    pub manifest: Manifest,
    pub descriptor: ContentDescriptor,
}

/// Locates and parses stock templates below a templates root
#[derive(Debug, Clone)]
pub struct TemplateLoader {
    root: PathBuf,
}

impl TemplateLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory of the template for a content type
    pub fn template_path(&self, content_type: ContentType) -> PathBuf {
        self.root.join(content_type.template_dir())
    }

    /// Load the manifest and content descriptor of a template. Read-only.
    pub async fn load(&self, content_type: ContentType) -> Result<LoadedTemplate> {
        let root = self.template_path(content_type);
        debug!("Loading {} template from {}", content_type, root.display());

        let manifest = read_object(&root.join(MANIFEST_FILE)).await?;
        let descriptor = read_object(&root.join(CONTENT_FILE)).await?;

        Ok(LoadedTemplate {
            content_type,
            root,
            manifest: Manifest::new(manifest),
            descriptor: ContentDescriptor::from_fields(content_type, descriptor),
        })
    }
}

async fn read_object(path: &Path) -> Result<Map<String, Value>> {
    let raw = match fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(template_not_found(path.display().to_string()));
        }
        Err(e) => {
            return Err(H5pError::Template(TemplateError::InvalidStructure {
                path: path.display().to_string(),
                message: e.to_string(),
            }));
        }
    };

    let invalid = |message: String| {
        H5pError::Template(TemplateError::InvalidStructure {
            path: path.display().to_string(),
            message,
        })
    };

    match serde_json::from_str::<Value>(&raw).map_err(|e| invalid(e.to_string()))? {
        Value::Object(map) => Ok(map),
        _ => Err(invalid("expected a JSON object".to_string())),
    }
}
