//! End-to-end pipeline: validate, load, inject, package, upload

use std::sync::Arc;
use std::time::Duration;

use h5pmake::{
    ContentType, GENERATED_FILE_NAME, InjectedContent, LoadedTemplate, Packager, RequestPayload,
    TemplateLoader, inject,
};
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::error::{PublishError, Result};
use crate::upload::{UploadError, UploadFile, UploadedFile, Uploader};

/// Where a published package can be downloaded from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Publication {
    pub url: String,
    pub key: String,
    pub file_name: String,
    pub size: usize,
}

/// Runs the package pipeline for one request at a time.
///
/// Holds no per-request state, so one instance is shared by all requests.
#[derive(Clone)]
pub struct Publisher {
    loader: TemplateLoader,
    packager: Packager,
    uploader: Arc<dyn Uploader>,
    upload_timeout: Duration,
}

impl Publisher {
    pub fn new(
        loader: TemplateLoader,
        packager: Packager,
        uploader: Arc<dyn Uploader>,
        upload_timeout: Duration,
    ) -> Self {
        Self {
            loader,
            packager,
            uploader,
            upload_timeout,
        }
    }

    pub fn loader(&self) -> &TemplateLoader {
        &self.loader
    }

    pub fn packager(&self) -> &Packager {
        &self.packager
    }

    /// Build a package from user input and upload it
    pub async fn generate(&self, request: RequestPayload) -> Result<Publication> {
        let content_type = request.content_type();
        let start_time = Instant::now();

        // nothing touches the filesystem before this passes
        request.validate()?;

        let template = self.load(content_type).await?;
        let content = inject(&template, &request)?;
        debug!("Injected request into {} template", content_type);

        let publication = self
            .package_and_upload(&template, &content, GENERATED_FILE_NAME)
            .await?;

        info!(
            "Generated {} package {} in {}ms",
            content_type,
            publication.key,
            start_time.elapsed().as_millis()
        );
        Ok(publication)
    }

    /// Repackage a stock template unchanged and upload it
    pub async fn premade(&self, content_type: ContentType) -> Result<Publication> {
        let template = self.load(content_type).await?;
        let content = InjectedContent::unmodified(&template);
        let file_name = format!("{}.{}", content_type.template_dir(), h5pmake::package::H5P_EXTENSION);

        let publication = self.package_and_upload(&template, &content, &file_name).await?;
        info!("Published premade {} package {}", content_type, publication.key);
        Ok(publication)
    }

    async fn load(&self, content_type: ContentType) -> Result<LoadedTemplate> {
        self.loader.load(content_type).await.map_err(|e| {
            error!("Failed to load {} template: {}", content_type, e);
            PublishError::from(e)
        })
    }

    async fn package_and_upload(
        &self,
        template: &LoadedTemplate,
        content: &InjectedContent,
        file_name: &str,
    ) -> Result<Publication> {
        let content_type = template.content_type;
        let (workspace, archive) = self
            .packager
            .package(template, content, file_name)
            .await
            .map_err(|e| {
                error!("Failed to package {} content: {}", content_type, e);
                PublishError::PackagingFailed(e.to_string())
            })?;

        let file = UploadFile::new(archive.file_name, archive.mime_type, archive.bytes);
        let uploaded = self.upload(file).await;

        // released on every path, success or not
        if let Err(e) = workspace.close().await {
            warn!("Failed to remove scratch workspace: {}", e);
        }

        let uploaded = uploaded.map_err(|e| {
            error!("Failed to upload {} package: {}", content_type, e);
            PublishError::UploadFailed(e)
        })?;

        Ok(Publication {
            url: uploaded.url,
            key: uploaded.key,
            file_name: uploaded.name,
            size: uploaded.size,
        })
    }

    async fn upload(&self, file: UploadFile) -> std::result::Result<UploadedFile, UploadError> {
        let results = tokio::time::timeout(self.upload_timeout, self.uploader.upload(file))
            .await
            .map_err(|_| UploadError::Timeout(self.upload_timeout.as_secs()))??;

        results.into_iter().next().ok_or(UploadError::Empty)
    }
}
