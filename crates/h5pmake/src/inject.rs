//! Field injection: overlay a validated request onto a loaded template.

use crate::content::RequestPayload;
use crate::descriptor::{ContentDescriptor, Manifest};
use crate::error::Result;
use crate::template::LoadedTemplate;

/// Updated copies of the two package files, ready to be written out
#[derive(Debug, Clone, PartialEq)]
pub struct InjectedContent {
    pub manifest: Manifest,
    pub descriptor: ContentDescriptor,
}

impl InjectedContent {
    /// The template's own files, for repackaging a stock template unchanged
    pub fn unmodified(template: &LoadedTemplate) -> Self {
        Self {
            manifest: template.manifest.clone(),
            descriptor: template.descriptor.clone(),
        }
    }
}

/// Pure transform; never touches the filesystem.
///
/// Sets the manifest title, the HTML task description and the
/// content-specific payload field. Everything else is copied through.
pub fn inject(template: &LoadedTemplate, request: &RequestPayload) -> Result<InjectedContent> {
    let mut manifest = template.manifest.clone();
    let mut descriptor = template.descriptor.clone();

    manifest.set_title(&request.title);
    descriptor.set_task_description(&request.description);
    descriptor.overlay(&request.payload)?;

    Ok(InjectedContent {
        manifest,
        descriptor,
    })
}
