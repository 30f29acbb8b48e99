//! h5pmake fills stock H5P content templates with user data and
//! repackages them as `.h5p` archives.
//!
//! The work is split into three stages:
//! - [`template::TemplateLoader`] reads a stock template into memory
//! - [`inject::inject`] overlays the user's fields onto it
//! - [`package::Packager`] writes the result into a scratch workspace and zips it

pub mod content;
pub mod descriptor;
pub mod error;
pub mod inject;
pub mod package;
pub mod template;

// Re-export core types
pub use content::{ContentPayload, ContentType, MIN_WORD_ENTRIES, Orientation, RequestPayload, WordEntry};
pub use descriptor::{ContentDescriptor, CrosswordDescriptor, DragWordsDescriptor, Manifest};
pub use error::{
    DataError, H5pError, PackagingError, Result, TemplateError, ValidationError, template_not_found,
};
pub use inject::{InjectedContent, inject};
pub use package::{
    ArchiveEntry, GENERATED_FILE_NAME, H5P_MIME_TYPE, PackagedArchive, Packager, ScratchWorkspace,
    unpack_entries,
};
pub use template::{LoadedTemplate, TemplateLoader};
