//! # h5pmake publish
//!
//! Runs the full package pipeline for one request and uploads the result:
//! - validates the request before any file I/O
//! - loads and fills the stock template via [`h5pmake`]
//! - packages it in a per-request scratch workspace
//! - hands the archive to an [`Uploader`] and returns the download link
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use h5pmake::{Packager, RequestPayload, TemplateLoader};
//! use h5pmake_publish::{MemoryUploader, Publisher};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let publisher = Publisher::new(
//!     TemplateLoader::new("templates"),
//!     Packager::new(std::env::temp_dir()),
//!     Arc::new(MemoryUploader::new()),
//!     Duration::from_secs(60),
//! );
//!
//! let request = RequestPayload::text("Weather", "Fill the gaps", "It is *sunny* today");
//! let publication = publisher.generate(request).await?;
//! println!("Download at {}", publication.url);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod publisher;
pub mod upload;

pub use error::{PublishError, Result};
pub use publisher::{Publication, Publisher};
pub use upload::{MemoryUploader, UploadError, UploadFile, UploadedFile, Uploader};

#[cfg(feature = "uploadthing")]
pub use upload::uploadthing::UploadThing;
