//! Packaging of injected templates into `.h5p` archives
//!
//! All writes happen inside a per-call scratch workspace; the stock
//! template directory is only ever read. An `.h5p` file is a plain zip
//! container with a different extension.

use std::fs::{self, File};
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

use crate::error::{PackagingError, Result};
use crate::inject::InjectedContent;
use crate::template::{CONTENT_FILE, LoadedTemplate, MANIFEST_FILE};

/// MIME type used for uploads
pub const H5P_MIME_TYPE: &str = "application/h5p";

/// File extension of a content package
pub const H5P_EXTENSION: &str = "h5p";

/// File name used for packages built from user input
pub const GENERATED_FILE_NAME: &str = "modified-content.h5p";

const STAGE_DIR: &str = "stage";

/// Maximum deflate level
const COMPRESSION_LEVEL: i32 = 9;

/// A uniquely named temporary directory owned by one request.
///
/// Removed when dropped; `close` does the same but reports failures.
#[derive(Debug)]
pub struct ScratchWorkspace {
    dir: TempDir,
}

impl ScratchWorkspace {
    /// Create a fresh workspace below `scratch_root`.
    ///
    /// Blocking; async callers go through `spawn_blocking`.
    pub fn create(scratch_root: &Path) -> Result<Self> {
        fs::create_dir_all(scratch_root).map_err(|e| {
            PackagingError::Workspace(format!("{}: {}", scratch_root.display(), e))
        })?;
        let dir = tempfile::Builder::new()
            .prefix("h5pmake-")
            .tempdir_in(scratch_root)
            .map_err(|e| PackagingError::Workspace(format!("{}: {}", scratch_root.display(), e)))?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Directory holding the copied and modified template tree
    pub fn stage_dir(&self) -> PathBuf {
        self.dir.path().join(STAGE_DIR)
    }

    /// Remove the workspace now, off the async worker threads
    pub async fn close(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        tokio::task::spawn_blocking(move || self.dir.close())
            .await?
            .map_err(|e| {
                PackagingError::Workspace(format!("failed to remove {}: {}", path.display(), e))
            })?;
        Ok(())
    }
}

/// A finished package, alive until it has been handed to the uploader
#[derive(Debug, Clone)]
pub struct PackagedArchive {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl PackagedArchive {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Builds `.h5p` archives from loaded templates
#[derive(Debug, Clone)]
pub struct Packager {
    scratch_root: PathBuf,
}

impl Packager {
    pub fn new(scratch_root: impl Into<PathBuf>) -> Self {
        Self {
            scratch_root: scratch_root.into(),
        }
    }

    /// Copy the template into a new workspace, write the injected files,
    /// and archive the result.
    ///
    /// The workspace is returned alongside the archive so the caller decides
    /// when it goes away. On error it has already been removed.
    pub async fn package(
        &self,
        template: &LoadedTemplate,
        content: &InjectedContent,
        file_name: &str,
    ) -> Result<(ScratchWorkspace, PackagedArchive)> {
        let manifest = serde_json::to_string_pretty(&content.manifest)?;
        let descriptor = serde_json::to_string_pretty(&content.descriptor.to_value())?;

        let scratch_root = self.scratch_root.clone();
        let source = template.root.clone();
        let content_type = template.content_type;
        let name = file_name.to_string();

        let (workspace, bytes) = tokio::task::spawn_blocking(move || -> Result<(ScratchWorkspace, Vec<u8>)> {
            let workspace = ScratchWorkspace::create(&scratch_root)?;
            let work_dir = workspace.path().to_path_buf();
            debug!("Packaging {} in {}", content_type, work_dir.display());

            let stage = work_dir.join(STAGE_DIR);
            copy_tree(&source, &stage)?;
            write_file(&stage.join(MANIFEST_FILE), manifest.as_bytes())?;
            write_file(&stage.join(CONTENT_FILE), descriptor.as_bytes())?;

            let zip_path = work_dir.join(Path::new(&name).with_extension("zip"));
            write_archive(&stage, &zip_path)?;

            // same bytes, H5P file name
            let h5p_path = work_dir.join(&name);
            fs::rename(&zip_path, &h5p_path).map_err(|e| PackagingError::Write {
                path: h5p_path.display().to_string(),
                reason: e.to_string(),
            })?;
            let bytes = fs::read(&h5p_path).map_err(|e| PackagingError::Write {
                path: h5p_path.display().to_string(),
                reason: e.to_string(),
            })?;
            Ok((workspace, bytes))
        })
        .await??;

        debug!("Packaged {} ({} bytes)", file_name, bytes.len());

        Ok((
            workspace,
            PackagedArchive {
                file_name: file_name.to_string(),
                mime_type: H5P_MIME_TYPE,
                bytes,
            },
        ))
    }
}

/// Recursively copy `source` into `dest`, creating `dest`
fn copy_tree(source: &Path, dest: &Path) -> Result<()> {
    for entry in WalkDir::new(source).follow_links(true).sort_by_file_name() {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| PackagingError::Copy {
                path: entry.path().display().to_string(),
                reason: e.to_string(),
            })?;
        let target = dest.join(relative);

        let copied = if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
        } else {
            fs::copy(entry.path(), &target).map(|_| ())
        };
        copied.map_err(|e| PackagingError::Copy {
            path: entry.path().display().to_string(),
            reason: e.to_string(),
        })?;
    }
    Ok(())
}

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| PackagingError::Write {
            path: parent.display().to_string(),
            reason: e.to_string(),
        })?;
    }
    fs::write(path, contents).map_err(|e| PackagingError::Write {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(())
}

/// Zip every directory and file below `source` into `dest`.
///
/// Entry names are relative to `source` and `/`-separated. Timestamps are
/// pinned so identical trees produce identical archives.
pub fn write_archive(source: &Path, dest: &Path) -> Result<()> {
    let file = File::create(dest).map_err(|e| PackagingError::Write {
        path: dest.display().to_string(),
        reason: e.to_string(),
    })?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(COMPRESSION_LEVEL))
        .last_modified_time(DateTime::default());

    for entry in WalkDir::new(source).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        let name = archive_name(source, entry.path())?;

        if entry.file_type().is_dir() {
            zip.add_directory(name, options)?;
        } else if entry.file_type().is_file() {
            zip.start_file(name, options)?;
            let mut input = File::open(entry.path()).map_err(|e| PackagingError::Copy {
                path: entry.path().display().to_string(),
                reason: e.to_string(),
            })?;
            std::io::copy(&mut input, &mut zip).map_err(|e| PackagingError::Archive(e.to_string()))?;
        } else {
            warn!("Skipping special file {}", entry.path().display());
        }
    }

    let mut file = zip.finish()?;
    file.flush()
        .map_err(|e| PackagingError::Archive(e.to_string()))?;
    Ok(())
}

fn archive_name(root: &Path, path: &Path) -> Result<String> {
    let relative = path.strip_prefix(root).map_err(|e| PackagingError::Archive(e.to_string()))?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}

/// One entry of an unpacked archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Entry name without the trailing `/` of directories
    pub name: String,
    pub is_dir: bool,
    pub contents: Vec<u8>,
}

/// Read every entry of an archive, in archive order
pub fn unpack_entries(bytes: &[u8]) -> Result<Vec<ArchiveEntry>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut entries = Vec::with_capacity(archive.len());

    for index in 0..archive.len() {
        let mut file = archive.by_index(index)?;
        let is_dir = file.is_dir();
        let name = file.name().trim_end_matches('/').to_string();
        let mut contents = Vec::new();
        if !is_dir {
            file.read_to_end(&mut contents)
                .map_err(|e| PackagingError::Archive(e.to_string()))?;
        }
        entries.push(ArchiveEntry {
            name,
            is_dir,
            contents,
        });
    }

    Ok(entries)
}
