//! File system abstraction for testability.
//!
//! The record cache only needs a handful of operations: stat a file for its
//! modification time, read it, and replace it atomically. They are collected
//! in the [`FileSystem`] trait so the cache can be driven against a fake in
//! tests.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use crate::error::{Error, ErrorContext, FileSystemError, Result};

/// Distinguishes concurrent temp files written by the same process.
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Converts an I/O error for directory creation.
fn create_dir_error(path: &Path, e: io::Error) -> Error {
    Error::FileSystem(FileSystemError::CreateDirFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Converts an I/O error for rename operations.
fn rename_error(from: &Path, to: &Path, e: io::Error) -> Error {
    Error::FileSystem(FileSystemError::RenameFailed {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Converts an I/O error for metadata lookups.
fn metadata_error(path: &Path, e: io::Error) -> Error {
    Error::FileSystem(FileSystemError::MetadataFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Abstraction over file system operations for testability.
pub trait FileSystem: Send + Sync {
    /// Read a file's contents as a string.
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Replace a file's contents so that readers see either the old or the
    /// new content, never a partial write. Missing parent directories are
    /// created.
    fn write_atomic(&self, path: &Path, contents: &str) -> Result<()>;

    /// Last modification time, or `None` when the file does not exist.
    fn modified(&self, path: &Path) -> Result<Option<SystemTime>>;

    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> Result<()>;
}

/// Real file system implementation using std::fs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFileSystem;

impl RealFileSystem {
    /// Create a new real file system instance.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

/// Sibling temp path used while replacing `path`.
fn temp_path_for(path: &Path) -> PathBuf {
    let seq = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{file_name}.{}.{seq}.tmp", process::id()))
}

/// Fill `temp` with `write`, then rename it over `path`.
///
/// `temp` is removed whenever either step fails.
fn replace_via<F>(temp: &Path, path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&Path) -> io::Result<()>,
{
    if let Err(e) = write(temp) {
        let _ = fs::remove_file(temp);
        return Err(e).write_context(temp);
    }
    fs::rename(temp, path).map_err(|e| {
        let _ = fs::remove_file(temp);
        rename_error(temp, path, e)
    })
}

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).read_context(path)
    }

    fn write_atomic(&self, path: &Path, contents: &str) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.exists()
        {
            self.create_dir_all(parent)?;
        }

        replace_via(&temp_path_for(path), path, |temp| fs::write(temp, contents))
    }

    fn modified(&self, path: &Path) -> Result<Option<SystemTime>> {
        match fs::metadata(path) {
            Ok(meta) if meta.is_file() => meta
                .modified()
                .map(Some)
                .map_err(|e| metadata_error(path, e)),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(metadata_error(path, e)),
        }
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).map_err(|e| create_dir_error(path, e))
    }
}
