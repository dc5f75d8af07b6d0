//! Error types for Tubemeta core operations.
//!
//! Errors are grouped by domain:
//! - [`UpstreamError`] for everything the remote metadata API can do wrong
//! - [`CacheError`] for the on-disk record cache
//! - [`FileSystemError`] for raw file system operations
//!
//! The resolver turns most of these into an empty "no metadata" outcome; only
//! [`Error::Cancelled`] is always handed back to the caller.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while talking to the remote metadata API.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The lookup returned an empty result list.
    #[error("No {entity} found for id {id}")]
    NotFound {
        /// Identifier that was looked up.
        id: String,
        /// Remote entity name (video, channel, playlist).
        entity: String,
    },

    /// The API key was rejected.
    #[error("Request rejected by the API (HTTP {status}): check the API key")]
    Unauthorized {
        /// HTTP status code.
        status: u16,
    },

    /// Any other non-success HTTP status.
    #[error("API returned HTTP {status} for {url}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Requested URL, without the API key.
        url: String,
    },

    /// Connection, TLS or timeout failure.
    #[error("Network error: {0}")]
    Transport(String),

    /// The body could not be decoded into the expected resource.
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

/// Errors raised by the record cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The identifier cannot be used as a cache directory name.
    #[error("Identifier {id:?} is not a valid cache key")]
    InvalidKey {
        /// Offending identifier.
        id: String,
    },

    /// A cached record could not be read or parsed.
    #[error("Failed to read cached record {path}: {reason}")]
    ReadFailed {
        /// Record path.
        path: PathBuf,
        /// Failure reason.
        reason: String,
    },

    /// A freshly fetched record could not be persisted.
    #[error("Failed to write cached record {path}: {reason}")]
    WriteFailed {
        /// Record path.
        path: PathBuf,
        /// Failure reason.
        reason: String,
    },
}

/// Errors raised by file system operations.
#[derive(Debug, Error)]
pub enum FileSystemError {
    /// Reading a file failed.
    #[error("Failed to read {path}: {reason}")]
    ReadFailed {
        /// Path being read.
        path: PathBuf,
        /// Failure reason.
        reason: String,
    },

    /// Writing a file failed.
    #[error("Failed to write {path}: {reason}")]
    WriteFailed {
        /// Path being written.
        path: PathBuf,
        /// Failure reason.
        reason: String,
    },

    /// Creating a directory failed.
    #[error("Failed to create directory {path}: {reason}")]
    CreateDirFailed {
        /// Directory path.
        path: PathBuf,
        /// Failure reason.
        reason: String,
    },

    /// Renaming a file failed.
    #[error("Failed to rename {from} to {to}: {reason}")]
    RenameFailed {
        /// Source path.
        from: PathBuf,
        /// Destination path.
        to: PathBuf,
        /// Failure reason.
        reason: String,
    },

    /// Reading file metadata failed.
    #[error("Failed to stat {path}: {reason}")]
    MetadataFailed {
        /// Path being inspected.
        path: PathBuf,
        /// Failure reason.
        reason: String,
    },
}

/// Errors that can occur in Tubemeta core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Remote metadata API failure.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// Record cache failure.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// File system failure.
    #[error(transparent)]
    FileSystem(#[from] FileSystemError),

    /// A record was fetched but its content could not be interpreted.
    #[error("Failed to parse metadata for {id}: {reason}")]
    MetadataParse {
        /// Identifier of the offending record.
        id: String,
        /// What could not be parsed.
        reason: String,
    },

    /// The operation was cancelled by the caller.
    #[error("Operation cancelled")]
    Cancelled,

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Remote API failure.
    Upstream,
    /// Cache or file system failure.
    Storage,
    /// Bad record content.
    Parse,
    /// Caller cancelled.
    Cancelled,
    /// Bad configuration.
    Configuration,
}

impl Error {
    /// Create an upstream "not found" error.
    pub fn not_found(id: impl Into<String>, entity: impl Into<String>) -> Self {
        Self::Upstream(UpstreamError::NotFound {
            id: id.into(),
            entity: entity.into(),
        })
    }

    /// Create a network transport error.
    pub fn network_error(message: impl Into<String>) -> Self {
        Self::Upstream(UpstreamError::Transport(message.into()))
    }

    /// Create an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::Upstream(UpstreamError::InvalidResponse(message.into()))
    }

    /// Create a metadata parse error.
    pub fn metadata_parse(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MetadataParse {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Upstream(_) => ErrorKind::Upstream,
            Self::Cache(_) | Self::FileSystem(_) | Self::Io(_) => ErrorKind::Storage,
            Self::MetadataParse { .. } | Self::Serialization(_) => ErrorKind::Parse,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Configuration(_) => ErrorKind::Configuration,
        }
    }

    /// Whether the error is a caller cancellation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Attach a path to raw I/O errors.
pub trait ErrorContext<T> {
    /// Map the error into a [`FileSystemError::ReadFailed`].
    fn read_context(self, path: &Path) -> Result<T>;

    /// Map the error into a [`FileSystemError::WriteFailed`].
    fn write_context(self, path: &Path) -> Result<T>;
}

impl<T> ErrorContext<T> for io::Result<T> {
    fn read_context(self, path: &Path) -> Result<T> {
        self.map_err(|e| {
            Error::FileSystem(FileSystemError::ReadFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
        })
    }

    fn write_context(self, path: &Path) -> Result<T> {
        self.map_err(|e| {
            Error::FileSystem(FileSystemError::WriteFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
        })
    }
}
