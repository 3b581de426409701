//! Error types for module packaging.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for packaging operations.
pub type PackageResult<T> = Result<T, PackageError>;

/// Errors that can occur while building a module.
#[derive(Debug, Error)]
pub enum PackageError {
    /// The library directory to scan does not exist.
    #[error("library directory does not exist: {}", .0.display())]
    LibraryDirNotFound(PathBuf),

    /// The output directory for generated documents does not exist.
    #[error("output directory does not exist: {}", .0.display())]
    OutputDirNotFound(PathBuf),

    /// A version string could not be used.
    #[error("invalid version: {0}")]
    InvalidVersion(String),

    /// A previously written metadata document could not be parsed.
    #[error("invalid metadata in {}: {reason}", .path.display())]
    InvalidMetadata { path: PathBuf, reason: String },

    /// Failed to read a file or directory.
    #[error("failed to read {}: {source}", .path.display())]
    ReadFailed { path: PathBuf, source: io::Error },

    /// Failed to write a file.
    #[error("failed to write {}: {source}", .path.display())]
    WriteFailed { path: PathBuf, source: io::Error },

    /// Failed to create a directory.
    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDirectoryFailed { path: PathBuf, source: io::Error },

    /// XML serialization failed.
    #[error("xml error: {0}")]
    Xml(String),

    /// Archive writing failed.
    #[error("archive failed: {0}")]
    ArchiveFailed(String),

    /// Configuration value or file is unusable.
    #[error("configuration error: {0}")]
    Config(String),
}

impl PackageError {
    /// Whether this error stems from bad configuration rather than I/O.
    ///
    /// Configuration errors are reported before any document is built.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            PackageError::LibraryDirNotFound(_)
                | PackageError::OutputDirNotFound(_)
                | PackageError::InvalidVersion(_)
                | PackageError::InvalidMetadata { .. }
                | PackageError::Config(_)
        )
    }
}
