//! Error types for I/O operations

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while cracking files on disk
#[derive(Error, Debug)]
pub enum IoError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", .path.display())]
    Split {
        path: PathBuf,
        #[source]
        source: objcrack_core::Error,
    },

    #[error("Invalid output name `{name}` in {}", .path.display())]
    InvalidOutputName { path: PathBuf, name: String },

    #[error("Refusing to overwrite source file {} with different content", .path.display())]
    WouldOverwriteSource { path: PathBuf },

    #[error("Invalid search pattern: {message}")]
    Pattern { message: String },

    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}

impl IoError {
    pub(crate) fn read(path: &Path, source: std::io::Error) -> Self {
        IoError::Read {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn write(path: &Path, source: std::io::Error) -> Self {
        IoError::Write {
            path: path.to_path_buf(),
            source,
        }
    }

    /// The split error behind this failure, if any
    pub fn split_error(&self) -> Option<&objcrack_core::Error> {
        match self {
            IoError::Split { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type alias for I/O operations
pub type Result<T> = std::result::Result<T, IoError>;
