//! Error types for objcrack

use thiserror::Error;

/// Main error type for splitting operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Malformed input at line {line}: {reason}")]
    MalformedInput { line: usize, reason: String },

    #[error("No object markers found (expected `# o <name>` comment lines)")]
    NoObjectMarkers,

    #[error("Group name collision: `{name}` is used by objects starting at lines {first_line} and {second_line}")]
    GroupNameCollision {
        name: String,
        first_line: usize,
        second_line: usize,
    },
}

impl Error {
    /// Build a malformed input error for a 0-based line index
    pub(crate) fn malformed(line_index: usize, reason: impl Into<String>) -> Self {
        Error::MalformedInput {
            line: line_index + 1,
            reason: reason.into(),
        }
    }

    /// True for malformed input, including a document without markers
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::MalformedInput { .. } | Error::NoObjectMarkers)
    }

    /// True when two objects resolved to the same output name
    pub fn is_collision(&self) -> bool {
        matches!(self, Error::GroupNameCollision { .. })
    }
}

/// Result type alias for objcrack operations
pub type Result<T> = std::result::Result<T, Error>;
