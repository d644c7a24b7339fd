//! Writing cracked objects to disk
//!
//! Outputs are written all-or-nothing: every object is first staged in a
//! uniquely named `.<name>.obj.*.partial` file in its destination directory,
//! and only when every stage write succeeded are the staged files renamed into
//! place. If a rename fails, the outputs already renamed by the same call are
//! removed again; an older file they replaced is not restored.

use crate::error::{IoError, Result};
use objcrack_core::{CrackedObject, CrackedObjects, SourceDocument};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};

const PARTIAL_SUFFIX: &str = ".partial";

/// What a writer did with each object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteOutcome {
    /// Files that were created or replaced
    pub written: Vec<PathBuf>,
    /// Outputs identical to their source file, left untouched
    pub unchanged: Vec<PathBuf>,
}

/// Trait for persisting the objects of one split source
pub trait OutputWriter: Send + Sync {
    /// Where `object` from `source` would be written
    fn output_path(&self, source: &Path, object: &CrackedObject) -> Result<PathBuf>;

    /// Write every object, or none of them
    fn write_objects(&self, source: &Path, objects: &CrackedObjects) -> Result<WriteOutcome>;
}

/// Writes `<group>.obj` files into the source directory or a fixed directory
#[derive(Debug, Clone, Default)]
pub struct DirectoryWriter {
    target: Option<PathBuf>,
}

impl DirectoryWriter {
    /// Write next to each source file
    pub fn beside_source() -> Self {
        Self { target: None }
    }

    /// Write every output into `dir`
    pub fn into_dir<P: Into<PathBuf>>(dir: P) -> Self {
        Self {
            target: Some(dir.into()),
        }
    }

    fn directory_for(&self, source: &Path) -> PathBuf {
        match &self.target {
            Some(dir) => dir.clone(),
            None => source
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        }
    }
}

/// Reject names that would escape the output directory
fn validate_name(source: &Path, name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if invalid {
        return Err(IoError::InvalidOutputName {
            path: source.to_path_buf(),
            name: name.to_string(),
        });
    }
    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Create a uniquely named staging file for `path` inside `dir`
fn stage(dir: &Path, path: &Path, text: &str) -> Result<NamedTempFile> {
    let mut prefix = std::ffi::OsString::from(".");
    prefix.push(path.file_name().unwrap_or_default());
    prefix.push(".");

    let mut file = Builder::new()
        .prefix(&prefix)
        .suffix(PARTIAL_SUFFIX)
        .tempfile_in(dir)
        .map_err(|e| IoError::write(path, e))?;
    file.write_all(text.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|e| IoError::write(path, e))?;
    Ok(file)
}

fn roll_back(written: &[PathBuf]) {
    for path in written {
        if let Err(e) = fs::remove_file(path) {
            tracing::warn!(path = %path.display(), error = %e, "could not roll back output");
        }
    }
}

impl OutputWriter for DirectoryWriter {
    fn output_path(&self, source: &Path, object: &CrackedObject) -> Result<PathBuf> {
        validate_name(source, &object.name)?;
        Ok(self.directory_for(source).join(object.file_name()))
    }

    fn write_objects(&self, source: &Path, objects: &CrackedObjects) -> Result<WriteOutcome> {
        let mut outcome = WriteOutcome::default();
        let mut pending = Vec::with_capacity(objects.len());

        for object in objects {
            let path = self.output_path(source, object)?;
            if same_file(&path, source) {
                let existing = fs::read_to_string(source).map_err(|e| IoError::read(source, e))?;
                if SourceDocument::from_text(&existing).lines() != object.lines.as_slice() {
                    return Err(IoError::WouldOverwriteSource { path });
                }
                tracing::debug!(path = %path.display(), "output identical to source, skipping");
                outcome.unchanged.push(path);
                continue;
            }
            pending.push((path, object));
        }

        if let Some(dir) = &self.target {
            fs::create_dir_all(dir).map_err(|e| IoError::write(dir, e))?;
        }

        let dir = self.directory_for(source);
        let dir = if dir.as_os_str().is_empty() { PathBuf::from(".") } else { dir };

        // Staged files delete themselves when dropped on an early return.
        let mut staged = Vec::with_capacity(pending.len());
        for (path, object) in pending {
            let file = stage(&dir, &path, &object.to_text())?;
            staged.push((file, path));
        }

        let mut written = Vec::with_capacity(staged.len());
        for (file, path) in staged {
            if let Err(e) = file.persist(&path) {
                roll_back(&written);
                return Err(IoError::write(&path, e.error));
            }
            tracing::trace!(path = %path.display(), "wrote output");
            written.push(path);
        }
        outcome.written = written;

        Ok(outcome)
    }
}
