//! Reading source OBJ files

use crate::error::{IoError, Result};
use objcrack_core::SourceDocument;
use std::fs;
use std::path::Path;

/// Read a whole OBJ file into memory
pub fn read_source<P: AsRef<Path>>(path: P) -> Result<SourceDocument> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| IoError::read(path, e))?;
    Ok(SourceDocument::from_text(&text))
}

/// True if `path` has an `.obj` extension, ignoring case
pub fn is_obj_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("obj"))
        .unwrap_or(false)
}
