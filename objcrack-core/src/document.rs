//! Source documents and object markers
//!
//! A [`SourceDocument`] is the immutable, line-oriented view of one OBJ file.
//! Exporters that concatenate several objects into a single file announce each
//! object with a comment such as `# o Var1` or `# object Var1`; those comments
//! are the only thing the splitter uses to find object boundaries. A generic
//! OBJ file without such comments cannot be split.

use serde::{Deserialize, Serialize};

/// Kind of directive a line carries, as far as splitting is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// `v x y z` vertex position
    Vertex,
    /// `f a b c ...` face
    Face,
    /// `g name` group declaration
    Group,
    /// `# o name` object marker comment
    Marker,
    /// Anything else (`vn`, `vt`, `s`, `usemtl`, comments, blank lines)
    Other,
}

impl LineKind {
    /// Classify a single line
    pub fn classify(line: &str) -> Self {
        let trimmed = line.trim_start();
        if trimmed.starts_with("v ") {
            LineKind::Vertex
        } else if trimmed.starts_with("f ") {
            LineKind::Face
        } else if trimmed.starts_with("g ") {
            LineKind::Group
        } else if marker_name(trimmed).is_some() {
            LineKind::Marker
        } else {
            LineKind::Other
        }
    }
}

/// A recognized start-of-object comment line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMarker {
    /// 0-based index of the marker in the source document
    pub line_index: usize,
    /// Marker line exactly as it appears in the source
    pub raw_text: String,
    /// Object name following the marker token, possibly empty
    pub name: String,
}

/// Returns the object name if `line` is a marker comment
fn marker_name(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix('#')?;
    let rest = rest.trim_start();
    let token_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    match &rest[..token_end] {
        "o" | "object" => Some(rest[token_end..].trim()),
        _ => None,
    }
}

/// The raw ordered lines of one OBJ file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceDocument {
    lines: Vec<String>,
}

impl SourceDocument {
    /// Split text into lines, accepting both `\n` and `\r\n` terminators
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    /// Build a document from already split lines
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// All lines, without terminators
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of lines
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True for a document with no lines
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of `v ` lines in the whole document
    pub fn vertex_count(&self) -> usize {
        self.lines
            .iter()
            .filter(|line| LineKind::classify(line) == LineKind::Vertex)
            .count()
    }

    /// All object markers in source order
    pub fn markers(&self) -> Vec<ObjectMarker> {
        self.lines
            .iter()
            .enumerate()
            .filter_map(|(line_index, line)| {
                marker_name(line).map(|name| ObjectMarker {
                    line_index,
                    raw_text: line.clone(),
                    name: name.to_string(),
                })
            })
            .collect()
    }
}

impl From<&str> for SourceDocument {
    fn from(text: &str) -> Self {
        Self::from_text(text)
    }
}
