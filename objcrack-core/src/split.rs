//! Splitting ("cracking") a multi-object OBJ document
//!
//! The whole document is segmented and every face line is renumbered in memory
//! before anything is returned, so a failure anywhere leaves the caller with no
//! partial output.

use crate::document::{LineKind, SourceDocument};
use crate::error::{Error, Result};
use crate::face::FaceLine;
use crate::segment::{segment, GroupNamePolicy, ObjectSegment};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Configuration for splitting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitOptions {
    /// How a segment with several `g` lines is named
    pub group_name_policy: GroupNamePolicy,
    /// Reject face indices that fall outside their object after renumbering
    pub validate_indices: bool,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            group_name_policy: GroupNamePolicy::Last,
            validate_indices: true,
        }
    }
}

impl SplitOptions {
    /// Set the group name policy
    pub fn with_group_name_policy(mut self, policy: GroupNamePolicy) -> Self {
        self.group_name_policy = policy;
        self
    }

    /// Enable or disable face index validation
    pub fn with_index_validation(mut self, validate: bool) -> Self {
        self.validate_indices = validate;
        self
    }
}

/// One standalone OBJ produced by a split
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrackedObject {
    /// Group name, used as the output file stem
    pub name: String,
    /// 1-based line of the object's marker in the source
    pub source_line: usize,
    pub lines: Vec<String>,
    pub vertex_count: usize,
    pub face_count: usize,
}

impl CrackedObject {
    /// File contents: every line terminated by `\n`
    pub fn to_text(&self) -> String {
        let capacity = self.lines.iter().map(|line| line.len() + 1).sum();
        let mut text = String::with_capacity(capacity);
        for line in &self.lines {
            text.push_str(line);
            text.push('\n');
        }
        text
    }

    /// Output file name, `<name>.obj`
    pub fn file_name(&self) -> String {
        format!("{}.obj", self.name)
    }
}

/// All objects of one source document, in source order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrackedObjects {
    objects: Vec<CrackedObject>,
}

impl CrackedObjects {
    /// Number of objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True when nothing was split out
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Iterate over objects in source order
    pub fn iter(&self) -> std::slice::Iter<'_, CrackedObject> {
        self.objects.iter()
    }

    /// Look up an object by group name
    pub fn get(&self, name: &str) -> Option<&CrackedObject> {
        self.objects.iter().find(|object| object.name == name)
    }

    /// Group names in source order
    pub fn names(&self) -> Vec<&str> {
        self.objects.iter().map(|object| object.name.as_str()).collect()
    }

    /// Sum of the vertex counts of all objects
    pub fn total_vertex_count(&self) -> usize {
        self.objects.iter().map(|object| object.vertex_count).sum()
    }

    /// Group name to output lines
    pub fn into_map(self) -> BTreeMap<String, Vec<String>> {
        self.objects
            .into_iter()
            .map(|object| (object.name, object.lines))
            .collect()
    }
}

impl IntoIterator for CrackedObjects {
    type Item = CrackedObject;
    type IntoIter = std::vec::IntoIter<CrackedObject>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.into_iter()
    }
}

impl<'a> IntoIterator for &'a CrackedObjects {
    type Item = &'a CrackedObject;
    type IntoIter = std::slice::Iter<'a, CrackedObject>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.iter()
    }
}

/// Splits one multi-object OBJ document into standalone objects
#[derive(Debug, Clone, Default)]
pub struct ObjSplitter {
    options: SplitOptions,
}

impl ObjSplitter {
    pub fn new(options: SplitOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SplitOptions {
        &self.options
    }

    /// Split a document into one object per marker
    ///
    /// Fails with [`Error::NoObjectMarkers`] when the document has no
    /// `# o <name>` comments, with [`Error::MalformedInput`] when a face cannot
    /// be parsed or points outside its object, and with
    /// [`Error::GroupNameCollision`] when two objects resolve to one name.
    pub fn split(&self, document: &SourceDocument) -> Result<CrackedObjects> {
        let segments = segment(document, self.options.group_name_policy)?;

        let mut seen: HashMap<&str, usize> = HashMap::with_capacity(segments.len());
        for seg in &segments {
            let marker_line = seg.marker.line_index + 1;
            if let Some(&first_line) = seen.get(seg.group_name.as_str()) {
                return Err(Error::GroupNameCollision {
                    name: seg.group_name.clone(),
                    first_line,
                    second_line: marker_line,
                });
            }
            seen.insert(seg.group_name.as_str(), marker_line);
        }

        let objects = segments
            .iter()
            .map(|seg| self.crack_segment(seg))
            .collect::<Result<Vec<_>>>()?;

        Ok(CrackedObjects { objects })
    }

    fn crack_segment(&self, seg: &ObjectSegment<'_>) -> Result<CrackedObject> {
        let offset = seg.cumulative_vertex_count_before;
        let mut lines = Vec::with_capacity(seg.lines.len());
        let mut face_count = 0;

        for (i, line) in seg.lines.iter().enumerate() {
            if LineKind::classify(line) != LineKind::Face {
                lines.push(line.clone());
                continue;
            }

            face_count += 1;
            let mut face = FaceLine::parse(line, seg.line_offset + i)?;
            face.renumber(offset)?;
            if self.options.validate_indices {
                face.validate(seg.vertex_count)?;
            }

            // The first object is already local; keep its faces byte for byte.
            if offset == 0 {
                lines.push(line.clone());
            } else {
                lines.push(face.to_string());
            }
        }

        Ok(CrackedObject {
            name: seg.group_name.clone(),
            source_line: seg.marker.line_index + 1,
            lines,
            vertex_count: seg.vertex_count,
            face_count,
        })
    }
}

/// Split OBJ text with default options
pub fn split_text(text: &str) -> Result<CrackedObjects> {
    ObjSplitter::default().split(&SourceDocument::from_text(text))
}
