//! Object segmentation of a source document
//!
//! Segments partition the document: every line belongs to exactly one segment,
//! in source order. Segment 0 begins at the first line of the file, so anything
//! written before the first marker (headers, `mtllib`) travels with the first
//! object. Every later segment begins one line *before* its marker, because
//! exporters write a lone `#` above each `# object` comment and that line
//! belongs to the object it introduces.

use crate::document::{LineKind, ObjectMarker, SourceDocument};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Which `g` line names a segment when it contains several
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GroupNamePolicy {
    /// The last `g` line in the segment wins
    #[default]
    Last,
    /// The first `g` line in the segment wins
    First,
}

/// The contiguous block of source lines belonging to one object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSegment<'a> {
    /// Position of the segment in source order
    pub index: usize,
    pub marker: ObjectMarker,
    /// 0-based index of the first line of the segment in the document
    pub line_offset: usize,
    pub lines: &'a [String],
    /// Number of `v ` lines in this segment
    pub vertex_count: usize,
    /// Sum of `vertex_count` over all earlier segments
    pub cumulative_vertex_count_before: usize,
    /// Output name resolved from the segment's `g` lines, or the marker name
    pub group_name: String,
}

impl<'a> ObjectSegment<'a> {
    /// `f` lines of this segment with their 0-based document line index
    pub fn face_lines(&self) -> impl Iterator<Item = (usize, &'a str)> + '_ {
        let offset = self.line_offset;
        let lines: &'a [String] = self.lines;
        lines
            .iter()
            .enumerate()
            .filter(|(_, line)| LineKind::classify(line) == LineKind::Face)
            .map(move |(i, line)| (offset + i, line.as_str()))
    }

    /// Range of document line indices covered by this segment
    pub fn line_range(&self) -> std::ops::Range<usize> {
        self.line_offset..self.line_offset + self.lines.len()
    }
}

/// Start line of every segment, one per marker
fn segment_starts(markers: &[ObjectMarker]) -> Vec<usize> {
    let mut starts = Vec::with_capacity(markers.len());
    for (i, marker) in markers.iter().enumerate() {
        let start = if i == 0 {
            0
        } else {
            // Never reach back into the previous marker line.
            let floor = markers[i - 1].line_index + 1;
            marker.line_index.saturating_sub(1).max(floor)
        };
        starts.push(start);
    }
    starts
}

fn resolve_group_name(lines: &[String], policy: GroupNamePolicy) -> Option<String> {
    let mut names = lines
        .iter()
        .filter(|line| LineKind::classify(line) == LineKind::Group)
        .map(|line| line.trim_start()[1..].trim())
        .filter(|name| !name.is_empty());

    let name = match policy {
        GroupNamePolicy::First => names.next(),
        GroupNamePolicy::Last => names.last(),
    };
    name.map(str::to_string)
}

/// Partition a document into object segments
pub fn segment(document: &SourceDocument, policy: GroupNamePolicy) -> Result<Vec<ObjectSegment<'_>>> {
    let markers = document.markers();
    if markers.is_empty() {
        return Err(Error::NoObjectMarkers);
    }

    let starts = segment_starts(&markers);
    let all_lines = document.lines();
    let mut segments = Vec::with_capacity(markers.len());
    let mut cumulative = 0;

    for (index, marker) in markers.into_iter().enumerate() {
        let start = starts[index];
        let end = starts.get(index + 1).copied().unwrap_or(all_lines.len());
        let lines = &all_lines[start..end];

        let vertex_count = lines
            .iter()
            .filter(|line| LineKind::classify(line) == LineKind::Vertex)
            .count();

        let group_name = match resolve_group_name(lines, policy) {
            Some(name) => name,
            None if !marker.name.is_empty() => marker.name.clone(),
            None => {
                return Err(Error::malformed(
                    marker.line_index,
                    "object has neither a group name nor a marker name",
                ))
            }
        };

        segments.push(ObjectSegment {
            index,
            marker,
            line_offset: start,
            lines,
            vertex_count,
            cumulative_vertex_count_before: cumulative,
            group_name,
        });
        cumulative += vertex_count;
    }

    Ok(segments)
}
