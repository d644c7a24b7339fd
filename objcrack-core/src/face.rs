//! Face line parsing and renumbering

use crate::error::{Error, Result};
use std::fmt;

/// One `v[/vt[/vn]]` reference inside a face line
///
/// Texture and normal components are `None` when absent, which covers both
/// the omitted form (`1`, `1/2`) and the empty form (`1//3`). The number of
/// components written in the source is kept so output matches input shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexRef {
    pub position: i64,
    pub texture: Option<i64>,
    pub normal: Option<i64>,
    components: usize,
}

impl VertexRef {
    fn parse(token: &str, line_index: usize) -> Result<Self> {
        let parts: Vec<&str> = token.split('/').collect();
        if parts.len() > 3 {
            return Err(Error::malformed(
                line_index,
                format!("face reference `{}` has more than three components", token),
            ));
        }

        let component = |idx: usize| -> Result<Option<i64>> {
            match parts.get(idx) {
                None => Ok(None),
                Some(part) if part.is_empty() => Ok(None),
                Some(part) => part.parse::<i64>().map(Some).map_err(|_| {
                    Error::malformed(
                        line_index,
                        format!("face reference `{}` has non-numeric component `{}`", token, part),
                    )
                }),
            }
        };

        let position = component(0)?.ok_or_else(|| {
            Error::malformed(
                line_index,
                format!("face reference `{}` has no vertex index", token),
            )
        })?;

        Ok(Self {
            position,
            texture: component(1)?,
            normal: component(2)?,
            components: parts.len(),
        })
    }

    fn offset(&mut self, offset: i64, line_index: usize) -> Result<()> {
        let shift = |idx: i64| {
            idx.checked_sub(offset).ok_or_else(|| {
                Error::malformed(
                    line_index,
                    format!("face index {} cannot be shifted down by {}", idx, offset),
                )
            })
        };
        self.position = shift(self.position)?;
        if let Some(texture) = self.texture {
            self.texture = Some(shift(texture)?);
        }
        if let Some(normal) = self.normal {
            self.normal = Some(shift(normal)?);
        }
        Ok(())
    }

    fn present(&self) -> impl Iterator<Item = i64> {
        std::iter::once(self.position)
            .chain(self.texture)
            .chain(self.normal)
    }
}

impl fmt::Display for VertexRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.position)?;
        if self.components >= 2 {
            f.write_str("/")?;
            if let Some(texture) = self.texture {
                write!(f, "{}", texture)?;
            }
        }
        if self.components >= 3 {
            f.write_str("/")?;
            if let Some(normal) = self.normal {
                write!(f, "{}", normal)?;
            }
        }
        Ok(())
    }
}

/// A parsed `f` directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceLine {
    /// 0-based index of the face in the source document
    pub line_index: usize,
    pub refs: Vec<VertexRef>,
}

impl FaceLine {
    /// Parse an `f` line; `line_index` is only used for error reporting
    pub fn parse(line: &str, line_index: usize) -> Result<Self> {
        let mut tokens = line.split_whitespace();
        if tokens.next() != Some("f") {
            return Err(Error::malformed(line_index, "not a face line"));
        }

        let refs = tokens
            .map(|token| VertexRef::parse(token, line_index))
            .collect::<Result<Vec<_>>>()?;
        if refs.is_empty() {
            return Err(Error::malformed(line_index, "face has no vertex references"));
        }

        Ok(Self { line_index, refs })
    }

    /// Shift every present component down by `offset`
    ///
    /// Fails with `MalformedInput` when a component would leave the `i64` range.
    pub fn renumber(&mut self, offset: usize) -> Result<()> {
        if offset == 0 {
            return Ok(());
        }
        let offset = i64::try_from(offset)
            .map_err(|_| Error::malformed(self.line_index, format!("vertex offset {} is too large", offset)))?;
        for vertex in &mut self.refs {
            vertex.offset(offset, self.line_index)?;
        }
        Ok(())
    }

    /// Check every present component lies in `[1, local_vertex_count]`
    pub fn validate(&self, local_vertex_count: usize) -> Result<()> {
        let upper = local_vertex_count as i64;
        for vertex in &self.refs {
            if let Some(bad) = vertex.present().find(|&idx| idx < 1 || idx > upper) {
                return Err(Error::malformed(
                    self.line_index,
                    format!(
                        "face index {} is outside the object's local range 1..={}",
                        bad, local_vertex_count
                    ),
                ));
            }
        }
        Ok(())
    }
}

impl fmt::Display for FaceLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("f")?;
        for vertex in &self.refs {
            write!(f, " {}", vertex)?;
        }
        Ok(())
    }
}

/// Parse, renumber and validate one face line in a single step
pub fn rewrite_face(line: &str, line_index: usize, offset: usize, local_vertex_count: usize) -> Result<String> {
    let mut face = FaceLine::parse(line, line_index)?;
    face.renumber(offset)?;
    face.validate(local_vertex_count)?;
    Ok(face.to_string())
}
