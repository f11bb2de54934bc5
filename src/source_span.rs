//! Byte-accurate spans over source text.
//!
//! Range matching is deliberately textual: two spans match when the
//! characters they cover are byte-equal, regardless of what moved
//! around them. Unrelated edits above or below a span, inserted lines,
//! and changed neighbors all leave a match intact. The text is never
//! parsed, so syntactically broken sources diff fine.

use crate::model::{Location, Position};

/// Precomputed line-start byte offsets for one source text.
#[derive(Debug)]
pub struct LineIndex<'a> {
    source: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    /// Index `source` by scanning for line breaks once.
    pub fn new(source: &'a str) -> Self {
        let mut line_starts = vec![0];
        for (offset, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(offset + 1);
            }
        }
        Self { source, line_starts }
    }

    /// The indexed source text.
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Byte offset of `pos`, or `None` when the position falls outside
    /// the text. A column may point one past the end of its line (the
    /// exclusive end of a span covering the whole line).
    pub fn offset(&self, pos: Position) -> Option<usize> {
        if pos.line == 0 {
            return None;
        }
        let line = (pos.line - 1) as usize;
        let line_start = *self.line_starts.get(line)?;
        let line_end = self
            .line_starts
            .get(line + 1)
            .copied()
            .unwrap_or(self.source.len());
        let offset = line_start + pos.column as usize;
        (offset <= line_end).then_some(offset)
    }

    /// Position one past the last character of the text (the
    /// exclusive end of the last line).
    pub fn end_position(&self) -> Position {
        let last_start = self.line_starts[self.line_starts.len() - 1];
        Position::new(
            self.line_starts.len() as u32,
            (self.source.len() - last_start) as u32,
        )
    }

    /// Text covered by `location`, or `None` when any edge falls
    /// outside the text or lands mid-character.
    pub fn slice(&self, location: Location) -> Option<&'a str> {
        let start = self.offset(location.start)?;
        let end = self.offset(location.end)?;
        if start > end {
            return None;
        }
        self.source.get(start..end)
    }
}

/// Whether `old_location` in the old text and `new_location` in the new
/// text cover the same bytes. A range referencing a line beyond its
/// source never matches.
pub fn ranges_match(
    old: &LineIndex<'_>,
    old_location: Location,
    new: &LineIndex<'_>,
    new_location: Location,
) -> bool {
    match (old.slice(old_location), new.slice(new_location)) {
        (Some(old_body), Some(new_body)) => old_body == new_body,
        _ => false,
    }
}
