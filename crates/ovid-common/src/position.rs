//! Position types for source and output locations.
//!
//! A [`Position`] is the (offset, line, column) triple used on both sides of
//! the translation: source-side points delivered by the resolved program
//! model, and output-side points tracked by the writer. Lines are 1-based,
//! columns 0-based, offsets are byte offsets.

use serde::Serialize;

/// An (offset, line, column) triple identifying a point in a text buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Position {
    /// Byte offset into the buffer.
    pub pos: u32,
    /// 1-based line number.
    pub line: u32,
    /// 0-based column.
    pub column: u32,
}

impl Position {
    pub const fn new(pos: u32, line: u32, column: u32) -> Self {
        Self { pos, line, column }
    }

    /// A position at the start of the given line.
    pub const fn line_start(pos: u32, line: u32) -> Self {
        Self {
            pos,
            line,
            column: 0,
        }
    }
}

/// A source position attached to a diagnostic: file identity plus a start
/// point and an optional end point.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SourcePosition {
    pub file: String,
    pub start: Position,
    pub end: Option<Position>,
}

impl SourcePosition {
    pub fn new(file: impl Into<String>, start: Position) -> Self {
        Self {
            file: file.into(),
            start,
            end: None,
        }
    }
}

impl std::fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({},{})", self.file, self.start.line, self.start.column)
    }
}

/// Maps byte offsets to line/column positions for one source text.
///
/// Built once per file by whatever front end populates the program model;
/// the core itself never re-derives source positions.
#[derive(Clone, Debug)]
pub struct LineMap {
    /// Byte offset of the start of each line. `line_starts[0] == 0`.
    line_starts: Vec<u32>,
}

impl LineMap {
    /// Scan `text` and record the start offset of every line.
    pub fn build(text: &str) -> Self {
        let mut line_starts = vec![0u32];
        let bytes = text.as_bytes();
        for nl in memchr::memchr_iter(b'\n', bytes) {
            line_starts.push((nl + 1) as u32);
        }
        Self { line_starts }
    }

    /// Number of lines in the mapped text.
    pub fn line_count(&self) -> u32 {
        self.line_starts.len() as u32
    }

    /// Resolve a byte offset to a full position (1-based line, 0-based column).
    pub fn position_at(&self, offset: u32) -> Position {
        let line_index = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        Position {
            pos: offset,
            line: (line_index + 1) as u32,
            column: offset - self.line_starts[line_index],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_map_single_line() {
        let map = LineMap::build("hello");
        assert_eq!(map.line_count(), 1);
        assert_eq!(map.position_at(0), Position::new(0, 1, 0));
        assert_eq!(map.position_at(3), Position::new(3, 1, 3));
    }

    #[test]
    fn test_line_map_multi_line() {
        let map = LineMap::build("ab\ncd\n\nef");
        assert_eq!(map.line_count(), 4);
        assert_eq!(map.position_at(0).line, 1);
        // First char after the newline starts line 2, column 0
        assert_eq!(map.position_at(3), Position::new(3, 2, 0));
        assert_eq!(map.position_at(4), Position::new(4, 2, 1));
        // Empty line
        assert_eq!(map.position_at(6).line, 3);
        assert_eq!(map.position_at(7), Position::new(7, 4, 0));
    }

    #[test]
    fn test_line_map_offset_at_newline() {
        let map = LineMap::build("a\nb");
        // The newline byte itself still belongs to line 1
        assert_eq!(map.position_at(1).line, 1);
        assert_eq!(map.position_at(2).line, 2);
    }
}
