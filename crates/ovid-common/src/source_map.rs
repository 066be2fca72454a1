//! Source map: correlation between source positions and output positions.
//!
//! The printer appends one entry per tree node, in source traversal order.
//! Entries are monotonically non-decreasing in both source and output order,
//! which makes reverse lookup (output position back to source position) a
//! binary search. In bundle mode each unit's map is shifted by the cumulative
//! output size before concatenation.

use crate::position::Position;
use serde::Serialize;

/// One (source → output) correlation point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SourceMapEntry {
    pub source: Position,
    pub output: Position,
}

/// An ordered sequence of source-to-output correlation entries for one
/// produced file.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SourceMap {
    entries: Vec<SourceMapEntry>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[SourceMapEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an entry. Entries must be appended in source traversal order.
    pub fn add_entry(&mut self, source: Position, output: Position) {
        self.entries.push(SourceMapEntry { source, output });
    }

    /// Discard entries past `len`. Used when a speculative emission is
    /// rolled back, so that abandoned output positions never survive.
    pub fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
    }

    /// Shift every output position by the given line and byte offsets.
    ///
    /// Called when concatenating per-unit outputs into a bundle: the unit's
    /// entries become bundle-relative.
    pub fn shift_output_positions(&mut self, line_offset: u32, byte_offset: u32) {
        for entry in &mut self.entries {
            entry.output.line += line_offset;
            entry.output.pos += byte_offset;
        }
    }

    /// Find the source position corresponding to an output (line, column),
    /// used to translate downstream-toolchain diagnostics back to the
    /// original source. Returns the last entry at or before the requested
    /// output point.
    pub fn find_source_position(&self, line: u32, column: u32) -> Option<Position> {
        let needle = (line, column);
        let idx = self
            .entries
            .partition_point(|e| (e.output.line, e.output.column) <= needle);
        if idx == 0 {
            return None;
        }
        Some(self.entries[idx - 1].source)
    }

    /// True when entries are non-decreasing in source order and in output
    /// order, the invariant reverse lookup relies on.
    pub fn is_monotonic(&self) -> bool {
        self.entries
            .windows(2)
            .all(|w| w[0].source.pos <= w[1].source.pos && w[0].output.pos <= w[1].output.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(map: &mut SourceMap, src: (u32, u32, u32), out: (u32, u32, u32)) {
        map.add_entry(
            Position::new(src.0, src.1, src.2),
            Position::new(out.0, out.1, out.2),
        );
    }

    #[test]
    fn test_monotonic_entries() {
        let mut map = SourceMap::new();
        entry(&mut map, (0, 1, 0), (0, 1, 0));
        entry(&mut map, (5, 1, 5), (8, 1, 8));
        entry(&mut map, (12, 2, 0), (20, 2, 0));
        assert!(map.is_monotonic());
    }

    #[test]
    fn test_shift_output_positions() {
        let mut map = SourceMap::new();
        entry(&mut map, (0, 1, 0), (0, 1, 0));
        entry(&mut map, (5, 2, 0), (10, 2, 4));
        map.shift_output_positions(7, 100);
        assert_eq!(map.entries()[0].output, Position::new(100, 8, 0));
        assert_eq!(map.entries()[1].output, Position::new(110, 9, 4));
        // Source side is untouched
        assert_eq!(map.entries()[1].source, Position::new(5, 2, 0));
    }

    #[test]
    fn test_find_source_position() {
        let mut map = SourceMap::new();
        entry(&mut map, (0, 1, 0), (0, 1, 0));
        entry(&mut map, (10, 3, 2), (4, 2, 0));
        entry(&mut map, (20, 5, 0), (9, 2, 5));

        // Exact hit
        assert_eq!(
            map.find_source_position(2, 0),
            Some(Position::new(10, 3, 2))
        );
        // Between entries: last one at or before wins
        assert_eq!(
            map.find_source_position(2, 3),
            Some(Position::new(10, 3, 2))
        );
        // Past the end
        assert_eq!(
            map.find_source_position(9, 9),
            Some(Position::new(20, 5, 0))
        );
        // Before the first entry
        assert_eq!(map.find_source_position(0, 0), None);
    }

    #[test]
    fn test_truncate_discards_tail() {
        let mut map = SourceMap::new();
        entry(&mut map, (0, 1, 0), (0, 1, 0));
        entry(&mut map, (5, 2, 0), (10, 2, 0));
        map.truncate(1);
        assert_eq!(map.len(), 1);
        assert_eq!(map.entries()[0].source.pos, 0);
    }
}
