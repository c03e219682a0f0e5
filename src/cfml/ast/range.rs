//! Position tracking for source code locations
//!
//! This module defines the line/column position type and the utility that converts byte
//! offsets to positions.
//!
//! ## Types
//!
//! - [`Position`] - A line:column position in source code
//! - [`SourceLocation`] - Utility for converting byte offsets to positions
//!
//! ## Key Design
//!
//! - **Byte spans preserved**: nodes store their byte span next to the line:column start
//! - **1-based lines, 0-based columns**: the convention grammar engines report in
//! - **Unicode-aware**: columns count characters, not bytes
//! - **Efficient conversion**: O(log n) binary search for byte-to-position conversion
//!
//! The visitors compute one `SourceLocation` per parsed source and reuse it for every node.

use serde::Serialize;
use std::fmt;
use std::ops::Range as ByteRange;

/// Represents a position in source code (line and column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(1, 0)
    }
}

/// Provides fast conversion from byte offsets to line/column positions
#[derive(Debug, Clone)]
pub struct SourceLocation {
    source: String,
    /// Byte offsets where each line starts
    line_starts: Vec<usize>,
}

impl SourceLocation {
    /// Create a new SourceLocation from source code
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];

        for (byte_pos, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(byte_pos + 1);
            }
        }

        Self {
            source: source.to_string(),
            line_starts,
        }
    }

    /// Whether this index was built for `source`
    pub fn is_for(&self, source: &str) -> bool {
        self.source == source
    }

    /// Convert a byte offset to a line/column position
    pub fn byte_to_position(&self, byte_offset: usize) -> Position {
        let offset = byte_offset.min(self.source.len());
        let line = self
            .line_starts
            .binary_search(&offset)
            .unwrap_or_else(|i| i - 1);

        let line_start = self.line_starts[line];
        let column = self
            .source
            .get(line_start..offset)
            .map(|text| text.chars().count())
            .unwrap_or(offset - line_start);

        Position::new(line + 1, column)
    }

    /// Convert a line/column position back to a byte offset, clamped to the source
    pub fn position_to_byte(&self, position: Position) -> usize {
        let Some(line_start) = self.line_start(position.line) else {
            return self.source.len();
        };
        self.source[line_start..]
            .char_indices()
            .take_while(|(_, ch)| *ch != '\n')
            .nth(position.column)
            .map(|(index, _)| line_start + index)
            .unwrap_or_else(|| {
                self.source[line_start..]
                    .find('\n')
                    .map_or(self.source.len(), |i| line_start + i)
            })
    }

    /// Source text covered by a byte range, empty when the range is out of bounds
    pub fn slice(&self, range: &ByteRange<usize>) -> &str {
        self.source.get(range.clone()).unwrap_or("")
    }

    /// Get the total number of lines in the source
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Get the byte offset for the start of a line (1-based)
    pub fn line_start(&self, line: usize) -> Option<usize> {
        line.checked_sub(1)
            .and_then(|index| self.line_starts.get(index).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_comparison() {
        let pos1 = Position::new(1, 5);
        let pos2 = Position::new(1, 5);
        let pos3 = Position::new(2, 3);

        assert_eq!(pos1, pos2);
        assert_ne!(pos1, pos3);
        assert!(pos1 < pos3);
    }

    #[test]
    fn test_byte_to_position_single_line() {
        let loc = SourceLocation::new("a = 1;");
        assert_eq!(loc.byte_to_position(0), Position::new(1, 0));
        assert_eq!(loc.byte_to_position(4), Position::new(1, 4));
    }

    #[test]
    fn test_byte_to_position_multiline() {
        let loc = SourceLocation::new("a = 1;\nb = 2;\n");
        assert_eq!(loc.line_count(), 3);
        assert_eq!(loc.byte_to_position(7), Position::new(2, 0));
        assert_eq!(loc.byte_to_position(11), Position::new(2, 4));
        assert_eq!(loc.line_start(2), Some(7));
        assert_eq!(loc.line_start(0), None);
    }

    #[test]
    fn test_columns_count_characters() {
        let loc = SourceLocation::new("x = 'é'; y");
        // 'é' is two bytes; the `;` sits at byte 8 but character column 7
        assert_eq!(loc.byte_to_position(8), Position::new(1, 7));
    }

    #[test]
    fn test_position_to_byte_inverts_byte_to_position() {
        let loc = SourceLocation::new("a = 1;\nlock { }");
        for offset in [0, 4, 7, 12] {
            assert_eq!(loc.position_to_byte(loc.byte_to_position(offset)), offset);
        }
    }

    #[test]
    fn test_offset_past_end_clamps() {
        let loc = SourceLocation::new("ab");
        assert_eq!(loc.byte_to_position(10), Position::new(1, 2));
        assert_eq!(loc.slice(&(5..9)), "");
    }
}
