//! Source positions for tokens, AST nodes and diagnostics.
//!
//! Lines and columns are 1-indexed. Columns count characters, not bytes,
//! so a diagnostic lines up with what the learner sees in the editor.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single position in source code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed, in characters)
    pub column: usize,
    /// Byte offset from start of file
    pub offset: usize,
}

impl SourceLocation {
    /// Create a new source location.
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self { line, column, offset }
    }

    /// The first character of a file.
    pub fn start() -> Self {
        Self { line: 1, column: 1, offset: 0 }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A half-open range of source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start line (1-indexed)
    pub start_line: usize,
    /// Start column (1-indexed)
    pub start_column: usize,
    /// End line (1-indexed)
    pub end_line: usize,
    /// End column (1-indexed, exclusive)
    pub end_column: usize,
    /// Byte offset of start
    pub start_offset: usize,
    /// Byte offset of end
    pub end_offset: usize,
}

impl Span {
    /// Create a span from line/column pairs, without byte offsets.
    pub fn new(start_line: usize, start_column: usize, end_line: usize, end_column: usize) -> Self {
        Self {
            start_line,
            start_column,
            end_line,
            end_column,
            start_offset: 0,
            end_offset: 0,
        }
    }

    /// Create a span from start and end locations.
    pub fn from_locations(start: SourceLocation, end: SourceLocation) -> Self {
        Self {
            start_line: start.line,
            start_column: start.column,
            end_line: end.line,
            end_column: end.column,
            start_offset: start.offset,
            end_offset: end.offset,
        }
    }

    /// A zero-width span at a location.
    pub fn point(loc: SourceLocation) -> Self {
        Self::from_locations(loc, loc)
    }

    /// Get the start location.
    pub fn start(&self) -> SourceLocation {
        SourceLocation::new(self.start_line, self.start_column, self.start_offset)
    }

    /// Get the end location.
    pub fn end(&self) -> SourceLocation {
        SourceLocation::new(self.end_line, self.end_column, self.end_offset)
    }

    /// Smallest span covering both `self` and `other`.
    pub fn merge(&self, other: &Span) -> Span {
        let start = if (self.start_line, self.start_column) <= (other.start_line, other.start_column) {
            self.start()
        } else {
            other.start()
        };
        let end = if (self.end_line, self.end_column) >= (other.end_line, other.end_column) {
            self.end()
        } else {
            other.end()
        };
        Span::from_locations(start, end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_column)
    }
}

/// Line index over a source text, used to render diagnostics.
#[derive(Debug, Clone)]
pub struct SourceMap<'a> {
    source: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> SourceMap<'a> {
    /// Index the lines of `source`.
    pub fn new(source: &'a str) -> Self {
        let mut line_starts = vec![0];
        for (i, c) in source.char_indices() {
            if c == '\n' {
                line_starts.push(i + 1);
            }
        }
        Self { source, line_starts }
    }

    /// Get a line of source code, without its terminator.
    pub fn line(&self, line_number: usize) -> Option<&'a str> {
        if line_number == 0 || line_number > self.line_starts.len() {
            return None;
        }
        let start = self.line_starts[line_number - 1];
        let end = self
            .line_starts
            .get(line_number)
            .copied()
            .unwrap_or(self.source.len());
        Some(self.source[start..end].trim_end_matches(|c: char| c == '\n' || c == '\r'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_display() {
        let span = Span::new(3, 7, 3, 12);
        assert_eq!(format!("{}", span), "3:7");
    }

    #[test]
    fn test_span_merge() {
        let span1 = Span::new(1, 1, 1, 5);
        let span2 = Span::new(2, 10, 2, 15);
        let merged = span1.merge(&span2);
        assert_eq!((merged.start_line, merged.start_column), (1, 1));
        assert_eq!((merged.end_line, merged.end_column), (2, 15));
    }

    #[test]
    fn test_source_map_lines() {
        let map = SourceMap::new(": DECLARACOES\r\nx : INTEIRO\n: PROGRAMA");
        assert_eq!(map.line(1), Some(": DECLARACOES"));
        assert_eq!(map.line(2), Some("x : INTEIRO"));
        assert_eq!(map.line(3), Some(": PROGRAMA"));
        assert_eq!(map.line(4), None);
    }
}
