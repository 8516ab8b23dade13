//! Source positions and ranges shared by the error and diagnostic channels.
//!
//! Positions are `(line, column)` pairs, 1-indexed, with columns counted in
//! Unicode grapheme clusters rather than bytes so that diagnostics stay
//! correct for blueprint source containing multi-byte characters.

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// A single point in blueprint source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// The position used when the parser supplied none: start of file.
    pub const fn unknown() -> Self {
        Self::new(1, 1)
    }

    /// Convert a byte offset into `source` into a `Position`, counting columns
    /// in grapheme clusters.
    pub fn from_byte_offset(source: &str, offset: usize) -> Self {
        let mut line = 1u32;
        let mut column = 1u32;
        let mut consumed = 0usize;
        for grapheme in source.graphemes(true) {
            if consumed >= offset {
                break;
            }
            if grapheme == "\n" {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
            consumed += grapheme.len();
        }
        Self::new(line, column)
    }
}

/// A half-open range between two positions, used for diagnostic highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// When no next-sibling position is known,
    /// the range ends at `start.line + 1`, column 1.
    pub fn from_start_only(start: Position) -> Self {
        Self {
            start,
            end: Position::new(start.line + 1, 1),
        }
    }

    /// Range used when no position at all is known for the problem.
    pub fn unknown() -> Self {
        let p = Position::unknown();
        Self::new(p, p)
    }
}
