//! Source positions and ranges
//!
//! Locations are line/column based (both 1-based) rather than byte offsets,
//! since every diagnostic is rendered as `line:col`. The scanner derives them
//! from byte ranges through a [`LineIndex`]; the parser only ever combines
//! them with [`SourceLocation::merge`].

use std::fmt;
use std::ops::Range;

/// A single line/column position. Orders by line, then column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Contiguous source range, inclusive at both ends
///
/// `end` is the position of the last character covered, so a lexeme of one
/// character is a point (`start == end`). All-zero is [`SourceLocation::UNKNOWN`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourceLocation {
    pub start: Position,
    pub end: Position,
}

impl SourceLocation {
    /// No known location. Only internal faults are ever reported without one.
    pub const UNKNOWN: Self = Self {
        start: Position::new(0, 0),
        end: Position::new(0, 0),
    };

    /// Zero-width location of a single lexeme
    pub const fn point(line: u32, column: u32) -> Self {
        let pos = Position::new(line, column);
        Self { start: pos, end: pos }
    }

    /// Range between two positions, in whichever order they are given
    pub fn span(a: Position, b: Position) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn is_unknown(&self) -> bool {
        *self == Self::UNKNOWN
    }

    pub fn start_line(&self) -> u32 {
        self.start.line
    }

    pub fn start_column(&self) -> u32 {
        self.start.column
    }

    pub fn end_line(&self) -> u32 {
        self.end.line
    }

    pub fn end_column(&self) -> u32 {
        self.end.column
    }

    /// Smallest range enclosing both locations.
    ///
    /// Commutative and associative, with [`SourceLocation::UNKNOWN`] as the
    /// identity, so reductions can combine children in any order.
    pub fn merge(self, other: Self) -> Self {
        if self.is_unknown() {
            return other;
        }
        if other.is_unknown() {
            return self;
        }
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Merge every location yielded by `locations`
    pub fn merge_all(locations: impl IntoIterator<Item = Self>) -> Self {
        locations.into_iter().fold(Self::UNKNOWN, Self::merge)
    }

    /// Whether `other` lies entirely within this range
    pub fn covers(&self, other: &Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start)
    }
}

/// Maps byte offsets of one source text to line/column positions
pub struct LineIndex<'a> {
    source: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(source: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { source, line_starts }
    }

    /// Position of the character starting at `offset`. Offsets past the end
    /// clamp to the end of input; columns count characters, not bytes.
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.source.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let line_start = self.line_starts[line];
        let column = self
            .source
            .get(line_start..offset)
            .map_or(offset - line_start, |text| text.chars().count());
        Position::new(line as u32 + 1, column as u32 + 1)
    }

    /// Location of the lexeme occupying `range`
    pub fn location(&self, range: Range<usize>) -> SourceLocation {
        let start = self.position(range.start);
        let last = self.source[..range.end.min(self.source.len())]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .filter(|&i| i >= range.start);
        match last {
            Some(last) => SourceLocation::span(start, self.position(last)),
            None => SourceLocation::span(start, start),
        }
    }
}
