//! Source location tracking
//!
//! Positions carry a byte offset plus a 1-based line and column. Property
//! values are usually one line, but templates may span several.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in source text
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    /// Byte offset from start of input (0-based)
    pub offset: usize,
    /// Line number (1-based)
    pub line: u32,
    /// Column number in characters (1-based)
    pub column: u32,
}

impl Position {
    pub fn new(offset: usize, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    pub fn start() -> Self {
        Self::new(0, 1, 1)
    }

    /// Advance past one character
    pub fn advance(self, ch: char) -> Self {
        match ch {
            '\n' => Self::new(self.offset + 1, self.line + 1, 1),
            _ => Self::new(self.offset + ch.len_utf8(), self.line, self.column + 1),
        }
    }

    pub fn advance_str(self, s: &str) -> Self {
        s.chars().fold(self, |pos, ch| pos.advance(ch))
    }

    /// Shift a position found in a nested source so it is relative to `base`
    pub fn relative_to(self, base: Position) -> Self {
        if self.line <= 1 {
            Self::new(
                base.offset + self.offset,
                base.line,
                base.column + self.column - 1,
            )
        } else {
            Self::new(base.offset + self.offset, base.line + self.line - 1, self.column)
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A half-open span of source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(
            start.offset <= end.offset,
            "Span start must not be after end"
        );
        Self { start, end }
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    /// Zero-width span at a position
    pub fn point(pos: Position) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Smallest span covering both
    pub fn to(&self, other: Span) -> Span {
        let start = if self.start.offset <= other.start.offset {
            self.start
        } else {
            other.start
        };
        let end = if self.end.offset >= other.end.offset {
            self.end
        } else {
            other.end
        };
        Span::new(start, end)
    }

    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    pub fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.offset >= self.start.offset && pos.offset < self.end.offset
    }

    pub fn slice<'a>(&self, input: &'a str) -> &'a str {
        input.get(self.start.offset..self.end.offset).unwrap_or("")
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(
                f,
                "{}:{}-{}",
                self.start.line, self.start.column, self.end.column
            )
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// A value with its source location
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Spanned<T> {
    pub value: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(value: T, span: Span) -> Self {
        Self { value, span }
    }

    pub fn map<U, F>(self, f: F) -> Spanned<U>
    where
        F: FnOnce(T) -> U,
    {
        Spanned {
            value: f(self.value),
            span: self.span,
        }
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T: fmt::Display> fmt::Display for Spanned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Line index over a source string, used for caret diagnostics
#[derive(Debug, Clone)]
pub struct SourceMap {
    pub source: String,
    line_starts: Vec<usize>,
}

impl SourceMap {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let mut line_starts = vec![0];
        for (offset, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(offset + 1);
            }
        }
        Self {
            source,
            line_starts,
        }
    }

    /// Line and column for a byte offset (clamped to the source length)
    pub fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.source.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };

        let line_start = self.line_starts[line];
        let column = self
            .source
            .get(line_start..offset)
            .map(|s| s.chars().count())
            .unwrap_or(0);

        Position::new(offset, (line + 1) as u32, (column + 1) as u32)
    }

    /// Line text by 1-based line number
    pub fn get_line(&self, line_num: u32) -> Option<&str> {
        let line_idx = (line_num as usize).checked_sub(1)?;
        let start = *self.line_starts.get(line_idx)?;
        let end = self
            .line_starts
            .get(line_idx + 1)
            .map(|next| next - 1)
            .unwrap_or(self.source.len());

        self.source.get(start..end)
    }

    /// `message` followed by the offending line and a caret underline
    pub fn format_error(&self, offset: usize, message: &str) -> String {
        let pos = self.position_at(offset);
        let mut result = format!("error: {}\n  --> {}:{}\n", message, pos.line, pos.column);

        if let Some(line) = self.get_line(pos.line) {
            let line_num = pos.line.to_string();
            let padding = " ".repeat(line_num.len());
            result.push_str(&format!("{} |\n", padding));
            result.push_str(&format!("{} | {}\n", line_num, line));
            result.push_str(&format!(
                "{} | {}^\n",
                padding,
                " ".repeat((pos.column - 1) as usize)
            ));
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_advance() {
        let pos = Position::start().advance('a').advance('é');
        assert_eq!(pos.offset, 3);
        assert_eq!(pos.column, 3);

        let pos = pos.advance('\n');
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 1);
    }

    #[test]
    fn test_relative_position() {
        let base = Position::new(10, 1, 11);
        let inner = Position::new(3, 1, 4);
        assert_eq!(inner.relative_to(base), Position::new(13, 1, 14));
    }

    #[test]
    fn test_span_merge_and_slice() {
        let source = "${name:trim()}";
        let a = Span::new(Position::new(2, 1, 3), Position::new(6, 1, 7));
        let b = Span::new(Position::new(7, 1, 8), Position::new(13, 1, 14));
        assert_eq!(a.slice(source), "name");
        assert_eq!(a.to(b).slice(source), "name:trim()");
        assert_eq!(a.len(), 4);
    }

    #[test]
    fn test_source_map_caret() {
        let map = SourceMap::new("first\n${a:frob()}");
        let pos = map.position_at(10);
        assert_eq!((pos.line, pos.column), (2, 5));
        assert_eq!(map.get_line(2), Some("${a:frob()}"));

        let rendered = map.format_error(10, "unknown function 'frob'");
        assert!(rendered.contains("--> 2:5"));
        assert!(rendered.ends_with("|     ^\n"));
    }
}
