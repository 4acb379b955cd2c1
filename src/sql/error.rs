//! SQL syntax errors with source positions.

use std::fmt;

/// A byte span in the source SQL string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Byte offset of the start of the span.
    pub start: usize,
    /// Byte offset of the end of the span (exclusive).
    pub end: usize,
}

impl Span {
    /// Creates a new span.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Creates a zero-length span at the given position.
    pub fn at(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }
}

/// A syntax error with the position it occurred at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// Error message.
    pub message: String,
    /// Position in the source.
    pub span: Span,
}

impl SyntaxError {
    /// Creates a syntax error at the given span.
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }

    /// Error for a token other than the expected one.
    pub fn unexpected_token(expected: &str, found: &str, span: Span) -> Self {
        Self::new(format!("expected {}, found {}", expected, found), span)
    }

    /// Computes the 1-based line and column of this error in `source`.
    pub fn line_column(&self, source: &str) -> (usize, usize) {
        let upto = &source[..self.span.start.min(source.len())];
        let line = upto.bytes().filter(|&b| b == b'\n').count() + 1;
        let column = upto
            .rfind('\n')
            .map(|nl| upto[nl + 1..].chars().count())
            .unwrap_or_else(|| upto.chars().count())
            + 1;
        (line, column)
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for SyntaxError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_column_single_line() {
        let err = SyntaxError::new("x", Span::at(7));
        assert_eq!(err.line_column("select borked"), (1, 8));
    }

    #[test]
    fn test_line_column_multi_line() {
        let source = "select *\nfrom t\nwhere ?";
        let err = SyntaxError::new("x", Span::at(source.find('?').unwrap()));
        assert_eq!(err.line_column(source), (3, 7));
    }

    #[test]
    fn test_line_column_at_start() {
        let err = SyntaxError::new("x", Span::at(0));
        assert_eq!(err.line_column("bad"), (1, 1));
    }
}
