//! Syntax foundation shared by the DDL and DDLS grammars.
//!
//! This module provides source location tracking, the string interner used
//! for identifiers, the numeric-literal scanner and the lexer both readers
//! are built on.

use serde::Serialize;

pub mod cursor;
pub mod lexer;
pub mod number;
pub mod strings;

pub use cursor::Cursor;
pub use lexer::{CharReader, Lexer, StringLiteral, Token, TokenKind};
pub use strings::{Name, StringTable};

/// Represents a span in the source code.
///
/// `start` and `end` are byte offsets; `line` and `column` are the 1-based
/// location of `start`, with columns counted in characters.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Default for Span {
    fn default() -> Self {
        Self {
            start: 0,
            end: 0,
            line: 1,
            column: 1,
        }
    }
}

impl Span {
    /// Returns a span covering `self` through the end of `other`.
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start,
            end: other.end.max(self.end),
            line: self.line,
            column: self.column,
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the text covered by this span, if it lies within `source`.
    pub fn slice<'a>(&self, source: &'a str) -> Option<&'a str> {
        source.get(self.start..self.end)
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        miette::SourceSpan::from(span.start..span.end)
    }
}
