//! Lexer shared by the DDL and DDLS grammars.
//!
//! Produces a forward-only stream of tokens terminated by `EndOfInput`.
//! Whitespace and comments are skipped. The literal keywords `true`, `false`,
//! `void` and the schema keywords are lexed as names; the readers reclassify
//! them.

use std::fmt;

use serde::Serialize;

use crate::errors::{DdlError, ErrorKind, ErrorReporting, SourceContext};
use crate::syntax::number::{self, NumberError};
use crate::syntax::strings::{Name, StringTable};
use crate::syntax::Span;

// ============================================================================
// TOKENS
// ============================================================================

/// A decoded string literal together with its quoted source form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StringLiteral {
    pub value: String,
    pub literal: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Name(Name),
    String(StringLiteral),
    Number(String),
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Colon,
    Comma,
    Equals,
    EndOfInput,
}

impl TokenKind {
    /// Human readable description used in syntax errors.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Name(name) => format!("name `{}`", name),
            TokenKind::String(s) => format!("string {}", s.literal),
            TokenKind::Number(n) => format!("number `{}`", n),
            TokenKind::LeftBrace => "`{`".into(),
            TokenKind::RightBrace => "`}`".into(),
            TokenKind::LeftBracket => "`[`".into(),
            TokenKind::RightBracket => "`]`".into(),
            TokenKind::Colon => "`:`".into(),
            TokenKind::Comma => "`,`".into(),
            TokenKind::Equals => "`=`".into(),
            TokenKind::EndOfInput => "end of input".into(),
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn is_end(&self) -> bool {
        self.kind == TokenKind::EndOfInput
    }
}

// ============================================================================
// CODE-POINT READER
// ============================================================================

/// Forward-only code-point reader tracking line and column.
#[derive(Debug, Clone)]
pub struct CharReader<'src> {
    text: &'src str,
    offset: usize,
    line: usize,
    column: usize,
}

/// A saved reader location, used to build spans.
#[derive(Debug, Clone, Copy)]
pub struct Mark {
    offset: usize,
    line: usize,
    column: usize,
}

impl<'src> CharReader<'src> {
    pub fn new(text: &'src str) -> Self {
        Self {
            text,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn has_next(&self) -> bool {
        self.offset < self.text.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn peek_second(&self) -> Option<char> {
        let mut chars = self.rest().chars();
        chars.next();
        chars.next()
    }

    pub fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.offset += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    /// Unconsumed input.
    pub fn rest(&self) -> &'src str {
        &self.text[self.offset..]
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn mark(&self) -> Mark {
        Mark {
            offset: self.offset,
            line: self.line,
            column: self.column,
        }
    }

    /// Span from `mark` to the current location.
    pub fn span_from(&self, mark: Mark) -> Span {
        Span {
            start: mark.offset,
            end: self.offset,
            line: mark.line,
            column: mark.column,
        }
    }

    pub fn slice_from(&self, mark: Mark) -> &'src str {
        &self.text[mark.offset..self.offset]
    }
}

// ============================================================================
// LEXER
// ============================================================================

pub fn is_name_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

pub fn is_name_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-'
}

pub struct Lexer<'src, 't> {
    reader: CharReader<'src>,
    source: &'src SourceContext,
    strings: &'t mut StringTable,
}

impl<'src, 't> Lexer<'src, 't> {
    pub fn new(source: &'src SourceContext, strings: &'t mut StringTable) -> Self {
        Self {
            reader: CharReader::new(&source.content),
            source,
            strings,
        }
    }

    pub fn source(&self) -> &'src SourceContext {
        self.source
    }

    /// Interns text through the session's string table.
    pub fn intern(&mut self, text: &str) -> Name {
        self.strings.intern(text)
    }

    /// Produces the next token. After the end of input has been reached every
    /// call returns another `EndOfInput` token.
    pub fn next_token(&mut self) -> Result<Token, DdlError> {
        self.skip_trivia()?;
        let mark = self.reader.mark();
        let Some(ch) = self.reader.peek() else {
            return Ok(Token {
                kind: TokenKind::EndOfInput,
                span: self.reader.span_from(mark),
            });
        };

        let kind = match ch {
            '{' => self.single(TokenKind::LeftBrace),
            '}' => self.single(TokenKind::RightBrace),
            '[' => self.single(TokenKind::LeftBracket),
            ']' => self.single(TokenKind::RightBracket),
            ':' => self.single(TokenKind::Colon),
            ',' => self.single(TokenKind::Comma),
            '=' => self.single(TokenKind::Equals),
            '"' => self.string()?,
            '+' | '-' | '0'..='9' => self.number()?,
            c if is_name_start(c) => self.name(),
            other => {
                self.reader.advance();
                return Err(self.source.report(
                    ErrorKind::UnexpectedCharacter { found: other },
                    self.reader.span_from(mark),
                ));
            }
        };

        let token = Token {
            kind,
            span: self.reader.span_from(mark),
        };
        tracing::trace!(token = %token.kind, at = %token.span, "lexed token");
        Ok(token)
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.reader.advance();
        kind
    }

    fn skip_trivia(&mut self) -> Result<(), DdlError> {
        loop {
            match (self.reader.peek(), self.reader.peek_second()) {
                (Some(' ' | '\t' | '\r' | '\n'), _) => {
                    self.reader.advance();
                }
                (Some('#'), _) | (Some('/'), Some('/')) => self.skip_line(),
                (Some('/'), Some('*')) => self.skip_block_comment()?,
                _ => return Ok(()),
            }
        }
    }

    fn skip_line(&mut self) {
        while let Some(ch) = self.reader.peek() {
            if ch == '\n' {
                break;
            }
            self.reader.advance();
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), DdlError> {
        let mark = self.reader.mark();
        self.reader.advance();
        self.reader.advance();
        loop {
            match self.reader.advance() {
                Some('*') if self.reader.peek() == Some('/') => {
                    self.reader.advance();
                    return Ok(());
                }
                Some(_) => {}
                None => {
                    let mut span = self.reader.span_from(mark);
                    span.end = span.start + 2;
                    return Err(self.source.report(ErrorKind::UnterminatedComment, span));
                }
            }
        }
    }

    fn name(&mut self) -> TokenKind {
        let mark = self.reader.mark();
        while matches!(self.reader.peek(), Some(c) if is_name_continue(c)) {
            self.reader.advance();
        }
        TokenKind::Name(self.strings.intern(self.reader.slice_from(mark)))
    }

    fn number(&mut self) -> Result<TokenKind, DdlError> {
        let mark = self.reader.mark();
        let rest = self.reader.rest();
        let scanned = number::scan(rest);
        let len = match scanned {
            Ok(len) => len,
            Err(err) => {
                let bad = match err {
                    NumberError::MissingDigits { offset }
                    | NumberError::MissingFraction { offset }
                    | NumberError::MissingExponent { offset } => offset,
                };
                self.advance_bytes(bad);
                let literal = self.reader.slice_from(mark).to_string();
                return Err(self.source.report(
                    ErrorKind::InvalidNumber {
                        literal,
                        reason: reason(err).into(),
                    },
                    self.reader.span_from(mark),
                ));
            }
        };
        self.advance_bytes(len);

        // `12abc` is not a number followed by a name.
        if matches!(self.reader.peek(), Some(c) if is_name_continue(c) || c == '.') {
            while matches!(self.reader.peek(), Some(c) if is_name_continue(c) || c == '.') {
                self.reader.advance();
            }
            return Err(self.source.report(
                ErrorKind::InvalidNumber {
                    literal: self.reader.slice_from(mark).to_string(),
                    reason: "unexpected characters after number".into(),
                },
                self.reader.span_from(mark),
            ));
        }

        Ok(TokenKind::Number(self.reader.slice_from(mark).to_string()))
    }

    fn advance_bytes(&mut self, len: usize) {
        let target = self.reader.offset() + len;
        while self.reader.offset() < target && self.reader.advance().is_some() {}
    }

    fn string(&mut self) -> Result<TokenKind, DdlError> {
        let mark = self.reader.mark();
        self.reader.advance();
        let mut value = String::new();

        loop {
            let escape_mark = self.reader.mark();
            match self.reader.advance() {
                None => {
                    let mut span = self.reader.span_from(mark);
                    span.end = span.start + 1;
                    return Err(self.source.report(ErrorKind::UnterminatedString, span));
                }
                Some('"') => break,
                Some('\n') | Some('\r') => {
                    return Err(self
                        .source
                        .report(ErrorKind::LineBreakInString, self.reader.span_from(escape_mark)));
                }
                Some('\\') => {
                    let ch = self.escape(escape_mark)?;
                    value.push(ch);
                }
                Some(ch) => value.push(ch),
            }
        }

        Ok(TokenKind::String(StringLiteral {
            value,
            literal: self.reader.slice_from(mark).to_string(),
        }))
    }

    fn escape(&mut self, mark: Mark) -> Result<char, DdlError> {
        let ch = match self.reader.advance() {
            Some('"') => '"',
            Some('\\') => '\\',
            Some('/') => '/',
            Some('b') => '\u{0008}',
            Some('f') => '\u{000C}',
            Some('n') => '\n',
            Some('r') => '\r',
            Some('t') => '\t',
            Some('u') => return self.unicode_escape(mark),
            Some(_) | None => return Err(self.invalid_escape(mark)),
        };
        Ok(ch)
    }

    fn unicode_escape(&mut self, mark: Mark) -> Result<char, DdlError> {
        let high = self.hex4(mark)?;
        if !(0xD800..0xDC00).contains(&high) {
            return char::from_u32(high).ok_or_else(|| self.invalid_escape(mark));
        }
        // High surrogate: a `\uXXXX` low surrogate must follow.
        if self.reader.peek() != Some('\\') || self.reader.peek_second() != Some('u') {
            return Err(self.invalid_escape(mark));
        }
        self.reader.advance();
        self.reader.advance();
        let low = self.hex4(mark)?;
        if !(0xDC00..0xE000).contains(&low) {
            return Err(self.invalid_escape(mark));
        }
        let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
        char::from_u32(code).ok_or_else(|| self.invalid_escape(mark))
    }

    fn hex4(&mut self, mark: Mark) -> Result<u32, DdlError> {
        let mut code = 0u32;
        for _ in 0..4 {
            let digit = self
                .reader
                .peek()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.invalid_escape(mark))?;
            self.reader.advance();
            code = code * 16 + digit;
        }
        Ok(code)
    }

    fn invalid_escape(&self, mark: Mark) -> DdlError {
        let escape = self.reader.slice_from(mark).to_string();
        self.source.report(
            ErrorKind::InvalidEscape { escape },
            self.reader.span_from(mark),
        )
    }
}

fn reason(err: NumberError) -> &'static str {
    match err {
        NumberError::MissingDigits { .. } => "expected digits",
        NumberError::MissingFraction { .. } => "expected digits after the decimal point",
        NumberError::MissingExponent { .. } => "expected exponent digits",
    }
}
