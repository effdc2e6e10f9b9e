//! One-token-lookahead cursor used by both recursive-descent readers.

use crate::errors::{DdlError, ErrorKind, ErrorReporting, SourceContext};
use crate::syntax::lexer::{Lexer, Token, TokenKind};
use crate::syntax::strings::Name;
use crate::syntax::Span;

pub struct Cursor<'src, 't> {
    lexer: Lexer<'src, 't>,
    current: Token,
    depth: usize,
    max_depth: usize,
}

impl<'src, 't> Cursor<'src, 't> {
    /// Primes the cursor with the first token.
    pub fn new(mut lexer: Lexer<'src, 't>, max_depth: usize) -> Result<Self, DdlError> {
        let current = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            depth: 0,
            max_depth,
        })
    }

    pub fn source(&self) -> &'src SourceContext {
        self.lexer.source()
    }

    pub fn intern(&mut self, text: &str) -> Name {
        self.lexer.intern(text)
    }

    pub fn peek(&self) -> &Token {
        &self.current
    }

    /// Consumes the current token and returns it.
    pub fn bump(&mut self) -> Result<Token, DdlError> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    /// Consumes the current token when it equals `kind`.
    pub fn eat(&mut self, kind: &TokenKind) -> Result<Option<Token>, DdlError> {
        if &self.current.kind == kind {
            return self.bump().map(Some);
        }
        Ok(None)
    }

    /// Consumes a token of the given punctuation kind or fails naming `expected`.
    pub fn expect(&mut self, kind: &TokenKind, expected: &str) -> Result<Token, DdlError> {
        match self.eat(kind)? {
            Some(token) => Ok(token),
            None => Err(self.unexpected(expected)),
        }
    }

    /// Consumes a name token.
    pub fn expect_name(&mut self, expected: &str) -> Result<(Name, Span), DdlError> {
        if let TokenKind::Name(name) = &self.current.kind {
            let name = name.clone();
            let token = self.bump()?;
            return Ok((name, token.span));
        }
        Err(self.unexpected(expected))
    }

    /// Syntax error at the current token.
    pub fn unexpected(&self, expected: &str) -> DdlError {
        self.source()
            .unexpected_token(expected, &self.current.kind.describe(), self.current.span)
    }

    /// Fails unless the whole input has been consumed.
    pub fn finish(&self) -> Result<(), DdlError> {
        if self.current.is_end() {
            return Ok(());
        }
        Err(self.source().report(
            ErrorKind::TrailingInput {
                found: self.current.kind.describe(),
            },
            self.current.span,
        ))
    }

    /// Enters a nested container, failing past the configured depth.
    pub fn descend(&mut self) -> Result<(), DdlError> {
        if self.depth >= self.max_depth {
            return Err(self.source().report(
                ErrorKind::NestingTooDeep {
                    limit: self.max_depth,
                },
                self.current.span,
            ));
        }
        self.depth += 1;
        Ok(())
    }

    pub fn ascend(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}
