//! DDL Default Reader
//!
//! Recursive descent with one token of lookahead:
//!
//! ```text
//! document := value EndOfInput
//! value    := map | list | string | number | boolean | void
//! map      := '{' (mapEntry (',' mapEntry)*)? '}'
//! mapEntry := key ':' value
//! key      := name | string
//! list     := '[' (value (',' value)*)? ']'
//! ```
//!
//! The first error aborts the run; no partial tree is returned.

use crate::document::node::{
    BooleanNode, ListNode, MapEntry, MapNode, NameNode, Node, NumberNode, StringNode, VoidNode,
};
use crate::errors::{DdlError, ErrorKind, ErrorReporting, SourceContext};
use crate::syntax::{Cursor, Lexer, StringTable, TokenKind};

/// Default nesting limit for maps and lists. Deep enough for real
/// documents and shallow enough that an unoptimised build reading a map
/// nested this far still fits in a 2 MiB thread stack.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// What to do when a map repeats a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateKeyPolicy {
    /// The later value replaces the earlier one; the key keeps its position.
    #[default]
    LastWins,
    /// The earlier value is kept and later ones are dropped.
    FirstWins,
    /// A repeated key is a syntax error.
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderOptions {
    pub duplicate_keys: DuplicateKeyPolicy,
    pub max_depth: usize,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            duplicate_keys: DuplicateKeyPolicy::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Reads DDL documents, interning names through the given table.
pub struct Reader<'t> {
    strings: &'t mut StringTable,
    options: ReaderOptions,
}

impl<'t> Reader<'t> {
    pub fn new(strings: &'t mut StringTable) -> Self {
        Self::with_options(strings, ReaderOptions::default())
    }

    pub fn with_options(strings: &'t mut StringTable, options: ReaderOptions) -> Self {
        Self { strings, options }
    }

    /// Parses the whole of `source` into a single DDL value.
    pub fn run(&mut self, source: &SourceContext) -> Result<Node, DdlError> {
        let _span = tracing::debug_span!("ddl_read", source = %source.name).entered();
        let lexer = Lexer::new(source, &mut *self.strings);
        let mut parser = Parser {
            cursor: Cursor::new(lexer, self.options.max_depth)?,
            options: self.options,
        };
        let node = parser.value()?;
        parser.cursor.finish()?;
        tracing::debug!(kind = %node.kind(), depth = node.depth(), "document read");
        Ok(node)
    }
}

struct Parser<'src, 't> {
    cursor: Cursor<'src, 't>,
    options: ReaderOptions,
}

impl<'src, 't> Parser<'src, 't> {
    fn value(&mut self) -> Result<Node, DdlError> {
        let token = self.cursor.peek();
        let span = token.span;
        match &token.kind {
            TokenKind::LeftBrace => self.map(),
            TokenKind::LeftBracket => self.list(),
            TokenKind::String(_) => {
                let token = self.cursor.bump()?;
                let TokenKind::String(literal) = token.kind else {
                    unreachable!("peeked a string token")
                };
                Ok(Node::String(StringNode::from_literal(literal, span)))
            }
            TokenKind::Number(text) => {
                let node = NumberNode::from_literal(text, span)
                    .map_err(|_| self.cursor.source().invalid_literal("number", text, span))?;
                self.cursor.bump()?;
                Ok(Node::Number(node))
            }
            TokenKind::Name(name) => {
                let node = match name.as_str() {
                    "true" | "false" => BooleanNode::from_literal(name.as_str(), span).map(Node::Boolean),
                    "void" => VoidNode::from_literal(name.as_str(), span).map(Node::Void),
                    _ => {
                        return Err(self.cursor.unexpected("a value").with_help(
                            "bare names are only allowed as map keys; quote the text to make it a string",
                        ))
                    }
                };
                let node = node.map_err(|err| {
                    self.cursor
                        .source()
                        .invalid_literal("literal", &err.to_string(), span)
                })?;
                self.cursor.bump()?;
                Ok(node)
            }
            _ => Err(self.cursor.unexpected("a value")),
        }
    }

    fn map(&mut self) -> Result<Node, DdlError> {
        self.cursor.descend()?;
        let open = self.cursor.expect(&TokenKind::LeftBrace, "`{`")?;
        let mut map = MapNode::new(open.span);

        if let Some(close) = self.cursor.eat(&TokenKind::RightBrace)? {
            map.span = open.span.to(close.span);
            self.cursor.ascend();
            return Ok(Node::Map(map));
        }

        let close = loop {
            let entry = self.map_entry()?;
            self.insert(&mut map, entry)?;
            if self.cursor.eat(&TokenKind::Comma)?.is_some() {
                continue;
            }
            break self.cursor.expect(&TokenKind::RightBrace, "`,` or `}`")?;
        };

        map.span = open.span.to(close.span);
        self.cursor.ascend();
        Ok(Node::Map(map))
    }

    fn map_entry(&mut self) -> Result<MapEntry, DdlError> {
        let key = self.key()?;
        self.cursor.expect(&TokenKind::Colon, "`:`")?;
        let value = self.value()?;
        Ok(MapEntry { key, value })
    }

    fn key(&mut self) -> Result<NameNode, DdlError> {
        let token = self.cursor.peek();
        let span = token.span;
        match &token.kind {
            TokenKind::Name(name) => {
                let name = name.clone();
                self.cursor.bump()?;
                Ok(NameNode::new(name, span))
            }
            TokenKind::String(literal) => {
                let text = literal.value.clone();
                let name = self.cursor.intern(&text);
                self.cursor.bump()?;
                Ok(NameNode::new(name, span))
            }
            _ => Err(self.cursor.unexpected("map key")),
        }
    }

    fn insert(&mut self, map: &mut MapNode, entry: MapEntry) -> Result<(), DdlError> {
        let Some(existing) = map.entry(entry.key.as_str()) else {
            map.insert(entry);
            return Ok(());
        };
        tracing::debug!(key = %entry.key.name, at = %entry.key.span, policy = ?self.options.duplicate_keys, "duplicate key");
        match self.options.duplicate_keys {
            DuplicateKeyPolicy::LastWins => {
                map.insert(entry);
            }
            DuplicateKeyPolicy::FirstWins => {}
            DuplicateKeyPolicy::Reject => {
                return Err(self.cursor.source().report(
                    ErrorKind::DuplicateKey {
                        key: entry.key.as_str().to_string(),
                        first: existing.key.span,
                    },
                    entry.key.span,
                ));
            }
        }
        Ok(())
    }

    fn list(&mut self) -> Result<Node, DdlError> {
        self.cursor.descend()?;
        let open = self.cursor.expect(&TokenKind::LeftBracket, "`[`")?;

        if let Some(close) = self.cursor.eat(&TokenKind::RightBracket)? {
            self.cursor.ascend();
            return Ok(Node::List(ListNode::new(Vec::new(), open.span.to(close.span))));
        }

        let mut items = Vec::new();
        let close = loop {
            items.push(self.value()?);
            if self.cursor.eat(&TokenKind::Comma)?.is_some() {
                continue;
            }
            break self.cursor.expect(&TokenKind::RightBracket, "`,` or `]`")?;
        };

        self.cursor.ascend();
        Ok(Node::List(ListNode::new(items, open.span.to(close.span))))
    }
}
