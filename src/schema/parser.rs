//! DDLS Default Reader
//!
//! ```text
//! schema       := declaration* typeExpr EndOfInput
//! declaration  := 'schema' name '=' typeExpr
//! typeExpr     := mapType | listType | scalarType | schemaRef
//! mapType      := '{' (mapEntryType (',' mapEntryType)*)? '}'
//! mapEntryType := key ':' typeExpr
//! listType     := '[' typeExpr ']'
//! scalarType   := 'Boolean' | 'Number' | 'String' | 'Void' | 'Scalar'
//! schemaRef    := name
//! ```

use crate::document::node::NameNode;
use crate::document::parser::DEFAULT_MAX_DEPTH;
use crate::errors::{DdlError, ErrorKind, ErrorReporting, SourceContext};
use crate::schema::node::{
    Declaration, ListType, MapEntryType, MapType, NodeId, ScalarKind, ScalarType, Schema,
    SchemaReference, TypeNode,
};
use crate::syntax::{Cursor, Lexer, Span, StringTable, TokenKind};

pub const SCHEMA_KEYWORD: &str = "schema";
pub const ANY_SCALAR_KEYWORD: &str = "Scalar";

/// Words that cannot name a declaration.
pub fn is_reserved(word: &str) -> bool {
    word == SCHEMA_KEYWORD || word == ANY_SCALAR_KEYWORD || ScalarKind::from_keyword(word).is_some()
}

pub struct Reader<'t> {
    strings: &'t mut StringTable,
    max_depth: usize,
}

impl<'t> Reader<'t> {
    pub fn new(strings: &'t mut StringTable) -> Self {
        Self {
            strings,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parses a whole schema document.
    pub fn run(&mut self, source: &SourceContext) -> Result<Schema, DdlError> {
        let _span = tracing::debug_span!("ddls_read", source = %source.name).entered();
        let lexer = Lexer::new(source, &mut *self.strings);
        let mut parser = Parser {
            cursor: Cursor::new(lexer, self.max_depth)?,
            next_id: 0,
        };

        let mut declarations = Vec::new();
        while parser.at_keyword(SCHEMA_KEYWORD) {
            declarations.push(parser.declaration()?);
        }
        let root = parser.type_expr()?;
        parser.cursor.finish()?;

        tracing::debug!(
            declarations = declarations.len(),
            map_types = parser.next_id,
            "schema read"
        );
        Ok(Schema { declarations, root })
    }
}

struct Parser<'src, 't> {
    cursor: Cursor<'src, 't>,
    next_id: u32,
}

impl<'src, 't> Parser<'src, 't> {
    fn at_keyword(&self, keyword: &str) -> bool {
        matches!(&self.cursor.peek().kind, TokenKind::Name(name) if name.as_str() == keyword)
    }

    fn declaration(&mut self) -> Result<Declaration, DdlError> {
        let start = self.cursor.bump()?.span;
        let (name, span) = self.cursor.expect_name("declaration name")?;
        if is_reserved(name.as_str()) {
            return Err(self.cursor.source().report(
                ErrorKind::ReservedWord {
                    word: name.as_str().to_string(),
                },
                span,
            ));
        }
        self.cursor.expect(&TokenKind::Equals, "`=`")?;
        let body = self.type_expr()?;
        let span_all = start.to(body.span());
        Ok(Declaration {
            name: NameNode::new(name, span),
            body,
            span: span_all,
        })
    }

    fn type_expr(&mut self) -> Result<TypeNode, DdlError> {
        let token = self.cursor.peek();
        let span = token.span;
        match &token.kind {
            TokenKind::LeftBrace => self.map_type(),
            TokenKind::LeftBracket => self.list_type(),
            TokenKind::Name(name) if name.as_str() == SCHEMA_KEYWORD => Err(self
                .cursor
                .unexpected("a type")
                .with_help("declarations must come before the root type")),
            TokenKind::Name(name) => {
                let node = if name.as_str() == ANY_SCALAR_KEYWORD {
                    TypeNode::Scalar(ScalarType::new(None, span))
                } else if let Some(kind) = ScalarKind::from_keyword(name.as_str()) {
                    TypeNode::Scalar(ScalarType::new(Some(kind), span))
                } else {
                    TypeNode::Reference(SchemaReference {
                        name: name.clone(),
                        span,
                    })
                };
                self.cursor.bump()?;
                Ok(node)
            }
            _ => Err(self.cursor.unexpected("a type")),
        }
    }

    fn map_type(&mut self) -> Result<TypeNode, DdlError> {
        self.cursor.descend()?;
        let open = self.cursor.expect(&TokenKind::LeftBrace, "`{`")?;
        let id = NodeId(self.next_id);
        self.next_id += 1;

        let mut entries = Vec::new();
        let close = match self.cursor.eat(&TokenKind::RightBrace)? {
            Some(close) => close,
            None => loop {
                let key = self.key()?;
                self.cursor.expect(&TokenKind::Colon, "`:`")?;
                let value = self.type_expr()?;
                entries.push(MapEntryType { key, value });
                if self.cursor.eat(&TokenKind::Comma)?.is_some() {
                    continue;
                }
                break self.cursor.expect(&TokenKind::RightBrace, "`,` or `}`")?;
            },
        };

        self.cursor.ascend();
        Ok(TypeNode::Map(MapType {
            id,
            entries,
            span: open.span.to(close.span),
        }))
    }

    fn key(&mut self) -> Result<NameNode, DdlError> {
        let token = self.cursor.peek();
        let span: Span = token.span;
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
            _ => Err(self.cursor.unexpected("field name")),
        }
    }

    fn list_type(&mut self) -> Result<TypeNode, DdlError> {
        self.cursor.descend()?;
        let open = self.cursor.expect(&TokenKind::LeftBracket, "`[`")?;
        let element = self.type_expr()?;
        let close = self.cursor.expect(&TokenKind::RightBracket, "`]`")?;
        self.cursor.ascend();
        Ok(TypeNode::List(ListType {
            element: Box::new(element),
            span: open.span.to(close.span),
        }))
    }
}
