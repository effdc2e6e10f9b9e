//! DDL tree.
//!
//! Every node carries the span it was parsed from. Parents own their
//! children; nothing is mutated once the reader hands the tree out.

use std::fmt;

use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::syntax::lexer::StringLiteral;
use crate::syntax::number;
use crate::syntax::{Name, Span};

/// Failure to build a scalar node from literal text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LiteralError {
    #[error("invalid boolean literal '{0}', expected 'true' or 'false'")]
    Boolean(String),
    #[error("invalid void literal '{0}', expected 'void'")]
    Void(String),
    #[error("invalid number literal '{0}'")]
    Number(String),
}

// ============================================================================
// NODE KINDS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeKind {
    Map,
    List,
    Boolean,
    Number,
    String,
    Void,
}

impl NodeKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Map => "Map",
            NodeKind::List => "List",
            NodeKind::Boolean => "Boolean",
            NodeKind::Number => "Number",
            NodeKind::String => "String",
            NodeKind::Void => "Void",
        }
    }

    pub const fn is_scalar(&self) -> bool {
        !matches!(self, NodeKind::Map | NodeKind::List)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// NODES
// ============================================================================

/// An interned identifier with its location. Used for map keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameNode {
    pub name: Name,
    pub span: Span,
}

impl NameNode {
    pub fn new(name: Name, span: Span) -> Self {
        Self { name, span }
    }

    pub fn as_str(&self) -> &str {
        self.name.as_str()
    }
}

/// A key/value pair of a map.
#[derive(Debug, Clone, PartialEq)]
pub struct MapEntry {
    pub key: NameNode,
    pub value: Node,
}

/// Map keyed by interned name. Iteration follows first insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct MapNode {
    entries: IndexMap<Name, MapEntry>,
    pub span: Span,
}

impl MapNode {
    pub fn new(span: Span) -> Self {
        Self {
            entries: IndexMap::new(),
            span,
        }
    }

    /// Inserts an entry, replacing the value of an existing key in place.
    /// Returns the replaced entry.
    pub fn insert(&mut self, entry: MapEntry) -> Option<MapEntry> {
        self.entries.insert(entry.key.name.clone(), entry)
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries.get(key).map(|entry| &entry.value)
    }

    pub fn entry(&self, key: &str) -> Option<&MapEntry> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn entries(&self) -> impl Iterator<Item = &MapEntry> {
        self.entries.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Name> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListNode {
    items: Vec<Node>,
    pub span: Span,
}

impl ListNode {
    pub fn new(items: Vec<Node>, span: Span) -> Self {
        Self { items, span }
    }

    pub fn items(&self) -> &[Node] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&Node> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanNode {
    value: bool,
    pub span: Span,
}

impl BooleanNode {
    pub fn new(value: bool, span: Span) -> Self {
        Self { value, span }
    }

    /// Accepts exactly `true` or `false`.
    pub fn from_literal(text: &str, span: Span) -> Result<Self, LiteralError> {
        match text {
            "true" => Ok(Self::new(true, span)),
            "false" => Ok(Self::new(false, span)),
            other => Err(LiteralError::Boolean(other.to_string())),
        }
    }

    pub fn as_bool(&self) -> bool {
        self.value
    }

    pub fn literal(&self) -> &'static str {
        if self.value {
            "true"
        } else {
            "false"
        }
    }
}

/// A number kept as its literal text; the numeric type is decided by the
/// consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberNode {
    literal: String,
    pub span: Span,
}

impl NumberNode {
    pub fn from_literal(text: &str, span: Span) -> Result<Self, LiteralError> {
        if !number::is_literal(text) {
            return Err(LiteralError::Number(text.to_string()));
        }
        Ok(Self {
            literal: text.to_string(),
            span,
        })
    }

    pub fn from_i64(value: i64, span: Span) -> Self {
        Self {
            literal: value.to_string(),
            span,
        }
    }

    pub fn literal(&self) -> &str {
        &self.literal
    }

    pub fn is_integer(&self) -> bool {
        number::is_integer_literal(&self.literal)
    }

    pub fn as_i64(&self) -> Option<i64> {
        if !self.is_integer() {
            return None;
        }
        self.literal.trim_start_matches('+').parse().ok()
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.literal
            .trim_start_matches('+')
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
    }
}

/// A string value together with the quoted form it was written as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringNode {
    value: String,
    literal: String,
    pub span: Span,
}

impl StringNode {
    pub fn new(value: impl Into<String>, span: Span) -> Self {
        let value = value.into();
        let literal = quote(&value);
        Self {
            value,
            literal,
            span,
        }
    }

    pub fn from_literal(literal: StringLiteral, span: Span) -> Self {
        Self {
            value: literal.value,
            literal: literal.literal,
            span,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// The quoted source form.
    pub fn literal(&self) -> &str {
        &self.literal
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoidNode {
    pub span: Span,
}

impl VoidNode {
    pub fn new(span: Span) -> Self {
        Self { span }
    }

    /// Accepts exactly `void`.
    pub fn from_literal(text: &str, span: Span) -> Result<Self, LiteralError> {
        if text != "void" {
            return Err(LiteralError::Void(text.to_string()));
        }
        Ok(Self::new(span))
    }

    pub fn literal(&self) -> &'static str {
        "void"
    }
}

/// A DDL value.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Map(MapNode),
    List(ListNode),
    Boolean(BooleanNode),
    Number(NumberNode),
    String(StringNode),
    Void(VoidNode),
}

impl Node {
    pub fn span(&self) -> Span {
        match self {
            Node::Map(n) => n.span,
            Node::List(n) => n.span,
            Node::Boolean(n) => n.span,
            Node::Number(n) => n.span,
            Node::String(n) => n.span,
            Node::Void(n) => n.span,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Map(_) => NodeKind::Map,
            Node::List(_) => NodeKind::List,
            Node::Boolean(_) => NodeKind::Boolean,
            Node::Number(_) => NodeKind::Number,
            Node::String(_) => NodeKind::String,
            Node::Void(_) => NodeKind::Void,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.kind().as_str()
    }

    pub fn as_map(&self) -> Option<&MapNode> {
        match self {
            Node::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListNode> {
        match self {
            Node::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(s) => Some(s.value()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Node::Boolean(b) => Some(b.as_bool()),
            _ => None,
        }
    }

    /// Structural equality that ignores spans, the quoting style of
    /// strings and the order of map entries.
    pub fn value_eq(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Map(a), Node::Map(b)) => {
                a.len() == b.len()
                    && a.entries().all(|x| {
                        b.get(x.key.as_str())
                            .is_some_and(|y| x.value.value_eq(y))
                    })
            }
            (Node::List(a), Node::List(b)) => {
                a.len() == b.len()
                    && a.items().iter().zip(b.items()).all(|(x, y)| x.value_eq(y))
            }
            (Node::Boolean(a), Node::Boolean(b)) => a.as_bool() == b.as_bool(),
            (Node::Number(a), Node::Number(b)) => a.literal() == b.literal(),
            (Node::String(a), Node::String(b)) => a.value() == b.value(),
            (Node::Void(_), Node::Void(_)) => true,
            _ => false,
        }
    }

    /// Maximum container nesting below and including this node.
    pub fn depth(&self) -> usize {
        match self {
            Node::Map(map) => 1 + map.entries().map(|e| e.value.depth()).max().unwrap_or(0),
            Node::List(list) => 1 + list.items().iter().map(Node::depth).max().unwrap_or(0),
            _ => 0,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&super::printer::to_compact_string(self))
    }
}

// ============================================================================
// SERIALIZATION
// ============================================================================

/// Serializes as plain data: maps become objects, lists arrays, `void`
/// becomes unit, numbers keep integer precision when possible.
impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for entry in map.entries() {
                    out.serialize_entry(&entry.key.name, &entry.value)?;
                }
                out.end()
            }
            Node::List(list) => {
                let mut out = serializer.serialize_seq(Some(list.len()))?;
                for item in list.items() {
                    out.serialize_element(item)?;
                }
                out.end()
            }
            Node::Boolean(b) => serializer.serialize_bool(b.as_bool()),
            Node::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => serializer.serialize_i64(i),
                (None, Some(f)) => serializer.serialize_f64(f),
                (None, None) => serializer.serialize_str(n.literal()),
            },
            Node::String(s) => serializer.serialize_str(s.value()),
            Node::Void(_) => serializer.serialize_unit(),
        }
    }
}

/// Quotes and escapes `value` as a DDL string literal.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
