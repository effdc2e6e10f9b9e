//! DDLS tree.
//!
//! Mirrors the shape of DDL documents but describes types. References
//! between declarations are names, resolved later through the symbol table;
//! the tree itself is acyclic.

use std::fmt;

use crate::document::node::{NameNode, NodeKind};
use crate::document::printer::key_literal;
use crate::syntax::{Name, Span};

/// Identifies a map type within one schema document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// SCALARS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Boolean,
    Number,
    String,
    Void,
}

impl ScalarKind {
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "Boolean" => Some(ScalarKind::Boolean),
            "Number" => Some(ScalarKind::Number),
            "String" => Some(ScalarKind::String),
            "Void" => Some(ScalarKind::Void),
            _ => None,
        }
    }

    pub const fn node_kind(&self) -> NodeKind {
        match self {
            ScalarKind::Boolean => NodeKind::Boolean,
            ScalarKind::Number => NodeKind::Number,
            ScalarKind::String => NodeKind::String,
            ScalarKind::Void => NodeKind::Void,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        self.node_kind().as_str()
    }
}

/// A terminal rule. Without a constraint it accepts any scalar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarType {
    pub constraint: Option<ScalarKind>,
    pub span: Span,
}

impl ScalarType {
    pub fn new(constraint: Option<ScalarKind>, span: Span) -> Self {
        Self { constraint, span }
    }

    pub fn accepts(&self, kind: NodeKind) -> bool {
        match self.constraint {
            Some(constraint) => constraint.node_kind() == kind,
            None => kind.is_scalar(),
        }
    }

    /// The keyword this type was written as.
    pub fn keyword(&self) -> &'static str {
        self.constraint.map_or("Scalar", |kind| kind.as_str())
    }
}

// ============================================================================
// COMPOSITE TYPES
// ============================================================================

/// A homogeneous list of `element`.
#[derive(Debug, Clone, PartialEq)]
pub struct ListType {
    pub element: Box<TypeNode>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapEntryType {
    pub key: NameNode,
    pub value: TypeNode,
}

/// Declared fields of a map. Repeated keys are kept so the symbol table can
/// flag them.
#[derive(Debug, Clone, PartialEq)]
pub struct MapType {
    pub id: NodeId,
    pub entries: Vec<MapEntryType>,
    pub span: Span,
}

impl MapType {
    /// First entry declared under `key`.
    pub fn entry(&self, key: &str) -> Option<&MapEntryType> {
        self.entries.iter().find(|entry| entry.key.as_str() == key)
    }

    pub fn declares(&self, key: &str) -> bool {
        self.entry(key).is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaReference {
    pub name: Name,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeNode {
    Map(MapType),
    List(ListType),
    Scalar(ScalarType),
    Reference(SchemaReference),
}

impl TypeNode {
    pub fn span(&self) -> Span {
        match self {
            TypeNode::Map(map) => map.span,
            TypeNode::List(list) => list.span,
            TypeNode::Scalar(scalar) => scalar.span,
            TypeNode::Reference(reference) => reference.span,
        }
    }

    /// Short description used in mismatch messages.
    pub fn describe(&self) -> &str {
        match self {
            TypeNode::Map(_) => "Map",
            TypeNode::List(_) => "List",
            TypeNode::Scalar(scalar) => scalar.keyword(),
            TypeNode::Reference(reference) => reference.name.as_str(),
        }
    }

    pub fn as_reference(&self) -> Option<&SchemaReference> {
        match self {
            TypeNode::Reference(reference) => Some(reference),
            _ => None,
        }
    }
}

impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeNode::Map(map) => {
                f.write_str("{")?;
                for (i, entry) in map.entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key_literal(entry.key.as_str()), entry.value)?;
                }
                f.write_str("}")
            }
            TypeNode::List(list) => write!(f, "[{}]", list.element),
            TypeNode::Scalar(scalar) => f.write_str(scalar.keyword()),
            TypeNode::Reference(reference) => f.write_str(reference.name.as_str()),
        }
    }
}

// ============================================================================
// DOCUMENT
// ============================================================================

/// `schema <name> = <body>`
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub name: NameNode,
    pub body: TypeNode,
    pub span: Span,
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "schema {} = {}", self.name.as_str(), self.body)
    }
}

/// A parsed DDLS file: named declarations followed by the root type.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub declarations: Vec<Declaration>,
    pub root: TypeNode,
}

impl Schema {
    /// First declaration named `name`.
    pub fn declaration(&self, name: &str) -> Option<&Declaration> {
        self.declarations
            .iter()
            .find(|decl| decl.name.as_str() == name)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for decl in &self.declarations {
            writeln!(f, "{}", decl)?;
        }
        write!(f, "{}", self.root)
    }
}
