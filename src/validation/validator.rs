//! Walks a DDL tree against a DDLS type.
//!
//! Findings are appended to the [`ValidationContext`]; a mismatch never
//! aborts the walk of sibling nodes. References are resolved through the
//! [`SymbolTable`] each time they are visited, from the scope the reference
//! was written in.

use crate::document::node::{MapNode, Node};
use crate::schema::{ListType, MapType, ScalarType, TypeNode};
use crate::validation::context::{DiagnosticCode, ValidationContext};
use crate::validation::scope::{DocumentId, ScopeId, SymbolId, SymbolTable};

/// Where a type node was written: the scope its references resolve from
/// and the document its map types belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub scope: ScopeId,
    pub document: DocumentId,
}

pub struct Validator<'a, 's> {
    table: &'a SymbolTable<'s>,
    context: &'a mut ValidationContext,
}

impl<'a, 's> Validator<'a, 's> {
    pub fn new(table: &'a SymbolTable<'s>, context: &'a mut ValidationContext) -> Self {
        Self { table, context }
    }

    /// Validates `node` against the root type of `document`.
    pub fn run_document(&mut self, document: DocumentId, node: &Node) {
        let doc = self.table.document(document);
        let _span = tracing::debug_span!("validate", schema = %doc.name).entered();
        let frame = Frame {
            scope: doc.scope,
            document,
        };
        self.visit(&doc.schema.root, node, frame);
        tracing::debug!(
            diagnostics = self.context.diagnostics().len(),
            valid = self.context.diagnostics().is_valid(),
            "validation finished"
        );
    }

    /// Validates `node` against `ty`, a type written at the top level of
    /// `document` (its root or a declaration body).
    pub fn run(&mut self, document: DocumentId, ty: &TypeNode, node: &Node) {
        let frame = Frame {
            scope: self.table.document(document).scope,
            document,
        };
        self.visit(ty, node, frame);
    }

    fn visit(&mut self, ty: &TypeNode, node: &Node, frame: Frame) {
        match ty {
            TypeNode::Scalar(scalar) => self.scalar(scalar, node),
            TypeNode::Map(map) => self.map(map, node, frame),
            TypeNode::List(list) => self.list(list, node, frame),
            TypeNode::Reference(_) => self.reference(ty, node, frame),
        }
    }

    fn mismatch(&mut self, expected: &str, node: &Node) {
        self.context.error(
            DiagnosticCode::TypeMismatch,
            format!("expected {}, got {}", expected, node.type_name()),
            node.span(),
        );
    }

    fn scalar(&mut self, scalar: &ScalarType, node: &Node) {
        if !scalar.accepts(node.kind()) {
            self.mismatch(scalar.keyword(), node);
        }
    }

    fn list(&mut self, list: &ListType, node: &Node, frame: Frame) {
        let Node::List(items) = node else {
            return self.mismatch("List", node);
        };
        for item in items.items() {
            self.visit(&list.element, item, frame);
        }
    }

    fn map(&mut self, map: &MapType, node: &Node, frame: Frame) {
        let Node::Map(data) = node else {
            return self.mismatch("Map", node);
        };
        let Some(scope) = self.table.map_scope(frame.document, map.id) else {
            tracing::warn!(id = %map.id, "map type without a scope");
            return;
        };
        let inner = Frame { scope, ..frame };

        for (i, field) in map.entries.iter().enumerate() {
            let name = field.key.as_str();
            if map.entries[..i].iter().any(|prev| prev.key.as_str() == name) {
                continue;
            }
            let Some(symbol) = self.table.lookup(scope, name, false) else {
                continue;
            };
            let symbol = self.table.symbol(symbol);
            let Some(field_ty) = symbol.ty else {
                self.context.error(
                    DiagnosticCode::ConflictingField,
                    format!("conflicting declarations of field {}", name),
                    data.entry(name).map_or(data.span, |entry| entry.key.span),
                );
                continue;
            };
            match data.get(name) {
                Some(value) => self.visit(field_ty, value, inner),
                None => self.context.error(
                    DiagnosticCode::MissingField,
                    format!("missing required field {}", name),
                    data.span,
                ),
            }
        }

        self.unexpected_fields(map, data);
    }

    fn unexpected_fields(&mut self, map: &MapType, data: &MapNode) {
        for entry in data.entries() {
            if !map.declares(entry.key.as_str()) {
                self.context.warning(
                    DiagnosticCode::UnexpectedField,
                    format!("unexpected field {}", entry.key.as_str()),
                    entry.key.span,
                );
            }
        }
    }

    /// Follows a chain of references until it reaches a structural type.
    fn reference(&mut self, ty: &TypeNode, node: &Node, frame: Frame) {
        let mut current = ty;
        let mut frame = frame;
        let mut chain: Vec<SymbolId> = Vec::new();

        while let TypeNode::Reference(reference) = current {
            let Some(id) = self.table.resolve(frame.scope, current) else {
                self.context.error(
                    DiagnosticCode::UnknownReference,
                    format!("unknown schema reference {}", reference.name),
                    node.span(),
                );
                return;
            };
            let symbol = self.table.symbol(id);
            let Some(target) = symbol.ty else {
                self.context.error(
                    DiagnosticCode::AmbiguousReference,
                    format!("ambiguous schema reference {}", reference.name),
                    node.span(),
                );
                return;
            };
            if chain.contains(&id) {
                self.context.error(
                    DiagnosticCode::CyclicReference,
                    format!("cyclic schema reference {}", reference.name),
                    node.span(),
                );
                return;
            }
            chain.push(id);
            frame = Frame {
                scope: self.table.type_scope(id),
                document: symbol.document,
            };
            current = target;
        }

        self.visit(current, node, frame);
    }
}
