//! Symbol table: lexically nested scopes built from DDLS documents.
//!
//! Scopes live in an arena owned by the [`SymbolTable`] and point at their
//! enclosing scope by index. The layout is:
//!
//! - one global scope binding every registered document by name,
//! - one scope per document binding its `schema` declarations,
//! - one scope per map type binding its fields, enclosed by the scope the
//!   map type appears in.
//!
//! Binding a name twice in one scope replaces the slot with an `Error`
//! symbol, so every later reference to it is reported instead of silently
//! picking one of the declarations.

use std::collections::HashMap;
use std::fmt;

use crate::schema::{NodeId, Schema, TypeNode};
use crate::syntax::{Name, Span};
use crate::validation::context::{Diagnostic, DiagnosticCode, Diagnostics};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(usize);

impl DocumentId {
    /// The first document added to a table.
    pub const FIRST: DocumentId = DocumentId(0);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// A whole schema document.
    Schema,
    /// A declaration whose body is another name.
    SchemaReference,
    Map,
    MapEntry,
    Scalar,
    List,
    /// A slot bound more than once.
    Error,
}

impl SymbolKind {
    /// Kind of a declaration with the given body.
    pub fn of_declaration(body: &TypeNode) -> Self {
        match body {
            TypeNode::Map(_) => SymbolKind::Map,
            TypeNode::List(_) => SymbolKind::List,
            TypeNode::Scalar(_) => SymbolKind::Scalar,
            TypeNode::Reference(_) => SymbolKind::SchemaReference,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Schema => "schema",
            SymbolKind::SchemaReference => "alias",
            SymbolKind::Map => "map",
            SymbolKind::MapEntry => "field",
            SymbolKind::Scalar => "scalar",
            SymbolKind::List => "list",
            SymbolKind::Error => "error",
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Symbol<'s> {
    pub name: Name,
    pub kind: SymbolKind,
    /// The declared type. `None` only for `Error` symbols.
    pub ty: Option<&'s TypeNode>,
    /// Scope the symbol is bound in.
    pub scope: ScopeId,
    pub document: DocumentId,
    pub span: Span,
}

impl Symbol<'_> {
    pub fn is_error(&self) -> bool {
        self.kind == SymbolKind::Error
    }
}

#[derive(Debug, Clone)]
pub struct Scope {
    enclosing: Option<ScopeId>,
    symbols: HashMap<Name, SymbolId>,
}

impl Scope {
    pub fn new(enclosing: Option<ScopeId>) -> Self {
        Self {
            enclosing,
            symbols: HashMap::new(),
        }
    }

    /// Binds `name` unless it is already bound here. Returns whether the
    /// binding was made.
    pub fn enter(&mut self, name: Name, symbol: SymbolId) -> bool {
        if self.symbols.contains_key(name.as_str()) {
            return false;
        }
        self.symbols.insert(name, symbol);
        true
    }

    pub fn get(&self, name: &str) -> Option<SymbolId> {
        self.symbols.get(name).copied()
    }

    pub fn enclosing(&self) -> Option<ScopeId> {
        self.enclosing
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    fn rebind(&mut self, name: Name, symbol: SymbolId) {
        self.symbols.insert(name, symbol);
    }
}

/// A schema document registered in the table.
#[derive(Debug, Clone)]
pub struct Document<'s> {
    pub name: Name,
    pub schema: &'s Schema,
    pub scope: ScopeId,
}

#[derive(Debug, Clone)]
pub struct SymbolTable<'s> {
    scopes: Vec<Scope>,
    symbols: Vec<Symbol<'s>>,
    documents: Vec<Document<'s>>,
    map_scopes: HashMap<(DocumentId, NodeId), ScopeId>,
    conflicts: Vec<(DocumentId, Diagnostic)>,
}

impl Default for SymbolTable<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'s> SymbolTable<'s> {
    pub const DEFAULT_DOCUMENT: &'static str = "main";

    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new(None)],
            symbols: Vec::new(),
            documents: Vec::new(),
            map_scopes: HashMap::new(),
            conflicts: Vec::new(),
        }
    }

    /// A table holding just `schema`.
    pub fn build(schema: &'s Schema) -> Self {
        let mut table = Self::new();
        table.add_document(Name::new(Self::DEFAULT_DOCUMENT), schema);
        table
    }

    pub fn global(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol<'s> {
        &self.symbols[id.0]
    }

    pub fn document(&self, id: DocumentId) -> &Document<'s> {
        &self.documents[id.0]
    }

    pub fn documents(&self) -> impl Iterator<Item = (DocumentId, &Document<'s>)> {
        self.documents
            .iter()
            .enumerate()
            .map(|(i, doc)| (DocumentId(i), doc))
    }

    pub fn document_named(&self, name: &str) -> Option<DocumentId> {
        self.documents
            .iter()
            .position(|doc| doc.name.as_str() == name)
            .map(DocumentId)
    }

    /// Registers `schema` under `name` and binds all of its declarations.
    pub fn add_document(&mut self, name: Name, schema: &'s Schema) -> DocumentId {
        let _span = tracing::debug_span!("symbols", document = %name).entered();
        let document = DocumentId(self.documents.len());
        let global = self.global();
        let scope = self.push_scope(Some(global));
        self.documents.push(Document {
            name: name.clone(),
            schema,
            scope,
        });

        self.declare(
            global,
            name,
            SymbolKind::Schema,
            &schema.root,
            document,
            schema.root.span(),
        );

        for decl in &schema.declarations {
            self.declare(
                scope,
                decl.name.name.clone(),
                SymbolKind::of_declaration(&decl.body),
                &decl.body,
                document,
                decl.name.span,
            );
        }
        for decl in &schema.declarations {
            self.bind_type(&decl.body, scope, document);
        }
        self.bind_type(&schema.root, scope, document);

        tracing::debug!(
            scopes = self.scopes.len(),
            symbols = self.symbols.len(),
            "document bound"
        );
        document
    }

    /// Finds `name` in `scope`, walking enclosing scopes when `recursive`.
    pub fn lookup(&self, scope: ScopeId, name: &str, recursive: bool) -> Option<SymbolId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = self.scope(id);
            if let Some(symbol) = scope.get(name) {
                return Some(symbol);
            }
            if !recursive {
                return None;
            }
            current = scope.enclosing();
        }
        None
    }

    /// Resolves the reference `node` seen from `scope`.
    ///
    /// A field whose type is a bare reference does not resolve to itself:
    /// in `{ Person: Person }` the value names the enclosing `Person`.
    pub fn resolve(&self, scope: ScopeId, node: &TypeNode) -> Option<SymbolId> {
        let reference = node.as_reference()?;
        let mut from = scope;
        loop {
            let id = self.lookup(from, reference.name.as_str(), true)?;
            let symbol = self.symbol(id);
            let is_self = symbol.kind == SymbolKind::MapEntry
                && symbol.ty.is_some_and(|ty| std::ptr::eq(ty, node));
            if !is_self {
                return Some(id);
            }
            from = self.scope(symbol.scope).enclosing()?;
        }
    }

    /// Scope of the map type `id` in `document`.
    pub fn map_scope(&self, document: DocumentId, id: NodeId) -> Option<ScopeId> {
        self.map_scopes.get(&(document, id)).copied()
    }

    /// Scope in which the type of `symbol` was written.
    pub fn type_scope(&self, symbol: SymbolId) -> ScopeId {
        let symbol = self.symbol(symbol);
        match symbol.kind {
            SymbolKind::Schema => self.document(symbol.document).scope,
            _ => symbol.scope,
        }
    }

    /// Schema-level findings: repeated declarations and fields, and
    /// references that resolve nowhere.
    pub fn diagnostics(&self) -> Diagnostics {
        let mut out = Diagnostics::new();
        out.extend(self.conflicts.iter().map(|(_, d)| d.clone()));
        for (id, doc) in self.documents() {
            for decl in &doc.schema.declarations {
                self.unresolved(&decl.body, doc.scope, id, &mut out);
            }
            self.unresolved(&doc.schema.root, doc.scope, id, &mut out);
        }
        out
    }

    /// Diagnostics of one document only.
    pub fn document_diagnostics(&self, document: DocumentId) -> Diagnostics {
        let doc = self.document(document);
        let mut out = Diagnostics::new();
        out.extend(
            self.conflicts
                .iter()
                .filter(|(owner, _)| *owner == document)
                .map(|(_, d)| d.clone()),
        );
        for decl in &doc.schema.declarations {
            self.unresolved(&decl.body, doc.scope, document, &mut out);
        }
        self.unresolved(&doc.schema.root, doc.scope, document, &mut out);
        out
    }

    // ------------------------------------------------------------------------

    fn push_scope(&mut self, enclosing: Option<ScopeId>) -> ScopeId {
        self.scopes.push(Scope::new(enclosing));
        ScopeId(self.scopes.len() - 1)
    }

    fn push_symbol(&mut self, symbol: Symbol<'s>) -> SymbolId {
        self.symbols.push(symbol);
        SymbolId(self.symbols.len() - 1)
    }

    fn declare(
        &mut self,
        scope: ScopeId,
        name: Name,
        kind: SymbolKind,
        ty: &'s TypeNode,
        document: DocumentId,
        span: Span,
    ) {
        let id = self.push_symbol(Symbol {
            name: name.clone(),
            kind,
            ty: Some(ty),
            scope,
            document,
            span,
        });
        if self.scopes[scope.0].enter(name.clone(), id) {
            return;
        }

        tracing::debug!(name = %name, kind = %kind, at = %span, "conflicting declaration");
        let message = match kind {
            SymbolKind::MapEntry => format!("duplicate field {}", name),
            _ => format!("duplicate declaration of {}", name),
        };
        let code = match kind {
            SymbolKind::MapEntry => DiagnosticCode::ConflictingField,
            _ => DiagnosticCode::DuplicateDeclaration,
        };
        self.conflicts
            .push((document, Diagnostic::error(code, message, span)));

        let poisoned = self
            .scope(scope)
            .get(name.as_str())
            .is_some_and(|existing| self.symbol(existing).is_error());
        if poisoned {
            return;
        }
        let error = self.push_symbol(Symbol {
            name: name.clone(),
            kind: SymbolKind::Error,
            ty: None,
            scope,
            document,
            span,
        });
        self.scopes[scope.0].rebind(name, error);
    }

    fn bind_type(&mut self, ty: &'s TypeNode, scope: ScopeId, document: DocumentId) {
        match ty {
            TypeNode::Map(map) => {
                let inner = self.push_scope(Some(scope));
                self.map_scopes.insert((document, map.id), inner);
                for entry in &map.entries {
                    self.declare(
                        inner,
                        entry.key.name.clone(),
                        SymbolKind::MapEntry,
                        &entry.value,
                        document,
                        entry.key.span,
                    );
                }
                for entry in &map.entries {
                    self.bind_type(&entry.value, inner, document);
                }
            }
            TypeNode::List(list) => self.bind_type(&list.element, scope, document),
            TypeNode::Scalar(_) | TypeNode::Reference(_) => {}
        }
    }

    fn unresolved(&self, ty: &TypeNode, scope: ScopeId, document: DocumentId, out: &mut Diagnostics) {
        match ty {
            TypeNode::Map(map) => {
                let Some(inner) = self.map_scope(document, map.id) else {
                    return;
                };
                for entry in &map.entries {
                    self.unresolved(&entry.value, inner, document, out);
                }
            }
            TypeNode::List(list) => self.unresolved(&list.element, scope, document, out),
            TypeNode::Reference(reference) => {
                if self.resolve(scope, ty).is_none() {
                    out.push(Diagnostic::error(
                        DiagnosticCode::UnknownReference,
                        format!("unknown schema reference {}", reference.name),
                        reference.span,
                    ));
                }
            }
            TypeNode::Scalar(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;

    #[test]
    fn scope_enter_keeps_first_binding() {
        let mut scope = Scope::new(None);
        assert!(scope.enter(Name::new("a"), SymbolId(0)));
        assert!(!scope.enter(Name::new("a"), SymbolId(1)));
        assert_eq!(scope.get("a"), Some(SymbolId(0)));
        assert_eq!(scope.len(), 1);
    }

    #[test]
    fn declarations_are_classified_by_body() {
        let schema = schema::parse(
            "schema M = {} schema L = [Number] schema S = String schema R = M\nM",
        )
        .unwrap();
        let table = SymbolTable::build(&schema);
        let doc = table.document(DocumentId(0));
        let kind = |name: &str| {
            let id = table.lookup(doc.scope, name, false).unwrap();
            table.symbol(id).kind
        };
        assert_eq!(kind("M"), SymbolKind::Map);
        assert_eq!(kind("L"), SymbolKind::List);
        assert_eq!(kind("S"), SymbolKind::Scalar);
        assert_eq!(kind("R"), SymbolKind::SchemaReference);

        let main = table.lookup(table.global(), "main", false).unwrap();
        assert_eq!(table.symbol(main).kind, SymbolKind::Schema);
        assert_eq!(table.type_scope(main), doc.scope);
    }

    #[test]
    fn map_fields_get_their_own_scope() {
        let schema = schema::parse("schema Id = Number {id: Id, tags: [String]}").unwrap();
        let table = SymbolTable::build(&schema);
        let TypeNode::Map(map) = &schema.root else {
            panic!("expected map root");
        };
        let inner = table.map_scope(DocumentId(0), map.id).unwrap();
        let doc_scope = table.document(DocumentId(0)).scope;
        assert_eq!(table.scope(inner).enclosing(), Some(doc_scope));
        assert!(table.lookup(inner, "tags", false).is_some());
        assert!(table.lookup(inner, "Id", false).is_none());
        assert!(table.lookup(inner, "Id", true).is_some());
    }

    #[test]
    fn redeclaration_poisons_the_slot() {
        let schema = schema::parse("schema A = Number schema A = String schema A = Void A").unwrap();
        let table = SymbolTable::build(&schema);
        let scope = table.document(DocumentId(0)).scope;
        let id = table.lookup(scope, "A", false).unwrap();
        assert!(table.symbol(id).is_error());
        assert!(table.symbol(id).ty.is_none());

        let diagnostics = table.diagnostics();
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics
            .iter()
            .all(|d| d.code == DiagnosticCode::DuplicateDeclaration));
    }

    #[test]
    fn field_named_like_its_type_resolves_outward() {
        let schema = schema::parse("schema Person = {name: String} {Person: Person}").unwrap();
        let table = SymbolTable::build(&schema);
        let TypeNode::Map(map) = &schema.root else {
            panic!("expected map root");
        };
        let inner = table.map_scope(DocumentId(0), map.id).unwrap();
        let target = table.resolve(inner, &map.entries[0].value).unwrap();
        assert_eq!(table.symbol(target).kind, SymbolKind::Map);
        assert!(table.diagnostics().is_empty());
    }

    #[test]
    fn unresolved_references_are_reported() {
        let schema = schema::parse("{a: [Missing]}").unwrap();
        let table = SymbolTable::build(&schema);
        let diagnostics = table.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics.as_slice()[0].message,
            "unknown schema reference Missing"
        );
    }

    #[test]
    fn documents_reference_each_other_by_name() {
        let address = schema::parse("{street: String}").unwrap();
        let person = schema::parse("{home: address}").unwrap();
        let mut table = SymbolTable::new();
        let first = table.add_document(Name::new("person"), &person);
        table.add_document(Name::new("address"), &address);
        assert_eq!(table.document_named("address").map(|d| d.0), Some(1));
        assert!(table.document_diagnostics(first).is_empty());
        assert!(table.diagnostics().is_empty());
    }
}
