//! Semantic validation of DDL documents against DDLS schemas.
//!
//! Unlike parsing, validation never fails fast: every finding becomes a
//! [`Diagnostic`] and the walk continues. A document is valid when no
//! diagnostic has `Error` severity.

pub mod context;
pub mod scope;
pub mod validator;

pub use context::{Diagnostic, DiagnosticCode, Diagnostics, Severity, ValidationContext};
pub use scope::{Document, DocumentId, Scope, ScopeId, Symbol, SymbolId, SymbolKind, SymbolTable};
pub use validator::{Frame, Validator};

use crate::document::Node;
use crate::schema::Schema;

/// Validates `node` against the root type of `schema`.
pub fn validate(schema: &Schema, node: &Node) -> Diagnostics {
    let table = SymbolTable::build(schema);
    let mut context = ValidationContext::new();
    Validator::new(&table, &mut context).run_document(DocumentId::FIRST, node);
    context.into_diagnostics()
}
