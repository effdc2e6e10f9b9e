//! Shared helpers for the integration tests.
#![allow(dead_code)]

use ddl::document::{self, Node};
use ddl::schema::{self, Schema};
use ddl::validation::{self, Diagnostic, Diagnostics, Severity};

pub fn doc(text: &str) -> Node {
    document::parse(text).unwrap_or_else(|e| panic!("document should parse: {e}\n{text}"))
}

pub fn schema(text: &str) -> Schema {
    schema::parse(text).unwrap_or_else(|e| panic!("schema should parse: {e}\n{text}"))
}

/// Validates `document` against `schema`, both given as source text.
pub fn check(schema_text: &str, document_text: &str) -> Diagnostics {
    validation::validate(&schema(schema_text), &doc(document_text))
}

pub fn errors(diagnostics: &Diagnostics) -> Vec<&Diagnostic> {
    diagnostics.errors().collect()
}

pub fn warnings(diagnostics: &Diagnostics) -> Vec<&Diagnostic> {
    diagnostics.warnings().collect()
}

/// `"<severity>: <message>"` for every diagnostic, in report order.
pub fn messages(diagnostics: &Diagnostics) -> Vec<String> {
    diagnostics
        .iter()
        .map(|d| {
            let severity = match d.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
            };
            format!("{}: {}", severity, d.message)
        })
        .collect()
}
