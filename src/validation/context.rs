//! Diagnostics accumulated by a validation run.

use std::fmt;

use serde::Serialize;

use crate::syntax::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCode {
    TypeMismatch,
    MissingField,
    UnexpectedField,
    UnknownReference,
    AmbiguousReference,
    CyclicReference,
    ConflictingField,
    DuplicateDeclaration,
}

impl DiagnosticCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::TypeMismatch => "type_mismatch",
            DiagnosticCode::MissingField => "missing_field",
            DiagnosticCode::UnexpectedField => "unexpected_field",
            DiagnosticCode::UnknownReference => "unknown_reference",
            DiagnosticCode::AmbiguousReference => "ambiguous_reference",
            DiagnosticCode::CyclicReference => "cyclic_reference",
            DiagnosticCode::ConflictingField => "conflicting_field",
            DiagnosticCode::DuplicateDeclaration => "duplicate_declaration",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ddl::validation::{}", self.as_str())
    }
}

/// A single semantic finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    pub fn error(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            span,
        }
    }

    pub fn warning(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            span,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.severity, self.span, self.message)
    }
}

/// Append-only, ordered list of findings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(|d| d.severity == Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// Valid means no errors; warnings are allowed.
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.0
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Extend<Diagnostic> for Diagnostics {
    fn extend<I: IntoIterator<Item = Diagnostic>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

/// State owned by one validation run.
#[derive(Debug, Default)]
pub struct ValidationContext {
    diagnostics: Diagnostics,
}

impl ValidationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        tracing::trace!(code = diagnostic.code.as_str(), at = %diagnostic.span, "{}", diagnostic.message);
        self.diagnostics.push(diagnostic);
    }

    pub fn error(&mut self, code: DiagnosticCode, message: impl Into<String>, span: Span) {
        self.report(Diagnostic::error(code, message, span));
    }

    pub fn warning(&mut self, code: DiagnosticCode, message: impl Into<String>, span: Span) {
        self.report(Diagnostic::warning(code, message, span));
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_alone_are_valid() {
        let mut context = ValidationContext::new();
        context.warning(DiagnosticCode::UnexpectedField, "unexpected field z", Span::default());
        assert!(context.diagnostics().is_valid());
        context.error(DiagnosticCode::MissingField, "missing required field b", Span::default());
        let diagnostics = context.into_diagnostics();
        assert!(!diagnostics.is_valid());
        assert_eq!(diagnostics.errors().count(), 1);
        assert_eq!(diagnostics.warnings().count(), 1);
    }

    #[test]
    fn codes_are_namespaced() {
        assert_eq!(
            DiagnosticCode::CyclicReference.to_string(),
            "ddl::validation::cyclic_reference"
        );
    }

    #[test]
    fn diagnostics_serialize_as_a_list() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::error(
            DiagnosticCode::TypeMismatch,
            "expected Number, got String",
            Span::default(),
        ));
        let json = serde_json::to_value(&diagnostics).unwrap();
        assert_eq!(json[0]["severity"], "error");
        assert_eq!(json[0]["code"], "type_mismatch");
        assert_eq!(json[0]["span"]["line"], 1);
    }
}
