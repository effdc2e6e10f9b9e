//! DDL Structural Error Handling
//!
//! Lexical and syntactical failures abort a parse and are reported as a single
//! `DdlError`. Semantic findings produced by the validator never use this
//! type; they are accumulated as `validation::Diagnostic`s instead.

use miette::{Diagnostic, LabeledSpan, NamedSource};
use std::fmt;
use std::sync::Arc;

use crate::syntax::Span;

// ============================================================================
// SOURCE CONTEXT - Error reporting infrastructure
// ============================================================================

/// Names the text being parsed so errors can render a labelled snippet.
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub name: String,
    pub content: String,
}

impl SourceContext {
    /// Create a source context from real file content
    pub fn from_file(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Create a source context for text that did not come from a file.
    pub fn anonymous(content: impl Into<String>) -> Self {
        Self::from_file("<input>", content)
    }

    /// Convert to NamedSource for use with miette error reporting
    pub fn to_named_source(&self) -> Arc<NamedSource<String>> {
        Arc::new(NamedSource::new(self.name.clone(), self.content.clone()))
    }
}

// ============================================================================
// ERROR TYPES
// ============================================================================

/// A structural failure: the input could not be tokenized or parsed.
#[derive(Debug)]
pub struct DdlError {
    /// What went wrong (type-specific data)
    pub kind: ErrorKind,
    /// Where it happened
    pub source_info: SourceInfo,
    /// How to help
    pub diagnostic_info: DiagnosticInfo,
}

/// All structural error kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    // Lexical errors - the character stream is not a token stream
    UnexpectedCharacter {
        found: char,
    },
    UnterminatedString,
    LineBreakInString,
    InvalidEscape {
        escape: String,
    },
    InvalidNumber {
        literal: String,
        reason: String,
    },
    UnterminatedComment,

    // Syntactical errors - the token stream does not match the grammar
    UnexpectedToken {
        expected: String,
        found: String,
    },
    TrailingInput {
        found: String,
    },
    InvalidLiteral {
        literal_type: String,
        value: String,
    },
    DuplicateKey {
        key: String,
        first: Span,
    },
    ReservedWord {
        word: String,
    },
    NestingTooDeep {
        limit: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Lexical,
    Syntactical,
}

impl ErrorCategory {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Lexical => "lexical",
            ErrorCategory::Syntactical => "syntax",
        }
    }
}

/// Source information attached to an error.
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub source: Arc<NamedSource<String>>,
    pub span: Span,
}

/// Diagnostic enhancement data
#[derive(Debug, Clone)]
pub struct DiagnosticInfo {
    pub help: Option<String>,
    pub error_code: String,
}

impl ErrorKind {
    /// Get the error category for test assertions
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnexpectedCharacter { .. }
            | Self::UnterminatedString
            | Self::LineBreakInString
            | Self::InvalidEscape { .. }
            | Self::InvalidNumber { .. }
            | Self::UnterminatedComment => ErrorCategory::Lexical,

            Self::UnexpectedToken { .. }
            | Self::TrailingInput { .. }
            | Self::InvalidLiteral { .. }
            | Self::DuplicateKey { .. }
            | Self::ReservedWord { .. }
            | Self::NestingTooDeep { .. } => ErrorCategory::Syntactical,
        }
    }

    /// Get error code suffix for diagnostic codes
    pub const fn code_suffix(&self) -> &'static str {
        match self {
            Self::UnexpectedCharacter { .. } => "unexpected_character",
            Self::UnterminatedString => "unterminated_string",
            Self::LineBreakInString => "line_break_in_string",
            Self::InvalidEscape { .. } => "invalid_escape",
            Self::InvalidNumber { .. } => "invalid_number",
            Self::UnterminatedComment => "unterminated_comment",
            Self::UnexpectedToken { .. } => "unexpected_token",
            Self::TrailingInput { .. } => "trailing_input",
            Self::InvalidLiteral { .. } => "invalid_literal",
            Self::DuplicateKey { .. } => "duplicate_key",
            Self::ReservedWord { .. } => "reserved_word",
            Self::NestingTooDeep { .. } => "nesting_too_deep",
        }
    }

    fn default_help(&self) -> Option<String> {
        match self {
            Self::InvalidEscape { .. } => Some(
                "valid escapes are \\\" \\\\ \\/ \\b \\f \\n \\r \\t and \\uXXXX".into(),
            ),
            Self::LineBreakInString => Some("use \\n to embed a line break".into()),
            Self::TrailingInput { .. } => {
                Some("a document holds exactly one top-level value".into())
            }
            Self::DuplicateKey { .. } => Some("remove or rename one of the entries".into()),
            _ => None,
        }
    }
}

impl std::error::Error for DdlError {}

impl fmt::Display for DdlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::UnexpectedCharacter { found } => {
                write!(f, "Lexical error: unexpected character {:?}", found)
            }
            ErrorKind::UnterminatedString => write!(f, "Lexical error: unterminated string"),
            ErrorKind::LineBreakInString => {
                write!(f, "Lexical error: line break inside string literal")
            }
            ErrorKind::InvalidEscape { escape } => {
                write!(f, "Lexical error: invalid escape sequence '{}'", escape)
            }
            ErrorKind::InvalidNumber { literal, reason } => {
                write!(f, "Lexical error: invalid number '{}': {}", literal, reason)
            }
            ErrorKind::UnterminatedComment => write!(f, "Lexical error: unterminated comment"),
            ErrorKind::UnexpectedToken { expected, found } => {
                write!(f, "Syntax error: expected {}, found {}", expected, found)
            }
            ErrorKind::TrailingInput { found } => {
                write!(f, "Syntax error: unexpected {} after end of document", found)
            }
            ErrorKind::InvalidLiteral {
                literal_type,
                value,
            } => write!(f, "Syntax error: invalid {} '{}'", literal_type, value),
            ErrorKind::DuplicateKey { key, .. } => {
                write!(f, "Syntax error: duplicate key '{}'", key)
            }
            ErrorKind::ReservedWord { word } => {
                write!(f, "Syntax error: '{}' is a reserved word", word)
            }
            ErrorKind::NestingTooDeep { limit } => {
                write!(f, "Syntax error: nesting exceeds {} levels", limit)
            }
        }
    }
}

impl Diagnostic for DdlError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(&self.diagnostic_info.error_code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diagnostic_info
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let mut labels = vec![LabeledSpan::new_with_span(
            Some(self.primary_label()),
            self.source_info.span,
        )];
        if let ErrorKind::DuplicateKey { first, .. } = &self.kind {
            labels.push(LabeledSpan::new_with_span(
                Some("first defined here".into()),
                *first,
            ));
        }
        Some(Box::new(labels.into_iter()))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&*self.source_info.source)
    }
}

impl DdlError {
    /// Location of the failure.
    pub fn span(&self) -> Span {
        self.source_info.span
    }

    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.diagnostic_info.help = Some(help.into());
        self
    }

    fn primary_label(&self) -> String {
        match &self.kind {
            ErrorKind::UnexpectedCharacter { .. } => "unexpected character".into(),
            ErrorKind::UnterminatedString => "string starts here".into(),
            ErrorKind::LineBreakInString => "line break".into(),
            ErrorKind::InvalidEscape { .. } => "invalid escape".into(),
            ErrorKind::InvalidNumber { .. } => "invalid number".into(),
            ErrorKind::UnterminatedComment => "comment starts here".into(),
            ErrorKind::UnexpectedToken { expected, .. } => format!("expected {}", expected),
            ErrorKind::TrailingInput { .. } => "trailing input".into(),
            ErrorKind::InvalidLiteral { .. } => "invalid literal".into(),
            ErrorKind::DuplicateKey { .. } => "duplicate key".into(),
            ErrorKind::ReservedWord { .. } => "reserved word".into(),
            ErrorKind::NestingTooDeep { .. } => "too deeply nested".into(),
        }
    }
}

// ============================================================================
// ERROR CREATION
// ============================================================================

/// Context-aware error creation.
pub trait ErrorReporting {
    /// Create an error with context-appropriate enhancements
    fn report(&self, kind: ErrorKind, span: Span) -> DdlError;

    fn unexpected_token(&self, expected: &str, found: &str, span: Span) -> DdlError {
        self.report(
            ErrorKind::UnexpectedToken {
                expected: expected.into(),
                found: found.into(),
            },
            span,
        )
    }

    fn invalid_literal(&self, literal_type: &str, value: &str, span: Span) -> DdlError {
        self.report(
            ErrorKind::InvalidLiteral {
                literal_type: literal_type.into(),
                value: value.into(),
            },
            span,
        )
    }
}

impl ErrorReporting for SourceContext {
    fn report(&self, kind: ErrorKind, span: Span) -> DdlError {
        let error_code = format!("ddl::{}::{}", kind.category().as_str(), kind.code_suffix());
        let help = kind.default_help();
        DdlError {
            kind,
            source_info: SourceInfo {
                source: self.to_named_source(),
                span,
            },
            diagnostic_info: DiagnosticInfo { help, error_code },
        }
    }
}

// ============================================================================
// ERROR FORMATTING UTILITIES
// ============================================================================

/// Prints a DdlError with full miette diagnostics to standard error.
pub fn print_error(error: DdlError) {
    use miette::Report;
    let report = Report::new(error);
    eprintln!("{report:?}");
}
