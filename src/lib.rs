//! DDL: a small data-definition language with a schema layer.
//!
//! - [`document`] reads and prints DDL documents (maps, lists and scalar
//!   literals).
//! - [`schema`] reads DDLS schemas describing the shape of documents.
//! - [`validation`] binds schemas into a scoped symbol table and checks
//!   documents against them, collecting diagnostics.
//!
//! Parsing fails fast with a single [`DdlError`]; validation never fails and
//! reports everything it finds.
//!
//! ```
//! let schema = ddl::schema::parse("{name: String, port: Number}").unwrap();
//! let doc = ddl::document::parse(r#"{name: "web", port: "80"}"#).unwrap();
//! let diagnostics = ddl::validation::validate(&schema, &doc);
//! assert_eq!(diagnostics.errors().count(), 1);
//! ```

pub mod cli;
pub mod document;
pub mod errors;
pub mod schema;
pub mod syntax;
pub mod validation;

pub use document::Node;
pub use errors::{DdlError, ErrorKind, SourceContext};
pub use schema::Schema;
pub use syntax::{Name, Span, StringTable};
pub use validation::{validate, Diagnostic, Diagnostics, Severity};
