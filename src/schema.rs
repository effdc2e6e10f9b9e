//! DDLS schemas: the type tree and its reader.

pub mod node;
pub mod parser;

pub use node::{
    Declaration, ListType, MapEntryType, MapType, NodeId, ScalarKind, ScalarType, Schema,
    SchemaReference, TypeNode,
};
pub use parser::{is_reserved, Reader};

use crate::errors::{DdlError, SourceContext};
use crate::syntax::StringTable;

/// Parses DDLS text with a private string table.
pub fn parse(text: &str) -> Result<Schema, DdlError> {
    parse_with(&SourceContext::anonymous(text), &mut StringTable::new())
}

/// Parses a named schema source, interning names into `strings`.
pub fn parse_with(source: &SourceContext, strings: &mut StringTable) -> Result<Schema, DdlError> {
    Reader::new(strings).run(source)
}
