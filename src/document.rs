//! DDL documents: the value tree, its reader and its printer.

pub mod node;
pub mod parser;
pub mod printer;

pub use node::{
    BooleanNode, ListNode, LiteralError, MapEntry, MapNode, NameNode, Node, NodeKind, NumberNode,
    StringNode, VoidNode,
};
pub use parser::{DuplicateKeyPolicy, Reader, ReaderOptions, DEFAULT_MAX_DEPTH};
pub use printer::{to_compact_string, to_pretty_string};

use crate::errors::{DdlError, SourceContext};
use crate::syntax::StringTable;

/// Parses DDL text with default options and a private string table.
pub fn parse(text: &str) -> Result<Node, DdlError> {
    parse_with(&SourceContext::anonymous(text), &mut StringTable::new(), ReaderOptions::default())
}

/// Parses a named source, interning names into `strings`.
pub fn parse_with(
    source: &SourceContext,
    strings: &mut StringTable,
    options: ReaderOptions,
) -> Result<Node, DdlError> {
    Reader::with_options(strings, options).run(source)
}
