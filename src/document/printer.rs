//! Canonical DDL rendering.
//!
//! Literals are written back exactly as they were read (numbers keep their
//! text, strings their quoting), so a parsed document prints to text that
//! reads back to an equal tree.

use crate::document::node::{quote, MapNode, Node};
use crate::syntax::lexer::{is_name_continue, is_name_start};

const INDENT: &str = "  ";

/// Renders `node` on a single line.
pub fn to_compact_string(node: &Node) -> String {
    let mut out = String::new();
    write_compact(node, &mut out);
    out
}

/// Renders `node` as an indented document terminated by a newline.
pub fn to_pretty_string(node: &Node) -> String {
    let mut out = String::new();
    write_pretty(node, 0, &mut out);
    out.push('\n');
    out
}

/// Renders a map key, quoting it when it is not a plain name.
pub fn key_literal(key: &str) -> String {
    if is_plain_name(key) {
        return key.to_string();
    }
    quote(key)
}

fn is_plain_name(key: &str) -> bool {
    let mut chars = key.chars();
    let starts_ok = chars.next().is_some_and(is_name_start);
    starts_ok && chars.all(is_name_continue)
}

fn write_scalar(node: &Node, out: &mut String) {
    match node {
        Node::Boolean(b) => out.push_str(b.literal()),
        Node::Number(n) => out.push_str(n.literal()),
        Node::String(s) => out.push_str(s.literal()),
        Node::Void(v) => out.push_str(v.literal()),
        Node::Map(_) | Node::List(_) => unreachable!("containers are not scalars"),
    }
}

fn write_compact(node: &Node, out: &mut String) {
    match node {
        Node::Map(map) => {
            out.push('{');
            for (i, entry) in map.entries().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&key_literal(entry.key.as_str()));
                out.push_str(": ");
                write_compact(&entry.value, out);
            }
            out.push('}');
        }
        Node::List(list) => {
            out.push('[');
            for (i, item) in list.items().iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_compact(item, out);
            }
            out.push(']');
        }
        scalar => write_scalar(scalar, out),
    }
}

fn write_pretty(node: &Node, depth: usize, out: &mut String) {
    match node {
        Node::Map(map) => write_map(map, depth, out),
        Node::List(list) if list.items().iter().all(|item| item.kind().is_scalar()) => {
            // Lists of scalars stay on one line.
            write_compact(node, out)
        }
        Node::List(list) => {
            out.push_str("[\n");
            let count = list.len();
            for (i, item) in list.items().iter().enumerate() {
                indent(depth + 1, out);
                write_pretty(item, depth + 1, out);
                if i + 1 < count {
                    out.push(',');
                }
                out.push('\n');
            }
            indent(depth, out);
            out.push(']');
        }
        scalar => write_scalar(scalar, out),
    }
}

fn write_map(map: &MapNode, depth: usize, out: &mut String) {
    if map.is_empty() {
        out.push_str("{}");
        return;
    }
    out.push_str("{\n");
    let count = map.len();
    for (i, entry) in map.entries().enumerate() {
        indent(depth + 1, out);
        out.push_str(&key_literal(entry.key.as_str()));
        out.push_str(": ");
        write_pretty(&entry.value, depth + 1, out);
        if i + 1 < count {
            out.push(',');
        }
        out.push('\n');
    }
    indent(depth, out);
    out.push('}');
}

fn indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}
