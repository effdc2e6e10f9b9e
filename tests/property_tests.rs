//! Property tests for the readers, the printer and the validator.

use ddl::document::node::quote;
use ddl::document::{self, Node};
use ddl::validation::{self, Severity};
use proptest::prelude::*;

/// A generated document, kept alongside its text so shapes can be compared.
#[derive(Debug, Clone)]
enum Value {
    Bool(bool),
    Int(i64),
    Real(i32, u16),
    Str(String),
    Void,
    List(Vec<Value>),
    Map(Vec<(String, Value)>),
}

fn unique_keys(entries: Vec<(String, Value)>) -> Vec<(String, Value)> {
    let mut seen = std::collections::HashSet::new();
    entries
        .into_iter()
        .filter(|(key, _)| seen.insert(key.clone()))
        .collect()
}

fn value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        (any::<i32>(), any::<u16>()).prop_map(|(whole, frac)| Value::Real(whole, frac)),
        "[ -~]{0,8}".prop_map(Value::Str),
        "\\PC{0,4}".prop_map(Value::Str),
        Just(Value::Void),
    ];
    leaf.prop_recursive(5, 48, 5, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(Value::List),
            prop::collection::vec(("[a-zA-Z_][a-zA-Z0-9_-]{0,6}", inner), 0..5)
                .prop_map(|entries| Value::Map(unique_keys(entries))),
        ]
    })
}

fn render(value: &Value) -> String {
    match value {
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Real(whole, frac) => format!("{}.{}", whole, frac),
        Value::Str(s) => quote(s),
        Value::Void => "void".to_string(),
        Value::List(items) => {
            let items: Vec<String> = items.iter().map(render).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Map(entries) => {
            let entries: Vec<String> = entries
                .iter()
                .map(|(key, value)| format!("{}: {}", key, render(value)))
                .collect();
            format!("{{ {} }}", entries.join(",\n"))
        }
    }
}

fn same_shape(expected: &Value, node: &Node) -> bool {
    match (expected, node) {
        (Value::Bool(b), Node::Boolean(n)) => n.as_bool() == *b,
        (Value::Int(i), Node::Number(n)) => n.as_i64() == Some(*i),
        (Value::Real(..), Node::Number(n)) => !n.is_integer(),
        (Value::Str(s), Node::String(n)) => n.value() == s,
        (Value::Void, Node::Void(_)) => true,
        (Value::List(items), Node::List(list)) => {
            items.len() == list.len()
                && items.iter().zip(list.items()).all(|(v, n)| same_shape(v, n))
        }
        (Value::Map(entries), Node::Map(map)) => {
            entries.len() == map.len()
                && entries
                    .iter()
                    .zip(map.entries())
                    .all(|((key, v), entry)| entry.key.as_str() == key && same_shape(v, &entry.value))
        }
        _ => false,
    }
}

proptest! {
    #[test]
    fn parsed_tree_matches_bracket_structure(v in value()) {
        let text = render(&v);
        let node = document::parse(&text).map_err(|e| TestCaseError::fail(format!("{e}\n{text}")))?;
        prop_assert!(same_shape(&v, &node), "shape mismatch for {}", text);
    }

    #[test]
    fn printed_documents_read_back(v in value()) {
        let node = document::parse(&render(&v)).unwrap();
        for printed in [document::to_compact_string(&node), document::to_pretty_string(&node)] {
            let reparsed = document::parse(&printed).unwrap();
            prop_assert!(node.value_eq(&reparsed), "{}", printed);
        }
    }

    #[test]
    fn reader_never_panics(text in "\\PC{0,40}") {
        let _ = document::parse(&text);
        let _ = ddl::schema::parse(&text);
    }

    #[test]
    fn truncated_containers_are_rejected(v in value()) {
        let text = render(&v);
        if text.ends_with('}') || text.ends_with(']') {
            let truncated = &text[..text.len() - 1];
            prop_assert!(document::parse(truncated).is_err());
        }
    }

    #[test]
    fn undeclared_keys_only_warn(entries in prop::collection::vec(("[a-z]{1,6}", value()), 0..6)) {
        let entries = unique_keys(entries);
        let map = Value::Map(entries.clone());
        let node = document::parse(&render(&map)).unwrap();
        let schema = ddl::schema::parse("{}").unwrap();
        let diagnostics = validation::validate(&schema, &node);
        prop_assert_eq!(diagnostics.len(), entries.len());
        prop_assert!(diagnostics.iter().all(|d| d.severity == Severity::Warning));
    }

    #[test]
    fn boolean_literals_round_trip(b in any::<bool>()) {
        let node = ddl::document::BooleanNode::new(b, Default::default());
        let reparsed = ddl::document::BooleanNode::from_literal(node.literal(), Default::default()).unwrap();
        prop_assert_eq!(reparsed.as_bool(), b);
    }

    #[test]
    fn void_rejects_everything_else(s in "\\PC{0,8}") {
        prop_assume!(s != "void");
        prop_assert!(ddl::document::VoidNode::from_literal(&s, Default::default()).is_err());
    }
}
