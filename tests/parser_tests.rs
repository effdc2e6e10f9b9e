// tests/parser_tests.rs

mod common;

use common::doc;
use ddl::document::{self, DuplicateKeyPolicy, Node, NodeKind, ReaderOptions};
use ddl::errors::{ErrorCategory, ErrorKind, SourceContext};
use ddl::syntax::StringTable;

fn parse_err(text: &str) -> ddl::DdlError {
    match document::parse(text) {
        Ok(node) => panic!("expected {text:?} to fail, got {node}"),
        Err(err) => err,
    }
}

// ---
// Well-formed documents
// ---

#[test]
fn test_parse_nested_configuration() {
    let node = doc(r#"
        // service configuration
        {
            name: "gateway",
            port: 8080,
            ratio: -0.25e-1,
            enabled: true,
            parent: void,
            "display name": "Gateway \u00e9",
            routes: [
                { path: "/", upstream: "web" },
                { path: "/api", upstream: "api" }
            ]
        }
    "#);

    let map = node.as_map().unwrap();
    let keys: Vec<&str> = map.keys().map(|k| k.as_str()).collect();
    assert_eq!(
        keys,
        ["name", "port", "ratio", "enabled", "parent", "display name", "routes"]
    );
    assert_eq!(map.get("name").and_then(Node::as_str), Some("gateway"));
    assert_eq!(map.get("display name").and_then(Node::as_str), Some("Gateway é"));
    assert_eq!(map.get("enabled").and_then(Node::as_bool), Some(true));
    assert_eq!(map.get("parent").map(Node::kind), Some(NodeKind::Void));

    match map.get("ratio") {
        Some(Node::Number(n)) => {
            assert_eq!(n.literal(), "-0.25e-1");
            assert_eq!(n.as_f64(), Some(-0.025));
        }
        other => panic!("expected a number, got {other:?}"),
    }

    let routes = map.get("routes").and_then(Node::as_list).unwrap();
    assert_eq!(routes.len(), 2);
    assert_eq!(
        routes.items()[1].as_map().unwrap().get("path").and_then(Node::as_str),
        Some("/api")
    );
}

#[test]
fn test_parse_shape_matches_brackets() {
    let node = doc("[[], [[]], {a: [{}]}]");
    assert_eq!(node.depth(), 4);
    let list = node.as_list().unwrap();
    assert_eq!(list.len(), 3);
    assert_eq!(list.items()[0].as_list().unwrap().len(), 0);
    assert_eq!(list.items()[1].as_list().unwrap().len(), 1);
    assert_eq!(list.items()[2].as_map().unwrap().len(), 1);
}

#[test]
fn test_parse_all_comment_styles() {
    let node = doc("# hash\n/* block\n comment */ [1, // line\n 2]");
    assert_eq!(node.as_list().unwrap().len(), 2);
}

#[test]
fn test_scalar_documents() {
    assert_eq!(doc("false").as_bool(), Some(false));
    assert_eq!(doc("\"s\"").as_str(), Some("s"));
    assert_eq!(doc("void").kind(), NodeKind::Void);
    assert_eq!(doc("+12").kind(), NodeKind::Number);
}

#[test]
fn test_spans_report_line_and_column() {
    let node = doc("{\n  port: \"80\"\n}");
    let entry = node.as_map().unwrap().entry("port").unwrap();
    assert_eq!((entry.key.span.line, entry.key.span.column), (2, 3));
    assert_eq!((entry.value.span().line, entry.value.span().column), (2, 9));
    assert_eq!(entry.value.span().start, 10);
    assert_eq!(entry.value.span().end, 14);
}

// ---
// Malformed documents
// ---

#[test]
fn test_unbalanced_delimiters_are_rejected() {
    for text in ["{a: 1", "[1, 2", "{a: [1}", "[1}", "}", "{a: 1}}"] {
        let err = parse_err(text);
        assert_eq!(err.category(), ErrorCategory::Syntactical, "{text}");
    }
}

#[test]
fn test_trailing_comma_is_rejected() {
    let err = parse_err("[1, 2,]");
    assert!(matches!(err.kind, ErrorKind::UnexpectedToken { .. }));
    assert_eq!(err.span().start, 6);

    let err = parse_err("{a: 1,}");
    assert!(matches!(err.kind, ErrorKind::UnexpectedToken { .. }));
}

#[test]
fn test_trailing_tokens_are_rejected() {
    let err = parse_err("{a: 1} 2");
    assert!(matches!(err.kind, ErrorKind::TrailingInput { ref found } if found == "number `2`"));
}

#[test]
fn test_bare_identifier_value_is_rejected() {
    let err = parse_err("{mode: fast}");
    match &err.kind {
        ErrorKind::UnexpectedToken { expected, found } => {
            assert_eq!(expected, "a value");
            assert_eq!(found, "name `fast`");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(err.diagnostic_info.help.is_some());
}

#[test]
fn test_lexical_errors_carry_positions() {
    let err = parse_err("{a: \"unterminated}");
    assert_eq!(err.category(), ErrorCategory::Lexical);
    assert!(matches!(err.kind, ErrorKind::UnterminatedString));

    let err = parse_err("[1, 2x]");
    assert!(matches!(err.kind, ErrorKind::InvalidNumber { .. }));
    assert_eq!(err.span().start, 4);

    let err = parse_err("[1, @]");
    assert!(matches!(err.kind, ErrorKind::UnexpectedCharacter { found: '@' }));
    assert_eq!((err.span().line, err.span().column), (1, 5));
}

#[test]
fn test_error_codes_are_namespaced() {
    let err = parse_err("[1,]");
    assert!(err.diagnostic_info.error_code.starts_with("ddl::syntax::"));
    let err = parse_err("\"\\q\"");
    assert!(err.diagnostic_info.error_code.starts_with("ddl::lexical::"));
}

// ---
// Reader options
// ---

#[test]
fn test_duplicate_keys_default_to_last_wins() {
    let node = doc("{a: 1, a: 2}");
    let map = node.as_map().unwrap();
    assert_eq!(map.len(), 1);
    assert_eq!(map.get("a").unwrap().to_string(), "2");
}

#[test]
fn test_duplicate_keys_can_be_rejected() {
    let options = ReaderOptions {
        duplicate_keys: DuplicateKeyPolicy::Reject,
        ..ReaderOptions::default()
    };
    let source = SourceContext::from_file("dup.ddl", "{a: 1,\n a: 2}");
    let err = document::parse_with(&source, &mut StringTable::new(), options).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DuplicateKey { ref key, .. } if key == "a"));
    assert_eq!(err.span().line, 2);
}

#[test]
fn test_shared_string_table_interns_keys() {
    let mut strings = StringTable::new();
    let options = ReaderOptions::default();
    let first = document::parse_with(&SourceContext::anonymous("{host: 1}"), &mut strings, options)
        .unwrap();
    let second =
        document::parse_with(&SourceContext::anonymous("{host: 2}"), &mut strings, options)
            .unwrap();
    let a = first.as_map().unwrap().keys().next().unwrap().clone();
    let b = second.as_map().unwrap().keys().next().unwrap().clone();
    assert!(a.ptr_eq(&b));
    assert!(strings.contains("host"));
}

/// Runs `f` on a thread with the default 2 MiB stack of spawned threads.
fn on_small_stack<T: Send + 'static>(f: impl FnOnce() -> T + Send + 'static) -> T {
    std::thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(f)
        .unwrap()
        .join()
        .unwrap()
}

fn nested_lists(depth: usize) -> String {
    format!("{}1{}", "[".repeat(depth), "]".repeat(depth))
}

fn nested_maps(depth: usize) -> String {
    format!("{}1{}", "{a: ".repeat(depth), "}".repeat(depth))
}

#[test]
fn test_deep_nesting_is_bounded() {
    let limit = document::DEFAULT_MAX_DEPTH;
    for text in [nested_lists(limit), nested_maps(limit)] {
        let depth = on_small_stack(move || document::parse(&text).map(|node| node.depth()));
        assert_eq!(depth.unwrap(), limit);
    }

    for text in [nested_lists(limit + 1), nested_maps(limit + 1)] {
        let err = on_small_stack(move || document::parse(&text).unwrap_err().kind);
        assert_eq!(err, ErrorKind::NestingTooDeep { limit });
    }
}

#[test]
fn test_hostile_nesting_is_an_error_not_a_crash() {
    let text = "[".repeat(100_000);
    let err = on_small_stack(move || document::parse(&text).unwrap_err());
    assert_eq!(err.category(), ErrorCategory::Syntactical);
    assert!(matches!(err.kind, ErrorKind::NestingTooDeep { .. }));
    assert_eq!(err.span().start, document::DEFAULT_MAX_DEPTH);
}
