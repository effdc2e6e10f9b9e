// tests/schema_tests.rs

mod common;

use common::schema;
use ddl::errors::{ErrorKind, SourceContext};
use ddl::schema::{ScalarKind, TypeNode};
use ddl::syntax::{Name, StringTable};
use ddl::validation::{DiagnosticCode, DocumentId, SymbolKind, SymbolTable};

#[test]
fn test_schema_with_declarations_and_root() {
    let schema = schema(
        r#"
        # a service and its endpoints
        schema Port = Number
        schema Endpoint = { path: String, "timeout-ms": Number }
        {
            name: String,
            port: Port,
            endpoints: [Endpoint],
            metadata: Scalar
        }
        "#,
    );
    assert_eq!(schema.declarations.len(), 2);
    assert_eq!(schema.declarations[0].to_string(), "schema Port = Number");
    assert_eq!(
        schema.declarations[1].to_string(),
        "schema Endpoint = {path: String, timeout-ms: Number}"
    );

    let TypeNode::Map(root) = &schema.root else {
        panic!("expected a map root");
    };
    let fields: Vec<&str> = root.entries.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(fields, ["name", "port", "endpoints", "metadata"]);
    assert!(matches!(&root.entry("port").unwrap().value, TypeNode::Reference(r) if r.name.as_str() == "Port"));
    match &root.entry("endpoints").unwrap().value {
        TypeNode::List(list) => assert_eq!(list.element.to_string(), "Endpoint"),
        other => panic!("expected list, got {other}"),
    }
    match &root.entry("metadata").unwrap().value {
        TypeNode::Scalar(scalar) => assert_eq!(scalar.constraint, None),
        other => panic!("expected scalar, got {other}"),
    }
}

#[test]
fn test_schema_display_reads_back() {
    let text = "schema Tree = {value: Number, children: [Tree]}\nTree";
    let parsed = schema(text);
    assert_eq!(parsed.to_string(), text);
    assert_eq!(schema(&parsed.to_string()), parsed);
}

#[test]
fn test_schema_syntax_errors() {
    let err = ddl::schema::parse("schema = Number Number").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnexpectedToken { ref expected, .. } if expected == "declaration name"));

    let err = ddl::schema::parse("schema A Number A").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnexpectedToken { ref expected, .. } if expected == "`=`"));

    let err = ddl::schema::parse("{a: 1}").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnexpectedToken { ref expected, .. } if expected == "a type"));

    let err = ddl::schema::parse("schema Void = Number Void").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ReservedWord { .. }));

    let err = ddl::schema::parse("schema A = Number").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnexpectedToken { .. }));
}

#[test]
fn test_schema_nesting_is_bounded() {
    let limit = ddl::document::DEFAULT_MAX_DEPTH;
    let nested = |depth: usize| format!("{}Number{}", "[".repeat(depth), "]".repeat(depth));

    let text = nested(limit);
    let parsed = std::thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(move || ddl::schema::parse(&text).map(|s| s.to_string()))
        .unwrap()
        .join()
        .unwrap();
    assert!(parsed.is_ok());

    let err = ddl::schema::parse(&nested(limit + 1)).unwrap_err();
    assert_eq!(err.kind, ErrorKind::NestingTooDeep { limit });
    assert_eq!(err.span().start, limit);
}

#[test]
fn test_scalar_keywords_are_case_sensitive() {
    match schema("number").root {
        TypeNode::Reference(reference) => assert_eq!(reference.name.as_str(), "number"),
        other => panic!("expected reference, got {other}"),
    }
    match schema("Number").root {
        TypeNode::Scalar(scalar) => assert_eq!(scalar.constraint, Some(ScalarKind::Number)),
        other => panic!("expected scalar, got {other}"),
    }
}

// ---
// Symbol table
// ---

#[test]
fn test_scope_shadowing() {
    let schema = schema("schema Id = Number {Id: String, inner: {x: Id}}");
    let table = SymbolTable::build(&schema);
    let doc_scope = table.document(DocumentId::FIRST).scope;

    let TypeNode::Map(root) = &schema.root else {
        panic!("expected a map root");
    };
    let root_scope = table.map_scope(DocumentId::FIRST, root.id).unwrap();
    let TypeNode::Map(inner) = &root.entry("inner").unwrap().value else {
        panic!("expected nested map");
    };
    let inner_scope = table.map_scope(DocumentId::FIRST, inner.id).unwrap();

    // Bound here: found either way.
    let local = table.lookup(root_scope, "Id", false).unwrap();
    assert_eq!(table.symbol(local).kind, SymbolKind::MapEntry);
    assert_eq!(table.lookup(root_scope, "Id", true), Some(local));

    // Bound only in an enclosing scope: found only recursively.
    assert_eq!(table.lookup(inner_scope, "Id", false), None);
    assert_eq!(table.lookup(inner_scope, "Id", true), Some(local));

    let outer = table.lookup(doc_scope, "Id", false).unwrap();
    assert_ne!(outer, local);
    assert_eq!(table.symbol(outer).kind, SymbolKind::Scalar);
}

#[test]
fn test_conflicting_fields_are_poisoned() {
    let schema = schema("{a: Number, a: String, b: Void}");
    let table = SymbolTable::build(&schema);
    let TypeNode::Map(root) = &schema.root else {
        panic!("expected a map root");
    };
    let scope = table.map_scope(DocumentId::FIRST, root.id).unwrap();
    let a = table.lookup(scope, "a", false).unwrap();
    assert_eq!(table.symbol(a).kind, SymbolKind::Error);
    let b = table.lookup(scope, "b", false).unwrap();
    assert_eq!(table.symbol(b).kind, SymbolKind::MapEntry);

    let diagnostics = table.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    let finding = &diagnostics.as_slice()[0];
    assert_eq!(finding.code, DiagnosticCode::ConflictingField);
    assert_eq!(finding.message, "duplicate field a");
    assert_eq!(finding.span.start, 12);
}

#[test]
fn test_documents_share_the_global_scope() {
    let mut strings = StringTable::new();
    let person = ddl::schema::parse_with(
        &SourceContext::from_file("person.ddls", "{name: String, home: address}"),
        &mut strings,
    )
    .unwrap();
    let address = ddl::schema::parse_with(
        &SourceContext::from_file("address.ddls", "{street: String, owner: person}"),
        &mut strings,
    )
    .unwrap();

    let mut table = SymbolTable::new();
    let person_id = table.add_document(strings.intern("person"), &person);
    let address_id = table.add_document(strings.intern("address"), &address);

    assert!(table.diagnostics().is_empty());
    let global = table.global();
    let symbol = table.lookup(global, "address", false).unwrap();
    assert_eq!(table.symbol(symbol).kind, SymbolKind::Schema);
    assert_eq!(table.symbol(symbol).document, address_id);
    assert_eq!(table.document_named("person"), Some(person_id));

    let mut lone = SymbolTable::new();
    lone.add_document(Name::new("person"), &person);
    let findings = lone.diagnostics();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings.as_slice()[0].message, "unknown schema reference address");
}
