use jschema::schema::Items;
use jschema::{
    PreloadedResolver, ResolveError, Resolver, Schema, SchemaError, SchemaReader, is_valid,
};
use serde_json::json;
use std::cell::Cell;
use url::Url;

fn remote(uri: &str, document: &str) -> PreloadedResolver {
    let mut resolver = PreloadedResolver::new();
    resolver.add_str(Url::parse(uri).unwrap(), document);
    resolver
}

// ==== Internal references ====

#[test]
fn test_hash_ref_resolves_to_the_root_node() {
    let schema = Schema::from_value(&json!({
        "properties": {
            "a": {"$ref": "#"},
            "b": {"properties": {"c": {"$ref": "#"}}},
            "d": {"items": [{"$ref": "#"}]}
        }
    }))
    .unwrap();
    let root = schema.root();
    let props = schema.root_node().properties();
    assert_eq!(props["a"], root);
    assert_eq!(schema[props["b"]].properties()["c"], root);
    assert_eq!(schema[props["d"]].items(), &Items::List(vec![root]));
}

#[test]
fn test_escaped_pointer_segments() {
    let schema = Schema::from_value(&json!({
        "definitions": {
            "tilde~field": {"type": "integer"},
            "slash/field": {"type": "string"},
            "percent%field": {"type": "boolean"}
        },
        "properties": {
            "t": {"$ref": "#/definitions/tilde~0field"},
            "s": {"$ref": "#/definitions/slash~1field"},
            "p": {"$ref": "#/definitions/percent%25field"}
        }
    }))
    .unwrap();
    assert!(is_valid(&json!({"t": 1, "s": "x", "p": true}), &schema));
    assert!(!is_valid(&json!({"t": "1"}), &schema));
    assert!(!is_valid(&json!({"s": 1}), &schema));
    assert!(!is_valid(&json!({"p": 1}), &schema));
}

#[test]
fn test_pointer_into_arrays() {
    let schema = Schema::from_value(&json!({
        "items": [{"type": "integer"}, {"$ref": "#/items/0"}]
    }))
    .unwrap();
    assert!(is_valid(&json!([1, 2]), &schema));
    assert!(!is_valid(&json!([1, "2"]), &schema));
}

#[test]
fn test_recursive_tree_validates_nested_data() {
    let document = json!({
        "definitions": {
            "node": {
                "type": "object",
                "properties": {
                    "value": {"type": "number"},
                    "children": {"type": "array", "items": {"$ref": "#/definitions/node"}}
                },
                "required": ["value"]
            }
        },
        "$ref": "#/definitions/node"
    });
    let schema = Schema::from_value(&document).unwrap();
    assert_eq!(schema.to_json(), document);
    let tree = json!({"value": 1, "children": [{"value": 2, "children": [{"value": 3}]}]});
    assert!(is_valid(&tree, &schema));
    let broken = json!({"value": 1, "children": [{"children": []}]});
    assert!(!is_valid(&broken, &schema));
}

#[test]
fn test_unresolvable_pointers_fail_the_read() {
    for reference in ["#/definitions/missing", "#/items/5", "#/definitions/a/type", ""] {
        let err = Schema::from_value(&json!({
            "definitions": {"a": {"type": "string"}},
            "items": [{}],
            "not": {"$ref": reference}
        }))
        .unwrap_err();
        assert!(
            matches!(err, SchemaError::UnresolvedRef { .. }),
            "{}: {}",
            reference,
            err
        );
    }
}

#[test]
fn test_unresolved_reference_location() {
    let text = "{\n  \"properties\": {\n    \"a\": {\"$ref\": \"#/nowhere\"}\n  }\n}";
    let err = Schema::parse(text).unwrap_err();
    assert_eq!(err.path().unwrap().to_string(), "#/properties/a");
    let location = err.location().unwrap();
    assert_eq!((location.line, location.column), (3, 10));
}

// ==== Resolution scopes ====

#[test]
fn test_location_independent_identifier() {
    let schema = Schema::from_value(&json!({
        "allOf": [{"$ref": "#foo"}],
        "definitions": {"A": {"id": "#foo", "type": "integer"}}
    }))
    .unwrap();
    assert!(is_valid(&json!(1), &schema));
    assert!(!is_valid(&json!("a"), &schema));
}

#[test]
fn test_scope_changes_in_nested_ids() {
    let schema = Schema::from_value(&json!({
        "id": "http://example.com/root.json",
        "definitions": {
            "A": {"id": "#foo", "type": "integer"},
            "B": {
                "id": "other.json",
                "definitions": {
                    "X": {"id": "#bar", "type": "string"}
                }
            }
        },
        "properties": {
            "foo": {"$ref": "#foo"},
            "bar": {"$ref": "other.json#bar"},
            "abs": {"$ref": "http://example.com/root.json#foo"}
        }
    }))
    .unwrap();
    assert!(is_valid(&json!({"foo": 1, "bar": "x", "abs": 2}), &schema));
    assert!(!is_valid(&json!({"foo": "1"}), &schema));
    assert!(!is_valid(&json!({"bar": 1}), &schema));
    assert!(!is_valid(&json!({"abs": "2"}), &schema));
}

#[test]
fn test_scope_declared_after_its_reference() {
    let schema = Schema::from_value(&json!({
        "properties": {
            "a": {"$ref": "#item"},
            "b": {"id": "#item", "type": "integer"}
        }
    }))
    .unwrap();
    assert!(is_valid(&json!({"a": 1, "b": 2}), &schema));
    assert!(!is_valid(&json!({"a": "1"}), &schema));
}

#[test]
fn test_member_order_does_not_change_scopes() {
    let resolver = remote(
        "http://localhost:1234/folder/folderInteger.json",
        r#"{"type": "integer"}"#,
    );
    let reference_first = r##"{
        "id": "http://localhost:1234/",
        "allOf": [{"$ref": "#/properties/p/properties/q"}],
        "properties": {
            "p": {"id": "folder/", "properties": {"q": {"$ref": "folderInteger.json"}}}
        }
    }"##;
    let reference_last = r##"{
        "id": "http://localhost:1234/",
        "properties": {
            "p": {"id": "folder/", "properties": {"q": {"$ref": "folderInteger.json"}}}
        },
        "allOf": [{"$ref": "#/properties/p/properties/q"}]
    }"##;
    for text in [reference_first, reference_last] {
        let schema = Schema::parse_with_resolver(text, &resolver).unwrap();
        assert!(is_valid(&json!(1), &schema));
        assert!(!is_valid(&json!("1"), &schema));
    }
}

#[test]
fn test_relative_reference_without_scope_fails() {
    let err = Schema::from_value(&json!({"not": {"$ref": "other.json"}})).unwrap_err();
    assert!(matches!(err, SchemaError::UnresolvedRef { .. }), "{}", err);
}

// ==== External documents ====

#[test]
fn test_no_resolver_is_fatal() {
    let err =
        Schema::from_value(&json!({"$ref": "http://x/schema.json#/definitions/y"})).unwrap_err();
    let SchemaError::UnresolvedRef { reference, .. } = err else {
        panic!("Expected UnresolvedRef, got {}", err);
    };
    assert_eq!(reference, "http://x/schema.json#/definitions/y");
}

#[test]
fn test_remote_fragment_reference() {
    let resolver = remote(
        "http://localhost:1234/subSchemas.json",
        r##"{"integer": {"type": "integer"}, "refToInteger": {"$ref": "#/integer"}}"##,
    );
    let schema = Schema::parse_with_resolver(
        r#"{"$ref": "http://localhost:1234/subSchemas.json#/refToInteger"}"#,
        &resolver,
    )
    .unwrap();
    assert!(is_valid(&json!(1), &schema));
    assert!(!is_valid(&json!("a"), &schema));
}

#[test]
fn test_base_uri_change_resolves_against_remote_folder() {
    let resolver = remote(
        "http://localhost:1234/folder/folderInteger.json",
        r#"{"type": "integer"}"#,
    );
    let schema = SchemaReader::new()
        .with_resolver(&resolver)
        .read(&json!({
            "id": "http://localhost:1234/",
            "items": {
                "id": "folder/",
                "items": {"$ref": "folderInteger.json"}
            }
        }))
        .unwrap();
    assert!(is_valid(&json!([[1]]), &schema));
    assert!(!is_valid(&json!([["a"]]), &schema));
}

#[test]
fn test_remote_document_may_refer_back() {
    let mut resolver = remote(
        "http://localhost:1234/a.json",
        r#"{"type": "object", "properties": {"b": {"$ref": "b.json"}}}"#,
    );
    resolver.add_str(
        Url::parse("http://localhost:1234/b.json").unwrap(),
        r#"{"type": "array", "items": {"$ref": "a.json"}}"#,
    );
    let schema =
        Schema::parse_with_resolver(r#"{"$ref": "http://localhost:1234/a.json"}"#, &resolver)
            .unwrap();
    assert!(is_valid(&json!({"b": [{"b": []}]}), &schema));
    assert!(!is_valid(&json!({"b": [{"b": {}}]}), &schema));
}

#[test]
fn test_each_document_is_fetched_once() {
    let calls = Cell::new(0);
    let counting = |uri: &Url| -> Result<Option<Vec<u8>>, ResolveError> {
        calls.set(calls.get() + 1);
        assert_eq!(uri.fragment(), None);
        Ok(Some(br#"{"definitions": {"a": {"type": "string"}, "b": {"type": "number"}}}"#.to_vec()))
    };
    let schema = SchemaReader::new()
        .with_resolver(&counting)
        .read(&json!({
            "properties": {
                "a": {"$ref": "http://localhost:1234/defs.json#/definitions/a"},
                "b": {"$ref": "http://localhost:1234/defs.json#/definitions/b"}
            }
        }))
        .unwrap();
    assert_eq!(calls.get(), 1);
    assert!(is_valid(&json!({"a": "x", "b": 1}), &schema));
}

#[test]
fn test_preloaded_resolver_falls_back() {
    let fallback = |uri: &Url| -> Result<Option<Vec<u8>>, ResolveError> {
        match uri.path() {
            "/fallback.json" => Ok(Some(br#"{"type": "boolean"}"#.to_vec())),
            _ => Ok(None),
        }
    };
    let mut resolver = PreloadedResolver::with_fallback(Box::new(fallback));
    resolver.add_str(
        Url::parse("http://localhost:1234/preloaded.json#ignored").unwrap(),
        r#"{"type": "string"}"#,
    );

    let preloaded = Url::parse("http://localhost:1234/preloaded.json").unwrap();
    assert!(resolver.resolve(&preloaded).unwrap().is_some());
    assert_eq!(resolver.preloaded_uris().collect::<Vec<_>>(), vec![&preloaded]);

    let fetched = Url::parse("http://localhost:1234/fallback.json").unwrap();
    assert_eq!(
        resolver.resolve(&fetched).unwrap(),
        Some(br#"{"type": "boolean"}"#.to_vec())
    );

    let missing = Url::parse("http://localhost:1234/missing.json").unwrap();
    assert_eq!(resolver.resolve(&missing).unwrap(), None);
    assert_eq!(PreloadedResolver::new().resolve(&missing).unwrap(), None);
}

#[test]
fn test_missing_remote_is_unresolved() {
    let resolver = PreloadedResolver::new();
    let err =
        Schema::parse_with_resolver(r#"{"$ref": "http://localhost:1234/none.json"}"#, &resolver)
            .unwrap_err();
    assert!(matches!(err, SchemaError::UnresolvedRef { .. }), "{}", err);
}

#[test]
fn test_resolver_failure_is_fatal() {
    let failing = |_: &Url| -> Result<Option<Vec<u8>>, ResolveError> {
        Err(ResolveError::other("connection refused"))
    };
    let err = Schema::parse_with_resolver(r#"{"$ref": "http://localhost:1234/a.json"}"#, &failing)
        .unwrap_err();
    match err {
        SchemaError::Resolve { uri, source } => {
            assert_eq!(uri, "http://localhost:1234/a.json");
            assert_eq!(source.to_string(), "connection refused");
        }
        other => panic!("Expected Resolve, got {}", other),
    }
}

#[test]
fn test_malformed_remote_is_wrapped() {
    let resolver = remote("http://localhost:1234/broken.json", "{not json");
    let err =
        Schema::parse_with_resolver(r#"{"$ref": "http://localhost:1234/broken.json"}"#, &resolver)
            .unwrap_err();
    match err {
        SchemaError::External { uri, source } => {
            assert_eq!(uri, "http://localhost:1234/broken.json");
            assert!(matches!(*source, SchemaError::InvalidJson { .. }));
        }
        other => panic!("Expected External, got {}", other),
    }
}
