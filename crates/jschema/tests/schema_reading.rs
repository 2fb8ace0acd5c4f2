use jschema::schema::{Additional, Items};
use jschema::{JsonType, Schema, SchemaError, SchemaNode};
use pretty_assertions::assert_eq;
use serde_json::json;

fn keyword_of(err: &SchemaError) -> &str {
    match err {
        SchemaError::InvalidKeyword { keyword, .. } => keyword,
        other => panic!("Expected InvalidKeyword, got {:?}", other),
    }
}

// ==== Keyword reading ====

#[test]
fn test_read_full_keyword_set() {
    let schema = Schema::parse(
        r#"{
            "title": "Order",
            "description": "A customer order",
            "type": ["object", "null"],
            "required": ["id", "lines"],
            "minProperties": 1,
            "maxProperties": 10,
            "properties": {
                "id": {"type": "string", "pattern": "^[A-Z]{3}-\\d+$", "minLength": 5},
                "total": {
                    "type": "number",
                    "minimum": 0,
                    "exclusiveMinimum": true,
                    "multipleOf": 0.01
                },
                "lines": {
                    "type": "array",
                    "items": {"type": "object"},
                    "minItems": 1,
                    "uniqueItems": true
                }
            },
            "patternProperties": {"^x-": {}},
            "additionalProperties": false,
            "dependencies": {"total": ["lines"], "coupon": {"required": ["total"]}}
        }"#,
    )
    .unwrap();

    let root = schema.root_node();
    assert_eq!(root.title(), Some("Order"));
    assert_eq!(root.description(), Some("A customer order"));
    assert!(root.types().contains(JsonType::Object));
    assert!(root.types().contains(JsonType::Null));
    assert_eq!(root.required().to_vec(), vec!["id".to_string(), "lines".to_string()]);
    assert_eq!(root.min_properties(), Some(1));
    assert_eq!(root.max_properties(), Some(10));
    assert_eq!(root.additional_properties(), Additional::Allowed(false));
    assert_eq!(root.pattern_properties().len(), 1);
    assert_eq!(root.pattern_properties()[0].pattern.as_str(), "^x-");
    assert_eq!(
        root.property_dependencies().get("total"),
        Some(&vec!["lines".to_string()])
    );
    assert!(root.schema_dependencies().contains_key("coupon"));

    let names: Vec<&str> = root.properties().keys().map(String::as_str).collect();
    assert_eq!(names, vec!["id", "total", "lines"]);

    let total = &schema[root.properties()["total"]];
    assert_eq!(total.minimum(), Some(0.0));
    assert!(total.exclusive_minimum());
    assert_eq!(total.multiple_of(), Some(0.01));

    let lines = &schema[root.properties()["lines"]];
    assert!(lines.unique_items());
    assert_eq!(lines.min_items(), Some(1));
    match lines.items() {
        Items::Single(item) => assert!(schema[*item].types().contains(JsonType::Object)),
        other => panic!("Expected a single items schema, got {:?}", other),
    }
}

#[test]
fn test_items_list_and_additional_items() {
    let schema = Schema::from_value(&json!({
        "items": [{"type": "integer"}, {"type": "boolean"}],
        "additionalItems": {"type": "string"}
    }))
    .unwrap();
    let root = schema.root_node();
    match root.items() {
        Items::List(list) => assert_eq!(list.len(), 2),
        other => panic!("Expected an items list, got {:?}", other),
    }
    let Additional::Schema(extra) = root.additional_items() else {
        panic!("Expected an additionalItems schema");
    };
    assert!(schema[extra].types().contains(JsonType::String));
}

#[test]
fn test_null_annotations_are_unset() {
    let schema =
        Schema::from_value(&json!({"title": null, "description": null, "format": null})).unwrap();
    let root = schema.root_node();
    assert_eq!(root.title(), None);
    assert_eq!(root.description(), None);
    assert_eq!(root.format(), None);
}

#[test]
fn test_exclusive_flag_before_its_bound() {
    let schema = Schema::from_value(&json!({"exclusiveMaximum": true, "maximum": 5})).unwrap();
    assert_eq!(schema.root_node().maximum(), Some(5.0));
    assert!(schema.root_node().exclusive_maximum());
}

#[test]
fn test_unknown_keywords_kept_as_extension_data() {
    let schema = Schema::from_value(&json!({
        "$schema": "http://json-schema.org/draft-04/schema#",
        "x-ui": {"widget": "slider"},
        "definitions": {"a": {"type": "string"}},
        "type": "integer"
    }))
    .unwrap();
    let extensions = schema.root_node().extension_data();
    let keys: Vec<&str> = extensions.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["definitions", "$schema", "x-ui"]);
    assert_eq!(extensions["x-ui"], json!({"widget": "slider"}));
}

#[test]
fn test_original_document_is_captured() {
    let document = json!({
        "id": "http://example.com/root.json",
        "type": "object",
        "properties": {"self": {"$ref": "#"}, "n": {"maximum": 3, "exclusiveMaximum": true}},
        "definitions": {"unused": {"enum": [1, [2], {"three": 3}]}},
        "x-extra": null
    });
    let schema = Schema::from_value(&document).unwrap();
    assert_eq!(schema.to_json(), document);
    assert_eq!(serde_json::to_value(&schema).unwrap(), document);

    let reread = Schema::parse(&schema.to_string()).unwrap();
    assert_eq!(reread.to_json(), schema.to_json());
}

// ==== Invariants ====

#[test]
fn test_multiple_of_must_be_positive() {
    for bad in [json!(0), json!(-1), json!(-0.5)] {
        let err = Schema::from_value(&json!({"multipleOf": bad})).unwrap_err();
        assert_eq!(keyword_of(&err), "multipleOf");
    }

    let mut node = SchemaNode::new();
    assert!(node.set_multiple_of(0.0).is_err());
    assert!(node.set_multiple_of(-2.0).is_err());
    assert!(node.set_multiple_of(2.5).is_ok());
    assert_eq!(node.multiple_of(), Some(2.5));
}

#[test]
fn test_setters_enforce_invariants() {
    let mut node = SchemaNode::new();
    assert!(node.set_min_length(-1).is_err());
    assert!(node.set_max_items(-3).is_err());
    assert!(node.set_exclusive_minimum(true).is_err());
    node.set_minimum(1.0);
    assert!(node.set_exclusive_minimum(true).is_ok());
    assert!(node.set_pattern("(unclosed").is_err());
    assert!(node.add_type(JsonType::String).is_ok());
    assert!(node.add_type(JsonType::String).is_err());
    assert!(node.add_required("a").is_ok());
    assert!(node.add_required("a").is_err());
    assert!(node.add_enum_value(json!(1)).is_ok());
    assert!(node.add_enum_value(json!(1.0)).is_err());
    assert!(node.set_id("#").is_err());
    assert!(node.set_all_of(Vec::new()).is_err());
}

#[test]
fn test_malformed_keywords_are_rejected() {
    let cases = [
        (json!({"type": "text"}), "type"),
        (json!({"type": ["string", "string"]}), "type"),
        (json!({"enum": []}), "enum"),
        (json!({"enum": [1, 1.0]}), "enum"),
        (json!({"required": []}), "required"),
        (json!({"required": ["a", "a"]}), "required"),
        (json!({"minLength": -1}), "minLength"),
        (json!({"maxItems": 1.5}), "maxItems"),
        (json!({"pattern": "["}), "pattern"),
        (json!({"patternProperties": {"(": {}}}), "patternProperties"),
        (json!({"exclusiveMinimum": true}), "exclusiveMinimum"),
        (json!({"allOf": []}), "allOf"),
        (json!({"uniqueItems": "yes"}), "uniqueItems"),
        (json!({"dependencies": {"a": []}}), "dependencies"),
        (json!({"title": 5}), "title"),
    ];
    for (document, keyword) in cases {
        let err = Schema::from_value(&document).unwrap_err();
        assert_eq!(keyword_of(&err), keyword, "document: {}", document);
    }
}

#[test]
fn test_nested_error_paths() {
    let err = Schema::from_value(&json!({
        "properties": {"a/b": {"items": [{}, {"minItems": -2}]}}
    }))
    .unwrap_err();
    assert_eq!(
        err.path().unwrap().to_string(),
        "#/properties/a~1b/items/1/minItems"
    );
}

#[test]
fn test_non_object_schemas_are_rejected() {
    let err = Schema::from_value(&json!({"not": true})).unwrap_err();
    assert_eq!(keyword_of(&err), "not");
    let err = Schema::from_value(&json!({"properties": {"a": [1]}})).unwrap_err();
    assert_eq!(err.path().unwrap().to_string(), "#/properties/a");
    assert!(matches!(
        Schema::from_value(&json!("string")),
        Err(SchemaError::InvalidStructure { .. })
    ));
}

#[test]
fn test_json_syntax_errors_have_locations() {
    let err = Schema::parse("{\n  \"type\": \"string\",\n}").unwrap_err();
    let SchemaError::InvalidJson { location, .. } = err else {
        panic!("Expected InvalidJson");
    };
    assert_eq!(location.unwrap().line, 3);
}
