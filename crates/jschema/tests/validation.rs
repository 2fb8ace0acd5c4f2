use jschema::{
    FnSink, Schema, SourceMap, ValidationError, ValidationErrorKind, ValidationOptions, Validator,
    is_valid, validate, validate_with, validation_errors, validation_messages,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn schema(document: Value) -> Schema {
    Schema::from_value(&document).unwrap()
}

// ==== Core behaviours ====

#[test]
fn test_integer_type() {
    let s = schema(json!({"type": "integer"}));
    assert!(is_valid(&json!(5), &s));
    assert!(!is_valid(&json!(5.5), &s));
    assert!(!is_valid(&json!("5"), &s));
}

#[test]
fn test_required_property_with_type() {
    let s = schema(json!({"properties": {"a": {"type": "string"}}, "required": ["a"]}));
    assert!(is_valid(&json!({"a": "x"}), &s));

    let missing = validation_errors(&json!({}), &s);
    assert_eq!(
        missing.iter().map(|e| e.kind.clone()).collect::<Vec<_>>(),
        vec![ValidationErrorKind::MissingRequiredProperty {
            property: "a".to_string()
        }]
    );

    let wrong = validation_errors(&json!({"a": 1}), &s);
    assert_eq!(wrong.len(), 1);
    assert_eq!(wrong[0].children[0].keyword(), "type");
}

#[test]
fn test_tuple_items_without_extras() {
    let s = schema(json!({
        "items": [{"type": "integer"}, {"type": "boolean"}],
        "additionalItems": false
    }));
    assert!(is_valid(&json!([1, true]), &s));
    assert_eq!(
        validation_errors(&json!([1, true, 2]), &s)[0].kind,
        ValidationErrorKind::AdditionalItemsNotAllowed {
            length: 3,
            allowed: 2
        }
    );
}

#[test]
fn test_one_of_requires_exactly_one_match() {
    let s = schema(json!({"oneOf": [{"type": "string"}, {"maxLength": 3}]}));
    // only the first branch applies to a long string
    assert!(is_valid(&json!("long string"), &s));
    // numbers satisfy only the second branch
    assert!(is_valid(&json!(10), &s));
    assert!(!is_valid(&json!("abc"), &s));

    let none = schema(json!({"oneOf": [{"type": "string"}, {"type": "boolean"}]}));
    assert!(!is_valid(&json!(1), &none));
}

#[test]
fn test_enum_membership_is_structural() {
    let s = schema(json!({"enum": [[1, 2], {"a": 1, "b": [true]}, null]}));
    assert!(is_valid(&json!([1.0, 2]), &s));
    assert!(is_valid(&json!({"b": [true], "a": 1}), &s));
    assert!(is_valid(&json!(null), &s));
    assert!(!is_valid(&json!([2, 1]), &s));
    assert!(!is_valid(&json!({"a": 1}), &s));

    // every other constraint passes, membership still decides
    let typed = schema(json!({"type": "string", "minLength": 1, "enum": ["a", "b"]}));
    let errors = validation_errors(&json!("c"), &typed);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].keyword(), "enum");
}

#[test]
fn test_errors_are_all_reported() {
    let s = schema(json!({
        "type": "object",
        "required": ["id", "name"],
        "maxProperties": 2,
        "properties": {"id": {"type": "integer", "minimum": 1}}
    }));
    let errors = validation_errors(&json!({"id": 0, "a": 1, "b": 2}), &s);
    let keywords: Vec<&str> = errors.iter().map(ValidationError::keyword).collect();
    assert_eq!(keywords, vec!["required", "maxProperties", "properties"]);
}

#[test]
fn test_validate_fails_with_first_error() {
    let s = schema(json!({"type": "string", "minLength": 3}));
    assert!(validate(&json!("abc"), &s).is_ok());
    let err = validate(&json!(12), &s).unwrap_err();
    assert_eq!(err.to_string(), "Validation error at (root): Expected string, got integer");
}

#[test]
fn test_validate_with_callback_sink() {
    let s = schema(json!({"items": {"type": "integer"}}));
    let mut paths = Vec::new();
    validate_with(
        &json!([1, "a", 2, "b"]),
        &s,
        &mut FnSink(|e: ValidationError| paths.push(e.children[0].instance_path.to_pointer())),
    );
    assert_eq!(paths, vec!["/1".to_string(), "/3".to_string()]);
}

// ==== Formatted messages ====

#[test]
fn test_nested_messages() {
    let s = schema(json!({
        "type": "object",
        "properties": {
            "address": {
                "type": "object",
                "properties": {
                    "lines": {"type": "array", "items": {"type": "string", "maxLength": 5}}
                },
                "required": ["city"]
            }
        }
    }));
    let data = json!({"address": {"lines": ["1 Main Street", 42]}});
    let messages = validation_messages(&data, &s);
    insta::assert_snapshot!(messages.join("\n"), @r"
(root): Property 'address' is not valid against schema
  address: Missing required property 'city'
  address: Property 'lines' is not valid against schema
    address.lines: Array item 0 is not valid against schema
      address.lines[0]: String length 13 is greater than maximum 5
    address.lines: Array item 1 is not valid against schema
      address.lines[1]: Expected string, got integer
");
}

#[test]
fn test_combinator_messages() {
    let s = schema(json!({
        "anyOf": [{"type": "string"}, {"minimum": 10}],
        "not": {"type": "integer"}
    }));
    let messages = validation_messages(&json!(3), &s);
    insta::assert_snapshot!(messages.join("\n"), @r"
(root): Data is not valid against any anyOf schema
  (root): Expected string, got integer
  (root): Value 3 is less than minimum 10
(root): Data should not be valid against the schema
");
}

#[test]
fn test_error_kind_serialization() {
    let kind = ValidationErrorKind::StringTooShort {
        length: 1,
        min_length: 3,
    };
    assert_eq!(
        serde_json::to_value(&kind).unwrap(),
        json!({"type": "StringTooShort", "data": {"length": 1, "min_length": 3}})
    );
    let back: ValidationErrorKind = serde_json::from_value(json!({
        "type": "OneOfMultiple",
        "data": {"matched": [0, 2]}
    }))
    .unwrap();
    assert_eq!(back, ValidationErrorKind::OneOfMultiple { matched: vec![0, 2] });
}

// ==== Options and source maps ====

#[test]
fn test_formats_are_asserted_by_default() {
    let s = schema(json!({
        "properties": {
            "when": {"format": "date-time"},
            "mail": {"format": "email"},
            "host": {"format": "hostname"},
            "v4": {"format": "ipv4"},
            "v6": {"format": "ipv6"},
            "link": {"format": "uri"},
            "other": {"format": "unknown-format"}
        }
    }));
    let good = json!({
        "when": "2020-02-29T23:59:59.999Z",
        "mail": "someone@example.com",
        "host": "example.com",
        "v4": "10.0.0.1",
        "v6": "fe80::1",
        "link": "https://example.com/a?b=c",
        "other": "anything"
    });
    assert!(is_valid(&good, &s));

    let bad = json!({
        "when": "2020-02-30T23:59:59.999Z",
        "mail": "someone",
        "host": "exa_mple.com",
        "v4": "10.0.0",
        "v6": "fe80:::1",
        "link": "example.com",
        "other": 5
    });
    assert_eq!(validation_errors(&bad, &s).len(), 6);

    let lenient = Validator::new(&s).with_options(ValidationOptions {
        assert_formats: false,
    });
    assert!(lenient.is_valid(&bad));
}

#[test]
fn test_locations_from_data_text() {
    let text = r#"{
  "name": "widget",
  "tags": ["a", "b", "a"],
  "size": {"width": -1}
}"#;
    let data: Value = serde_json::from_str(text).unwrap();
    let map = SourceMap::new(text);
    let s = schema(json!({
        "properties": {
            "tags": {"uniqueItems": true},
            "size": {"properties": {"width": {"minimum": 0}}}
        }
    }));
    let errors = Validator::new(&s).with_source_map(&map).errors(&data);
    assert_eq!(errors.len(), 2);

    let tags = &errors[0].children[0];
    assert_eq!(
        tags.to_string(),
        "Validation error at tags (3:11): Array items 0 and 2 are not unique"
    );

    let width = &errors[1].children[0].children[0];
    assert_eq!(width.instance_path.to_pointer(), "/size/width");
    let location = width.location.unwrap();
    assert_eq!((location.line, location.column), (4, 21));
}
