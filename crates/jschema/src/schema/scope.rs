//! Resolution-scope URI arithmetic
//!
//! Scopes are kept as strings so that documents without an absolute base
//! (`"id": "folder/"`) still get consistent keys. Absolute scopes are joined
//! with [`url::Url::join`]; relative ones fall back to a textual join.

use super::pointer::JsonPointer;
use serde_json::Value;
use std::collections::HashMap;
use url::Url;

/// Resolve `reference` against the enclosing scope `base`
pub(crate) fn join(base: Option<&str>, reference: &str) -> String {
    if Url::parse(reference).is_ok() {
        return normalize(reference);
    }
    let Some(base) = base else {
        return normalize(reference);
    };
    if let Ok(base_url) = Url::parse(base) {
        return match base_url.join(reference) {
            Ok(joined) => normalize(joined.as_str()),
            Err(_) => normalize(reference),
        };
    }
    let joined = if reference.is_empty() {
        base.to_string()
    } else if reference.starts_with('#') {
        format!("{}{}", strip_fragment(base), reference)
    } else if reference.starts_with('/') {
        reference.to_string()
    } else {
        let base = strip_fragment(base);
        match base.rfind('/') {
            Some(slash) => format!("{}{}", &base[..=slash], reference),
            None => reference.to_string(),
        }
    };
    normalize(&joined)
}

/// Whether `uri` parses as an absolute URI
pub(crate) fn is_absolute(uri: &str) -> bool {
    Url::parse(uri).is_ok()
}

/// The part of `uri` before its first `#`
pub(crate) fn strip_fragment(uri: &str) -> &str {
    uri.split_once('#').map_or(uri, |(base, _)| base)
}

/// The scope stack in effect at `target`, built from the `id` of each
/// schema object enclosing it in `root`.
pub(crate) fn lexical_scopes(
    root: &Value,
    base: Option<&str>,
    target: &JsonPointer,
) -> Vec<String> {
    let mut scopes: Vec<String> = Vec::new();
    let mut ancestor = JsonPointer::root();
    for segment in target.segments() {
        let declared = ancestor
            .lookup(root)
            .filter(|value| value.get("$ref").is_none())
            .and_then(|value| value.get("id"))
            .and_then(Value::as_str);
        if let Some(id) = declared {
            let scope = join(scopes.last().map(String::as_str).or(base), id);
            scopes.push(scope);
        }
        ancestor = ancestor.child(segment.as_str());
    }
    scopes
}

/// Every resolution scope declared in a document, mapped to the pointer of
/// the schema object declaring it. The first declaration of a scope wins.
pub(crate) fn declared_scopes(root: &Value, base: Option<&str>) -> HashMap<String, JsonPointer> {
    let mut declared = HashMap::new();
    collect_declared(root, &JsonPointer::root(), base, &mut declared);
    declared
}

fn collect_declared(
    value: &Value,
    pointer: &JsonPointer,
    base: Option<&str>,
    declared: &mut HashMap<String, JsonPointer>,
) {
    let Value::Object(object) = value else {
        return;
    };
    if object.contains_key("$ref") {
        return;
    }
    let scope = object
        .get("id")
        .and_then(Value::as_str)
        .map(|id| join(base, id));
    if let Some(scope) = &scope {
        declared
            .entry(scope.clone())
            .or_insert_with(|| pointer.clone());
    }
    let base = scope.as_deref().or(base);

    for (keyword, member) in object {
        let at = pointer.child(keyword.as_str());
        match (keyword.as_str(), member) {
            (
                "properties" | "patternProperties" | "definitions" | "dependencies",
                Value::Object(map),
            ) => {
                for (name, schema) in map {
                    collect_declared(schema, &at.child(name.as_str()), base, declared);
                }
            }
            ("items" | "allOf" | "anyOf" | "oneOf", Value::Array(list)) => {
                for (index, schema) in list.iter().enumerate() {
                    collect_declared(schema, &at.index(index), base, declared);
                }
            }
            ("items" | "additionalItems" | "additionalProperties" | "not", _) => {
                collect_declared(member, &at, base, declared)
            }
            _ => {}
        }
    }
}

/// An empty fragment names the same resource as no fragment
fn normalize(uri: &str) -> String {
    uri.strip_suffix('#').unwrap_or(uri).to_string()
}
