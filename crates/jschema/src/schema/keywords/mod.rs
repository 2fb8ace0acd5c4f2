//! Keyword handlers
//!
//! Each handler reads one keyword value into the node under construction.
//! [`KEYWORDS`] maps keyword names to handlers; names missing from it are
//! kept verbatim as extension data.

mod annotations;
mod arrays;
mod combinators;
mod numeric;
mod objects;
mod strings;

use super::pointer::JsonPointer;
use super::reader::Reader;
use super::types::{Additional, SchemaId};
use crate::error::{SchemaError, SchemaResult};
use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::HashMap;

pub(crate) use annotations::definitions;

/// Reads one keyword value (at `pointer`) into node `id`
pub(crate) type KeywordHandler =
    fn(&mut Reader<'_>, SchemaId, &Value, &JsonPointer) -> SchemaResult<()>;

/// Handler per draft-4 keyword. `id`, `definitions` and `$ref` are
/// handled by the reader itself.
pub(crate) static KEYWORDS: Lazy<HashMap<&'static str, KeywordHandler>> = Lazy::new(|| {
    let mut table: HashMap<&'static str, KeywordHandler> = HashMap::new();

    table.insert("title", annotations::title);
    table.insert("description", annotations::description);
    table.insert("default", annotations::default);
    table.insert("format", annotations::format);
    table.insert("type", annotations::types);
    table.insert("enum", annotations::enumeration);

    table.insert("multipleOf", numeric::multiple_of);
    table.insert("maximum", numeric::maximum);
    table.insert("exclusiveMaximum", numeric::exclusive_maximum);
    table.insert("minimum", numeric::minimum);
    table.insert("exclusiveMinimum", numeric::exclusive_minimum);

    table.insert("maxLength", strings::max_length);
    table.insert("minLength", strings::min_length);
    table.insert("pattern", strings::pattern);

    table.insert("items", arrays::items);
    table.insert("additionalItems", arrays::additional_items);
    table.insert("maxItems", arrays::max_items);
    table.insert("minItems", arrays::min_items);
    table.insert("uniqueItems", arrays::unique_items);

    table.insert("properties", objects::properties);
    table.insert("patternProperties", objects::pattern_properties);
    table.insert("additionalProperties", objects::additional_properties);
    table.insert("maxProperties", objects::max_properties);
    table.insert("minProperties", objects::min_properties);
    table.insert("required", objects::required);
    table.insert("dependencies", objects::dependencies);

    table.insert("allOf", combinators::all_of);
    table.insert("anyOf", combinators::any_of);
    table.insert("oneOf", combinators::one_of);
    table.insert("not", combinators::not);

    table
});

/// Read a keyword value that must be a schema object
fn read_subschema(
    reader: &mut Reader<'_>,
    keyword: &str,
    value: &Value,
    pointer: &JsonPointer,
) -> SchemaResult<SchemaId> {
    if !value.is_object() {
        return Err(SchemaError::keyword(keyword, "must be a schema object").at(pointer));
    }
    reader.read_value(value, pointer)
}

/// Read a non-empty array of schema objects
fn read_schema_list(
    reader: &mut Reader<'_>,
    keyword: &str,
    value: &Value,
    pointer: &JsonPointer,
) -> SchemaResult<Vec<SchemaId>> {
    let items = super::helpers::as_non_empty_array(keyword, value).map_err(|e| e.at(pointer))?;
    items
        .iter()
        .enumerate()
        .map(|(i, item)| read_subschema(reader, keyword, item, &pointer.index(i)))
        .collect()
}

/// Read an allow-flag or a schema (`additionalItems`, `additionalProperties`)
fn read_additional(
    reader: &mut Reader<'_>,
    keyword: &str,
    value: &Value,
    pointer: &JsonPointer,
) -> SchemaResult<Additional> {
    match value {
        Value::Bool(allowed) => Ok(Additional::Allowed(*allowed)),
        Value::Object(_) => Ok(Additional::Schema(reader.read_value(value, pointer)?)),
        _ => Err(SchemaError::keyword(keyword, "must be a boolean or a schema object").at(pointer)),
    }
}
