// Annotation keywords, `type`, `enum` and `definitions`

use super::read_subschema;
use crate::error::{SchemaError, SchemaResult};
use crate::schema::helpers::{as_non_empty_array, as_object, as_optional_string};
use crate::schema::pointer::JsonPointer;
use crate::schema::reader::Reader;
use crate::schema::types::{JsonType, SchemaId};
use serde_json::Value;

pub(crate) fn title(
    reader: &mut Reader<'_>,
    id: SchemaId,
    value: &Value,
    pointer: &JsonPointer,
) -> SchemaResult<()> {
    let title = as_optional_string("title", value).map_err(|e| e.at(pointer))?;
    reader.node_mut(id).set_title(title);
    Ok(())
}

pub(crate) fn description(
    reader: &mut Reader<'_>,
    id: SchemaId,
    value: &Value,
    pointer: &JsonPointer,
) -> SchemaResult<()> {
    let description = as_optional_string("description", value).map_err(|e| e.at(pointer))?;
    reader.node_mut(id).set_description(description);
    Ok(())
}

pub(crate) fn default(
    reader: &mut Reader<'_>,
    id: SchemaId,
    value: &Value,
    _pointer: &JsonPointer,
) -> SchemaResult<()> {
    reader.node_mut(id).set_default(value.clone());
    Ok(())
}

pub(crate) fn format(
    reader: &mut Reader<'_>,
    id: SchemaId,
    value: &Value,
    pointer: &JsonPointer,
) -> SchemaResult<()> {
    let format = as_optional_string("format", value).map_err(|e| e.at(pointer))?;
    reader.node_mut(id).set_format(format);
    Ok(())
}

/// `type`: one type name or a non-empty array of distinct names
pub(crate) fn types(
    reader: &mut Reader<'_>,
    id: SchemaId,
    value: &Value,
    pointer: &JsonPointer,
) -> SchemaResult<()> {
    match value {
        Value::String(_) => add_type_name(reader, id, value, pointer),
        Value::Array(_) => {
            let names = as_non_empty_array("type", value).map_err(|e| e.at(pointer))?;
            for (i, name) in names.iter().enumerate() {
                add_type_name(reader, id, name, &pointer.index(i))?;
            }
            Ok(())
        }
        _ => Err(SchemaError::keyword("type", "must be a string or an array").at(pointer)),
    }
}

fn add_type_name(
    reader: &mut Reader<'_>,
    id: SchemaId,
    name: &Value,
    pointer: &JsonPointer,
) -> SchemaResult<()> {
    let name = name
        .as_str()
        .ok_or_else(|| SchemaError::keyword("type", "type names must be strings").at(pointer))?;
    let ty = JsonType::from_name(name)
        .ok_or_else(|| {
            SchemaError::keyword("type", format!("unknown type '{}'", name)).at(pointer)
        })?;
    reader.node_mut(id).add_type(ty).map_err(|e| e.at(pointer))
}

/// `enum`: a non-empty array of structurally distinct values
pub(crate) fn enumeration(
    reader: &mut Reader<'_>,
    id: SchemaId,
    value: &Value,
    pointer: &JsonPointer,
) -> SchemaResult<()> {
    let values = as_non_empty_array("enum", value).map_err(|e| e.at(pointer))?;
    for (i, item) in values.iter().enumerate() {
        reader
            .node_mut(id)
            .add_enum_value(item.clone())
            .map_err(|e| e.at(&pointer.index(i)))?;
    }
    Ok(())
}

/// `definitions`: every entry is read so its scopes are registered and
/// `$ref` pointers into it reuse the same nodes. The values stay reachable
/// only through references.
pub(crate) fn definitions(
    reader: &mut Reader<'_>,
    id: SchemaId,
    value: &Value,
    pointer: &JsonPointer,
) -> SchemaResult<()> {
    let entries = as_object("definitions", value).map_err(|e| e.at(pointer))?;
    for (name, entry) in entries {
        read_subschema(reader, "definitions", entry, &pointer.child(name.as_str()))?;
    }
    reader.node_mut(id).add_extension("definitions", value.clone());
    Ok(())
}
