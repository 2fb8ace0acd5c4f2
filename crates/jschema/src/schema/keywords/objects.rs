// Object keywords

use super::{read_additional, read_subschema};
use crate::error::{SchemaError, SchemaResult};
use crate::schema::helpers::{as_integer, as_object, as_unique_strings};
use crate::schema::pointer::JsonPointer;
use crate::schema::reader::Reader;
use crate::schema::types::SchemaId;
use serde_json::Value;

pub(crate) fn properties(
    reader: &mut Reader<'_>,
    id: SchemaId,
    value: &Value,
    pointer: &JsonPointer,
) -> SchemaResult<()> {
    let members = as_object("properties", value).map_err(|e| e.at(pointer))?;
    for (name, member) in members {
        let schema = read_subschema(reader, "properties", member, &pointer.child(name.as_str()))?;
        reader.node_mut(id).add_property(name.as_str(), schema);
    }
    Ok(())
}

pub(crate) fn pattern_properties(
    reader: &mut Reader<'_>,
    id: SchemaId,
    value: &Value,
    pointer: &JsonPointer,
) -> SchemaResult<()> {
    let members = as_object("patternProperties", value).map_err(|e| e.at(pointer))?;
    for (pattern, member) in members {
        let at = pointer.child(pattern.as_str());
        let schema = read_subschema(reader, "patternProperties", member, &at)?;
        reader
            .node_mut(id)
            .add_pattern_property(pattern, schema)
            .map_err(|e| e.at(&at))?;
    }
    Ok(())
}

pub(crate) fn additional_properties(
    reader: &mut Reader<'_>,
    id: SchemaId,
    value: &Value,
    pointer: &JsonPointer,
) -> SchemaResult<()> {
    let additional = read_additional(reader, "additionalProperties", value, pointer)?;
    reader.node_mut(id).set_additional_properties(additional);
    Ok(())
}

pub(crate) fn max_properties(
    reader: &mut Reader<'_>,
    id: SchemaId,
    value: &Value,
    pointer: &JsonPointer,
) -> SchemaResult<()> {
    let count = as_integer("maxProperties", value).map_err(|e| e.at(pointer))?;
    reader
        .node_mut(id)
        .set_max_properties(count)
        .map_err(|e| e.at(pointer))
}

pub(crate) fn min_properties(
    reader: &mut Reader<'_>,
    id: SchemaId,
    value: &Value,
    pointer: &JsonPointer,
) -> SchemaResult<()> {
    let count = as_integer("minProperties", value).map_err(|e| e.at(pointer))?;
    reader
        .node_mut(id)
        .set_min_properties(count)
        .map_err(|e| e.at(pointer))
}

pub(crate) fn required(
    reader: &mut Reader<'_>,
    id: SchemaId,
    value: &Value,
    pointer: &JsonPointer,
) -> SchemaResult<()> {
    let names = as_unique_strings("required", value).map_err(|e| e.at(pointer))?;
    for name in names {
        reader
            .node_mut(id)
            .add_required(name)
            .map_err(|e| e.at(pointer))?;
    }
    Ok(())
}

/// `dependencies`: per member, a schema or a list of co-required names
pub(crate) fn dependencies(
    reader: &mut Reader<'_>,
    id: SchemaId,
    value: &Value,
    pointer: &JsonPointer,
) -> SchemaResult<()> {
    let members = as_object("dependencies", value).map_err(|e| e.at(pointer))?;
    for (name, dependency) in members {
        let at = pointer.child(name.as_str());
        match dependency {
            Value::Object(_) => {
                let schema = reader.read_value(dependency, &at)?;
                reader.node_mut(id).add_schema_dependency(name.as_str(), schema);
            }
            Value::Array(_) => {
                let names = as_unique_strings("dependencies", dependency).map_err(|e| e.at(&at))?;
                reader
                    .node_mut(id)
                    .add_property_dependency(name.as_str(), names)
                    .map_err(|e| e.at(&at))?;
            }
            _ => {
                return Err(SchemaError::keyword(
                    "dependencies",
                    format!("dependency of '{}' must be a schema object or an array", name),
                )
                .at(&at));
            }
        }
    }
    Ok(())
}
