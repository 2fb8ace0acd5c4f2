// Array keywords

use super::{read_additional, read_subschema};
use crate::error::{SchemaError, SchemaResult};
use crate::schema::helpers::{as_bool, as_integer};
use crate::schema::pointer::JsonPointer;
use crate::schema::reader::Reader;
use crate::schema::types::{Items, SchemaId};
use serde_json::Value;

/// `items`: a schema for every element, or a list of per-position schemas
pub(crate) fn items(
    reader: &mut Reader<'_>,
    id: SchemaId,
    value: &Value,
    pointer: &JsonPointer,
) -> SchemaResult<()> {
    let items = match value {
        Value::Null => Items::default(),
        Value::Object(_) => Items::Single(reader.read_value(value, pointer)?),
        Value::Array(list) => {
            let mut schemas = Vec::with_capacity(list.len());
            for (i, item) in list.iter().enumerate() {
                schemas.push(read_subschema(reader, "items", item, &pointer.index(i))?);
            }
            Items::List(schemas)
        }
        _ => {
            return Err(
                SchemaError::keyword("items", "must be a schema object or an array").at(pointer)
            );
        }
    };
    reader.node_mut(id).set_items(items);
    Ok(())
}

pub(crate) fn additional_items(
    reader: &mut Reader<'_>,
    id: SchemaId,
    value: &Value,
    pointer: &JsonPointer,
) -> SchemaResult<()> {
    let additional = read_additional(reader, "additionalItems", value, pointer)?;
    reader.node_mut(id).set_additional_items(additional);
    Ok(())
}

pub(crate) fn max_items(
    reader: &mut Reader<'_>,
    id: SchemaId,
    value: &Value,
    pointer: &JsonPointer,
) -> SchemaResult<()> {
    let count = as_integer("maxItems", value).map_err(|e| e.at(pointer))?;
    reader
        .node_mut(id)
        .set_max_items(count)
        .map_err(|e| e.at(pointer))
}

pub(crate) fn min_items(
    reader: &mut Reader<'_>,
    id: SchemaId,
    value: &Value,
    pointer: &JsonPointer,
) -> SchemaResult<()> {
    let count = as_integer("minItems", value).map_err(|e| e.at(pointer))?;
    reader
        .node_mut(id)
        .set_min_items(count)
        .map_err(|e| e.at(pointer))
}

pub(crate) fn unique_items(
    reader: &mut Reader<'_>,
    id: SchemaId,
    value: &Value,
    pointer: &JsonPointer,
) -> SchemaResult<()> {
    let unique = as_bool("uniqueItems", value).map_err(|e| e.at(pointer))?;
    reader.node_mut(id).set_unique_items(unique);
    Ok(())
}
