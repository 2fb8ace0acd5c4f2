// String keywords

use crate::error::SchemaResult;
use crate::schema::helpers::{as_integer, as_string};
use crate::schema::pointer::JsonPointer;
use crate::schema::reader::Reader;
use crate::schema::types::SchemaId;
use serde_json::Value;

pub(crate) fn max_length(
    reader: &mut Reader<'_>,
    id: SchemaId,
    value: &Value,
    pointer: &JsonPointer,
) -> SchemaResult<()> {
    let length = as_integer("maxLength", value).map_err(|e| e.at(pointer))?;
    reader
        .node_mut(id)
        .set_max_length(length)
        .map_err(|e| e.at(pointer))
}

pub(crate) fn min_length(
    reader: &mut Reader<'_>,
    id: SchemaId,
    value: &Value,
    pointer: &JsonPointer,
) -> SchemaResult<()> {
    let length = as_integer("minLength", value).map_err(|e| e.at(pointer))?;
    reader
        .node_mut(id)
        .set_min_length(length)
        .map_err(|e| e.at(pointer))
}

pub(crate) fn pattern(
    reader: &mut Reader<'_>,
    id: SchemaId,
    value: &Value,
    pointer: &JsonPointer,
) -> SchemaResult<()> {
    let pattern = as_string("pattern", value).map_err(|e| e.at(pointer))?;
    reader
        .node_mut(id)
        .set_pattern(pattern)
        .map_err(|e| e.at(pointer))
}
