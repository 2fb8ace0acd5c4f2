// Combinator keywords

use super::{read_schema_list, read_subschema};
use crate::error::SchemaResult;
use crate::schema::pointer::JsonPointer;
use crate::schema::reader::Reader;
use crate::schema::types::SchemaId;
use serde_json::Value;

pub(crate) fn all_of(
    reader: &mut Reader<'_>,
    id: SchemaId,
    value: &Value,
    pointer: &JsonPointer,
) -> SchemaResult<()> {
    let schemas = read_schema_list(reader, "allOf", value, pointer)?;
    reader.node_mut(id).set_all_of(schemas).map_err(|e| e.at(pointer))
}

pub(crate) fn any_of(
    reader: &mut Reader<'_>,
    id: SchemaId,
    value: &Value,
    pointer: &JsonPointer,
) -> SchemaResult<()> {
    let schemas = read_schema_list(reader, "anyOf", value, pointer)?;
    reader.node_mut(id).set_any_of(schemas).map_err(|e| e.at(pointer))
}

pub(crate) fn one_of(
    reader: &mut Reader<'_>,
    id: SchemaId,
    value: &Value,
    pointer: &JsonPointer,
) -> SchemaResult<()> {
    let schemas = read_schema_list(reader, "oneOf", value, pointer)?;
    reader.node_mut(id).set_one_of(schemas).map_err(|e| e.at(pointer))
}

pub(crate) fn not(
    reader: &mut Reader<'_>,
    id: SchemaId,
    value: &Value,
    pointer: &JsonPointer,
) -> SchemaResult<()> {
    let schema = read_subschema(reader, "not", value, pointer)?;
    reader.node_mut(id).set_not(schema);
    Ok(())
}
