// Numeric keywords

use super::KeywordHandler;
use crate::error::SchemaResult;
use crate::schema::helpers::{as_bool, as_number};
use crate::schema::pointer::JsonPointer;
use crate::schema::reader::Reader;
use crate::schema::types::SchemaId;
use serde_json::Value;

pub(crate) fn multiple_of(
    reader: &mut Reader<'_>,
    id: SchemaId,
    value: &Value,
    pointer: &JsonPointer,
) -> SchemaResult<()> {
    let divisor = as_number("multipleOf", value).map_err(|e| e.at(pointer))?;
    reader
        .node_mut(id)
        .set_multiple_of(divisor)
        .map_err(|e| e.at(pointer))
}

pub(crate) fn maximum(
    reader: &mut Reader<'_>,
    id: SchemaId,
    value: &Value,
    pointer: &JsonPointer,
) -> SchemaResult<()> {
    let bound = as_number("maximum", value).map_err(|e| e.at(pointer))?;
    reader.node_mut(id).set_maximum(bound);
    Ok(())
}

pub(crate) fn minimum(
    reader: &mut Reader<'_>,
    id: SchemaId,
    value: &Value,
    pointer: &JsonPointer,
) -> SchemaResult<()> {
    let bound = as_number("minimum", value).map_err(|e| e.at(pointer))?;
    reader.node_mut(id).set_minimum(bound);
    Ok(())
}

pub(crate) fn exclusive_maximum(
    reader: &mut Reader<'_>,
    id: SchemaId,
    value: &Value,
    pointer: &JsonPointer,
) -> SchemaResult<()> {
    let exclusive = as_bool("exclusiveMaximum", value).map_err(|e| e.at(pointer))?;
    bound_from_sibling(reader, id, "maximum", pointer, maximum)?;
    reader
        .node_mut(id)
        .set_exclusive_maximum(exclusive)
        .map_err(|e| e.at(pointer))
}

pub(crate) fn exclusive_minimum(
    reader: &mut Reader<'_>,
    id: SchemaId,
    value: &Value,
    pointer: &JsonPointer,
) -> SchemaResult<()> {
    let exclusive = as_bool("exclusiveMinimum", value).map_err(|e| e.at(pointer))?;
    bound_from_sibling(reader, id, "minimum", pointer, minimum)?;
    reader
        .node_mut(id)
        .set_exclusive_minimum(exclusive)
        .map_err(|e| e.at(pointer))
}

/// Apply the bound an exclusive flag depends on when it appears later in
/// the same object, so member order doesn't matter.
fn bound_from_sibling(
    reader: &mut Reader<'_>,
    id: SchemaId,
    bound: &str,
    pointer: &JsonPointer,
    apply: KeywordHandler,
) -> SchemaResult<()> {
    let node = reader.node(id);
    let already_set = match bound {
        "maximum" => node.maximum().is_some(),
        _ => node.minimum().is_some(),
    };
    if already_set {
        return Ok(());
    }
    let Some(sibling) = node.source().get(bound).cloned() else {
        return Ok(());
    };
    let sibling_pointer = pointer.parent().unwrap_or_default().child(bound);
    apply(reader, id, &sibling, &sibling_pointer)
}
