//! Compiled schema graphs
//!
//! A [`Schema`] is an arena of [`SchemaNode`]s plus the handle of its root.
//! [`SchemaReader`] builds one from a JSON document, resolving `$ref`
//! against JSON pointers, `id` resolution scopes, and documents fetched
//! through a [`Resolver`].

mod helpers;
mod keywords;
pub mod pointer;
mod reader;
mod scope;
pub mod types;

pub use pointer::JsonPointer;
pub use types::{Additional, Items, JsonType, PatternProperty, SchemaId, SchemaNode, TypeSet};

use crate::error::{SchemaError, SchemaResult};
use crate::resolver::Resolver;
use crate::source_map::SourceMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::ops::Index;

/// A compiled, immutable schema graph
#[derive(Debug, Clone)]
pub struct Schema {
    nodes: Vec<SchemaNode>,
    root: SchemaId,
    /// The root document as read, `$ref` members included
    document: Map<String, Value>,
}

impl Schema {
    /// Read a schema from JSON text
    pub fn parse(text: &str) -> SchemaResult<Self> {
        SchemaReader::new().read_str(text)
    }

    /// Read a schema from JSON text, fetching external references through `resolver`
    pub fn parse_with_resolver(text: &str, resolver: &dyn Resolver) -> SchemaResult<Self> {
        SchemaReader::new().with_resolver(resolver).read_str(text)
    }

    /// Read a schema from an already parsed JSON value
    pub fn from_value(document: &Value) -> SchemaResult<Self> {
        SchemaReader::new().read(document)
    }

    pub fn root(&self) -> SchemaId {
        self.root
    }

    pub fn root_node(&self) -> &SchemaNode {
        &self.nodes[self.root.0]
    }

    pub fn node(&self, id: SchemaId) -> Option<&SchemaNode> {
        self.nodes.get(id.0)
    }

    /// Number of nodes, the unconstrained slot included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SchemaId, &SchemaNode)> {
        self.nodes.iter().enumerate().map(|(i, node)| (SchemaId(i), node))
    }

    /// The root schema document as it was read
    pub fn to_json(&self) -> Value {
        Value::Object(self.document.clone())
    }
}

impl Index<SchemaId> for Schema {
    type Output = SchemaNode;

    fn index(&self, id: SchemaId) -> &SchemaNode {
        &self.nodes[id.0]
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string_pretty(&self.document).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.document.serialize(serializer)
    }
}

/// Builder for reading schema documents
#[derive(Default, Clone, Copy)]
pub struct SchemaReader<'r> {
    resolver: Option<&'r dyn Resolver>,
}

impl<'r> SchemaReader<'r> {
    pub fn new() -> Self {
        Self { resolver: None }
    }

    /// Fetch externally referenced documents through `resolver`
    pub fn with_resolver(mut self, resolver: &'r dyn Resolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Read a schema document.
    ///
    /// The first problem aborts the read; no partial graph is returned.
    pub fn read(&self, document: &Value) -> SchemaResult<Schema> {
        reader::Reader::new(self.resolver).read(document.clone())
    }

    /// Parse and read JSON text, attaching line/column to errors in the
    /// root document.
    pub fn read_str(&self, text: &str) -> SchemaResult<Schema> {
        if text.trim().is_empty() {
            return Err(SchemaError::InvalidJson {
                message: "empty schema text".to_string(),
                location: None,
            });
        }
        let document: Value = serde_json::from_str(text)?;
        reader::Reader::new(self.resolver)
            .read(document)
            .map_err(|e| e.with_source(&SourceMap::new(text)))
    }
}
