//! Schema node definitions
//!
//! A [`SchemaNode`] is the compiled form of one JSON Schema object. Nodes
//! live in the arena of a [`super::Schema`] and refer to each other through
//! [`SchemaId`] handles, so `$ref` cycles are two handles naming the same
//! slot rather than an infinite expansion.
//!
//! Every setter enforces the keyword's invariant when it is called, so a
//! node assembled by hand is held to the same rules as one read from JSON.

use crate::equality::json_equal;
use crate::error::{SchemaError, SchemaResult};
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Handle of a node inside a schema graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaId(pub(crate) usize);

impl SchemaId {
    /// The empty schema every graph keeps in slot 0
    pub const UNCONSTRAINED: SchemaId = SchemaId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// JSON value kinds named by the `type` keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    Array,
    Boolean,
    Integer,
    Number,
    Null,
    Object,
    String,
}

impl JsonType {
    pub const ALL: [JsonType; 7] = [
        JsonType::Array,
        JsonType::Boolean,
        JsonType::Integer,
        JsonType::Number,
        JsonType::Null,
        JsonType::Object,
        JsonType::String,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        JsonType::ALL.into_iter().find(|t| t.as_str() == name)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JsonType::Array => "array",
            JsonType::Boolean => "boolean",
            JsonType::Integer => "integer",
            JsonType::Number => "number",
            JsonType::Null => "null",
            JsonType::Object => "object",
            JsonType::String => "string",
        }
    }

    /// Kind of a data value; integer-valued numbers are `Integer`
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => JsonType::Null,
            Value::Bool(_) => JsonType::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => JsonType::Integer,
            Value::Number(_) => JsonType::Number,
            Value::String(_) => JsonType::String,
            Value::Array(_) => JsonType::Array,
            Value::Object(_) => JsonType::Object,
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of [`JsonType`]s; empty means unconstrained
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeSet(u8);

impl TypeSet {
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, ty: JsonType) -> bool {
        self.0 & ty.bit() != 0
    }

    /// Add `ty`, returning false if it was already present
    pub fn insert(&mut self, ty: JsonType) -> bool {
        let fresh = !self.contains(ty);
        self.0 |= ty.bit();
        fresh
    }

    pub fn iter(self) -> impl Iterator<Item = JsonType> {
        JsonType::ALL.into_iter().filter(move |t| self.contains(*t))
    }

    /// Whether a value of kind `ty` satisfies this set.
    ///
    /// An empty set accepts everything; `number` also accepts integers.
    pub fn accepts(self, ty: JsonType) -> bool {
        self.is_empty()
            || self.contains(ty)
            || (ty == JsonType::Integer && self.contains(JsonType::Number))
    }
}

impl fmt::Display for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(JsonType::as_str).collect();
        f.write_str(&names.join(" or "))
    }
}

/// The `items` keyword
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Items {
    /// One schema applied to every element
    Single(SchemaId),
    /// Per-position schemas
    List(Vec<SchemaId>),
}

impl Default for Items {
    fn default() -> Self {
        Items::Single(SchemaId::UNCONSTRAINED)
    }
}

/// `additionalItems` / `additionalProperties`: a flag or a schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Additional {
    Allowed(bool),
    Schema(SchemaId),
}

impl Default for Additional {
    fn default() -> Self {
        Additional::Allowed(true)
    }
}

/// One `patternProperties` entry
#[derive(Debug, Clone)]
pub struct PatternProperty {
    pub pattern: Regex,
    pub schema: SchemaId,
}

/// The compiled form of one schema object
#[derive(Debug, Clone, Default)]
pub struct SchemaNode {
    id: Option<String>,
    title: Option<String>,
    description: Option<String>,
    default: Option<Value>,
    format: Option<String>,
    types: TypeSet,

    multiple_of: Option<f64>,
    maximum: Option<f64>,
    exclusive_maximum: bool,
    minimum: Option<f64>,
    exclusive_minimum: bool,

    max_length: Option<usize>,
    min_length: Option<usize>,
    pattern: Option<Regex>,

    items: Items,
    additional_items: Additional,
    max_items: Option<usize>,
    min_items: Option<usize>,
    unique_items: bool,

    properties: IndexMap<String, SchemaId>,
    pattern_properties: Vec<PatternProperty>,
    additional_properties: Additional,
    max_properties: Option<usize>,
    min_properties: Option<usize>,
    required: Vec<String>,
    schema_dependencies: IndexMap<String, SchemaId>,
    property_dependencies: IndexMap<String, Vec<String>>,

    all_of: Vec<SchemaId>,
    any_of: Vec<SchemaId>,
    one_of: Vec<SchemaId>,
    not: Option<SchemaId>,
    enum_values: Vec<Value>,

    extension_data: Map<String, Value>,
    source: Map<String, Value>,
}

fn non_negative(keyword: &str, value: i64) -> SchemaResult<usize> {
    usize::try_from(value)
        .map_err(|_| SchemaError::keyword(keyword, "must be greater than or equal to zero"))
}

fn non_empty(keyword: &str, schemas: &[SchemaId]) -> SchemaResult<()> {
    if schemas.is_empty() {
        return Err(SchemaError::keyword(keyword, "must not be empty"));
    }
    Ok(())
}

impl SchemaNode {
    pub fn new() -> Self {
        Self::default()
    }

    // ==== Annotations ====

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: impl Into<String>) -> SchemaResult<()> {
        let id = id.into();
        if id.is_empty() || id == "#" {
            return Err(SchemaError::keyword("id", format!("invalid id '{}'", id)));
        }
        self.id = Some(id);
        Ok(())
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn set_title(&mut self, title: Option<String>) {
        self.title = title;
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn set_default(&mut self, default: Value) {
        self.default = Some(default);
    }

    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    pub fn set_format(&mut self, format: Option<String>) {
        self.format = format;
    }

    pub fn types(&self) -> TypeSet {
        self.types
    }

    pub fn add_type(&mut self, ty: JsonType) -> SchemaResult<()> {
        if !self.types.insert(ty) {
            return Err(SchemaError::keyword("type", format!("duplicate type '{}'", ty)));
        }
        Ok(())
    }

    // ==== Numeric constraints ====

    pub fn multiple_of(&self) -> Option<f64> {
        self.multiple_of
    }

    pub fn set_multiple_of(&mut self, value: f64) -> SchemaResult<()> {
        if !value.is_finite() || value <= 0.0 {
            return Err(SchemaError::keyword("multipleOf", "must be greater than zero"));
        }
        self.multiple_of = Some(value);
        Ok(())
    }

    pub fn maximum(&self) -> Option<f64> {
        self.maximum
    }

    pub fn set_maximum(&mut self, value: f64) {
        self.maximum = Some(value);
    }

    pub fn exclusive_maximum(&self) -> bool {
        self.exclusive_maximum
    }

    pub fn set_exclusive_maximum(&mut self, exclusive: bool) -> SchemaResult<()> {
        if self.maximum.is_none() {
            return Err(SchemaError::keyword("exclusiveMaximum", "requires 'maximum'"));
        }
        self.exclusive_maximum = exclusive;
        Ok(())
    }

    pub fn minimum(&self) -> Option<f64> {
        self.minimum
    }

    pub fn set_minimum(&mut self, value: f64) {
        self.minimum = Some(value);
    }

    pub fn exclusive_minimum(&self) -> bool {
        self.exclusive_minimum
    }

    pub fn set_exclusive_minimum(&mut self, exclusive: bool) -> SchemaResult<()> {
        if self.minimum.is_none() {
            return Err(SchemaError::keyword("exclusiveMinimum", "requires 'minimum'"));
        }
        self.exclusive_minimum = exclusive;
        Ok(())
    }

    // ==== String constraints ====

    pub fn max_length(&self) -> Option<usize> {
        self.max_length
    }

    pub fn set_max_length(&mut self, value: i64) -> SchemaResult<()> {
        self.max_length = Some(non_negative("maxLength", value)?);
        Ok(())
    }

    pub fn min_length(&self) -> Option<usize> {
        self.min_length
    }

    pub fn set_min_length(&mut self, value: i64) -> SchemaResult<()> {
        self.min_length = Some(non_negative("minLength", value)?);
        Ok(())
    }

    pub fn pattern(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }

    pub fn set_pattern(&mut self, pattern: &str) -> SchemaResult<()> {
        let regex = Regex::new(pattern)
            .map_err(|e| SchemaError::keyword("pattern", format!("invalid regex: {}", e)))?;
        self.pattern = Some(regex);
        Ok(())
    }

    // ==== Array constraints ====

    pub fn items(&self) -> &Items {
        &self.items
    }

    pub fn set_items(&mut self, items: Items) {
        self.items = items;
    }

    pub fn additional_items(&self) -> Additional {
        self.additional_items
    }

    pub fn set_additional_items(&mut self, additional: Additional) {
        self.additional_items = additional;
    }

    pub fn max_items(&self) -> Option<usize> {
        self.max_items
    }

    pub fn set_max_items(&mut self, value: i64) -> SchemaResult<()> {
        self.max_items = Some(non_negative("maxItems", value)?);
        Ok(())
    }

    pub fn min_items(&self) -> Option<usize> {
        self.min_items
    }

    pub fn set_min_items(&mut self, value: i64) -> SchemaResult<()> {
        self.min_items = Some(non_negative("minItems", value)?);
        Ok(())
    }

    pub fn unique_items(&self) -> bool {
        self.unique_items
    }

    pub fn set_unique_items(&mut self, unique: bool) {
        self.unique_items = unique;
    }

    // ==== Object constraints ====

    pub fn properties(&self) -> &IndexMap<String, SchemaId> {
        &self.properties
    }

    pub fn add_property(&mut self, name: impl Into<String>, schema: SchemaId) {
        self.properties.insert(name.into(), schema);
    }

    pub fn pattern_properties(&self) -> &[PatternProperty] {
        &self.pattern_properties
    }

    pub fn add_pattern_property(&mut self, pattern: &str, schema: SchemaId) -> SchemaResult<()> {
        let pattern = Regex::new(pattern).map_err(|e| {
            SchemaError::keyword("patternProperties", format!("invalid regex: {}", e))
        })?;
        self.pattern_properties.push(PatternProperty { pattern, schema });
        Ok(())
    }

    pub fn additional_properties(&self) -> Additional {
        self.additional_properties
    }

    pub fn set_additional_properties(&mut self, additional: Additional) {
        self.additional_properties = additional;
    }

    pub fn max_properties(&self) -> Option<usize> {
        self.max_properties
    }

    pub fn set_max_properties(&mut self, value: i64) -> SchemaResult<()> {
        self.max_properties = Some(non_negative("maxProperties", value)?);
        Ok(())
    }

    pub fn min_properties(&self) -> Option<usize> {
        self.min_properties
    }

    pub fn set_min_properties(&mut self, value: i64) -> SchemaResult<()> {
        self.min_properties = Some(non_negative("minProperties", value)?);
        Ok(())
    }

    pub fn required(&self) -> &[String] {
        &self.required
    }

    pub fn add_required(&mut self, name: impl Into<String>) -> SchemaResult<()> {
        let name = name.into();
        if self.required.contains(&name) {
            return Err(SchemaError::keyword(
                "required",
                format!("duplicate property '{}'", name),
            ));
        }
        self.required.push(name);
        Ok(())
    }

    pub fn schema_dependencies(&self) -> &IndexMap<String, SchemaId> {
        &self.schema_dependencies
    }

    pub fn add_schema_dependency(&mut self, name: impl Into<String>, schema: SchemaId) {
        self.schema_dependencies.insert(name.into(), schema);
    }

    pub fn property_dependencies(&self) -> &IndexMap<String, Vec<String>> {
        &self.property_dependencies
    }

    /// `name` requires every member of `co_required`, which must be a
    /// non-empty list without duplicates
    pub fn add_property_dependency(
        &mut self,
        name: impl Into<String>,
        co_required: Vec<String>,
    ) -> SchemaResult<()> {
        let name = name.into();
        if co_required.is_empty() {
            return Err(SchemaError::keyword(
                "dependencies",
                format!("dependency list of '{}' must not be empty", name),
            ));
        }
        for (i, dep) in co_required.iter().enumerate() {
            if co_required[..i].contains(dep) {
                return Err(SchemaError::keyword(
                    "dependencies",
                    format!("duplicate dependency '{}' of '{}'", dep, name),
                ));
            }
        }
        self.property_dependencies.insert(name, co_required);
        Ok(())
    }

    // ==== Combinators ====

    pub fn all_of(&self) -> &[SchemaId] {
        &self.all_of
    }

    pub fn set_all_of(&mut self, schemas: Vec<SchemaId>) -> SchemaResult<()> {
        non_empty("allOf", &schemas)?;
        self.all_of = schemas;
        Ok(())
    }

    pub fn any_of(&self) -> &[SchemaId] {
        &self.any_of
    }

    pub fn set_any_of(&mut self, schemas: Vec<SchemaId>) -> SchemaResult<()> {
        non_empty("anyOf", &schemas)?;
        self.any_of = schemas;
        Ok(())
    }

    pub fn one_of(&self) -> &[SchemaId] {
        &self.one_of
    }

    pub fn set_one_of(&mut self, schemas: Vec<SchemaId>) -> SchemaResult<()> {
        non_empty("oneOf", &schemas)?;
        self.one_of = schemas;
        Ok(())
    }

    pub fn not(&self) -> Option<SchemaId> {
        self.not
    }

    pub fn set_not(&mut self, schema: SchemaId) {
        self.not = Some(schema);
    }

    pub fn enum_values(&self) -> &[Value] {
        &self.enum_values
    }

    pub fn add_enum_value(&mut self, value: Value) -> SchemaResult<()> {
        if self.enum_values.iter().any(|v| json_equal(v, &value)) {
            return Err(SchemaError::keyword("enum", format!("duplicate value {}", value)));
        }
        self.enum_values.push(value);
        Ok(())
    }

    // ==== Raw data ====

    /// Unrecognized keywords, verbatim and in document order
    pub fn extension_data(&self) -> &Map<String, Value> {
        &self.extension_data
    }

    pub fn add_extension(&mut self, name: impl Into<String>, value: Value) {
        self.extension_data.insert(name.into(), value);
    }

    /// The JSON object this node was read from
    pub fn source(&self) -> &Map<String, Value> {
        &self.source
    }

    pub(crate) fn set_source(&mut self, source: Map<String, Value>) {
        self.source = source;
    }
}
