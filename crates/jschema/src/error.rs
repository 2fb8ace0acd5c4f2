// Error types for schema reading and validation

use crate::resolver::ResolveError;
use crate::schema::JsonPointer;
use crate::source_map::SourceMap;
use std::fmt;
use thiserror::Error;

/// Errors raised while reading a schema document.
///
/// Reading is fail-fast: the first error aborts the whole read and no
/// partial schema graph is returned.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The schema text is not valid JSON
    #[error("invalid JSON: {message}")]
    InvalidJson {
        message: String,
        location: Option<SourceLocation>,
    },

    /// The document has the wrong shape (non-object schema, bad pointer target, ...)
    #[error("invalid schema structure at {path}: {message}")]
    InvalidStructure {
        message: String,
        path: JsonPointer,
        location: Option<SourceLocation>,
    },

    /// A keyword value violates the keyword's type or invariants
    #[error("invalid '{keyword}' at {path}: {message}")]
    InvalidKeyword {
        keyword: String,
        message: String,
        path: JsonPointer,
        location: Option<SourceLocation>,
    },

    /// A `$ref` that cannot be resolved
    #[error("unresolved reference '{reference}' at {path}: {reason}")]
    UnresolvedRef {
        reference: String,
        reason: String,
        path: JsonPointer,
        location: Option<SourceLocation>,
    },

    /// A `$ref` chain that loops back on itself without reaching a schema object
    #[error("circular reference '{reference}' at {path}")]
    CircularRef {
        reference: String,
        path: JsonPointer,
        location: Option<SourceLocation>,
    },

    /// The resolver failed to fetch an external document
    #[error("failed to fetch '{uri}'")]
    Resolve {
        uri: String,
        #[source]
        source: ResolveError,
    },

    /// A read error raised inside an externally fetched document
    #[error("in external schema '{uri}': {source}")]
    External {
        uri: String,
        #[source]
        source: Box<SchemaError>,
    },
}

impl SchemaError {
    /// Shorthand for a keyword error; the path is filled in by the reader.
    pub(crate) fn keyword(keyword: &str, message: impl Into<String>) -> Self {
        SchemaError::InvalidKeyword {
            keyword: keyword.to_string(),
            message: message.into(),
            path: JsonPointer::root(),
            location: None,
        }
    }

    pub(crate) fn structure(message: impl Into<String>, path: &JsonPointer) -> Self {
        SchemaError::InvalidStructure {
            message: message.into(),
            path: path.clone(),
            location: None,
        }
    }

    pub(crate) fn unresolved(
        reference: &str,
        reason: impl Into<String>,
        path: &JsonPointer,
    ) -> Self {
        SchemaError::UnresolvedRef {
            reference: reference.to_string(),
            reason: reason.into(),
            path: path.clone(),
            location: None,
        }
    }

    /// Replace the JSON pointer of a keyword error raised by a setter.
    pub(crate) fn at(mut self, pointer: &JsonPointer) -> Self {
        if let SchemaError::InvalidKeyword { path, .. } = &mut self {
            *path = pointer.clone();
        }
        self
    }

    /// JSON pointer of the offending value, when the error has one
    pub fn path(&self) -> Option<&JsonPointer> {
        match self {
            SchemaError::InvalidStructure { path, .. }
            | SchemaError::InvalidKeyword { path, .. }
            | SchemaError::UnresolvedRef { path, .. }
            | SchemaError::CircularRef { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Line/column of the offending value, when known
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            SchemaError::InvalidJson { location, .. }
            | SchemaError::InvalidStructure { location, .. }
            | SchemaError::InvalidKeyword { location, .. }
            | SchemaError::UnresolvedRef { location, .. }
            | SchemaError::CircularRef { location, .. } => location.as_ref(),
            _ => None,
        }
    }

    /// Attach line/column information looked up from the schema text.
    pub(crate) fn with_source(mut self, source_map: &SourceMap) -> Self {
        let found = self.path().and_then(|p| source_map.locate(&p.to_string()));
        match &mut self {
            SchemaError::InvalidStructure { location, .. }
            | SchemaError::InvalidKeyword { location, .. }
            | SchemaError::UnresolvedRef { location, .. }
            | SchemaError::CircularRef { location, .. } => {
                if location.is_none() {
                    *location = found;
                }
            }
            _ => {}
        }
        self
    }
}

impl From<serde_json::Error> for SchemaError {
    fn from(e: serde_json::Error) -> Self {
        let location = (e.line() > 0).then(|| SourceLocation {
            line: e.line(),
            column: e.column(),
        });
        SchemaError::InvalidJson {
            message: e.to_string(),
            location,
        }
    }
}

/// Result type for schema reading operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Structured validation error kinds
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ValidationErrorKind {
    /// Data kind not admitted by `type`
    TypeMismatch { expected: String, got: String },

    /// Value not structurally equal to any `enum` entry
    InvalidEnumValue { value: String },

    /// Number below `minimum` (or equal to it when exclusive)
    BelowMinimum {
        value: f64,
        minimum: f64,
        exclusive: bool,
    },

    /// Number above `maximum` (or equal to it when exclusive)
    AboveMaximum {
        value: f64,
        maximum: f64,
        exclusive: bool,
    },

    /// Number not a multiple of `multipleOf`
    NotMultipleOf { value: f64, multiple_of: f64 },

    /// String shorter than `minLength`
    StringTooShort { length: usize, min_length: usize },

    /// String longer than `maxLength`
    StringTooLong { length: usize, max_length: usize },

    /// String doesn't match `pattern`
    PatternMismatch { value: String, pattern: String },

    /// String doesn't satisfy its `format`
    InvalidFormat { value: String, format: String },

    /// Two array items are structurally equal under `uniqueItems`
    ArrayItemsNotUnique { first: usize, second: usize },

    /// Array shorter than `minItems`
    TooFewItems { length: usize, min_items: usize },

    /// Array longer than `maxItems`
    TooManyItems { length: usize, max_items: usize },

    /// Array longer than the `items` list while `additionalItems` is false
    AdditionalItemsNotAllowed { length: usize, allowed: usize },

    /// An array element failed its item schema (children hold the details)
    InvalidItem { index: usize },

    /// Missing member listed in `required`
    MissingRequiredProperty { property: String },

    /// Object has fewer members than `minProperties`
    TooFewProperties { count: usize, min_properties: usize },

    /// Object has more members than `maxProperties`
    TooManyProperties { count: usize, max_properties: usize },

    /// Member matched no schema while `additionalProperties` is false
    AdditionalPropertyNotAllowed { property: String },

    /// An object member failed one of its schemas (children hold the details)
    InvalidProperty { property: String },

    /// Object failed the schema dependency triggered by `property`
    SchemaDependency { property: String },

    /// `property` is present but a co-required member is missing
    PropertyDependency { property: String, missing: String },

    /// Data failed the `allOf` sub-schema at `index`
    AllOf { index: usize },

    /// Data failed every `anyOf` sub-schema
    AnyOf,

    /// Data failed every `oneOf` sub-schema
    OneOfNone,

    /// Data matched more than one `oneOf` sub-schema
    OneOfMultiple { matched: Vec<usize> },

    /// Data matched the `not` sub-schema
    Not,
}

impl ValidationErrorKind {
    /// The schema keyword responsible for this error
    pub fn keyword(&self) -> &'static str {
        match self {
            ValidationErrorKind::TypeMismatch { .. } => "type",
            ValidationErrorKind::InvalidEnumValue { .. } => "enum",
            ValidationErrorKind::BelowMinimum { .. } => "minimum",
            ValidationErrorKind::AboveMaximum { .. } => "maximum",
            ValidationErrorKind::NotMultipleOf { .. } => "multipleOf",
            ValidationErrorKind::StringTooShort { .. } => "minLength",
            ValidationErrorKind::StringTooLong { .. } => "maxLength",
            ValidationErrorKind::PatternMismatch { .. } => "pattern",
            ValidationErrorKind::InvalidFormat { .. } => "format",
            ValidationErrorKind::ArrayItemsNotUnique { .. } => "uniqueItems",
            ValidationErrorKind::TooFewItems { .. } => "minItems",
            ValidationErrorKind::TooManyItems { .. } => "maxItems",
            ValidationErrorKind::AdditionalItemsNotAllowed { .. } => "additionalItems",
            ValidationErrorKind::InvalidItem { .. } => "items",
            ValidationErrorKind::MissingRequiredProperty { .. } => "required",
            ValidationErrorKind::TooFewProperties { .. } => "minProperties",
            ValidationErrorKind::TooManyProperties { .. } => "maxProperties",
            ValidationErrorKind::AdditionalPropertyNotAllowed { .. } => "additionalProperties",
            ValidationErrorKind::InvalidProperty { .. } => "properties",
            ValidationErrorKind::SchemaDependency { .. }
            | ValidationErrorKind::PropertyDependency { .. } => "dependencies",
            ValidationErrorKind::AllOf { .. } => "allOf",
            ValidationErrorKind::AnyOf => "anyOf",
            ValidationErrorKind::OneOfNone | ValidationErrorKind::OneOfMultiple { .. } => "oneOf",
            ValidationErrorKind::Not => "not",
        }
    }

    /// Format a human-readable message from this error kind
    pub fn message(&self) -> String {
        match self {
            ValidationErrorKind::TypeMismatch { expected, got } => {
                format!("Expected {}, got {}", expected, got)
            }
            ValidationErrorKind::InvalidEnumValue { value } => {
                format!("Value {} does not match any enum value", value)
            }
            ValidationErrorKind::BelowMinimum {
                value,
                minimum,
                exclusive,
            } => {
                if *exclusive {
                    format!("Value {} is not greater than exclusive minimum {}", value, minimum)
                } else {
                    format!("Value {} is less than minimum {}", value, minimum)
                }
            }
            ValidationErrorKind::AboveMaximum {
                value,
                maximum,
                exclusive,
            } => {
                if *exclusive {
                    format!("Value {} is not less than exclusive maximum {}", value, maximum)
                } else {
                    format!("Value {} is greater than maximum {}", value, maximum)
                }
            }
            ValidationErrorKind::NotMultipleOf { value, multiple_of } => {
                format!("Value {} is not a multiple of {}", value, multiple_of)
            }
            ValidationErrorKind::StringTooShort { length, min_length } => {
                format!("String length {} is less than minimum {}", length, min_length)
            }
            ValidationErrorKind::StringTooLong { length, max_length } => {
                format!("String length {} is greater than maximum {}", length, max_length)
            }
            ValidationErrorKind::PatternMismatch { value, pattern } => {
                format!("String '{}' does not match pattern '{}'", value, pattern)
            }
            ValidationErrorKind::InvalidFormat { value, format } => {
                format!("String '{}' is not in correct {} format", value, format)
            }
            ValidationErrorKind::ArrayItemsNotUnique { first, second } => {
                format!("Array items {} and {} are not unique", first, second)
            }
            ValidationErrorKind::TooFewItems { length, min_items } => {
                format!("Array length {} is less than minimum {}", length, min_items)
            }
            ValidationErrorKind::TooManyItems { length, max_items } => {
                format!("Array length {} is greater than maximum {}", length, max_items)
            }
            ValidationErrorKind::AdditionalItemsNotAllowed { length, allowed } => {
                format!(
                    "Array length {} is greater than {} and additional items are not allowed",
                    length, allowed
                )
            }
            ValidationErrorKind::InvalidItem { index } => {
                format!("Array item {} is not valid against schema", index)
            }
            ValidationErrorKind::MissingRequiredProperty { property } => {
                format!("Missing required property '{}'", property)
            }
            ValidationErrorKind::TooFewProperties {
                count,
                min_properties,
            } => {
                format!("Object has {} properties, less than minimum {}", count, min_properties)
            }
            ValidationErrorKind::TooManyProperties {
                count,
                max_properties,
            } => {
                format!(
                    "Object has {} properties, greater than maximum {}",
                    count, max_properties
                )
            }
            ValidationErrorKind::AdditionalPropertyNotAllowed { property } => {
                format!("Additional property '{}' is not allowed", property)
            }
            ValidationErrorKind::InvalidProperty { property } => {
                format!("Property '{}' is not valid against schema", property)
            }
            ValidationErrorKind::SchemaDependency { property } => {
                format!("Schema dependency of '{}' is not satisfied", property)
            }
            ValidationErrorKind::PropertyDependency { property, missing } => {
                format!("Property '{}' requires property '{}'", property, missing)
            }
            ValidationErrorKind::AllOf { index } => {
                format!("Data is not valid against allOf schema {}", index)
            }
            ValidationErrorKind::AnyOf => "Data is not valid against any anyOf schema".to_string(),
            ValidationErrorKind::OneOfNone => {
                "Data is not valid against any oneOf schema".to_string()
            }
            ValidationErrorKind::OneOfMultiple { matched } => {
                let matched: Vec<String> = matched.iter().map(|i| i.to_string()).collect();
                format!(
                    "Data is valid against more than one oneOf schema ({})",
                    matched.join(", ")
                )
            }
            ValidationErrorKind::Not => "Data should not be valid against the schema".to_string(),
        }
    }
}

/// One violated constraint, with the violations nested beneath it
#[derive(Debug, Clone, PartialEq, Error)]
pub struct ValidationError {
    /// The structured error kind
    pub kind: ValidationErrorKind,
    /// Instance path where the error occurred (e.g., ["address", "lines", 0])
    pub instance_path: InstancePath,
    /// Source location (line, column) when the data came with a source map
    pub location: Option<SourceLocation>,
    /// Nested failures (e.g. the errors of a failing property)
    pub children: Vec<ValidationError>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = self.kind.message();
        if let Some(loc) = &self.location {
            write!(
                f,
                "Validation error at {} ({}:{}): {}",
                self.instance_path, loc.line, loc.column, message
            )
        } else {
            write!(f, "Validation error at {}: {}", self.instance_path, message)
        }
    }
}

impl ValidationError {
    /// Create a new validation error with a structured kind
    pub fn new(kind: ValidationErrorKind, instance_path: InstancePath) -> Self {
        Self {
            kind,
            instance_path,
            location: None,
            children: Vec::new(),
        }
    }

    /// Get the human-readable message for this error
    pub fn message(&self) -> String {
        self.kind.message()
    }

    /// The schema keyword that produced this error
    pub fn keyword(&self) -> &'static str {
        self.kind.keyword()
    }

    /// Set the nested errors
    pub fn with_children(mut self, children: Vec<ValidationError>) -> Self {
        self.children = children;
        self
    }

    /// Set the source location
    pub fn with_location(mut self, location: Option<SourceLocation>) -> Self {
        self.location = location;
        self
    }

    /// Message of this error and all of its descendants, one per line,
    /// children indented two spaces per level.
    pub fn full_message(&self) -> String {
        let mut out = String::new();
        self.write_tree(&mut out, 0);
        out
    }

    fn write_tree(&self, out: &mut String, depth: usize) {
        if depth > 0 {
            out.push('\n');
        }
        out.push_str(&"  ".repeat(depth));
        out.push_str(&format!("{}: {}", self.instance_path, self.kind.message()));
        for child in &self.children {
            child.write_tree(out, depth + 1);
        }
    }

    /// Number of errors in this tree, this one included
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(ValidationError::count).sum::<usize>()
    }
}

/// Instance path (e.g., ["address", "lines", 0])
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstancePath {
    segments: Vec<PathSegment>,
}

impl InstancePath {
    /// Create a new empty instance path
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Push a key segment onto the path
    pub fn push_key(&mut self, key: impl Into<String>) {
        self.segments.push(PathSegment::Key(key.into()));
    }

    /// Push an index segment onto the path
    pub fn push_index(&mut self, index: usize) {
        self.segments.push(PathSegment::Index(index));
    }

    /// Pop the last segment from the path
    pub fn pop(&mut self) -> Option<PathSegment> {
        self.segments.pop()
    }

    /// Get the segments as a slice
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Check if the path is empty
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Get the length of the path
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// The path as an RFC 6901 JSON pointer ("" for the root)
    pub fn to_pointer(&self) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                PathSegment::Key(key) => format!("/{}", key.replace('~', "~0").replace('/', "~1")),
                PathSegment::Index(index) => format!("/{}", index),
            })
            .collect()
    }
}

impl fmt::Display for InstancePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            write!(f, "(root)")
        } else {
            for (i, segment) in self.segments.iter().enumerate() {
                if i > 0 && matches!(segment, PathSegment::Key(_)) {
                    write!(f, ".")?;
                }
                write!(f, "{}", segment)?;
            }
            Ok(())
        }
    }
}

/// A segment in an instance path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Object key
    Key(String),
    /// Array index
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{}", key),
            PathSegment::Index(index) => write!(f, "[{}]", index),
        }
    }
}

/// Source location for error reporting (both 1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}
