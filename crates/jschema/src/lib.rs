// Draft-4 JSON Schema for Rust
//
// This crate reads JSON Schema documents into a linked schema graph
// (resolving `$ref` through JSON pointers, `id` scopes and external
// documents) and validates JSON values against it.

pub mod decimal;
pub mod equality;
pub mod error;
pub mod format;
pub mod resolver;
pub mod schema;
pub mod source_map;
pub mod validator;

pub use error::{
    InstancePath, PathSegment, SchemaError, SchemaResult, SourceLocation, ValidationError,
    ValidationErrorKind, ValidationResult,
};
pub use resolver::{PreloadedResolver, ResolveError, Resolver};
pub use schema::{JsonPointer, JsonType, Schema, SchemaId, SchemaNode, SchemaReader};
pub use source_map::SourceMap;
pub use validator::{ErrorSink, FnSink, ValidationOptions, Validator};

use serde_json::Value;

/// Whether `data` satisfies `schema`
pub fn is_valid(data: &Value, schema: &Schema) -> bool {
    Validator::new(schema).is_valid(data)
}

/// Validate `data`, failing with the first violation found
pub fn validate(data: &Value, schema: &Schema) -> ValidationResult<()> {
    Validator::new(schema).validate(data)
}

/// Every top-level violation of `schema` by `data`
pub fn validation_errors(data: &Value, schema: &Schema) -> Vec<ValidationError> {
    Validator::new(schema).errors(data)
}

/// Formatted messages, one per top-level violation
pub fn validation_messages(data: &Value, schema: &Schema) -> Vec<String> {
    Validator::new(schema).messages(data)
}

/// Report every violation to `sink` instead of collecting them
pub fn validate_with(data: &Value, schema: &Schema, sink: &mut dyn ErrorSink) {
    Validator::new(schema).validate_into(data, sink)
}
