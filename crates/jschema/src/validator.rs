// JSON validation engine

use crate::decimal;
use crate::equality::json_equal;
use crate::error::{
    InstancePath, PathSegment, SourceLocation, ValidationError, ValidationErrorKind,
    ValidationResult,
};
use crate::format;
use crate::schema::{Additional, Items, JsonType, Schema, SchemaId, SchemaNode};
use crate::source_map::SourceMap;
use serde_json::{Map, Number, Value};
use unicode_segmentation::UnicodeSegmentation;

/// Receiver of validation errors
pub trait ErrorSink {
    fn append(&mut self, error: ValidationError);
}

impl ErrorSink for Vec<ValidationError> {
    fn append(&mut self, error: ValidationError) {
        self.push(error);
    }
}

/// Adapts a closure into an [`ErrorSink`]
pub struct FnSink<F>(pub F);

impl<F: FnMut(ValidationError)> ErrorSink for FnSink<F> {
    fn append(&mut self, error: ValidationError) {
        (self.0)(error)
    }
}

/// Validation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Check `format` values; when false, `format` is only an annotation
    pub assert_formats: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            assert_formats: true,
        }
    }
}

/// Validates JSON values against a compiled schema
#[derive(Clone, Copy)]
pub struct Validator<'a> {
    schema: &'a Schema,
    options: ValidationOptions,
    source_map: Option<&'a SourceMap>,
}

impl<'a> Validator<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self {
            schema,
            options: ValidationOptions::default(),
            source_map: None,
        }
    }

    pub fn with_options(mut self, options: ValidationOptions) -> Self {
        self.options = options;
        self
    }

    /// Attach line/column information from the data's source text
    pub fn with_source_map(mut self, source_map: &'a SourceMap) -> Self {
        self.source_map = Some(source_map);
        self
    }

    /// Report every violation in `data` to `sink`
    pub fn validate_into(&self, data: &Value, sink: &mut dyn ErrorSink) {
        let mut context = ValidationContext::new(self);
        context.validate(data, self.schema.root(), sink);
    }

    pub fn is_valid(&self, data: &Value) -> bool {
        self.errors(data).is_empty()
    }

    /// All top-level violations, each with its nested failures
    pub fn errors(&self, data: &Value) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        self.validate_into(data, &mut errors);
        tracing::trace!(errors = errors.len(), "validation finished");
        errors
    }

    /// One formatted message per top-level violation
    pub fn messages(&self, data: &Value) -> Vec<String> {
        self.errors(data)
            .iter()
            .map(ValidationError::full_message)
            .collect()
    }

    /// Collect every violation, then fail with the first one
    pub fn validate(&self, data: &Value) -> ValidationResult<()> {
        match self.errors(data).into_iter().next() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// Validation context tracks state during validation
struct ValidationContext<'a> {
    schema: &'a Schema,
    options: ValidationOptions,
    source_map: Option<&'a SourceMap>,
    /// Current instance path (e.g., ["address", "lines", 0])
    instance_path: InstancePath,
    /// (schema node, data address) pairs being validated
    active: Vec<(SchemaId, usize)>,
}

impl<'a> ValidationContext<'a> {
    fn new(validator: &Validator<'a>) -> Self {
        Self {
            schema: validator.schema,
            options: validator.options,
            source_map: validator.source_map,
            instance_path: InstancePath::new(),
            active: Vec::new(),
        }
    }

    /// Create an error at the current instance path
    fn error(&self, kind: ValidationErrorKind) -> ValidationError {
        ValidationError::new(kind, self.instance_path.clone()).with_location(self.locate())
    }

    fn locate(&self) -> Option<SourceLocation> {
        self.source_map?.locate(&self.instance_path.to_pointer())
    }

    /// Execute a function with a new instance path segment
    fn with_instance_path<F, R>(&mut self, segment: PathSegment, f: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        match segment {
            PathSegment::Key(key) => self.instance_path.push_key(key),
            PathSegment::Index(index) => self.instance_path.push_index(index),
        }
        let result = f(self);
        self.instance_path.pop();
        result
    }

    /// Errors of `data` against `id`, collected instead of reported
    fn collect(&mut self, data: &Value, id: SchemaId) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        self.validate(data, id, &mut errors);
        errors
    }

    fn validate(&mut self, data: &Value, id: SchemaId, sink: &mut dyn ErrorSink) {
        if id == SchemaId::UNCONSTRAINED {
            return;
        }
        let key = (id, data as *const Value as usize);
        if self.active.contains(&key) {
            return;
        }
        self.active.push(key);
        let schema = self.schema;
        self.validate_node(data, &schema[id], sink);
        self.active.pop();
    }

    fn validate_node(&mut self, data: &Value, node: &'a SchemaNode, sink: &mut dyn ErrorSink) {
        let types = node.types();
        let kind = JsonType::of(data);

        // Rejected null: nothing else applies
        if kind == JsonType::Null && !types.accepts(JsonType::Null) {
            sink.append(self.error(ValidationErrorKind::TypeMismatch {
                expected: types.to_string(),
                got: kind.to_string(),
            }));
            return;
        }

        if !node.enum_values().is_empty()
            && !node.enum_values().iter().any(|v| json_equal(v, data))
        {
            sink.append(self.error(ValidationErrorKind::InvalidEnumValue {
                value: data.to_string(),
            }));
        }

        if !types.accepts(kind) {
            sink.append(self.error(ValidationErrorKind::TypeMismatch {
                expected: types.to_string(),
                got: kind.to_string(),
            }));
        }

        match data {
            Value::Number(n) => self.validate_number(n, node, sink),
            Value::String(s) => self.validate_string(s, node, sink),
            Value::Array(items) => self.validate_array(items, node, sink),
            Value::Object(members) => self.validate_object(data, members, node, sink),
            Value::Bool(_) | Value::Null => {}
        }

        self.validate_combinators(data, node, sink);
    }

    fn validate_number(&mut self, n: &Number, node: &SchemaNode, sink: &mut dyn ErrorSink) {
        let Some(value) = n.as_f64() else {
            return;
        };

        if let Some(minimum) = node.minimum() {
            let exclusive = node.exclusive_minimum();
            if value < minimum || (exclusive && value == minimum) {
                sink.append(self.error(ValidationErrorKind::BelowMinimum {
                    value,
                    minimum,
                    exclusive,
                }));
            }
        }

        if let Some(maximum) = node.maximum() {
            let exclusive = node.exclusive_maximum();
            if value > maximum || (exclusive && value == maximum) {
                sink.append(self.error(ValidationErrorKind::AboveMaximum {
                    value,
                    maximum,
                    exclusive,
                }));
            }
        }

        if let Some(multiple_of) = node.multiple_of()
            && !decimal::is_multiple_of(n, multiple_of)
        {
            sink.append(self.error(ValidationErrorKind::NotMultipleOf { value, multiple_of }));
        }
    }

    fn validate_string(&mut self, value: &str, node: &SchemaNode, sink: &mut dyn ErrorSink) {
        if node.min_length().is_some() || node.max_length().is_some() {
            let length = value.graphemes(true).count();

            if let Some(min_length) = node.min_length()
                && length < min_length
            {
                sink.append(self.error(ValidationErrorKind::StringTooShort { length, min_length }));
            }

            if let Some(max_length) = node.max_length()
                && length > max_length
            {
                sink.append(self.error(ValidationErrorKind::StringTooLong { length, max_length }));
            }
        }

        if let Some(pattern) = node.pattern()
            && !pattern.is_match(value)
        {
            sink.append(self.error(ValidationErrorKind::PatternMismatch {
                value: value.to_string(),
                pattern: pattern.as_str().to_string(),
            }));
        }

        if self.options.assert_formats
            && let Some(name) = node.format()
            && format::check(name, value) == Some(false)
        {
            sink.append(self.error(ValidationErrorKind::InvalidFormat {
                value: value.to_string(),
                format: name.to_string(),
            }));
        }
    }

    fn validate_array(&mut self, items: &[Value], node: &SchemaNode, sink: &mut dyn ErrorSink) {
        if node.unique_items() {
            'scan: for (second, item) in items.iter().enumerate() {
                for (first, earlier) in items[..second].iter().enumerate() {
                    if json_equal(earlier, item) {
                        sink.append(
                            self.error(ValidationErrorKind::ArrayItemsNotUnique { first, second }),
                        );
                        break 'scan;
                    }
                }
            }
        }

        let length = items.len();
        if let Some(min_items) = node.min_items()
            && length < min_items
        {
            sink.append(self.error(ValidationErrorKind::TooFewItems { length, min_items }));
        }
        if let Some(max_items) = node.max_items()
            && length > max_items
        {
            sink.append(self.error(ValidationErrorKind::TooManyItems { length, max_items }));
        }

        match node.items() {
            Items::Single(schema) => {
                for (index, item) in items.iter().enumerate() {
                    self.validate_item(index, item, *schema, sink);
                }
            }
            Items::List(schemas) => {
                if length > schemas.len() && node.additional_items() == Additional::Allowed(false) {
                    sink.append(self.error(ValidationErrorKind::AdditionalItemsNotAllowed {
                        length,
                        allowed: schemas.len(),
                    }));
                }
                for (index, item) in items.iter().enumerate() {
                    let schema = match (schemas.get(index), node.additional_items()) {
                        (Some(schema), _) => *schema,
                        (None, Additional::Schema(schema)) => schema,
                        (None, Additional::Allowed(_)) => break,
                    };
                    self.validate_item(index, item, schema, sink);
                }
            }
        }
    }

    fn validate_item(
        &mut self,
        index: usize,
        item: &Value,
        schema: SchemaId,
        sink: &mut dyn ErrorSink,
    ) {
        let children =
            self.with_instance_path(PathSegment::Index(index), |ctx| ctx.collect(item, schema));
        if !children.is_empty() {
            sink.append(
                self.error(ValidationErrorKind::InvalidItem { index })
                    .with_children(children),
            );
        }
    }

    fn validate_object(
        &mut self,
        data: &Value,
        members: &Map<String, Value>,
        node: &SchemaNode,
        sink: &mut dyn ErrorSink,
    ) {
        for property in node.required() {
            if !members.contains_key(property) {
                sink.append(self.error(ValidationErrorKind::MissingRequiredProperty {
                    property: property.clone(),
                }));
            }
        }

        let count = members.len();
        if let Some(min_properties) = node.min_properties()
            && count < min_properties
        {
            sink.append(self.error(ValidationErrorKind::TooFewProperties {
                count,
                min_properties,
            }));
        }
        if let Some(max_properties) = node.max_properties()
            && count > max_properties
        {
            sink.append(self.error(ValidationErrorKind::TooManyProperties {
                count,
                max_properties,
            }));
        }

        for (name, value) in members {
            let mut schemas: Vec<SchemaId> = Vec::new();
            if let Some(schema) = node.properties().get(name) {
                schemas.push(*schema);
            }
            schemas.extend(
                node.pattern_properties()
                    .iter()
                    .filter(|entry| entry.pattern.is_match(name))
                    .map(|entry| entry.schema),
            );
            if schemas.is_empty() {
                match node.additional_properties() {
                    Additional::Allowed(true) => {}
                    Additional::Allowed(false) => {
                        sink.append(self.error(ValidationErrorKind::AdditionalPropertyNotAllowed {
                            property: name.clone(),
                        }));
                    }
                    Additional::Schema(schema) => schemas.push(schema),
                }
            }

            for schema in schemas {
                let children = self.with_instance_path(PathSegment::Key(name.clone()), |ctx| {
                    ctx.collect(value, schema)
                });
                if !children.is_empty() {
                    sink.append(
                        self.error(ValidationErrorKind::InvalidProperty {
                            property: name.clone(),
                        })
                        .with_children(children),
                    );
                }
            }
        }

        for (property, schema) in node.schema_dependencies() {
            if members.contains_key(property) {
                let children = self.collect(data, *schema);
                if !children.is_empty() {
                    sink.append(
                        self.error(ValidationErrorKind::SchemaDependency {
                            property: property.clone(),
                        })
                        .with_children(children),
                    );
                }
            }
        }

        for (property, co_required) in node.property_dependencies() {
            if !members.contains_key(property) {
                continue;
            }
            for missing in co_required {
                if !members.contains_key(missing) {
                    sink.append(self.error(ValidationErrorKind::PropertyDependency {
                        property: property.clone(),
                        missing: missing.clone(),
                    }));
                }
            }
        }
    }

    fn validate_combinators(&mut self, data: &Value, node: &SchemaNode, sink: &mut dyn ErrorSink) {
        for (index, schema) in node.all_of().iter().enumerate() {
            let children = self.collect(data, *schema);
            if !children.is_empty() {
                sink.append(
                    self.error(ValidationErrorKind::AllOf { index })
                        .with_children(children),
                );
            }
        }

        if !node.any_of().is_empty() {
            let mut failures = Vec::new();
            let mut matched = false;
            for schema in node.any_of() {
                let errors = self.collect(data, *schema);
                if errors.is_empty() {
                    matched = true;
                    break;
                }
                failures.extend(errors);
            }
            if !matched {
                sink.append(self.error(ValidationErrorKind::AnyOf).with_children(failures));
            }
        }

        if !node.one_of().is_empty() {
            let mut failures = Vec::new();
            let mut matched = Vec::new();
            for (index, schema) in node.one_of().iter().enumerate() {
                let errors = self.collect(data, *schema);
                if errors.is_empty() {
                    matched.push(index);
                } else {
                    failures.extend(errors);
                }
            }
            match matched.len() {
                0 => sink.append(
                    self.error(ValidationErrorKind::OneOfNone)
                        .with_children(failures),
                ),
                1 => {}
                _ => sink.append(self.error(ValidationErrorKind::OneOfMultiple { matched })),
            }
        }

        if let Some(schema) = node.not()
            && self.collect(data, schema).is_empty()
        {
            sink.append(self.error(ValidationErrorKind::Not));
        }
    }
}
