//! JSON pointers into schema documents
//!
//! A [`JsonPointer`] names a value inside a schema document. The reader uses
//! it for error reporting and as the key of its node memo, and resolves
//! `$ref` fragments by walking a pointer from a document root.

use serde_json::Value;
use std::fmt;

/// Owned, unescaped path from a document root to one of its values
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct JsonPointer {
    segments: Vec<String>,
}

impl JsonPointer {
    /// The pointer to the document root
    pub fn root() -> Self {
        Self::default()
    }

    /// A new pointer one member below this one
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    /// A new pointer one array element below this one
    pub fn index(&self, index: usize) -> Self {
        self.child(index.to_string())
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The pointer one level up, or `None` at the root
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.segments.split_last()?;
        Some(Self {
            segments: rest.to_vec(),
        })
    }

    /// Look up the value this pointer names inside `root`
    pub fn lookup<'v>(&self, root: &'v Value) -> Option<&'v Value> {
        self.segments
            .iter()
            .try_fold(root, |value, segment| match value {
                Value::Object(map) => map.get(segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            })
    }
}

impl fmt::Display for JsonPointer {
    /// Fragment form: `#` for the root, `#/properties/a~1b` below it
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#")?;
        for segment in &self.segments {
            write!(f, "/{}", escape(segment))?;
        }
        Ok(())
    }
}

fn escape(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Decode one pointer segment: `~1` to `/`, `~0` to `~`, then `%25` to `%`
pub(crate) fn unescape(segment: &str) -> String {
    segment
        .replace("~1", "/")
        .replace("~0", "~")
        .replace("%25", "%")
}

/// Split a reference at its first `#` into the URI part and the fragment
pub(crate) fn split_fragment(reference: &str) -> (&str, Option<&str>) {
    match reference.split_once('#') {
        Some((uri, fragment)) => (uri, Some(fragment)),
        None => (reference, None),
    }
}

/// Walk a fragment pointer (e.g. `/definitions/a`) from `root`.
///
/// Empty segments are skipped. Object segments are key lookups; array
/// segments must be in-range indices. Returns the target value and its
/// canonical pointer, or a message describing the first failing step.
pub(crate) fn walk<'v>(
    root: &'v Value,
    fragment: &str,
) -> Result<(&'v Value, JsonPointer), String> {
    let mut current = root;
    let mut pointer = JsonPointer::root();
    for raw in fragment.split('/').filter(|s| !s.is_empty()) {
        let segment = unescape(raw);
        current = match current {
            Value::Object(map) => map
                .get(&segment)
                .ok_or_else(|| format!("no member '{}' at {}", segment, pointer))?,
            Value::Array(items) => {
                let index = segment
                    .parse::<usize>()
                    .map_err(|_| format!("'{}' is not an array index at {}", segment, pointer))?;
                items
                    .get(index)
                    .ok_or_else(|| format!("index {} is out of range at {}", index, pointer))?
            }
            _ => return Err(format!("cannot descend into a scalar at {}", pointer)),
        };
        pointer = pointer.child(segment);
    }
    Ok((current, pointer))
}
