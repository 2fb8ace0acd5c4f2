//! The schema reading session
//!
//! A [`Reader`] turns one schema document into a [`Schema`] graph. It owns
//! every piece of working state for the read: the node arena, a memo from
//! (document, JSON pointer) to node so each schema object becomes exactly
//! one node, the set of `$ref` objects currently being resolved, the
//! documents fetched through the resolver, and a frame per document being
//! read with its schema and resolution-scope stacks.
//!
//! The memo entry for an object is written before its keywords are read,
//! so a `$ref` back to an enclosing schema yields the node that is still
//! being built. That is how cyclic graphs close.

use super::Schema;
use super::helpers::as_string;
use super::keywords::{self, KEYWORDS};
use super::pointer::{JsonPointer, split_fragment, walk};
use super::scope;
use super::types::{SchemaId, SchemaNode};
use crate::error::{SchemaError, SchemaResult};
use crate::resolver::Resolver;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use url::Url;

/// (document index, pointer string) naming one JSON object
type NodeKey = (usize, String);

/// A document taking part in the read
struct Document {
    root: Rc<Value>,
    /// URI the document was fetched from
    base: Option<String>,
    /// URIs (without fragment) this document is known by
    names: Vec<String>,
    /// Resolution scope URI to the node that declared it
    scopes: HashMap<String, SchemaId>,
    /// Resolution scope URI to the object declaring it, read or not
    declared: HashMap<String, JsonPointer>,
}

impl Document {
    fn new(root: Rc<Value>, uri: Option<String>) -> Self {
        let declared = scope::declared_scopes(&root, uri.as_deref());
        Self {
            root,
            base: uri.clone(),
            names: uri.into_iter().collect(),
            scopes: HashMap::new(),
            declared,
        }
    }
}

/// Traversal state for the document currently being read
struct Frame {
    document: usize,
    /// Reading started below the document root (an external `uri#/pointer`)
    from_fragment: bool,
    schema_stack: Vec<SchemaId>,
    scope_stack: Vec<String>,
}

impl Frame {
    fn new(document: usize) -> Self {
        Self {
            document,
            from_fragment: false,
            schema_stack: Vec::new(),
            scope_stack: Vec::new(),
        }
    }
}

pub(crate) struct Reader<'r> {
    nodes: Vec<SchemaNode>,
    resolver: Option<&'r dyn Resolver>,
    memo: HashMap<NodeKey, SchemaId>,
    resolving: HashSet<NodeKey>,
    documents: Vec<Document>,
    fetched: HashMap<String, usize>,
    frame: Frame,
}

impl<'r> Reader<'r> {
    pub(crate) fn new(resolver: Option<&'r dyn Resolver>) -> Self {
        Self {
            // slot 0 is SchemaId::UNCONSTRAINED
            nodes: vec![SchemaNode::new()],
            resolver,
            memo: HashMap::new(),
            resolving: HashSet::new(),
            documents: Vec::new(),
            fetched: HashMap::new(),
            frame: Frame::new(0),
        }
    }

    /// Read `document` as the root schema
    pub(crate) fn read(mut self, document: Value) -> SchemaResult<Schema> {
        let root = Rc::new(document);
        self.documents.push(Document::new(Rc::clone(&root), None));
        self.frame = Frame::new(0);
        let root_id = self.read_value(&root, &JsonPointer::root())?;
        tracing::trace!(nodes = self.nodes.len(), "schema read");
        Ok(Schema {
            nodes: self.nodes,
            root: root_id,
            document: root.as_object().cloned().unwrap_or_default(),
        })
    }

    pub(crate) fn node(&self, id: SchemaId) -> &SchemaNode {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: SchemaId) -> &mut SchemaNode {
        &mut self.nodes[id.0]
    }

    /// Read the schema object at `pointer` of the current document,
    /// following `$ref` and reusing nodes already created for it.
    pub(crate) fn read_value(
        &mut self,
        value: &Value,
        pointer: &JsonPointer,
    ) -> SchemaResult<SchemaId> {
        let Value::Object(object) = value else {
            return Err(SchemaError::structure(
                "a schema must be a JSON object",
                pointer,
            ));
        };
        let key = (self.frame.document, pointer.to_string());
        if let Some(id) = self.memo.get(&key) {
            return Ok(*id);
        }

        let Some(reference) = object.get("$ref") else {
            return self.load(object, pointer, key);
        };
        let reference = as_string("$ref", reference).map_err(|e| e.at(&pointer.child("$ref")))?;
        if !self.resolving.insert(key.clone()) {
            return Err(SchemaError::CircularRef {
                reference: reference.to_string(),
                path: pointer.clone(),
                location: None,
            });
        }
        let resolved = self.resolve(reference, object, pointer);
        self.resolving.remove(&key);
        let id = resolved?;
        self.memo.insert(key, id);
        Ok(id)
    }

    fn load(
        &mut self,
        object: &Map<String, Value>,
        pointer: &JsonPointer,
        key: NodeKey,
    ) -> SchemaResult<SchemaId> {
        let id = SchemaId(self.nodes.len());
        let mut node = SchemaNode::new();
        node.set_source(object.clone());
        self.nodes.push(node);
        self.memo.insert(key, id);

        self.frame.schema_stack.push(id);
        let scope_depth = self.frame.scope_stack.len();
        let result = self.load_keywords(id, object, pointer);
        self.frame.scope_stack.truncate(scope_depth);
        self.frame.schema_stack.pop();
        result.map(|()| id)
    }

    /// `id` first, then `definitions`, then the rest in document order
    fn load_keywords(
        &mut self,
        id: SchemaId,
        object: &Map<String, Value>,
        pointer: &JsonPointer,
    ) -> SchemaResult<()> {
        if let Some(value) = object.get("id") {
            self.enter_scope(id, value, &pointer.child("id"), pointer.is_root())?;
        }
        if let Some(value) = object.get("definitions") {
            keywords::definitions(self, id, value, &pointer.child("definitions"))?;
        }
        for (name, value) in object {
            if matches!(name.as_str(), "id" | "definitions") {
                continue;
            }
            match KEYWORDS.get(name.as_str()) {
                Some(handler) => handler(self, id, value, &pointer.child(name.as_str()))?,
                None => self.nodes[id.0].add_extension(name.as_str(), value.clone()),
            }
        }
        Ok(())
    }

    /// Process `id`: compute the new scope against the enclosing one and
    /// register it right away so later references can find this node.
    fn enter_scope(
        &mut self,
        id: SchemaId,
        value: &Value,
        pointer: &JsonPointer,
        document_root: bool,
    ) -> SchemaResult<()> {
        let raw = as_string("id", value).map_err(|e| e.at(pointer))?;
        self.nodes[id.0].set_id(raw).map_err(|e| e.at(pointer))?;

        let scope = scope::join(self.current_scope().as_deref(), raw);
        tracing::trace!(scope = %scope, at = %pointer, "registering resolution scope");

        let document = &mut self.documents[self.frame.document];
        if document_root {
            let name = scope::strip_fragment(&scope).to_string();
            if !document.names.contains(&name) {
                document.names.push(name);
            }
        }
        document.scopes.insert(scope.clone(), id);
        self.frame.scope_stack.push(scope);
        Ok(())
    }

    fn current_scope(&self) -> Option<String> {
        self.frame
            .scope_stack
            .last()
            .or_else(|| self.documents[self.frame.document].names.first())
            .cloned()
    }

    fn names_current_document(&self, uri: &str) -> bool {
        let base = scope::strip_fragment(uri);
        self.documents[self.frame.document]
            .names
            .iter()
            .any(|name| name == base)
    }

    /// Resolve the `$ref` found in `context` (the object at `pointer`)
    fn resolve(
        &mut self,
        reference: &str,
        context: &Map<String, Value>,
        pointer: &JsonPointer,
    ) -> SchemaResult<SchemaId> {
        tracing::debug!(reference, at = %pointer, "resolving reference");

        if reference.trim().is_empty() {
            return Err(SchemaError::unresolved(reference, "empty reference", pointer));
        }
        if reference == "#" {
            if self.frame.from_fragment {
                return self.read_fragment(reference, "", pointer);
            }
            return self
                .frame
                .schema_stack
                .first()
                .copied()
                .ok_or_else(|| SchemaError::CircularRef {
                    reference: reference.to_string(),
                    path: pointer.clone(),
                    location: None,
                });
        }

        let target = scope::join(self.current_scope().as_deref(), reference);
        if let Some(id) = self.documents[self.frame.document].scopes.get(&target) {
            return Ok(*id);
        }
        // declared later in document order and not read yet
        if let Some(declared) = self.documents[self.frame.document].declared.get(&target).cloned() {
            let root = Rc::clone(&self.documents[self.frame.document].root);
            if let Some(value) = declared.lookup(&root) {
                return self.read_in_place(value, &declared);
            }
        }

        match split_fragment(reference) {
            (host, Some(fragment)) => {
                if host.is_empty() || self.names_current_document(&target) {
                    self.read_fragment(reference, fragment, pointer)
                } else {
                    self.read_external(reference, &target, pointer)
                }
            }
            (_, None) => {
                if !scope::is_absolute(reference)
                    && let Some(member) = context.get(reference)
                {
                    return self.read_value(member, &pointer.child(reference));
                }
                if self.names_current_document(&target) {
                    return self.read_fragment(reference, "", pointer);
                }
                if scope::is_absolute(&target) {
                    return self.read_external(reference, &target, pointer);
                }
                Err(SchemaError::unresolved(
                    reference,
                    "no enclosing resolution scope makes it absolute",
                    pointer,
                ))
            }
        }
    }

    /// Walk `fragment` from the root of the current document
    fn read_fragment(
        &mut self,
        reference: &str,
        fragment: &str,
        pointer: &JsonPointer,
    ) -> SchemaResult<SchemaId> {
        let root = Rc::clone(&self.documents[self.frame.document].root);
        let (target, target_pointer) = walk(&root, fragment)
            .map_err(|reason| SchemaError::unresolved(reference, reason, pointer))?;
        if !target.is_object() {
            return Err(SchemaError::unresolved(
                reference,
                format!("{} is not a schema object", target_pointer),
                pointer,
            ));
        }
        self.read_in_place(target, &target_pointer)
    }

    /// Read the object at `pointer` of the current document under the
    /// resolution scopes of its own enclosing schemas, not those of the
    /// schema that referred to it.
    fn read_in_place(&mut self, value: &Value, pointer: &JsonPointer) -> SchemaResult<SchemaId> {
        let document = &self.documents[self.frame.document];
        let scopes = scope::lexical_scopes(&document.root, document.base.as_deref(), pointer);
        let outer = std::mem::replace(&mut self.frame.scope_stack, scopes);
        let result = self.read_value(value, pointer);
        self.frame.scope_stack = outer;
        result
    }

    /// Fetch the document named by `target` and read the schema it points at
    fn read_external(
        &mut self,
        reference: &str,
        target: &str,
        pointer: &JsonPointer,
    ) -> SchemaResult<SchemaId> {
        let Some(resolver) = self.resolver else {
            return Err(SchemaError::unresolved(
                reference,
                "no resolver is configured for external references",
                pointer,
            ));
        };
        let mut url = Url::parse(target).map_err(|e| {
            SchemaError::unresolved(
                reference,
                format!("'{}' is not an absolute URI: {}", target, e),
                pointer,
            )
        })?;
        let fragment = url.fragment().map(str::to_string);
        url.set_fragment(None);
        let uri = url.to_string();

        let document = match self.fetched.get(&uri) {
            Some(document) => *document,
            None => {
                tracing::debug!(uri = %uri, "fetching external schema document");
                let bytes = resolver
                    .resolve(&url)
                    .map_err(|source| SchemaError::Resolve {
                        uri: uri.clone(),
                        source,
                    })?
                    .ok_or_else(|| {
                        SchemaError::unresolved(
                            reference,
                            format!("the resolver has no document for '{}'", uri),
                            pointer,
                        )
                    })?;
                let value: Value =
                    serde_json::from_slice(&bytes).map_err(|e| SchemaError::External {
                        uri: uri.clone(),
                        source: Box::new(e.into()),
                    })?;
                self.documents
                    .push(Document::new(Rc::new(value), Some(uri.clone())));
                let index = self.documents.len() - 1;
                self.fetched.insert(uri.clone(), index);
                index
            }
        };

        let outer = std::mem::replace(&mut self.frame, Frame::new(document));
        let result = match fragment.as_deref() {
            Some(fragment) if !fragment.is_empty() => {
                self.frame.from_fragment = true;
                self.read_fragment(reference, fragment, &JsonPointer::root())
            }
            _ => {
                let root = Rc::clone(&self.documents[document].root);
                self.read_value(&root, &JsonPointer::root())
            }
        };
        self.frame = outer;
        result.map_err(|source| SchemaError::External {
            uri,
            source: Box::new(source),
        })
    }
}
