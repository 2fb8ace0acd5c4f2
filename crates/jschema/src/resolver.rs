//! Fetching externally referenced schema documents
//!
//! The reader never performs I/O itself. When a `$ref` points outside the
//! document being read, it asks a [`Resolver`] for the bytes of the target
//! document. [`PreloadedResolver`] serves documents from memory and can
//! delegate misses to another resolver.

use std::collections::HashMap;
use std::io::Read;
use thiserror::Error;
use url::Url;

/// Errors a resolver can report
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{message}")]
    Other { message: String },
}

impl ResolveError {
    pub fn other(message: impl Into<String>) -> Self {
        ResolveError::Other {
            message: message.into(),
        }
    }
}

/// Source of external schema documents
pub trait Resolver {
    /// Fetch the document at `uri` (absolute, without fragment).
    ///
    /// `Ok(None)` means the resolver has no data for `uri`.
    fn resolve(&self, uri: &Url) -> Result<Option<Vec<u8>>, ResolveError>;
}

impl<F> Resolver for F
where
    F: Fn(&Url) -> Result<Option<Vec<u8>>, ResolveError>,
{
    fn resolve(&self, uri: &Url) -> Result<Option<Vec<u8>>, ResolveError> {
        self(uri)
    }
}

/// In-memory table of documents, consulted before an optional fallback
#[derive(Default)]
pub struct PreloadedResolver {
    preloaded: HashMap<Url, Vec<u8>>,
    fallback: Option<Box<dyn Resolver>>,
}

impl PreloadedResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// A preloaded table that delegates misses to `fallback`
    pub fn with_fallback(fallback: Box<dyn Resolver>) -> Self {
        Self {
            preloaded: HashMap::new(),
            fallback: Some(fallback),
        }
    }

    /// Register `bytes` as the document at `uri`; any fragment is ignored
    pub fn add(&mut self, uri: Url, bytes: impl Into<Vec<u8>>) {
        self.preloaded.insert(without_fragment(uri), bytes.into());
    }

    pub fn add_str(&mut self, uri: Url, document: &str) {
        self.add(uri, document.as_bytes().to_vec());
    }

    /// Register the full contents of `reader` as the document at `uri`
    pub fn add_reader(&mut self, uri: Url, mut reader: impl Read) -> Result<(), ResolveError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        self.add(uri, bytes);
        Ok(())
    }

    /// URIs with preloaded documents
    pub fn preloaded_uris(&self) -> impl Iterator<Item = &Url> {
        self.preloaded.keys()
    }
}

impl Resolver for PreloadedResolver {
    fn resolve(&self, uri: &Url) -> Result<Option<Vec<u8>>, ResolveError> {
        let key = without_fragment(uri.clone());
        if let Some(bytes) = self.preloaded.get(&key) {
            tracing::trace!(uri = %key, "serving preloaded schema document");
            return Ok(Some(bytes.clone()));
        }
        match &self.fallback {
            Some(fallback) => fallback.resolve(&key),
            None => Ok(None),
        }
    }
}

fn without_fragment(mut uri: Url) -> Url {
    uri.set_fragment(None);
    uri
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_preloaded_lookup_ignores_fragment() {
        let mut resolver = PreloadedResolver::new();
        resolver.add_str(url("http://localhost:1234/integer.json#"), r#"{"type":"integer"}"#);

        let bytes = resolver
            .resolve(&url("http://localhost:1234/integer.json#/x"))
            .unwrap()
            .unwrap();
        assert_eq!(bytes, br#"{"type":"integer"}"#);
        assert_eq!(resolver.preloaded_uris().count(), 1);
    }

    #[test]
    fn test_missing_entry_without_fallback_is_no_data() {
        let resolver = PreloadedResolver::new();
        assert!(resolver.resolve(&url("http://x/y.json")).unwrap().is_none());
    }

    #[test]
    fn test_fallback_receives_misses() {
        let fallback = |uri: &Url| -> Result<Option<Vec<u8>>, ResolveError> {
            if uri.path() == "/remote.json" {
                Ok(Some(b"{}".to_vec()))
            } else {
                Err(ResolveError::other(format!("cannot fetch {}", uri)))
            }
        };
        let mut resolver = PreloadedResolver::with_fallback(Box::new(fallback));
        resolver.add_str(url("http://x/local.json"), "{\"type\":\"string\"}");

        assert_eq!(
            resolver.resolve(&url("http://x/local.json")).unwrap().unwrap(),
            b"{\"type\":\"string\"}"
        );
        assert_eq!(
            resolver.resolve(&url("http://x/remote.json")).unwrap().unwrap(),
            b"{}"
        );
        let err = resolver.resolve(&url("http://x/other.json")).unwrap_err();
        assert_eq!(err.to_string(), "cannot fetch http://x/other.json");
    }

    #[test]
    fn test_add_reader() {
        let mut resolver = PreloadedResolver::new();
        resolver
            .add_reader(url("http://x/a.json"), &b"{\"minimum\": 1}"[..])
            .unwrap();
        assert!(resolver.resolve(&url("http://x/a.json")).unwrap().is_some());
    }
}
