//! Reference resolution seam.
//!
//! The validator never fetches anything itself. `$ref` and `extends` URIs that
//! point outside the current document are handed to a [`SchemaResolver`]
//! injected at construction time. [`SchemaRegistry`] is the in-memory
//! implementation filled by the schema loader.

use std::collections::HashMap;
use std::sync::Arc;

use url::Url;

use crate::error::UnresolvableReference;
use crate::value::Value;

/// Turns a document URI (without fragment) into a schema document
#[cfg_attr(test, mockall::automock)]
pub trait SchemaResolver: Send + Sync {
    fn resolve(&self, uri: &str) -> Result<Arc<Value>, UnresolvableReference>;
}

/// Resolver used when none is configured; every lookup fails
#[derive(Debug, Default, Clone, Copy)]
pub struct NoResolver;

impl SchemaResolver for NoResolver {
    fn resolve(&self, uri: &str) -> Result<Arc<Value>, UnresolvableReference> {
        Err(UnresolvableReference::new(uri, "no schema resolver configured"))
    }
}

/// In-memory map of schema documents keyed by absolute URI
#[derive(Debug, Default, Clone)]
pub struct SchemaRegistry {
    documents: HashMap<String, Arc<Value>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document; a fragment on `uri` is ignored
    pub fn insert(&mut self, uri: &str, document: impl Into<Arc<Value>>) {
        self.documents
            .insert(strip_fragment(uri).to_string(), document.into());
    }

    pub fn with_document(mut self, uri: &str, document: impl Into<Arc<Value>>) -> Self {
        self.insert(uri, document);
        self
    }

    pub fn get(&self, uri: &str) -> Option<&Arc<Value>> {
        self.documents.get(strip_fragment(uri))
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.documents.contains_key(strip_fragment(uri))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn uris(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }
}

impl SchemaResolver for SchemaRegistry {
    fn resolve(&self, uri: &str) -> Result<Arc<Value>, UnresolvableReference> {
        self.get(uri)
            .cloned()
            .ok_or_else(|| UnresolvableReference::new(uri, "schema is not registered"))
    }
}

/// Drop the `#fragment` part of a URI
pub fn strip_fragment(uri: &str) -> &str {
    uri.split_once('#').map_or(uri, |(document, _)| document)
}

/// Resolve `reference` against `base` when the base is an absolute URI
pub fn join_uri(base: Option<&str>, reference: &str) -> String {
    if let Ok(absolute) = Url::parse(reference) {
        return absolute.to_string();
    }
    base.and_then(|base| Url::parse(base).ok())
        .and_then(|base| base.join(reference).ok())
        .map_or_else(|| reference.to_string(), |joined| joined.to_string())
}
