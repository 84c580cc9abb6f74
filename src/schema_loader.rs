//! Root schema loading.
//!
//! A root schema is read from disk or downloaded, decoded, and then walked for
//! `$ref`/`extends` URIs that leave the document. Every such document is
//! fetched in turn until the closure is complete, so validation itself never
//! touches the network.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};
use url::Url;

use crate::cache::SchemaCache;
use crate::error::{Error, Result};
use crate::http_client::AsyncHttpClient;
use crate::resolver::{SchemaRegistry, join_uri, strip_fragment};
use crate::validator::{ValidationOptions, Validator};
use crate::value::Value;

/// Where a schema document comes from
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaSource {
    Local(PathBuf),
    Remote(String),
}

impl SchemaSource {
    /// Classify a command-line location: `http(s)://` and `file://` URLs or a path
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            return SchemaSource::Remote(location.to_string());
        }
        if let Ok(url) = Url::parse(location)
            && url.scheme() == "file"
            && let Ok(path) = url.to_file_path()
        {
            return SchemaSource::Local(path);
        }
        SchemaSource::Local(PathBuf::from(location))
    }

    /// Absolute URI used to key the document and join relative references
    pub fn uri(&self) -> Result<String> {
        match self {
            SchemaSource::Remote(url) => Ok(strip_fragment(url).to_string()),
            SchemaSource::Local(path) => {
                let absolute = if path.is_absolute() {
                    path.clone()
                } else {
                    std::env::current_dir()?.join(path)
                };
                Url::from_file_path(&absolute)
                    .map(|url| url.to_string())
                    .map_err(|_| Error::SchemaNotFound {
                        uri: path.display().to_string(),
                    })
            }
        }
    }
}

/// A root schema together with every document it references
#[derive(Debug, Clone)]
pub struct LoadedSchema {
    pub root: Arc<Value>,
    /// Base URI of the root: its `id` when present, otherwise its location
    pub uri: String,
    pub registry: SchemaRegistry,
}

impl LoadedSchema {
    /// Validator resolving against this schema's registry
    pub fn validator(&self, options: ValidationOptions) -> Validator {
        Validator::new(options)
            .with_resolver(Arc::new(self.registry.clone()))
            .with_base_uri(self.uri.clone())
    }
}

/// Loads schema documents from disk or HTTP through the two-tier cache
pub struct SchemaLoader {
    cache: Arc<SchemaCache>,
    http_client: AsyncHttpClient,
}

impl SchemaLoader {
    pub fn new(cache: Arc<SchemaCache>, http_client: AsyncHttpClient) -> Self {
        Self { cache, http_client }
    }

    /// Load the root schema at `location` and everything it references
    pub async fn load(&self, location: &str) -> Result<LoadedSchema> {
        let location_uri = SchemaSource::parse(location).uri()?;
        let root = self.load_document(&location_uri).await?;

        if !root.is_object() {
            return Err(Error::SchemaParsing {
                source_name: location.to_string(),
                details: "a schema must be a JSON object".to_string(),
            });
        }

        let base = match root.get("id").and_then(Value::as_str) {
            Some(id) => strip_fragment(&join_uri(Some(&location_uri), id)).to_string(),
            None => location_uri.clone(),
        };

        let mut registry = SchemaRegistry::new();
        registry.insert(&location_uri, root.clone());
        registry.insert(&base, root.clone());

        let mut seen: HashSet<String> = registry.uris().map(str::to_string).collect();
        let mut pending = external_references(&root, &base);

        while let Some(uri) = pending.pop() {
            if !seen.insert(uri.clone()) {
                continue;
            }
            let document = self.load_document(&uri).await?;
            pending.extend(external_references(&document, &uri));
            registry.insert(&uri, document);
        }

        info!(schema = %base, documents = registry.len(), "schema loaded");
        Ok(LoadedSchema {
            root,
            uri: base,
            registry,
        })
    }

    /// Fetch and decode one document, once per process
    pub async fn load_document(&self, uri: &str) -> Result<Arc<Value>> {
        self.cache
            .parsed()
            .get_or_load(uri.to_string(), || async move {
                let bytes = self.fetch(uri).await?;
                decode(&bytes, uri).map(Arc::new)
            })
            .await
    }

    async fn fetch(&self, uri: &str) -> Result<Vec<u8>> {
        let url = Url::parse(uri).map_err(|_| Error::SchemaNotFound {
            uri: uri.to_string(),
        })?;

        match url.scheme() {
            "file" => {
                let path = url.to_file_path().map_err(|_| Error::SchemaNotFound {
                    uri: uri.to_string(),
                })?;
                read_local(&path, uri).await
            }
            "http" | "https" => self.fetch_remote(uri).await,
            _ => Err(Error::SchemaNotFound {
                uri: uri.to_string(),
            }),
        }
    }

    async fn fetch_remote(&self, url: &str) -> Result<Vec<u8>> {
        if let Some(cached) = self.cache.get(url).await? {
            debug!(url, "schema served from cache");
            return Ok(cached.data.as_ref().clone());
        }

        let data = self.http_client.download_schema(url).await?;
        // Undecodable downloads are not worth caching
        decode(&data, url)?;
        self.cache.set(url, data.clone(), None).await?;
        Ok(data)
    }

    pub fn cache(&self) -> &Arc<SchemaCache> {
        &self.cache
    }
}

async fn read_local(path: &Path, uri: &str) -> Result<Vec<u8>> {
    debug!(path = %path.display(), "reading local schema");
    tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::SchemaNotFound {
            uri: uri.to_string(),
        },
        _ => Error::Io(e),
    })
}

fn decode(bytes: &[u8], source_name: &str) -> Result<Value> {
    serde_json::from_slice(bytes).map_err(|e| Error::SchemaParsing {
        source_name: source_name.to_string(),
        details: e.to_string(),
    })
}

/// Document URIs named by string `$ref`/`extends` values that leave `document`
pub fn external_references(document: &Value, base: &str) -> Vec<String> {
    let mut found = Vec::new();
    collect_references(document, base, &mut found);
    found.sort();
    found.dedup();
    found
}

fn collect_references(node: &Value, base: &str, found: &mut Vec<String>) {
    match node {
        Value::Object(map) => {
            for (key, child) in map {
                match (key.as_str(), child) {
                    ("$ref" | "extends", Value::String(reference)) => {
                        push_reference(reference, base, found);
                    }
                    ("extends", Value::Array(parents)) => {
                        for parent in parents {
                            match parent {
                                Value::String(reference) => push_reference(reference, base, found),
                                schema => collect_references(schema, base, found),
                            }
                        }
                    }
                    _ => collect_references(child, base, found),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_references(item, base, found);
            }
        }
        _ => {}
    }
}

fn push_reference(reference: &str, base: &str, found: &mut Vec<String>) {
    let location = strip_fragment(reference);
    if location.is_empty() {
        return;
    }
    let uri = join_uri(Some(base), location);
    if uri != base {
        found.push(uri);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;
    use crate::http_client::HttpClientConfig;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_loader() -> (SchemaLoader, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config = CacheConfig {
            directory: temp_dir.path().join("cache"),
            ttl_hours: 1,
            max_size_mb: 10,
            max_memory_entries: 50,
            memory_ttl_seconds: 60,
        };
        let cache = Arc::new(SchemaCache::new(config));
        let http_client = AsyncHttpClient::new(HttpClientConfig::default()).unwrap();
        (SchemaLoader::new(cache, http_client), temp_dir)
    }

    fn write_schema(dir: &Path, name: &str, schema: serde_json::Value) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, serde_json::to_vec_pretty(&schema).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_schema_source_parsing() {
        assert_eq!(
            SchemaSource::parse("https://example.com/schema.json"),
            SchemaSource::Remote("https://example.com/schema.json".to_string())
        );
        assert_eq!(
            SchemaSource::parse("schemas/person.json"),
            SchemaSource::Local(PathBuf::from("schemas/person.json"))
        );
        assert_eq!(
            SchemaSource::parse("file:///tmp/person.json"),
            SchemaSource::Local(PathBuf::from("/tmp/person.json"))
        );
    }

    #[test]
    fn test_external_references_skip_local_pointers() {
        let schema = Value::from(json!({
            "properties": {
                "a": {"$ref": "#/definitions/a"},
                "b": {"$ref": "other.json#/definitions/b"},
                "c": {"extends": ["base.json", {"$ref": "other.json"}]},
                "d": {"$ref": "http://example.com/schemas/root.json#/x"}
            }
        }));

        let references = external_references(&schema, "http://example.com/schemas/root.json");
        assert_eq!(
            references,
            vec![
                "http://example.com/schemas/base.json".to_string(),
                "http://example.com/schemas/other.json".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_load_local_schema_with_relative_references() {
        let (loader, temp_dir) = create_loader();
        write_schema(
            temp_dir.path(),
            "address.json",
            json!({"type": "object", "properties": {"zip": {"$ref": "zip.json"}}}),
        );
        write_schema(temp_dir.path(), "zip.json", json!({"type": "string", "pattern": "^[0-9]{5}$"}));
        let root = write_schema(
            temp_dir.path(),
            "person.json",
            json!({"properties": {"home": {"$ref": "address.json"}}}),
        );

        let loaded = loader.load(root.to_str().unwrap()).await.unwrap();
        assert!(loaded.uri.starts_with("file://"));
        assert!(loaded.registry.uris().any(|uri| uri.ends_with("/address.json")));
        assert!(loaded.registry.uris().any(|uri| uri.ends_with("/zip.json")));

        let validator = loaded.validator(ValidationOptions::default());
        let errors = validator
            .validate_json(&json!({"home": {"zip": "1234"}}), &loaded.root.to_json())
            .unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "home.zip");
    }

    #[tokio::test]
    async fn test_reference_cycles_are_loaded_once() {
        let (loader, temp_dir) = create_loader();
        write_schema(temp_dir.path(), "a.json", json!({"properties": {"b": {"$ref": "b.json"}}}));
        write_schema(temp_dir.path(), "b.json", json!({"properties": {"a": {"$ref": "a.json"}}}));

        let loaded = loader
            .load(temp_dir.path().join("a.json").to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(loaded.registry.len(), 2);
    }

    #[tokio::test]
    async fn test_root_id_becomes_base_uri() {
        let (loader, temp_dir) = create_loader();
        let root = write_schema(
            temp_dir.path(),
            "root.json",
            json!({"id": "urn:example:root", "type": "object"}),
        );

        let loaded = loader.load(root.to_str().unwrap()).await.unwrap();
        assert_eq!(loaded.uri, "urn:example:root");
        assert!(loaded.registry.contains("urn:example:root"));
    }

    #[tokio::test]
    async fn test_missing_schema_is_reported() {
        let (loader, temp_dir) = create_loader();
        let missing = temp_dir.path().join("missing.json");

        let result = loader.load(missing.to_str().unwrap()).await;
        assert!(matches!(result, Err(Error::SchemaNotFound { .. })));
    }

    #[tokio::test]
    async fn test_missing_referenced_schema_is_reported() {
        let (loader, temp_dir) = create_loader();
        let root = write_schema(temp_dir.path(), "root.json", json!({"$ref": "gone.json"}));

        let result = loader.load(root.to_str().unwrap()).await;
        match result {
            Err(Error::SchemaNotFound { uri }) => assert!(uri.ends_with("/gone.json")),
            other => panic!("expected SchemaNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_schema_is_a_parsing_error() {
        let (loader, temp_dir) = create_loader();
        let path = temp_dir.path().join("broken.json");
        std::fs::write(&path, "{\"type\": ").unwrap();

        let result = loader.load(path.to_str().unwrap()).await;
        assert!(matches!(result, Err(Error::SchemaParsing { .. })));
    }

    #[tokio::test]
    async fn test_non_object_root_is_rejected() {
        let (loader, temp_dir) = create_loader();
        let root = write_schema(temp_dir.path(), "list.json", json!([1, 2]));

        let result = loader.load(root.to_str().unwrap()).await;
        match result {
            Err(Error::SchemaParsing { details, .. }) => assert!(details.contains("JSON object")),
            other => panic!("expected SchemaParsing, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_documents_are_decoded_once() {
        let (loader, temp_dir) = create_loader();
        let root = write_schema(temp_dir.path(), "root.json", json!({"type": "string"}));

        loader.load(root.to_str().unwrap()).await.unwrap();
        std::fs::write(&root, "not json").unwrap();

        // Served from the parsed-document cache; the file is not read again
        let loaded = loader.load(root.to_str().unwrap()).await.unwrap();
        assert_eq!(loaded.root.get("type"), Some(&Value::from("string")));
    }
}
