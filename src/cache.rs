//! Two-tier schema cache.
//!
//! Raw schema bytes live in a `moka` memory tier backed by a `cacache` disk
//! tier with JSON metadata sidecars carrying the expiry time. Decoded schema
//! documents are kept separately in [`ParsedSchemaCache`], so each remote
//! document is decoded once per process however many files reference it.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, trace};

pub use crate::config::CacheConfig;
use crate::error::{Error, Result};
use crate::value::Value;

/// Decoded schema documents keyed by absolute URI
pub struct ParsedSchemaCache {
    cache: Cache<String, Arc<Value>>,
}

impl ParsedSchemaCache {
    pub fn new(max_capacity: u64) -> Self {
        Self {
            cache: Cache::builder().max_capacity(max_capacity).build(),
        }
    }

    /// Return the cached document, or run `loader` and keep what it produces.
    ///
    /// Failed loads are not cached.
    pub async fn get_or_load<F, Fut>(&self, key: String, loader: F) -> Result<Arc<Value>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Arc<Value>>>,
    {
        if let Some(document) = self.cache.get(&key).await {
            trace!(key = %key, "parsed schema cache hit");
            return Ok(document);
        }

        let document = loader().await?;
        self.cache.insert(key, document.clone()).await;
        Ok(document)
    }

    pub async fn get(&self, key: &str) -> Option<Arc<Value>> {
        self.cache.get(key).await
    }

    pub async fn insert(&self, key: String, document: Arc<Value>) {
        self.cache.insert(key, document).await;
    }

    pub async fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }
}

/// Metadata for cached schema entries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMetadata {
    pub key: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub size_bytes: u64,
    pub etag: Option<String>,
}

impl CacheMetadata {
    pub fn new(key: String, url: String, ttl: Duration) -> Self {
        let now = Utc::now();
        let expires_at =
            now + chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::hours(24));

        Self {
            key,
            url,
            created_at: now,
            expires_at,
            size_bytes: 0,
            etag: None,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size_bytes = size;
        self
    }

    pub fn with_etag(mut self, etag: Option<String>) -> Self {
        self.etag = etag;
        self
    }
}

/// Raw schema bytes with their metadata
#[derive(Debug, Clone)]
pub struct CachedSchema {
    pub data: Arc<Vec<u8>>,
    pub metadata: CacheMetadata,
}

impl CachedSchema {
    pub fn new(data: Vec<u8>, metadata: CacheMetadata) -> Self {
        Self {
            data: Arc::new(data),
            metadata,
        }
    }
}

/// Persistent tier backed by `cacache`
pub struct DiskCache {
    cache_dir: PathBuf,
}

impl DiskCache {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Stable key for a schema URL
    pub fn generate_key(url: &str) -> String {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        url.hash(&mut hasher);
        format!("schema_{:x}", hasher.finish())
    }

    /// Unexpired entry for `key`; expired entries are removed on the way
    pub async fn get(&self, key: &str) -> Result<Option<CachedSchema>> {
        let metadata = match self.get_metadata(key).await? {
            Some(metadata) if !metadata.is_expired() => metadata,
            Some(_) => {
                debug!(key, "disk cache entry expired");
                let _ = self.remove(key).await;
                return Ok(None);
            }
            None => return Ok(None),
        };

        match cacache::read(&self.cache_dir, key).await {
            Ok(data) => Ok(Some(CachedSchema::new(data, metadata))),
            Err(cacache::Error::EntryNotFound(_, _)) => Ok(None),
            Err(e) => Err(Error::Cache(format!("Failed to read from disk cache: {}", e))),
        }
    }

    pub async fn set(&self, key: &str, data: &[u8], metadata: CacheMetadata) -> Result<()> {
        cacache::write(&self.cache_dir, key, data)
            .await
            .map_err(|e| Error::Cache(format!("Failed to write to disk cache: {}", e)))?;

        self.set_metadata(key, &metadata).await
    }

    pub async fn remove(&self, key: &str) -> Result<()> {
        let _ = cacache::remove(&self.cache_dir, key).await;
        let _ = fs::remove_file(self.metadata_path(key)).await;
        Ok(())
    }

    pub async fn contains(&self, key: &str) -> Result<bool> {
        Ok(self
            .get_metadata(key)
            .await?
            .is_some_and(|metadata| !metadata.is_expired()))
    }

    pub async fn stats(&self) -> Result<CacheStats> {
        let mut stats = CacheStats::default();

        // A cache directory that does not exist yet reads as empty
        if let Ok(entries) = cacache::index::ls(&self.cache_dir).collect::<std::result::Result<Vec<_>, _>>() {
            for entry in entries {
                stats.entry_count += 1;
                stats.total_size += entry.size as u64;
            }
        }

        Ok(stats)
    }

    pub async fn clear(&self) -> Result<()> {
        cacache::clear(&self.cache_dir)
            .await
            .map_err(|e| Error::Cache(format!("Failed to clear disk cache: {}", e)))?;
        let _ = fs::remove_dir_all(self.cache_dir.join("metadata")).await;
        Ok(())
    }

    async fn get_metadata(&self, key: &str) -> Result<Option<CacheMetadata>> {
        match fs::read_to_string(self.metadata_path(key)).await {
            Ok(content) => serde_json::from_str(&content)
                .map(Some)
                .map_err(|e| Error::Cache(format!("Failed to parse metadata: {}", e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Cache(format!("Failed to read metadata: {}", e))),
        }
    }

    async fn set_metadata(&self, key: &str, metadata: &CacheMetadata) -> Result<()> {
        let metadata_path = self.metadata_path(key);

        if let Some(parent) = metadata_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::Cache(format!("Failed to create metadata directory: {}", e)))?;
        }

        let content = serde_json::to_string_pretty(metadata)
            .map_err(|e| Error::Cache(format!("Failed to serialize metadata: {}", e)))?;

        fs::write(&metadata_path, content)
            .await
            .map_err(|e| Error::Cache(format!("Failed to write metadata: {}", e)))
    }

    fn metadata_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join("metadata").join(format!("{}.json", key))
    }
}

/// In-process tier backed by `moka`
pub struct MemoryCache {
    cache: Cache<String, Arc<CachedSchema>>,
}

impl MemoryCache {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();

        Self { cache }
    }

    pub async fn get(&self, key: &str) -> Option<Arc<CachedSchema>> {
        self.cache.get(key).await
    }

    pub async fn set(&self, key: String, schema: Arc<CachedSchema>) {
        self.cache.insert(key, schema).await;
    }

    pub async fn remove(&self, key: &str) {
        self.cache.remove(key).await;
    }

    pub fn contains(&self, key: &str) -> bool {
        self.cache.contains_key(key)
    }

    pub async fn stats(&self) -> MemoryCacheStats {
        self.cache.run_pending_tasks().await;

        MemoryCacheStats {
            entry_count: self.cache.entry_count(),
            weighted_size: self.cache.weighted_size(),
        }
    }

    pub async fn clear(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}

/// Memory tier first, then disk, for raw bytes; decoded documents on the side
pub struct SchemaCache {
    memory_cache: MemoryCache,
    disk_cache: DiskCache,
    parsed_cache: ParsedSchemaCache,
    config: CacheConfig,
}

impl SchemaCache {
    pub fn new(config: CacheConfig) -> Self {
        let memory_cache = MemoryCache::new(
            config.max_memory_entries,
            Duration::from_secs(config.memory_ttl_seconds),
        );
        let disk_cache = DiskCache::new(config.directory.clone());
        let parsed_cache = ParsedSchemaCache::new(config.max_memory_entries);

        Self {
            memory_cache,
            disk_cache,
            parsed_cache,
            config,
        }
    }

    pub fn parsed(&self) -> &ParsedSchemaCache {
        &self.parsed_cache
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub async fn get(&self, url: &str) -> Result<Option<Arc<CachedSchema>>> {
        let key = DiskCache::generate_key(url);

        if let Some(schema) = self.memory_cache.get(&key).await {
            trace!(url, "memory cache hit");
            return Ok(Some(schema));
        }

        if let Some(schema) = self.disk_cache.get(&key).await? {
            trace!(url, "disk cache hit");
            let schema = Arc::new(schema);
            self.memory_cache.set(key, schema.clone()).await;
            return Ok(Some(schema));
        }

        Ok(None)
    }

    /// Store in both tiers
    pub async fn set(&self, url: &str, data: Vec<u8>, etag: Option<String>) -> Result<()> {
        let key = DiskCache::generate_key(url);
        let ttl = Duration::from_secs(self.config.ttl_hours * 3600);

        let metadata = CacheMetadata::new(key.clone(), url.to_string(), ttl)
            .with_size(data.len() as u64)
            .with_etag(etag);

        self.disk_cache.set(&key, &data, metadata.clone()).await?;
        self.memory_cache
            .set(key, Arc::new(CachedSchema::new(data, metadata)))
            .await;

        Ok(())
    }

    pub async fn remove(&self, url: &str) -> Result<()> {
        let key = DiskCache::generate_key(url);
        self.memory_cache.remove(&key).await;
        self.disk_cache.remove(&key).await
    }

    pub async fn contains(&self, url: &str) -> Result<bool> {
        let key = DiskCache::generate_key(url);
        if self.memory_cache.contains(&key) {
            return Ok(true);
        }
        self.disk_cache.contains(&key).await
    }

    pub async fn stats(&self) -> Result<ComprehensiveCacheStats> {
        Ok(ComprehensiveCacheStats {
            memory: self.memory_cache.stats().await,
            disk: self.disk_cache.stats().await?,
            parsed_documents: self.parsed_cache.entry_count().await,
        })
    }

    pub async fn clear(&self) -> Result<()> {
        self.memory_cache.clear().await;
        self.disk_cache.clear().await
    }
}

#[derive(Debug, Default, Clone)]
pub struct CacheStats {
    pub entry_count: u64,
    pub total_size: u64,
}

#[derive(Debug, Clone)]
pub struct MemoryCacheStats {
    pub entry_count: u64,
    pub weighted_size: u64,
}

#[derive(Debug, Clone)]
pub struct ComprehensiveCacheStats {
    pub memory: MemoryCacheStats,
    pub disk: CacheStats,
    pub parsed_documents: u64,
}
