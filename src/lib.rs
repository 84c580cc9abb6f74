//! # validate-json Library
//!
//! A JSON Schema (draft 3 and draft 4) validation engine, plus an async
//! pipeline for validating whole directory trees of JSON documents against a
//! root schema with remote schema caching and concurrent processing.

pub mod cache;
pub mod cli;
pub mod config;
mod constraints;
pub mod context;
pub mod engine;
pub mod error;
pub mod error_reporter;
pub mod file_discovery;
pub mod http_client;
pub mod output;
pub mod resolver;
pub mod schema_loader;
pub mod validator;
pub mod value;

pub use cache::{
    CacheMetadata, CacheStats, CachedSchema, ComprehensiveCacheStats, DiskCache, MemoryCache,
    MemoryCacheStats, ParsedSchemaCache, SchemaCache,
};
pub use cli::{Cli, OutputFormat, VerbosityLevel};
pub use config::{CacheConfig, Config, ConfigManager};
pub use constraints::FormatChecker;
pub use context::{PathSegment, ValidationContext, ValidationError};
pub use engine::{
    EngineConfig, FileValidationResult, PerformanceMetrics, ProgressCallback, SchemaCacheStats,
    ValidationEngine, ValidationPhase, ValidationProgress, ValidationResults, ValidationStatus,
};
pub use error::{Error, Result, UnresolvableReference};
pub use error_reporter::ErrorReporter;
pub use file_discovery::{DiscoveryStats, FileDiscovery};
pub use http_client::{AsyncHttpClient, HttpClientConfig};
pub use output::Output;
pub use resolver::{NoResolver, SchemaRegistry, SchemaResolver};
pub use schema_loader::{LoadedSchema, SchemaLoader, SchemaSource};
pub use validator::{
    CheckMode, DEFAULT_MAX_DEPTH, ValidationOptions, Validator, has_errors, validate,
    validate_json,
};
pub use value::{Kind, Map, Value};
