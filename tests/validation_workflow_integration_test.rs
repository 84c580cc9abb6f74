use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;
use validate_json::{
    AsyncHttpClient, CacheConfig, EngineConfig, FileDiscovery, HttpClientConfig, ProgressCallback,
    SchemaCache, SchemaLoader, ValidationEngine, ValidationOptions, ValidationStatus,
};

struct Fixture {
    dir: TempDir,
    loader: SchemaLoader,
    cache: Arc<SchemaCache>,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let cache = Arc::new(SchemaCache::new(CacheConfig {
            directory: dir.path().join(".cache"),
            ttl_hours: 1,
            max_size_mb: 10,
            max_memory_entries: 100,
            memory_ttl_seconds: 60,
        }));
        let http_client = AsyncHttpClient::new(HttpClientConfig::default()).unwrap();
        let loader = SchemaLoader::new(Arc::clone(&cache), http_client);
        Self { dir, loader, cache }
    }

    fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    fn write_json(&self, relative: &str, value: serde_json::Value) -> PathBuf {
        self.write(relative, &serde_json::to_string_pretty(&value).unwrap())
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }
}

fn engine_config() -> EngineConfig {
    EngineConfig {
        max_concurrent_validations: 4,
        validation_timeout: Duration::from_secs(10),
        fail_fast: false,
    }
}

fn setup_schemas(fixture: &Fixture) -> PathBuf {
    fixture.write_json(
        "schemas/common.json",
        json!({
            "definitions": {
                "sku": {"type": "string", "pattern": "^[A-Z]{3}-[0-9]{4}$"},
                "money": {"type": "number", "minimum": 0, "divisibleBy": 0.01}
            }
        }),
    );
    fixture.write_json(
        "schemas/order.json",
        json!({
            "type": "object",
            "required": ["id", "lines"],
            "properties": {
                "id": {"type": "integer"},
                "placed": {"type": "string", "format": "date"},
                "lines": {
                    "type": "array",
                    "minItems": 1,
                    "items": {
                        "type": "object",
                        "properties": {
                            "sku": {"$ref": "common.json#/definitions/sku"},
                            "price": {"$ref": "common.json#/definitions/money"}
                        },
                        "additionalProperties": false
                    }
                }
            }
        }),
    )
}

fn file_name(path: &Path) -> String {
    path.file_name().unwrap().to_string_lossy().to_string()
}

#[tokio::test]
async fn test_directory_of_documents_against_local_schema() {
    let fixture = Fixture::new();
    let schema_path = setup_schemas(&fixture);

    fixture.write_json(
        "data/good.json",
        json!({"id": 1, "placed": "2024-02-29", "lines": [{"sku": "ABC-1234", "price": 9.99}]}),
    );
    fixture.write_json(
        "data/bad.json",
        json!({"id": "one", "lines": [{"sku": "abc", "price": -1, "note": "x"}]}),
    );
    fixture.write("data/nested/broken.json", "{\"id\": ");
    fixture.write("data/readme.txt", "not validated");

    let schema = fixture.loader.load(schema_path.to_str().unwrap()).await.unwrap();
    assert_eq!(schema.registry.len(), 2);

    let engine = ValidationEngine::new(
        &schema,
        schema.validator(ValidationOptions::default()),
        engine_config(),
    )
    .with_cache(Arc::clone(&fixture.cache));
    let results = engine
        .validate_path(&fixture.path("data"), &FileDiscovery::new())
        .await
        .unwrap();

    assert_eq!(results.total_files, 3);
    assert_eq!(results.valid_files, 1);
    assert_eq!(results.invalid_files, 1);
    assert_eq!(results.error_files, 1);
    assert_eq!(results.performance_metrics.schema_cache_stats.schemas_loaded, 2);

    let bad = results
        .file_results
        .iter()
        .find(|r| file_name(&r.path) == "bad.json")
        .unwrap();
    let rendered: Vec<String> = bad.errors.iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        vec![
            "id: string value found, but an integer is required",
            "lines[0].sku: Does not match the regex pattern ^[A-Z]{3}-[0-9]{4}$",
            "lines[0].price: Must have a minimum value of 0",
            "lines[0]: The property note is not defined and the definition does not allow additional properties",
        ]
    );
    assert_eq!(bad.status, ValidationStatus::Invalid { error_count: 4 });

    let broken = results
        .file_results
        .iter()
        .find(|r| file_name(&r.path) == "broken.json")
        .unwrap();
    assert!(broken.status.is_error());
}

#[tokio::test]
async fn test_discovery_filters_apply_to_the_run() {
    let fixture = Fixture::new();
    let schema_path = fixture.write_json("schema.json", json!({"type": "object"}));
    fixture.write("docs/a.json", "{}");
    fixture.write("docs/b.geojson", "[]");
    fixture.write("docs/skip/c.json", "[]");

    let schema = fixture.loader.load(schema_path.to_str().unwrap()).await.unwrap();
    let engine = ValidationEngine::new(
        &schema,
        schema.validator(ValidationOptions::default()),
        engine_config(),
    );

    let discovery = FileDiscovery::new()
        .with_extensions(vec!["json".to_string(), "geojson".to_string()])
        .with_exclude_patterns(&["**/skip/**".to_string()])
        .unwrap();
    let results = engine
        .validate_path(&fixture.path("docs"), &discovery)
        .await
        .unwrap();

    assert_eq!(results.total_files, 2);
    assert_eq!(results.valid_files, 1);
    assert_eq!(results.invalid_files, 1);
}

#[tokio::test]
async fn test_progress_callback_counts_every_file() {
    let fixture = Fixture::new();
    let schema_path = fixture.write_json("schema.json", json!({"type": "array"}));
    for i in 0..12 {
        fixture.write(&format!("docs/{i:02}.json"), "[]");
    }

    let schema = fixture.loader.load(schema_path.to_str().unwrap()).await.unwrap();
    let engine = ValidationEngine::new(
        &schema,
        schema.validator(ValidationOptions::default()),
        engine_config(),
    );

    let seen = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen);
    let callback: ProgressCallback = Arc::new(move |progress| {
        if progress.current_file.is_some() {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });

    let results = engine
        .validate_path_with_progress(&fixture.path("docs"), &FileDiscovery::new(), Some(callback))
        .await
        .unwrap();

    assert!(results.all_valid());
    assert_eq!(seen.load(Ordering::SeqCst), 12);
}

#[tokio::test]
async fn test_schema_cycle_across_documents_is_reported_per_file() {
    let fixture = Fixture::new();
    fixture.write_json("schemas/a.json", json!({"extends": "b.json"}));
    fixture.write_json("schemas/b.json", json!({"extends": "a.json"}));
    fixture.write("docs/one.json", "{}");

    let schema = fixture
        .loader
        .load(fixture.path("schemas/a.json").to_str().unwrap())
        .await
        .unwrap();
    let engine = ValidationEngine::new(
        &schema,
        schema.validator(ValidationOptions::default().with_max_depth(64)),
        engine_config(),
    );

    let results = engine
        .validate_path(&fixture.path("docs"), &FileDiscovery::new())
        .await
        .unwrap();
    assert_eq!(results.error_files, 1);
    match &results.file_results[0].status {
        ValidationStatus::Error { message } => assert!(message.contains("Recursion limit of 64")),
        other => panic!("expected an error status, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_root_path_is_an_error() {
    let fixture = Fixture::new();
    let schema_path = fixture.write_json("schema.json", json!({}));
    let schema = fixture.loader.load(schema_path.to_str().unwrap()).await.unwrap();
    let engine = ValidationEngine::new(
        &schema,
        schema.validator(ValidationOptions::default()),
        engine_config(),
    );

    let result = engine
        .validate_path(&fixture.path("nowhere"), &FileDiscovery::new())
        .await;
    assert!(result.is_err());
}
