//! Concurrent file validation.
//!
//! Every discovered document is read and decoded asynchronously, then checked
//! against the loaded root schema on the blocking pool. One [`Validator`] is
//! shared by all tasks; a semaphore bounds how many files are in flight.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cache::SchemaCache;
use crate::config::{Config, ConfigManager};
use crate::context::ValidationError;
use crate::error::{Error, Result};
use crate::file_discovery::FileDiscovery;
use crate::schema_loader::LoadedSchema;
use crate::validator::Validator;
use crate::value::Value;

/// Scheduling settings for a run
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub max_concurrent_validations: usize,
    /// Per-file budget covering read, decode, and validation
    pub validation_timeout: Duration,
    /// Skip files not yet started once one file is invalid or errored
    pub fail_fast: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_validations: num_cpus::get(),
            validation_timeout: Duration::from_secs(30),
            fail_fast: false,
        }
    }
}

impl From<&Config> for EngineConfig {
    fn from(config: &Config) -> Self {
        Self {
            max_concurrent_validations: ConfigManager::get_thread_count(config),
            validation_timeout: ConfigManager::get_timeout_duration(config),
            fail_fast: config.validation.fail_fast,
        }
    }
}

/// Outcome for one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ValidationStatus {
    Valid,
    /// The document violates the schema
    Invalid { error_count: usize },
    /// The document could not be read, decoded, or checked
    Error { message: String },
    Skipped { reason: String },
}

impl ValidationStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationStatus::Valid)
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, ValidationStatus::Invalid { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ValidationStatus::Error { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, ValidationStatus::Skipped { .. })
    }
}

/// Result of validating a single file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileValidationResult {
    pub path: PathBuf,
    pub status: ValidationStatus,
    pub schema_url: Option<String>,
    pub duration: Duration,
    /// Constraint failures, in the order they were found
    pub errors: Vec<ValidationError>,
}

impl FileValidationResult {
    pub fn valid(path: PathBuf, schema_url: String, duration: Duration) -> Self {
        Self {
            path,
            status: ValidationStatus::Valid,
            schema_url: Some(schema_url),
            duration,
            errors: Vec::new(),
        }
    }

    pub fn invalid(
        path: PathBuf,
        schema_url: String,
        duration: Duration,
        errors: Vec<ValidationError>,
    ) -> Self {
        Self {
            path,
            status: ValidationStatus::Invalid {
                error_count: errors.len(),
            },
            schema_url: Some(schema_url),
            duration,
            errors,
        }
    }

    pub fn error(path: PathBuf, error: Error, duration: Duration) -> Self {
        Self {
            path,
            status: ValidationStatus::Error {
                message: error.to_string(),
            },
            schema_url: None,
            duration,
            errors: Vec::new(),
        }
    }

    pub fn skipped(path: PathBuf, reason: String) -> Self {
        Self {
            path,
            status: ValidationStatus::Skipped { reason },
            schema_url: None,
            duration: Duration::ZERO,
            errors: Vec::new(),
        }
    }
}

/// Progress update passed to a [`ProgressCallback`]
#[derive(Debug, Clone)]
pub struct ValidationProgress {
    pub current_file: Option<PathBuf>,
    pub completed: usize,
    pub total: usize,
    pub phase: ValidationPhase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationPhase {
    Discovery,
    Validation,
    Aggregation,
    Complete,
}

pub type ProgressCallback = Arc<dyn Fn(ValidationProgress) + Send + Sync>;

/// Timing and cache figures for a run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_duration: Duration,
    pub discovery_duration: Duration,
    pub validation_duration: Duration,
    pub average_time_per_file: Duration,
    pub throughput_files_per_second: f64,
    pub concurrent_validations: usize,
    pub schema_cache_stats: SchemaCacheStats,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SchemaCacheStats {
    /// Schema documents the root schema needed
    pub schemas_loaded: usize,
    /// Raw remote schemas held in memory
    pub memory_entries: u64,
    pub disk_entries: u64,
    pub disk_size_bytes: u64,
}

/// Aggregated results of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResults {
    pub total_files: usize,
    pub valid_files: usize,
    pub invalid_files: usize,
    pub error_files: usize,
    pub skipped_files: usize,
    /// Sum of per-file durations
    pub total_duration: Duration,
    pub average_duration: Duration,
    pub file_results: Vec<FileValidationResult>,
    pub schemas_used: Vec<String>,
    pub performance_metrics: PerformanceMetrics,
}

impl ValidationResults {
    pub fn aggregate(file_results: Vec<FileValidationResult>) -> Self {
        let total_files = file_results.len();
        let mut valid_files = 0;
        let mut invalid_files = 0;
        let mut error_files = 0;
        let mut skipped_files = 0;
        let mut total_duration = Duration::ZERO;
        let mut schemas_used = Vec::new();

        for result in &file_results {
            match result.status {
                ValidationStatus::Valid => valid_files += 1,
                ValidationStatus::Invalid { .. } => invalid_files += 1,
                ValidationStatus::Error { .. } => error_files += 1,
                ValidationStatus::Skipped { .. } => skipped_files += 1,
            }
            total_duration += result.duration;

            if let Some(schema_url) = &result.schema_url
                && !schemas_used.contains(schema_url)
            {
                schemas_used.push(schema_url.clone());
            }
        }

        let average_duration = mean_duration(total_duration, total_files);

        Self {
            total_files,
            valid_files,
            invalid_files,
            error_files,
            skipped_files,
            total_duration,
            average_duration,
            file_results,
            schemas_used,
            performance_metrics: PerformanceMetrics {
                validation_duration: total_duration,
                average_time_per_file: average_duration,
                ..PerformanceMetrics::default()
            },
        }
    }

    pub fn with_metrics(
        file_results: Vec<FileValidationResult>,
        performance_metrics: PerformanceMetrics,
    ) -> Self {
        let mut results = Self::aggregate(file_results);
        results.performance_metrics = performance_metrics;
        results
    }

    /// True when at least one file was checked and every file passed
    pub fn all_valid(&self) -> bool {
        self.total_files > 0 && self.valid_files == self.total_files
    }

    pub fn has_errors(&self) -> bool {
        self.error_files > 0 || self.invalid_files > 0
    }

    /// Percentage of files that were valid
    pub fn success_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.valid_files as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Validates documents against one loaded root schema
pub struct ValidationEngine {
    validator: Arc<Validator>,
    schema: Arc<Value>,
    schema_uri: String,
    schemas_loaded: usize,
    cache: Option<Arc<SchemaCache>>,
    config: EngineConfig,
}

impl ValidationEngine {
    pub fn new(schema: &LoadedSchema, validator: Validator, config: EngineConfig) -> Self {
        Self {
            validator: Arc::new(validator),
            schema: schema.root.clone(),
            schema_uri: schema.uri.clone(),
            schemas_loaded: schema.registry.len(),
            cache: None,
            config,
        }
    }

    /// Report this cache's figures in the run metrics
    pub fn with_cache(mut self, cache: Arc<SchemaCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub async fn validate_path(
        &self,
        path: &Path,
        file_discovery: &FileDiscovery,
    ) -> Result<ValidationResults> {
        self.validate_path_with_progress(path, file_discovery, None)
            .await
    }

    /// Discover files under `path` and validate them all
    pub async fn validate_path_with_progress(
        &self,
        path: &Path,
        file_discovery: &FileDiscovery,
        progress_callback: Option<ProgressCallback>,
    ) -> Result<ValidationResults> {
        let workflow_start = Instant::now();
        let report = |completed, total, phase| {
            if let Some(callback) = &progress_callback {
                callback(ValidationProgress {
                    current_file: None,
                    completed,
                    total,
                    phase,
                });
            }
        };

        report(0, 0, ValidationPhase::Discovery);
        let discovery_start = Instant::now();
        let files = file_discovery.discover_files(path).await?;
        let discovery_duration = discovery_start.elapsed();
        info!(path = %path.display(), files = files.len(), "files discovered");

        let validation_start = Instant::now();
        let results = self
            .validate_files_with_progress(files, progress_callback.clone())
            .await?;
        let validation_duration = validation_start.elapsed();
        report(results.len(), results.len(), ValidationPhase::Aggregation);

        let total_duration = workflow_start.elapsed();
        let metrics = PerformanceMetrics {
            total_duration,
            discovery_duration,
            validation_duration,
            average_time_per_file: mean_duration(validation_duration, results.len()),
            throughput_files_per_second: if total_duration.as_secs_f64() > 0.0 {
                results.len() as f64 / total_duration.as_secs_f64()
            } else {
                0.0
            },
            concurrent_validations: self.config.max_concurrent_validations,
            schema_cache_stats: self.collect_cache_statistics().await,
        };

        let final_results = ValidationResults::with_metrics(results, metrics);
        report(
            final_results.total_files,
            final_results.total_files,
            ValidationPhase::Complete,
        );
        Ok(final_results)
    }

    pub async fn validate_files(&self, files: Vec<PathBuf>) -> Result<Vec<FileValidationResult>> {
        self.validate_files_with_progress(files, None).await
    }

    /// Validate `files` concurrently; results come back in input order
    pub async fn validate_files_with_progress(
        &self,
        files: Vec<PathBuf>,
        progress_callback: Option<ProgressCallback>,
    ) -> Result<Vec<FileValidationResult>> {
        if files.is_empty() {
            return Ok(Vec::new());
        }

        let total_files = files.len();
        let completed = Arc::new(AtomicUsize::new(0));
        let stop = Arc::new(AtomicBool::new(false));
        let semaphore = Arc::new(tokio::sync::Semaphore::new(
            self.config.max_concurrent_validations.max(1),
        ));

        let tasks: Vec<_> = files
            .into_iter()
            .map(|file_path| {
                let validator = Arc::clone(&self.validator);
                let schema = Arc::clone(&self.schema);
                let schema_uri = self.schema_uri.clone();
                let semaphore = Arc::clone(&semaphore);
                let completed = Arc::clone(&completed);
                let stop = Arc::clone(&stop);
                let progress_callback = progress_callback.clone();
                let timeout = self.config.validation_timeout;
                let fail_fast = self.config.fail_fast;

                tokio::spawn(async move {
                    let _permit = semaphore.acquire().await.map_err(|_| Error::Concurrency {
                        details: "validation semaphore closed".to_string(),
                    })?;

                    let result = if stop.load(Ordering::SeqCst) {
                        FileValidationResult::skipped(
                            file_path.clone(),
                            "an earlier file failed validation".to_string(),
                        )
                    } else {
                        let outcome = tokio::time::timeout(
                            timeout,
                            Self::validate_single_file_internal(
                                file_path.clone(),
                                validator,
                                schema,
                                schema_uri,
                            ),
                        )
                        .await;

                        match outcome {
                            Ok(result) => result,
                            Err(_) => {
                                warn!(path = %file_path.display(), ?timeout, "validation timed out");
                                FileValidationResult::error(
                                    file_path.clone(),
                                    Error::Concurrency {
                                        details: format!("validation timed out after {:?}", timeout),
                                    },
                                    timeout,
                                )
                            }
                        }
                    };

                    if fail_fast && (result.status.is_invalid() || result.status.is_error()) {
                        stop.store(true, Ordering::SeqCst);
                    }

                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    if let Some(callback) = &progress_callback {
                        callback(ValidationProgress {
                            current_file: Some(file_path),
                            completed: done,
                            total: total_files,
                            phase: ValidationPhase::Validation,
                        });
                    }

                    Ok::<_, Error>(result)
                })
            })
            .collect();

        let joined = try_join_all(tasks).await.map_err(|e| Error::Concurrency {
            details: format!("Task join error: {}", e),
        })?;

        joined.into_iter().collect()
    }

    async fn validate_single_file_internal(
        file_path: PathBuf,
        validator: Arc<Validator>,
        schema: Arc<Value>,
        schema_uri: String,
    ) -> FileValidationResult {
        let start_time = Instant::now();

        let bytes = match tokio::fs::read(&file_path).await {
            Ok(bytes) => bytes,
            Err(e) => return FileValidationResult::error(file_path, e.into(), start_time.elapsed()),
        };

        let instance: Value = match serde_json::from_slice(&bytes) {
            Ok(instance) => instance,
            Err(e) => {
                let error = Error::InstanceDecoding {
                    file: file_path.clone(),
                    details: e.to_string(),
                };
                return FileValidationResult::error(file_path, error, start_time.elapsed());
            }
        };

        let checked =
            tokio::task::spawn_blocking(move || validator.validate(&instance, &schema)).await;
        let duration = start_time.elapsed();

        match checked {
            Ok(Ok(errors)) if errors.is_empty() => {
                debug!(path = %file_path.display(), ?duration, "valid");
                FileValidationResult::valid(file_path, schema_uri, duration)
            }
            Ok(Ok(errors)) => {
                debug!(path = %file_path.display(), errors = errors.len(), "invalid");
                FileValidationResult::invalid(file_path, schema_uri, duration, errors)
            }
            Ok(Err(e)) => {
                warn!(path = %file_path.display(), "validation aborted: {e}");
                FileValidationResult::error(file_path, e, duration)
            }
            Err(e) => FileValidationResult::error(
                file_path,
                Error::Concurrency {
                    details: format!("Join error: {}", e),
                },
                duration,
            ),
        }
    }

    pub async fn validate_single_file(&self, file_path: &Path) -> FileValidationResult {
        Self::validate_single_file_internal(
            file_path.to_path_buf(),
            Arc::clone(&self.validator),
            Arc::clone(&self.schema),
            self.schema_uri.clone(),
        )
        .await
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn schema_uri(&self) -> &str {
        &self.schema_uri
    }

    async fn collect_cache_statistics(&self) -> SchemaCacheStats {
        let mut stats = SchemaCacheStats {
            schemas_loaded: self.schemas_loaded,
            ..SchemaCacheStats::default()
        };

        if let Some(cache) = &self.cache {
            match cache.stats().await {
                Ok(cache_stats) => {
                    stats.memory_entries = cache_stats.memory.entry_count;
                    stats.disk_entries = cache_stats.disk.entry_count;
                    stats.disk_size_bytes = cache_stats.disk.total_size;
                }
                Err(e) => debug!("cache statistics unavailable: {e}"),
            }
        }

        stats
    }
}

/// `total / count`, or zero for no items
fn mean_duration(total: Duration, count: usize) -> Duration {
    match u32::try_from(count) {
        Ok(0) => Duration::ZERO,
        Ok(count) => total / count,
        Err(_) => total.div_f64(count as f64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::SchemaRegistry;
    use crate::validator::{CheckMode, ValidationOptions};
    use serde_json::json;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn loaded(schema: serde_json::Value) -> LoadedSchema {
        LoadedSchema {
            root: Arc::new(Value::from(schema)),
            uri: "file:///schemas/test.json".to_string(),
            registry: SchemaRegistry::new(),
        }
    }

    fn engine_for(schema: serde_json::Value, config: EngineConfig) -> ValidationEngine {
        let schema = loaded(schema);
        let validator = schema.validator(ValidationOptions::default());
        ValidationEngine::new(&schema, validator, config)
    }

    fn test_config() -> EngineConfig {
        EngineConfig {
            max_concurrent_validations: 2,
            validation_timeout: Duration::from_secs(5),
            fail_fast: false,
        }
    }

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn person_schema() -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "name": {"type": "string", "required": true},
                "age": {"type": "integer", "minimum": 0}
            }
        })
    }

    #[test]
    fn test_validation_status_predicates() {
        assert!(ValidationStatus::Valid.is_valid());
        assert!(ValidationStatus::Invalid { error_count: 2 }.is_invalid());
        assert!(
            ValidationStatus::Error {
                message: "boom".to_string()
            }
            .is_error()
        );
        assert!(
            ValidationStatus::Skipped {
                reason: "later".to_string()
            }
            .is_skipped()
        );
        assert!(!ValidationStatus::Valid.is_invalid());
    }

    #[test]
    fn test_validation_results_aggregation() {
        let schema = "file:///s.json".to_string();
        let results = ValidationResults::aggregate(vec![
            FileValidationResult::valid("a.json".into(), schema.clone(), Duration::from_millis(10)),
            FileValidationResult::invalid(
                "b.json".into(),
                schema.clone(),
                Duration::from_millis(30),
                vec![ValidationError {
                    path: "age".to_string(),
                    message: "Must be at least 0".to_string(),
                }],
            ),
            FileValidationResult::error(
                "c.json".into(),
                Error::Config("x".to_string()),
                Duration::from_millis(20),
            ),
            FileValidationResult::skipped("d.json".into(), "fail fast".to_string()),
        ]);

        assert_eq!(results.total_files, 4);
        assert_eq!(results.valid_files, 1);
        assert_eq!(results.invalid_files, 1);
        assert_eq!(results.error_files, 1);
        assert_eq!(results.skipped_files, 1);
        assert_eq!(results.total_duration, Duration::from_millis(60));
        assert_eq!(results.average_duration, Duration::from_millis(15));
        assert_eq!(results.schemas_used, vec![schema]);
        assert!(results.has_errors());
        assert!(!results.all_valid());
        assert_eq!(results.success_rate(), 25.0);
    }

    #[test]
    fn test_validation_results_empty() {
        let results = ValidationResults::aggregate(Vec::new());
        assert_eq!(results.total_files, 0);
        assert!(!results.all_valid());
        assert!(!results.has_errors());
        assert_eq!(results.success_rate(), 0.0);
    }

    #[tokio::test]
    async fn test_validate_files_empty_list() {
        let engine = engine_for(person_schema(), test_config());
        assert!(engine.validate_files(Vec::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_valid_and_invalid_documents() {
        let temp_dir = TempDir::new().unwrap();
        let good = write(&temp_dir, "good.json", r#"{"name": "Ada", "age": 36}"#);
        let bad = write(&temp_dir, "bad.json", r#"{"age": -1}"#);
        let engine = engine_for(person_schema(), test_config());

        let results = engine.validate_files(vec![good, bad]).await.unwrap();

        assert!(results[0].status.is_valid());
        assert_eq!(results[0].schema_url.as_deref(), Some("file:///schemas/test.json"));
        assert_eq!(results[1].status, ValidationStatus::Invalid { error_count: 2 });
        let paths: Vec<&str> = results[1].errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["name", "age"]);
    }

    #[tokio::test]
    async fn test_undecodable_document_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let broken = write(&temp_dir, "broken.json", "{\"name\": ");
        let engine = engine_for(person_schema(), test_config());

        let result = engine.validate_single_file(&broken).await;
        match result.status {
            ValidationStatus::Error { message } => assert!(message.contains("Instance decoding failed")),
            other => panic!("expected an error status, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let engine = engine_for(person_schema(), test_config());
        let result = engine
            .validate_single_file(Path::new("/definitely/not/here.json"))
            .await;
        assert!(result.status.is_error());
    }

    #[tokio::test]
    async fn test_cyclic_schema_is_an_error_not_a_hang() {
        let temp_dir = TempDir::new().unwrap();
        let doc = write(&temp_dir, "doc.json", "{}");
        let schema = loaded(json!({"$ref": "#"}));
        let validator = schema.validator(ValidationOptions::default().with_max_depth(16));
        let engine = ValidationEngine::new(&schema, validator, test_config());

        let result = engine.validate_single_file(&doc).await;
        match result.status {
            ValidationStatus::Error { message } => assert!(message.contains("Recursion limit")),
            other => panic!("expected an error status, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_type_cast_mode_reaches_the_validator() {
        let temp_dir = TempDir::new().unwrap();
        let doc = write(&temp_dir, "doc.json", r#"{"count": "12"}"#);
        let schema = loaded(json!({"properties": {"count": {"type": "integer"}}}));

        let strict = ValidationEngine::new(
            &schema,
            schema.validator(ValidationOptions::default()),
            test_config(),
        );
        assert!(strict.validate_single_file(&doc).await.status.is_invalid());

        let lenient = ValidationEngine::new(
            &schema,
            schema.validator(ValidationOptions::default().with_check_mode(CheckMode::TypeCast)),
            test_config(),
        );
        assert!(lenient.validate_single_file(&doc).await.status.is_valid());
    }

    #[tokio::test]
    async fn test_validate_path_reports_progress_phases() {
        let temp_dir = TempDir::new().unwrap();
        for i in 0..5 {
            write(&temp_dir, &format!("doc{i}.json"), &format!(r#"{{"name": "n{i}"}}"#));
        }
        write(&temp_dir, "ignored.txt", "not json");

        let engine = engine_for(person_schema(), test_config());
        let phases = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&phases);
        let callback: ProgressCallback = Arc::new(move |progress: ValidationProgress| {
            recorder.lock().unwrap().push(progress.phase);
        });

        let results = engine
            .validate_path_with_progress(temp_dir.path(), &FileDiscovery::new(), Some(callback))
            .await
            .unwrap();

        assert_eq!(results.total_files, 5);
        assert!(results.all_valid());
        assert_eq!(results.performance_metrics.concurrent_validations, 2);

        let phases = phases.lock().unwrap();
        assert_eq!(phases.first(), Some(&ValidationPhase::Discovery));
        assert_eq!(phases.last(), Some(&ValidationPhase::Complete));
        assert_eq!(
            phases.iter().filter(|p| **p == ValidationPhase::Validation).count(),
            5
        );
    }

    #[tokio::test]
    async fn test_fail_fast_skips_remaining_files() {
        let temp_dir = TempDir::new().unwrap();
        let mut files = vec![write(&temp_dir, "bad.json", "{}")];
        for i in 0..4 {
            files.push(write(&temp_dir, &format!("ok{i}.json"), r#"{"name": "x"}"#));
        }

        let config = EngineConfig {
            max_concurrent_validations: 1,
            fail_fast: true,
            ..test_config()
        };
        let engine = engine_for(person_schema(), config);
        let results = engine.validate_files(files).await.unwrap();

        assert!(results[0].status.is_invalid());
        assert!(results[1..].iter().all(|r| r.status.is_skipped()));
    }

    #[tokio::test]
    async fn test_engine_config_from_application_config() {
        let mut config = Config::default();
        config.validation.threads = Some(3);
        config.validation.fail_fast = true;
        config.network.timeout_seconds = 7;

        let engine_config = EngineConfig::from(&config);
        assert_eq!(engine_config.max_concurrent_validations, 3);
        assert_eq!(engine_config.validation_timeout, Duration::from_secs(7));
        assert!(engine_config.fail_fast);
    }

    #[test]
    fn test_mean_duration() {
        assert_eq!(mean_duration(Duration::from_secs(10), 0), Duration::ZERO);
        assert_eq!(mean_duration(Duration::from_secs(10), 4), Duration::from_millis(2500));

        #[cfg(target_pointer_width = "64")]
        {
            let beyond_u32 = u32::MAX as usize + 1;
            let mean = mean_duration(Duration::from_secs(10), beyond_u32);
            assert!(mean > Duration::ZERO && mean < Duration::from_nanos(5), "{mean:?}");
        }
    }
}
