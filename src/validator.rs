//! Public validation façade.
//!
//! ```
//! use serde_json::json;
//! use validate_json::{ValidationOptions, validate_json};
//!
//! let errors = validate_json(
//!     &json!({"name": 7}),
//!     &json!({"properties": {"name": {"type": "string"}}}),
//!     &ValidationOptions::default(),
//! )
//! .unwrap();
//! assert_eq!(errors[0].to_string(), "name: integer value found, but a string is required");
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constraints::{Dispatcher, PatternCache};
use crate::context::{ValidationContext, ValidationError};
use crate::error::Result;
use crate::resolver::{NoResolver, SchemaResolver};
use crate::value::Value;

/// Containers a validated value may nest below its root before a run is aborted
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// How strictly scalar kinds are compared
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckMode {
    /// JSON kinds must match exactly
    #[default]
    Normal,
    /// Strings holding numbers or `true`/`false` satisfy `number`, `integer`
    /// and `boolean`, and compare equal to such enum candidates
    TypeCast,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOptions {
    pub check_mode: CheckMode,
    pub max_depth: usize,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            check_mode: CheckMode::Normal,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ValidationOptions {
    pub fn with_check_mode(mut self, check_mode: CheckMode) -> Self {
        self.check_mode = check_mode;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Validates instances against schemas, resolving external references
/// through the configured [`SchemaResolver`].
///
/// A validator holds no per-run state and can be shared between threads.
#[derive(Clone)]
pub struct Validator {
    options: ValidationOptions,
    resolver: Arc<dyn SchemaResolver>,
    base_uri: Option<String>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationOptions::default())
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("options", &self.options)
            .field("base_uri", &self.base_uri)
            .finish_non_exhaustive()
    }
}

impl Validator {
    pub fn new(options: ValidationOptions) -> Self {
        Self {
            options,
            resolver: Arc::new(NoResolver),
            base_uri: None,
        }
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn SchemaResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// URI of the root schema, used to resolve relative references.
    /// Without it, the schema's own `id` is used.
    pub fn with_base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.base_uri = Some(base_uri.into());
        self
    }

    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Validate `value` against `schema`, returning every constraint failure.
    ///
    /// An empty vector means the value is valid. `Err` is only returned when
    /// the run had to be aborted: a cyclic schema, or a value nested deeper
    /// than `max_depth`.
    pub fn validate(&self, value: &Value, schema: &Value) -> Result<Vec<ValidationError>> {
        let mut context = ValidationContext::new();
        self.check(value, schema, &mut context)?;
        debug!(errors = context.len(), "validation finished");
        Ok(context.into_errors())
    }

    /// Validate into a caller-owned context, appending at its current path
    pub fn check(&self, value: &Value, schema: &Value, context: &mut ValidationContext) -> Result<()> {
        let base_uri = self
            .base_uri
            .as_deref()
            .or_else(|| schema.get("id").and_then(Value::as_str));
        let patterns = PatternCache::default();
        Dispatcher::new(&self.options, self.resolver.as_ref(), &patterns, schema, base_uri)
            .check(value, schema, context)
    }

    pub fn validate_json(
        &self,
        value: &serde_json::Value,
        schema: &serde_json::Value,
    ) -> Result<Vec<ValidationError>> {
        self.validate(&Value::from(value), &Value::from(schema))
    }
}

/// Validate without a resolver; external references are reported as errors
pub fn validate(value: &Value, schema: &Value, options: &ValidationOptions) -> Result<Vec<ValidationError>> {
    Validator::new(options.clone()).validate(value, schema)
}

/// [`validate`] over decoded `serde_json` trees
pub fn validate_json(
    value: &serde_json::Value,
    schema: &serde_json::Value,
    options: &ValidationOptions,
) -> Result<Vec<ValidationError>> {
    Validator::new(options.clone()).validate_json(value, schema)
}

pub fn has_errors(errors: &[ValidationError]) -> bool {
    !errors.is_empty()
}
