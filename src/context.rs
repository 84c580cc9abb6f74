//! Validation context: current path, the frames being evaluated, and the error log.
//!
//! Speculative evaluation uses [`ValidationContext::fork`]. A fork remembers
//! how many errors its parent held when it was taken and records only the
//! errors added afterwards, so a fork that is dropped leaves its parent
//! untouched and a fork that is merged appends exactly its new errors.
//!
//! Every schema node under evaluation is kept on an active stack together with
//! the value it is applied to. Entering the same pair again can only loop, so
//! it aborts the run; nesting into the value is bounded separately.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::value::Value;

/// A single constraint failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Location in the instance, `a.b[2].c`; empty for the root
    pub path: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// One step into a container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSegment<'a> {
    Key(&'a str),
    Index(usize),
}

impl<'a> From<&'a str> for PathSegment<'a> {
    fn from(key: &'a str) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment<'_> {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// Append a segment to a dotted/bracket path
pub fn append_path(base: &str, segment: PathSegment<'_>) -> String {
    match segment {
        PathSegment::Index(i) => format!("{base}[{i}]"),
        PathSegment::Key(key) if base.is_empty() => key.to_string(),
        PathSegment::Key(key) => format!("{base}.{key}"),
    }
}

/// Identity of a schema frame on the active stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SchemaKey {
    /// Address of a schema node inside a loaded document
    Node(usize),
    /// Absolute `uri#fragment` of an external reference, whose document may
    /// be a fresh allocation on every resolution
    Reference(String),
}

impl SchemaKey {
    pub(crate) fn node(schema: &Value) -> Self {
        SchemaKey::Node(std::ptr::from_ref(schema) as usize)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationContext {
    path: String,
    errors: Vec<ValidationError>,
    /// Error count of the parent when this context was forked
    snapshot: usize,
    /// Containers descended into below the root value
    depth: usize,
    /// Schema frames being evaluated, paired with the address of their value
    active: Vec<(SchemaKey, usize)>,
}

impl ValidationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    /// Record a failure at the current path
    pub fn append_error(&mut self, message: impl Into<String>) {
        self.errors.push(ValidationError {
            path: self.path.clone(),
            message: message.into(),
        });
    }

    /// Errors recorded in this context since it was created or forked
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        self.len() > 0
    }

    /// Total error count, including the parent's errors at the snapshot point
    pub fn len(&self) -> usize {
        self.snapshot + self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of errors added since the snapshot point
    pub fn added(&self) -> usize {
        self.errors.len()
    }

    /// True when nothing failed since the snapshot point
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Independent snapshot for speculative evaluation
    pub fn fork(&self) -> Self {
        Self {
            path: self.path.clone(),
            errors: Vec::new(),
            snapshot: self.len(),
            depth: self.depth,
            active: self.active.clone(),
        }
    }

    /// Commit a fork's errors
    pub fn merge(&mut self, fork: ValidationContext) {
        self.errors.extend(fork.errors);
    }

    /// Run `f` with the path extended by `segment`, restoring it afterwards
    pub fn descend<'s, T>(
        &mut self,
        segment: impl Into<PathSegment<'s>>,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        let child = append_path(&self.path, segment.into());
        let parent = std::mem::replace(&mut self.path, child);
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        self.path = parent;
        result
    }

    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }

    /// Push a schema frame for `value`.
    ///
    /// Fails when the same schema is already being applied to the same value
    /// further up the stack, or when the value lies more than `limit`
    /// containers below the root.
    pub(crate) fn enter(&mut self, schema: SchemaKey, value: &Value, limit: usize) -> Result<()> {
        let frame = (schema, std::ptr::from_ref(value) as usize);
        if self.depth > limit || self.active.contains(&frame) {
            return Err(Error::RecursionLimit {
                limit,
                path: self.path.clone(),
            });
        }
        self.active.push(frame);
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.active.pop();
    }
}
