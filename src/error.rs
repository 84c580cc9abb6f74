use std::path::PathBuf;

use thiserror::Error;

/// Main application error type that encompasses all possible failure modes
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON decoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status error: {status} for {url} - {message}")]
    HttpStatus {
        url: String,
        status: u16,
        message: String,
    },

    #[error("Request timeout: {url} after {timeout_seconds} seconds")]
    Timeout { url: String, timeout_seconds: u64 },

    #[error("Schema parsing error: {source_name} - {details}")]
    SchemaParsing { source_name: String, details: String },

    #[error("Schema not found: {uri}")]
    SchemaNotFound { uri: String },

    #[error("Instance decoding failed: {file} - {details}")]
    InstanceDecoding { file: PathBuf, details: String },

    #[error("Recursion limit of {limit} exceeded at '{path}'; the schema is cyclic or the document nests too deeply")]
    RecursionLimit { limit: usize, path: String },

    #[error(transparent)]
    UnresolvableReference(#[from] UnresolvableReference),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system traversal error: {path} - {reason}")]
    FileSystemTraversal { path: PathBuf, reason: String },

    #[error("Concurrent operation error: {details}")]
    Concurrency { details: String },
}

/// A schema reference the resolver could not turn into a document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unresolvable reference {uri}: {reason}")]
pub struct UnresolvableReference {
    pub uri: String,
    pub reason: String,
}

impl UnresolvableReference {
    pub fn new(uri: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            reason: reason.into(),
        }
    }
}

impl From<crate::config::ConfigError> for Error {
    fn from(err: crate::config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let io_error = Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "File not found",
        ));
        assert!(io_error.to_string().contains("IO error"));

        let schema_error = Error::SchemaParsing {
            source_name: "http://example.com/schema.json".to_string(),
            details: "expected value at line 1".to_string(),
        };
        assert!(schema_error.to_string().contains("Schema parsing error"));
        assert!(
            schema_error
                .to_string()
                .contains("http://example.com/schema.json")
        );
    }

    #[test]
    fn test_recursion_limit_names_path_and_limit() {
        let error = Error::RecursionLimit {
            limit: 64,
            path: "a.b[2]".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("64"));
        assert!(message.contains("a.b[2]"));
        assert!(message.contains("cyclic"));
    }

    #[test]
    fn test_unresolvable_reference_is_transparent() {
        let error: Error = UnresolvableReference::new("http://x/y.json", "not registered").into();
        assert_eq!(
            error.to_string(),
            "Unresolvable reference http://x/y.json: not registered"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Access denied");
        let error: Error = io_error.into();

        match error {
            Error::Io(_) => (),
            _ => panic!("Expected Error::Io"),
        }
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: Error = json_error.into();
        assert!(matches!(error, Error::Json(_)));
    }

    #[test]
    fn test_error_source_chain() {
        use std::error::Error as _;

        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let error = Error::Io(io_error);

        let source = error.source().unwrap();
        assert_eq!(source.to_string(), "File not found");
    }
}
