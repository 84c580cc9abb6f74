use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum VerbosityLevel {
    /// Only show critical errors
    Quiet,
    /// Show standard information
    #[default]
    Normal,
    /// Show detailed information
    Verbose,
    /// Show all available debugging information
    Debug,
}

impl VerbosityLevel {
    /// Default `tracing` filter directive when `RUST_LOG` is unset
    pub fn log_directive(self) -> &'static str {
        match self {
            VerbosityLevel::Quiet => "error",
            VerbosityLevel::Normal => "warn",
            VerbosityLevel::Verbose => "info",
            VerbosityLevel::Debug => "debug",
        }
    }
}

/// Result rendering selected with `--format`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One line per file, followed by each validation error
    #[default]
    Human,
    /// Machine-readable report
    Json,
    /// Totals only
    Summary,
}

/// Validate JSON documents against a JSON Schema (draft 3 / draft 4)
#[derive(Parser, Debug, Clone)]
#[command(name = "validate-json")]
#[command(about = "Validate JSON files against a JSON Schema with remote schema caching")]
#[command(version)]
pub struct Cli {
    /// Directory or file to validate
    #[arg(help = "Directory or file to validate")]
    pub path: PathBuf,

    /// Root schema: a local path or an http(s) URL
    #[arg(short = 's', long = "schema")]
    pub schema: String,

    /// File extensions to process (comma-separated)
    #[arg(
        short = 'e',
        long = "extensions",
        help = "File extensions to process (e.g., 'json,geojson')"
    )]
    pub extensions: Option<String>,

    /// Number of concurrent validation tasks
    #[arg(short = 't', long = "threads")]
    pub threads: Option<usize>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Enable quiet mode (errors only)
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Quiet mode",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    /// Cache directory for remote schemas
    #[arg(long = "cache-dir")]
    pub cache_dir: Option<PathBuf>,

    /// Cache TTL in hours
    #[arg(long = "cache-ttl")]
    pub cache_ttl: Option<u64>,

    /// HTTP request timeout in seconds
    #[arg(long = "timeout")]
    pub timeout: Option<u64>,

    /// Number of retry attempts for failed downloads
    #[arg(long = "retry-attempts")]
    pub retry_attempts: Option<u32>,

    /// Include file patterns (glob syntax)
    #[arg(long = "include", action = clap::ArgAction::Append)]
    pub include_patterns: Vec<String>,

    /// Exclude file patterns (glob syntax)
    #[arg(long = "exclude", action = clap::ArgAction::Append)]
    pub exclude_patterns: Vec<String>,

    /// Show progress indicators
    #[arg(long = "progress")]
    pub progress: bool,

    /// Stop scheduling files after the first invalid one
    #[arg(long = "fail-fast")]
    pub fail_fast: bool,

    /// Maximum cache size in MB
    #[arg(long = "max-cache-size")]
    pub max_cache_size: Option<u64>,

    /// Accept numeric and boolean strings where numbers and booleans are expected
    #[arg(long = "type-cast")]
    pub type_cast: bool,

    /// Maximum nesting depth of a validated document
    #[arg(long = "max-depth")]
    pub max_depth: Option<usize>,

    /// Output format
    #[arg(long = "format", value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Configuration file (TOML or JSON)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Extensions given on the command line, if any
    pub fn get_extensions(&self) -> Option<Vec<String>> {
        self.extensions.as_ref().map(|extensions| {
            extensions
                .split(',')
                .map(|s| s.trim().trim_start_matches('.').to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.path.exists() {
            return Err(format!("Path does not exist: {}", self.path.display()));
        }
        if self.schema.trim().is_empty() {
            return Err("Schema location must not be empty".to_string());
        }
        if let Some(threads) = self.threads
            && threads == 0
        {
            return Err("Number of threads must be greater than 0".to_string());
        }
        if self.max_depth == Some(0) {
            return Err("Maximum depth must be greater than 0".to_string());
        }
        Ok(())
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        match (self.quiet, self.verbose) {
            (true, _) => VerbosityLevel::Quiet,
            (false, 0) => VerbosityLevel::Normal,
            (false, 1) => VerbosityLevel::Verbose,
            (false, _) => VerbosityLevel::Debug,
        }
    }
}
