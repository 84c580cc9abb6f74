use std::path::Path;

use crate::cli::VerbosityLevel;
use crate::config::ConfigError;
use crate::error::Error;

/// Prints fatal errors and progress to stderr
pub struct ErrorReporter {
    verbosity: VerbosityLevel,
    show_timestamps: bool,
}

impl ErrorReporter {
    pub fn new(verbosity: VerbosityLevel) -> Self {
        Self {
            verbosity,
            show_timestamps: false,
        }
    }

    pub fn with_timestamps(mut self, show_timestamps: bool) -> Self {
        self.show_timestamps = show_timestamps;
        self
    }

    pub fn report_error(&self, error: &Error) {
        eprintln!("{}", self.format_error(error));
    }

    pub fn report_config_error(&self, error: &ConfigError) {
        eprintln!("{}", self.format_config_error(error));
    }

    /// Overwrites the current line; ends it once `current == total`
    pub fn report_progress(&self, current: usize, total: usize, current_file: Option<&Path>) {
        if self.verbosity == VerbosityLevel::Quiet || total == 0 {
            return;
        }

        let percentage = (current as f64 / total as f64 * 100.0) as u32;
        match (self.verbosity, current_file) {
            (VerbosityLevel::Verbose | VerbosityLevel::Debug, Some(file)) => eprint!(
                "\rProgress: {}/{} ({}%) - {}",
                current,
                total,
                percentage,
                file.display()
            ),
            _ => eprint!("\rProgress: {}/{} ({}%)", current, total, percentage),
        }

        if current == total {
            eprintln!();
        }
    }

    pub fn format_error(&self, error: &Error) -> String {
        match self.verbosity {
            VerbosityLevel::Quiet => format!("error: {}", error),
            VerbosityLevel::Normal => self.format_error_normal(error),
            VerbosityLevel::Verbose => self.format_error_verbose(error),
            VerbosityLevel::Debug => self.format_error_debug(error),
        }
    }

    pub fn format_config_error(&self, error: &ConfigError) -> String {
        match self.verbosity {
            VerbosityLevel::Quiet => format!("Config error: {}", error),
            VerbosityLevel::Normal | VerbosityLevel::Verbose => {
                format!("Configuration Error: {}\n{}", error, Self::config_help(error))
            }
            VerbosityLevel::Debug => format!(
                "Configuration Error: {}\nDebug: {:?}\n{}",
                error,
                error,
                Self::config_help(error)
            ),
        }
    }

    fn format_error_normal(&self, error: &Error) -> String {
        let timestamp = if self.show_timestamps {
            format!("[{}] ", chrono::Utc::now().format("%H:%M:%S"))
        } else {
            String::new()
        };

        format!("{}Error: {}", timestamp, error)
    }

    fn format_error_verbose(&self, error: &Error) -> String {
        let mut output = self.format_error_normal(error);
        if let Some(suggestion) = Self::suggestion(error) {
            output.push_str("\nSuggestion: ");
            output.push_str(&suggestion);
        }
        output
    }

    fn format_error_debug(&self, error: &Error) -> String {
        let mut output = self.format_error_verbose(error);
        output.push_str(&format!("\nDebug Info: {:?}", error));

        output.push_str("\nError Chain:");
        let mut current: &dyn std::error::Error = error;
        let mut level = 0;
        while let Some(source) = current.source() {
            level += 1;
            output.push_str(&format!("\n  {}: {}", level, source));
            current = source;
        }

        output
    }

    fn suggestion(error: &Error) -> Option<String> {
        let suggestion = match error {
            Error::Http(_) | Error::Timeout { .. } => {
                "Check network connectivity, or raise --timeout and --retry-attempts".to_string()
            }
            Error::HttpStatus { url, .. } => format!("Verify the schema URL is reachable: {}", url),
            Error::SchemaNotFound { uri } => {
                format!("Verify the schema location, and any relative $ref it contains: {}", uri)
            }
            Error::SchemaParsing { .. } => {
                "Schema documents must be well-formed JSON objects".to_string()
            }
            Error::RecursionLimit { .. } => {
                "Look for a $ref or extends chain that leads back to itself, or raise --max-depth for deeply nested documents"
                    .to_string()
            }
            Error::Cache(_) => "Try removing the cache directory or check disk space".to_string(),
            Error::FileSystemTraversal { path, .. } => {
                format!("Check permissions on {}", path.display())
            }
            _ => return None,
        };
        Some(suggestion)
    }

    fn config_help(error: &ConfigError) -> String {
        match error {
            ConfigError::Io(_) => "Check that the configuration file exists and is readable".to_string(),
            ConfigError::TomlParsing(_) | ConfigError::JsonParsing(_) => {
                "Check the configuration file syntax (TOML or JSON expected)".to_string()
            }
            ConfigError::Validation(_) => {
                "Fix the offending value in the configuration file, environment, or flags".to_string()
            }
            ConfigError::Environment(_) => {
                "Check the VALIDATE_JSON_* environment variables".to_string()
            }
            ConfigError::UnsupportedFormat(_) => {
                "Use a .toml or .json configuration file".to_string()
            }
        }
    }
}
