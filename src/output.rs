//! Rendering of validation results.

use std::time::Duration;

use serde::Serialize;

use crate::cli::{OutputFormat, VerbosityLevel};
use crate::engine::{FileValidationResult, PerformanceMetrics, ValidationResults, ValidationStatus};

/// Formats a finished run for stdout
pub struct Output {
    format: OutputFormat,
    verbosity: VerbosityLevel,
    show_colors: bool,
}

/// Shape of `--format json`
#[derive(Serialize)]
struct JsonReport<'a> {
    valid: bool,
    total_files: usize,
    valid_files: usize,
    invalid_files: usize,
    error_files: usize,
    skipped_files: usize,
    files: &'a [FileValidationResult],
}

impl Output {
    pub fn new(format: OutputFormat, verbosity: VerbosityLevel) -> Self {
        Self {
            format,
            verbosity,
            show_colors: atty::is(atty::Stream::Stdout),
        }
    }

    pub fn with_colors(mut self, show_colors: bool) -> Self {
        self.show_colors = show_colors;
        self
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if self.show_colors {
            format!("\x1b[{}m{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    pub fn print(&self, results: &ValidationResults) -> serde_json::Result<()> {
        print!("{}", self.render(results)?);
        Ok(())
    }

    pub fn render(&self, results: &ValidationResults) -> serde_json::Result<String> {
        match self.format {
            OutputFormat::Json => Self::render_json(results),
            OutputFormat::Summary => Ok(self.format_summary(results)),
            OutputFormat::Human => Ok(self.render_human(results)),
        }
    }

    fn render_json(results: &ValidationResults) -> serde_json::Result<String> {
        let report = JsonReport {
            valid: !results.has_errors(),
            total_files: results.total_files,
            valid_files: results.valid_files,
            invalid_files: results.invalid_files,
            error_files: results.error_files,
            skipped_files: results.skipped_files,
            files: &results.file_results,
        };
        let mut rendered = serde_json::to_string_pretty(&report)?;
        rendered.push('\n');
        Ok(rendered)
    }

    fn render_human(&self, results: &ValidationResults) -> String {
        let mut output = String::new();

        for file_result in &results.file_results {
            let shown = match self.verbosity {
                VerbosityLevel::Quiet => {
                    file_result.status.is_invalid() || file_result.status.is_error()
                }
                VerbosityLevel::Normal => !file_result.status.is_valid(),
                VerbosityLevel::Verbose | VerbosityLevel::Debug => true,
            };
            if shown {
                output.push_str(&self.format_file_result(file_result));
                output.push('\n');
            }
        }

        if self.verbosity > VerbosityLevel::Quiet {
            if !output.is_empty() {
                output.push('\n');
            }
            output.push_str(&self.format_summary(results));
        }

        if self.verbosity == VerbosityLevel::Debug {
            output.push_str(&Self::format_debug_info(results));
        }

        output
    }

    /// One status line, followed by one indented line per constraint failure
    pub fn format_file_result(&self, result: &FileValidationResult) -> String {
        let path_display = result.path.display();
        let duration_str = format_duration(result.duration);

        match &result.status {
            ValidationStatus::Valid => format!(
                "{}  {} ({})",
                self.colorize("✓ VALID", "32"),
                path_display,
                duration_str
            ),
            ValidationStatus::Invalid { error_count } => {
                let mut output = format!(
                    "{}  {} ({}) - {} error{}",
                    self.colorize("✗ INVALID", "31"),
                    path_display,
                    duration_str,
                    error_count,
                    if *error_count == 1 { "" } else { "s" }
                );
                for error in &result.errors {
                    let location = if error.path.is_empty() {
                        "(root)"
                    } else {
                        error.path.as_str()
                    };
                    output.push_str(&format!("\n    {}: {}", location, error.message));
                }
                output
            }
            ValidationStatus::Error { message } => format!(
                "{}  {} ({}) - {}",
                self.colorize("⚠ ERROR", "33"),
                path_display,
                duration_str,
                message
            ),
            ValidationStatus::Skipped { reason } => format!(
                "{}  {} - {}",
                self.colorize("- SKIPPED", "36"),
                path_display,
                reason
            ),
        }
    }

    fn format_summary(&self, results: &ValidationResults) -> String {
        let mut output = String::new();
        output.push_str("Validation Summary:\n");
        output.push_str(&format!("  Total files: {}\n", results.total_files));
        output.push_str(&format!(
            "  {} {}\n",
            self.colorize("Valid:", "32"),
            results.valid_files
        ));

        if results.invalid_files > 0 {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("Invalid:", "31"),
                results.invalid_files
            ));
        }
        if results.error_files > 0 {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("Errors:", "33"),
                results.error_files
            ));
        }
        if results.skipped_files > 0 {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("Skipped:", "36"),
                results.skipped_files
            ));
        }

        output.push_str(&format!("  Success rate: {:.1}%\n", results.success_rate()));
        output.push_str(&format!(
            "  Duration: {}\n",
            format_duration(results.performance_metrics.total_duration)
        ));

        if self.verbosity >= VerbosityLevel::Verbose {
            output.push_str(&Self::format_performance_metrics(&results.performance_metrics));
        }

        output
    }

    fn format_performance_metrics(metrics: &PerformanceMetrics) -> String {
        let cache = &metrics.schema_cache_stats;
        let mut output = String::new();
        output.push_str("\nPerformance Metrics:\n");
        output.push_str(&format!(
            "  Throughput: {:.1} files/sec\n",
            metrics.throughput_files_per_second
        ));
        output.push_str(&format!(
            "  Concurrent validations: {}\n",
            metrics.concurrent_validations
        ));
        output.push_str(&format!(
            "  Discovery: {}, validation: {}\n",
            format_duration(metrics.discovery_duration),
            format_duration(metrics.validation_duration)
        ));
        output.push_str(&format!(
            "  Schema documents: {} (cached remotely: {} in memory, {} on disk)\n",
            cache.schemas_loaded, cache.memory_entries, cache.disk_entries
        ));
        output
    }

    fn format_debug_info(results: &ValidationResults) -> String {
        let mut output = String::new();
        output.push_str("\nDebug Information:\n");
        output.push_str(&format!("  Schemas used: {}\n", results.schemas_used.len()));
        for (i, schema) in results.schemas_used.iter().enumerate() {
            output.push_str(&format!("    {}: {}\n", i + 1, schema));
        }
        output
    }
}

fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs_f64();
    if total_secs < 1.0 {
        format!("{}ms", duration.as_millis())
    } else if total_secs < 60.0 {
        format!("{:.2}s", total_secs)
    } else {
        let mins = (total_secs / 60.0) as u64;
        let secs = total_secs % 60.0;
        format!("{}m{:.1}s", mins, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ValidationError;
    use crate::error::Error;

    fn create_test_results() -> ValidationResults {
        let schema = "file:///schemas/person.json".to_string();
        ValidationResults::aggregate(vec![
            FileValidationResult::valid("ok.json".into(), schema.clone(), Duration::from_millis(3)),
            FileValidationResult::invalid(
                "bad.json".into(),
                schema,
                Duration::from_millis(5),
                vec![
                    ValidationError {
                        path: String::new(),
                        message: "Does not have a value in the enumeration [1,2]".to_string(),
                    },
                    ValidationError {
                        path: "items[1].price".to_string(),
                        message: "Must be at least 0".to_string(),
                    },
                ],
            ),
            FileValidationResult::error(
                "broken.json".into(),
                Error::Config("unreadable".to_string()),
                Duration::from_millis(1),
            ),
        ])
    }

    fn plain(format: OutputFormat, verbosity: VerbosityLevel) -> Output {
        Output::new(format, verbosity).with_colors(false)
    }

    #[test]
    fn test_human_output_lists_errors_with_paths() {
        let rendered = plain(OutputFormat::Human, VerbosityLevel::Normal)
            .render(&create_test_results())
            .unwrap();

        assert!(rendered.contains("✗ INVALID  bad.json (5ms) - 2 errors"));
        assert!(rendered.contains("    (root): Does not have a value in the enumeration [1,2]"));
        assert!(rendered.contains("    items[1].price: Must be at least 0"));
        assert!(rendered.contains("⚠ ERROR  broken.json"));
        assert!(!rendered.contains("ok.json"));
        assert!(rendered.contains("Validation Summary:"));
    }

    #[test]
    fn test_verbose_output_includes_valid_files_and_metrics() {
        let rendered = plain(OutputFormat::Human, VerbosityLevel::Verbose)
            .render(&create_test_results())
            .unwrap();

        assert!(rendered.contains("✓ VALID  ok.json"));
        assert!(rendered.contains("Performance Metrics:"));
    }

    #[test]
    fn test_quiet_output_has_no_summary() {
        let rendered = plain(OutputFormat::Human, VerbosityLevel::Quiet)
            .render(&create_test_results())
            .unwrap();

        assert!(rendered.contains("bad.json"));
        assert!(!rendered.contains("Validation Summary:"));
    }

    #[test]
    fn test_summary_output() {
        let rendered = plain(OutputFormat::Summary, VerbosityLevel::Normal)
            .render(&create_test_results())
            .unwrap();

        assert!(rendered.starts_with("Validation Summary:"));
        assert!(rendered.contains("Total files: 3"));
        assert!(rendered.contains("Invalid: 1"));
        assert!(!rendered.contains("bad.json"));
    }

    #[test]
    fn test_json_output_is_machine_readable() {
        let rendered = plain(OutputFormat::Json, VerbosityLevel::Normal)
            .render(&create_test_results())
            .unwrap();
        let report: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(report["valid"], false);
        assert_eq!(report["total_files"], 3);
        assert_eq!(report["files"][1]["status"]["status"], "invalid");
        assert_eq!(report["files"][1]["status"]["error_count"], 2);
        assert_eq!(report["files"][1]["errors"][1]["path"], "items[1].price");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m30.0s");
    }
}
