use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use validate_json::{
    AsyncHttpClient, Cli, ConfigManager, EngineConfig, ErrorReporter, FileDiscovery,
    HttpClientConfig, Output, OutputFormat, ProgressCallback, SchemaCache, SchemaLoader,
    ValidationEngine, VerbosityLevel,
};

const EXIT_INVALID: u8 = 1;
const EXIT_FAILURE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_tracing(cli.verbosity());

    match run(&cli).await {
        Ok(code) => code,
        Err(error) => {
            let reporter = ErrorReporter::new(cli.verbosity());
            match error.downcast_ref::<validate_json::Error>() {
                Some(error) => reporter.report_error(error),
                None => match error.downcast_ref::<validate_json::config::ConfigError>() {
                    Some(error) => reporter.report_config_error(error),
                    None => eprintln!("Error: {error:#}"),
                },
            }
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

/// `RUST_LOG` wins; otherwise the level follows `-q`/`-v`
fn init_tracing(verbosity: VerbosityLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.log_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    cli.validate().map_err(anyhow::Error::msg)?;

    let config = ConfigManager::load_config(cli).await?;
    debug!(?config, "effective configuration");

    let verbosity = if cli.quiet || cli.verbose > 0 {
        cli.verbosity()
    } else {
        config.verbosity()
    };
    let format = OutputFormat::from(config.output.format);

    let cache = Arc::new(SchemaCache::new(config.cache.clone()));
    let http_client = AsyncHttpClient::new(HttpClientConfig::from(&config))?;
    let loader = SchemaLoader::new(Arc::clone(&cache), http_client);

    let schema = loader
        .load(&cli.schema)
        .await
        .with_context(|| format!("could not load schema {}", cli.schema))?;

    let validator = schema.validator(config.validation_options());
    let engine = ValidationEngine::new(&schema, validator, EngineConfig::from(&config))
        .with_cache(cache);
    let discovery = FileDiscovery::from_config(&config.files)?;

    let progress = config.validation.show_progress.then(|| {
        let reporter = ErrorReporter::new(verbosity);
        let callback: ProgressCallback = Arc::new(move |progress| {
            if progress.total > 0 && progress.current_file.is_some() {
                reporter.report_progress(
                    progress.completed,
                    progress.total,
                    progress.current_file.as_deref(),
                );
            }
        });
        callback
    });

    let results = engine
        .validate_path_with_progress(&cli.path, &discovery, progress)
        .await?;
    info!(
        total = results.total_files,
        invalid = results.invalid_files,
        errors = results.error_files,
        "validation finished"
    );

    Output::new(format, verbosity).print(&results)?;

    Ok(if results.has_errors() {
        ExitCode::from(EXIT_INVALID)
    } else {
        ExitCode::SUCCESS
    })
}
