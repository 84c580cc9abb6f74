use crate::config::{Config, ConfigManager};
use crate::error::{Error, Result};
use reqwest::{Client, Response};
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Number of retry attempts
    pub retry_attempts: u32,
    /// Initial retry delay in milliseconds
    pub retry_delay_ms: u64,
    /// Maximum retry delay in milliseconds (for exponential backoff cap)
    pub max_retry_delay_ms: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            retry_attempts: 3,
            retry_delay_ms: 1000,
            max_retry_delay_ms: 30000,
            user_agent: format!("validate-json/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl From<&Config> for HttpClientConfig {
    fn from(config: &Config) -> Self {
        Self {
            timeout_seconds: config.network.timeout_seconds,
            retry_attempts: config.network.retry_attempts,
            retry_delay_ms: ConfigManager::get_retry_delay_duration(config).as_millis() as u64,
            ..Self::default()
        }
    }
}

impl HttpClientConfig {
    /// Delay before retry number `attempt` (zero based), doubling up to the cap
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 2_u64.saturating_pow(attempt);
        let delay_ms = self.retry_delay_ms.saturating_mul(factor);
        Duration::from_millis(delay_ms.min(self.max_retry_delay_ms))
    }
}

/// Async HTTP client for downloading remote schema documents
pub struct AsyncHttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl AsyncHttpClient {
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .pool_idle_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .build()?;

        Ok(Self { client, config })
    }

    /// Download a schema document with retry and exponential backoff
    pub async fn download_schema(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.get_response_with_retry(url).await?;
        let bytes = response.bytes().await?;
        debug!(url, bytes = bytes.len(), "downloaded schema");
        Ok(bytes.to_vec())
    }

    async fn get_response_with_retry(&self, url: &str) -> Result<Response> {
        let mut attempt = 0;

        loop {
            let error = match self.make_request(url).await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status();
                    Error::HttpStatus {
                        url: url.to_string(),
                        status: status.as_u16(),
                        message: format!(
                            "HTTP {}: {}",
                            status.as_u16(),
                            status.canonical_reason().unwrap_or("Unknown")
                        ),
                    }
                }
                Err(error) => error,
            };

            if attempt >= self.config.retry_attempts || !Self::is_retryable_error(&error) {
                return Err(error);
            }

            let delay = self.config.backoff_delay(attempt);
            warn!(url, attempt = attempt + 1, ?delay, "schema download failed, retrying: {error}");
            sleep(delay).await;
            attempt += 1;
        }
    }

    /// Make a single HTTP request with timeout
    async fn make_request(&self, url: &str) -> Result<Response> {
        timeout(
            Duration::from_secs(self.config.timeout_seconds),
            self.client.get(url).send(),
        )
        .await
        .map_err(|_| Error::Timeout {
            url: url.to_string(),
            timeout_seconds: self.config.timeout_seconds,
        })?
        .map_err(Error::from)
    }

    /// Network failures, timeouts and 5xx responses are retried; 4xx are not
    fn is_retryable_error(error: &Error) -> bool {
        match error {
            Error::Http(reqwest_error) => {
                reqwest_error.is_timeout() || reqwest_error.is_connect() || reqwest_error.is_request()
            }
            Error::HttpStatus { status, .. } => (500..600).contains(status),
            Error::Timeout { .. } => true,
            _ => false,
        }
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }
}
