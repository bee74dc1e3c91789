//! HTTP download of GFS wind grids with retry.
//!
//! Transient failures (connection errors, timeouts, 5xx and 429 responses)
//! are retried with exponential backoff. Other 4xx responses fail at once:
//! the file is not published, and asking again will not change that.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use forecast_common::{FetchError, GridFetcher, GridSpec, ResourceKey, WindGrid};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::decode::decode_wind_grid;
use crate::url::{UrlTemplate, DEFAULT_GFS_URL_TEMPLATE};

/// Configuration for the GFS grid fetcher.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Upstream URL template
    pub url_template: String,
    /// Whole-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
    /// Maximum number of retry attempts after the first try
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles each retry)
    pub initial_retry_delay_ms: u64,
    /// Maximum retry delay in milliseconds
    pub max_retry_delay_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_GFS_URL_TEMPLATE.to_string(),
            request_timeout_secs: 60,
            connect_timeout_secs: 10,
            max_retries: 3,
            initial_retry_delay_ms: 500,
            max_retry_delay_ms: 8_000,
        }
    }
}

enum AttemptError {
    Retryable(String),
    Fatal(String),
}

/// Downloads and decodes GFS 10 m wind grids.
pub struct GfsGridFetcher {
    client: Client,
    config: FetchConfig,
    template: UrlTemplate,
    spec: GridSpec,
}

impl GfsGridFetcher {
    /// Create a fetcher producing full 1440 × 720 grids.
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        Self::with_grid_spec(config, GridSpec::gfs_0p25())
    }

    /// Create a fetcher that expects grids of a specific size.
    pub fn with_grid_spec(config: FetchConfig, spec: GridSpec) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .pool_max_idle_per_host(4)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| FetchError::Network(format!("failed to create HTTP client: {e}")))?;

        let template = UrlTemplate::new(config.url_template.clone());
        Ok(Self {
            client,
            config,
            template,
            spec,
        })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Download the raw GRIB2 bytes for `key`, retrying transient failures.
    #[instrument(skip(self), fields(key = %key))]
    pub async fn download(&self, key: &ResourceKey) -> Result<Bytes, FetchError> {
        let url = self.template.render(key);
        let mut retry_count = 0;
        let mut delay = Duration::from_millis(self.config.initial_retry_delay_ms);
        let max_delay = Duration::from_millis(self.config.max_retry_delay_ms);

        loop {
            match self.attempt(&url).await {
                Ok(bytes) => {
                    info!(bytes = bytes.len(), retries = retry_count, "Downloaded GRIB2 file");
                    return Ok(bytes);
                }
                Err(AttemptError::Fatal(message)) => {
                    warn!(url = %url, error = %message, "Download failed, not retrying");
                    return Err(FetchError::Network(message));
                }
                Err(AttemptError::Retryable(message)) => {
                    retry_count += 1;
                    if retry_count > self.config.max_retries {
                        return Err(FetchError::Network(format!(
                            "download failed after {} retries: {}",
                            self.config.max_retries, message
                        )));
                    }

                    warn!(
                        error = %message,
                        retry = retry_count,
                        max_retries = self.config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "Download failed, retrying"
                    );
                    metrics::counter!("wind_upstream_retries_total").increment(1);

                    tokio::time::sleep(delay).await;
                    delay = std::cmp::min(delay * 2, max_delay);
                }
            }
        }
    }

    async fn attempt(&self, url: &str) -> Result<Bytes, AttemptError> {
        debug!(url = %url, "Requesting GRIB2 file");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AttemptError::Retryable(format!("request error: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let message = format!("upstream returned {status}");
            return Err(if is_retryable_status(status) {
                AttemptError::Retryable(message)
            } else {
                AttemptError::Fatal(message)
            });
        }

        response
            .bytes()
            .await
            .map_err(|e| AttemptError::Retryable(format!("body read error: {e}")))
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

#[async_trait]
impl GridFetcher for GfsGridFetcher {
    async fn fetch(&self, key: &ResourceKey) -> Result<WindGrid, FetchError> {
        let started = Instant::now();
        let bytes = self.download(key).await?;

        let spec = self.spec;
        let grid = tokio::task::spawn_blocking(move || decode_wind_grid(&bytes, spec))
            .await
            .map_err(|e| FetchError::Aborted(format!("decode task failed: {e}")))??;

        info!(
            key = %key,
            width = grid.width(),
            height = grid.height(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Decoded wind grid"
        );
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable_status(StatusCode::SERVICE_UNAVAILABLE));
        assert!(is_retryable_status(StatusCode::BAD_GATEWAY));
        assert!(is_retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(!is_retryable_status(StatusCode::NOT_FOUND));
        assert!(!is_retryable_status(StatusCode::FORBIDDEN));
    }

    #[test]
    fn test_config_defaults_for_missing_fields() {
        let config: FetchConfig = serde_json::from_str(r#"{"max_retries": 7}"#).unwrap();
        assert_eq!(config.max_retries, 7);
        assert_eq!(config.url_template, DEFAULT_GFS_URL_TEMPLATE);
        assert_eq!(config.request_timeout_secs, 60);
    }
}
