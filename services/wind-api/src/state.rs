//! Application state for the wind API.

use std::sync::Arc;

use anyhow::{Context, Result};
use forecast_common::{Clock, GridFetcher, SystemClock};
use gfs_source::GfsGridFetcher;
use grid_processor::{ForecastGridCache, GridSampler, WindForecastService};
use metrics_exporter_prometheus::PrometheusHandle;

use crate::config::ServiceConfig;

/// Shared application state.
pub struct AppState {
    /// Wind lookups backed by the process-local grid cache.
    pub service: WindForecastService,

    /// Renders `/metrics`; absent when no recorder is installed.
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(service: WindForecastService, prometheus: Option<PrometheusHandle>) -> Self {
        Self {
            service,
            prometheus,
        }
    }

    /// Wire the production collaborators from configuration.
    pub fn from_config(config: &ServiceConfig, prometheus: Option<PrometheusHandle>) -> Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let fetcher: Arc<dyn GridFetcher> = Arc::new(
            GfsGridFetcher::new(config.fetch.clone())
                .context("Failed to create GFS grid fetcher")?,
        );
        let cache = ForecastGridCache::new(Arc::clone(&clock));
        let sampler = GridSampler::new(config.sampling);

        tracing::info!(
            url_template = %config.fetch.url_template,
            sampling = sampler.strategy_name(),
            "Initialized wind forecast service"
        );

        Ok(Self::new(
            WindForecastService::new(cache, fetcher, sampler, clock),
            prometheus,
        ))
    }
}
