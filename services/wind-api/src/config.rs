//! Service configuration loading and types.
//!
//! Everything has a default, so the service starts without a file. A YAML
//! file can override any section:
//!
//! ```yaml
//! fetch:
//!   url_template: "http://mirror.local/gfs.{date}/{cycle:02}/f{offset:03}"
//!   max_retries: 5
//! sampling: bicubic
//! cache:
//!   sweep_interval_secs: 120
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use gfs_source::FetchConfig;
use grid_processor::SamplingMethod;
use serde::Deserialize;

/// Top-level service configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Upstream download settings.
    pub fetch: FetchConfig,

    /// Point sampling strategy.
    pub sampling: SamplingMethod,

    /// Cache maintenance settings.
    pub cache: CacheConfig,
}

/// Cache maintenance settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Seconds between sweeps for expired grids.
    pub sweep_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: 300,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a YAML file.
    ///
    /// A missing file is not an error: the defaults are used instead.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file does not exist, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read: {:?}", path))?;
        let config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse: {:?}", path))?;

        tracing::info!(
            path = %path.display(),
            sampling = ?config.sampling,
            sweep_interval_secs = config.cache.sweep_interval_secs,
            "Loaded service config"
        );
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.cache.sweep_interval_secs.max(1))
    }
}
