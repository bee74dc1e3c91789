//! The upstream grid source seam.

use async_trait::async_trait;
use thiserror::Error;

use crate::{ResourceKey, WindGrid};

/// Why an upstream grid could not be produced.
///
/// Cloneable so a single failure can be handed to every caller waiting on
/// the same fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Fetch aborted: {0}")]
    Aborted(String),
}

/// Downloads and decodes the grid identified by a resource key.
#[async_trait]
pub trait GridFetcher: Send + Sync {
    async fn fetch(&self, key: &ResourceKey) -> Result<WindGrid, FetchError>;
}
