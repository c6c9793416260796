//! Fetcher trait for materializing a release asset on disk

use std::path::Path;

#[cfg(test)]
use mockall::automock;

use crate::version::error::FetchError;

/// Trait for downloading an asset into a directory
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Retrieves `url` into `destination`
    ///
    /// Archives are unpacked in place; anything else is stored as a single
    /// file. `destination` already exists when this is called.
    async fn fetch(&self, destination: &Path, url: &str) -> Result<(), FetchError>;
}
