//! Listing traits for remote releases and installed release directories

use std::path::Path;

#[cfg(test)]
use mockall::automock;

use crate::release::types::RemoteRelease;
use crate::version::error::ListError;

/// Trait for listing the releases published for a repository
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ReleaseLister: Send + Sync {
    /// Fetches every release of `organization/repository`
    ///
    /// # Returns
    /// * `Ok(Vec<RemoteRelease>)` - Releases in the order the host returns them
    /// * `Err(ListError)` - Network failure, rate limiting, unknown repository
    async fn list_releases(
        &self,
        organization: &str,
        repository: &str,
    ) -> Result<Vec<RemoteRelease>, ListError>;
}

/// Trait for listing installed release directories
#[cfg_attr(test, automock)]
pub trait DirectoryLister: Send + Sync {
    /// Names of the immediate sub-directories of `root`
    fn list_directories(&self, root: &Path) -> Result<Vec<String>, ListError>;
}
