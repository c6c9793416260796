use std::path::PathBuf;

use thiserror::Error;

/// Errors from the semver engine.
///
/// Callers can tell which side of a `check` was malformed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("Invalid semantic version constraint {constraint:?}: {reason}")]
    InvalidConstraint { constraint: String, reason: String },

    #[error("Invalid semantic version: {0:?}")]
    InvalidVersion(String),
}

impl VersionError {
    pub(crate) fn invalid_constraint(constraint: &str, reason: impl Into<String>) -> Self {
        Self::InvalidConstraint {
            constraint: constraint.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors from listing releases, remote or local
#[derive(Debug, Error)]
pub enum ListError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Rate limited: retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Repository not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Unable to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from transferring or unpacking a release asset
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Download of {url} failed with status {status}")]
    Status { url: String, status: u16 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Archive(String),
}

/// Errors surfaced by the release catalog, tagged with the failing phase
#[derive(Debug, Error)]
pub enum ReleaseError {
    #[error(transparent)]
    InvalidConstraint(VersionError),

    #[error("Unable to list releases: {0}")]
    List(#[from] ListError),

    #[error("Unable to create release directory {path:?}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to download release: {0}")]
    Fetch(#[from] FetchError),
}
