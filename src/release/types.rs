//! Remote release types, shaped like the GitHub Releases API response

use serde::Deserialize;

/// A published release: its tag and the assets attached to it
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteRelease {
    /// Tag name, usually but not always semver-shaped (e.g. "v0.14.1", "nightly")
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

/// A downloadable file attached to a release
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Asset {
    pub name: String,
    pub browser_download_url: String,
}

impl RemoteRelease {
    pub fn new(tag_name: impl Into<String>, assets: Vec<Asset>) -> Self {
        Self {
            tag_name: tag_name.into(),
            assets,
        }
    }
}

impl Asset {
    pub fn new(name: impl Into<String>, browser_download_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            browser_download_url: browser_download_url.into(),
        }
    }
}
