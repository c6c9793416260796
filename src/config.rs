use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

// =============================================================================
// GitHub API constants
// =============================================================================

/// Default base URL for the GitHub API
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// User agent sent with every request (GitHub rejects requests without one)
pub const USER_AGENT: &str = concat!("release-catalog/", env!("CARGO_PKG_VERSION"));

/// Releases requested per page (GitHub maximum)
pub const RELEASES_PER_PAGE: usize = 100;

/// Upper bound on pages fetched for a single listing
pub const MAX_RELEASE_PAGES: usize = 10;

/// Default HTTP read timeout in seconds: the longest wait for the next
/// chunk of a response, so large downloads are not cut off
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 300;

/// Timeout for establishing a connection
pub const HTTP_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Environment variable consulted when no token is configured
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unable to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Configuration file structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub github: GitHubConfig,
    pub http: HttpConfig,
    /// Where releases are installed; defaults to [`default_releases_path`]
    pub releases_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct GitHubConfig {
    pub api_url: String,
    pub token: Option<String>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_GITHUB_API_URL.to_string(),
            token: None,
        }
    }
}

impl GitHubConfig {
    /// Configured token, or `$GITHUB_TOKEN` when none is configured
    pub fn resolved_token(&self) -> Option<String> {
        token_with_env(self.token.clone(), std::env::var(GITHUB_TOKEN_ENV).ok())
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl HttpConfig {
    /// Shared HTTP client for the GitHub API and asset downloads
    pub fn client(&self) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
            .read_timeout(Duration::from_secs(self.timeout_secs))
            .build()
    }
}

impl Config {
    /// Load the config file at `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Releases path from the config file, or the default location
    pub fn releases_path(&self) -> PathBuf {
        self.releases_path
            .clone()
            .unwrap_or_else(default_releases_path)
    }
}

/// Returns the path to the data directory for release-catalog.
/// Uses $XDG_DATA_HOME/release-catalog if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/release-catalog,
/// or ./release-catalog if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the default directory releases are installed into.
pub fn default_releases_path() -> PathBuf {
    data_dir().join("releases")
}

/// Returns the path to the default config file.
pub fn default_config_path() -> PathBuf {
    data_dir().join("config.json")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("release-catalog")
}

fn token_with_env(configured: Option<String>, env: Option<String>) -> Option<String> {
    configured
        .filter(|token| !token.is_empty())
        .or(env.filter(|token| !token.is_empty()))
}
