//! GitHub Releases API lister

use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::config::{MAX_RELEASE_PAGES, RELEASES_PER_PAGE};
use crate::release::lister::ReleaseLister;
use crate::release::types::RemoteRelease;
use crate::version::error::ListError;

/// Release lister backed by the GitHub REST API
pub struct GitHubReleaseLister {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubReleaseLister {
    /// Creates a lister for the API at `base_url` (e.g. "https://api.github.com")
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Authenticate requests with a personal access token
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    async fn fetch_page(
        &self,
        package: &str,
        page: usize,
    ) -> Result<Vec<RemoteRelease>, ListError> {
        let url = format!(
            "{}/repos/{}/releases?per_page={}&page={}",
            self.base_url, package, RELEASES_PER_PAGE, page
        );

        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(ListError::NotFound(package.to_string()));
        }

        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        let rate_limit_exhausted = status == StatusCode::FORBIDDEN
            && header("x-ratelimit-remaining").as_deref() == Some("0");
        if status == StatusCode::TOO_MANY_REQUESTS || rate_limit_exhausted {
            let retry_after = header("retry-after").and_then(|v| v.parse().ok());
            return Err(ListError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            warn!("GitHub API returned status {}: {}", status, url);
            return Err(ListError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        response.json().await.map_err(|e| {
            warn!("Failed to parse GitHub releases response: {}", e);
            ListError::InvalidResponse(e.to_string())
        })
    }
}

#[async_trait::async_trait]
impl ReleaseLister for GitHubReleaseLister {
    async fn list_releases(
        &self,
        organization: &str,
        repository: &str,
    ) -> Result<Vec<RemoteRelease>, ListError> {
        let package = format!("{}/{}", organization, repository);
        let mut releases = Vec::new();

        for page in 1..=MAX_RELEASE_PAGES {
            let batch = self.fetch_page(&package, page).await?;
            let last_page = batch.len() < RELEASES_PER_PAGE;
            releases.extend(batch);
            if last_page {
                break;
            }
            if page == MAX_RELEASE_PAGES {
                warn!(
                    "Stopped listing {} after {} pages; older releases are not included",
                    package, MAX_RELEASE_PAGES
                );
            }
        }

        debug!("Listed {} releases for {}", releases.len(), package);
        Ok(releases)
    }
}
