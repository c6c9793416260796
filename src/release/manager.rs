//! Release manager: wires [`Options`] to the listing and fetching
//! collaborators and exposes the resolve/select/install operations.

use std::path::PathBuf;
use std::sync::Arc;

#[cfg(test)]
use mockall::automock;
use tracing::{debug, info};

use crate::config::Config;
use crate::release::catalog::{VersionCatalog, installed_catalog, parse_constraint, remote_catalog};
use crate::release::fetch::fetch_release;
use crate::release::fetcher::Fetcher;
use crate::release::fetchers::HttpFetcher;
use crate::release::lister::{DirectoryLister, ReleaseLister};
use crate::release::listers::{FsDirectoryLister, GitHubReleaseLister};
use crate::release::options::Options;
use crate::version::error::ReleaseError;

/// Operations for managing the releases of one repository
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Versions: Send + Sync {
    /// Remote releases matching `constraint` that have an asset for the
    /// configured platform, as tag -> download URL
    async fn list_releases(&self, constraint: &str) -> Result<VersionCatalog, ReleaseError>;

    /// Highest remote release matching `constraint`, as (tag, download URL)
    async fn latest_release(
        &self,
        constraint: &str,
    ) -> Result<Option<(String, String)>, ReleaseError>;

    /// Download and unpack a release; returns the expected executable path
    async fn download_release(&self, tag: &str, url: &str) -> Result<PathBuf, ReleaseError>;

    /// Installed releases matching `constraint`, as tag -> executable path
    fn list_installed(&self, constraint: &str) -> Result<VersionCatalog, ReleaseError>;

    /// Highest installed release matching `constraint`, as (tag, executable path)
    fn installed_version(
        &self,
        constraint: &str,
    ) -> Result<Option<(String, String)>, ReleaseError>;
}

pub struct ReleaseManager {
    options: Options,
    lister: Arc<dyn ReleaseLister>,
    directories: Arc<dyn DirectoryLister>,
    fetcher: Arc<dyn Fetcher>,
}

impl ReleaseManager {
    pub fn new(
        options: Options,
        lister: Arc<dyn ReleaseLister>,
        directories: Arc<dyn DirectoryLister>,
        fetcher: Arc<dyn Fetcher>,
    ) -> Self {
        Self {
            options,
            lister,
            directories,
            fetcher,
        }
    }

    /// Manager backed by the GitHub API, the local filesystem and HTTP downloads
    pub fn from_config(options: Options, config: &Config) -> Result<Self, reqwest::Error> {
        let client = config.http.client()?;
        let lister = GitHubReleaseLister::new(client.clone(), &config.github.api_url)
            .with_token(config.github.resolved_token());

        Ok(Self::new(
            options,
            Arc::new(lister),
            Arc::new(FsDirectoryLister),
            Arc::new(HttpFetcher::new(client)),
        ))
    }

    pub fn options(&self) -> &Options {
        &self.options
    }
}

#[async_trait::async_trait]
impl Versions for ReleaseManager {
    async fn list_releases(&self, constraint: &str) -> Result<VersionCatalog, ReleaseError> {
        let constraint = parse_constraint(constraint)?;

        info!(
            "Listing releases for {}/{}",
            self.options.organization(),
            self.options.repository()
        );
        let releases = self
            .lister
            .list_releases(self.options.organization(), self.options.repository())
            .await?;
        debug!("Found {} releases", releases.len());

        let catalog = remote_catalog(&releases, &constraint, &self.options);
        info!(
            "{} releases match {:?} on {}/{}",
            catalog.len(),
            constraint.as_str(),
            self.options.os(),
            self.options.arch()
        );
        Ok(catalog)
    }

    async fn latest_release(
        &self,
        constraint: &str,
    ) -> Result<Option<(String, String)>, ReleaseError> {
        Ok(self.list_releases(constraint).await?.latest())
    }

    async fn download_release(&self, tag: &str, url: &str) -> Result<PathBuf, ReleaseError> {
        fetch_release(tag, url, &self.options, self.fetcher.as_ref()).await
    }

    fn list_installed(&self, constraint: &str) -> Result<VersionCatalog, ReleaseError> {
        let constraint = parse_constraint(constraint)?;

        let root = self.options.releases_path();
        debug!("Listing installed releases in {:?}", root);
        let entries = self.directories.list_directories(root)?;

        Ok(installed_catalog(&entries, &constraint, &self.options))
    }

    fn installed_version(
        &self,
        constraint: &str,
    ) -> Result<Option<(String, String)>, ReleaseError> {
        Ok(self.list_installed(constraint)?.latest())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::fetcher::MockFetcher;
    use crate::release::lister::{MockDirectoryLister, MockReleaseLister};
    use crate::release::naming::NamingStrategy;
    use crate::release::types::{Asset, RemoteRelease};
    use crate::version::error::ListError;
    use std::path::Path;

    fn options() -> Options {
        Options::builder(
            "nicholasjackson",
            "fake-service",
            NamingStrategy::from_templates("fake-service-{os}", "fake-service-{os}"),
        )
        .os("linux")
        .arch("x64")
        .releases_path("/opt/releases")
        .build()
    }

    fn manager(
        lister: MockReleaseLister,
        directories: MockDirectoryLister,
        fetcher: MockFetcher,
    ) -> ReleaseManager {
        ReleaseManager::new(options(), Arc::new(lister), Arc::new(directories), Arc::new(fetcher))
    }

    fn lister_returning(tags: &'static [&'static str]) -> MockReleaseLister {
        let mut lister = MockReleaseLister::new();
        lister
            .expect_list_releases()
            .withf(|org, repo| org == "nicholasjackson" && repo == "fake-service")
            .returning(move |_, _| {
                Ok(tags
                    .iter()
                    .map(|tag| {
                        RemoteRelease::new(
                            *tag,
                            vec![Asset::new(
                                "fake-service-linux",
                                format!("https://example.com/{tag}/fake-service-linux"),
                            )],
                        )
                    })
                    .collect())
            });
        lister
    }

    #[tokio::test]
    async fn latest_release_picks_highest_matching_tag() {
        let manager = manager(
            lister_returning(&["v0.13.0-beta", "v0.12.2", "nightly", "v0.12.0"]),
            MockDirectoryLister::new(),
            MockFetcher::new(),
        );

        let latest = manager.latest_release("~v0.12.0").await.unwrap();

        assert_eq!(
            latest,
            Some((
                "v0.12.2".to_string(),
                "https://example.com/v0.12.2/fake-service-linux".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn latest_release_is_none_when_nothing_matches() {
        let manager = manager(
            lister_returning(&["v0.12.2", "v0.13.0"]),
            MockDirectoryLister::new(),
            MockFetcher::new(),
        );

        assert_eq!(manager.latest_release("~1.0.0").await.unwrap(), None);
    }

    #[tokio::test]
    async fn list_releases_validates_constraint_before_listing() {
        let mut lister = MockReleaseLister::new();
        lister.expect_list_releases().never();
        let manager = manager(lister, MockDirectoryLister::new(), MockFetcher::new());

        let result = manager.list_releases("not-a-range").await;

        assert!(matches!(result, Err(ReleaseError::InvalidConstraint(_))));
    }

    #[tokio::test]
    async fn list_releases_surfaces_listing_failure() {
        let mut lister = MockReleaseLister::new();
        lister
            .expect_list_releases()
            .times(1)
            .returning(|_, _| Err(ListError::NotFound("nicholasjackson/fake-service".to_string())));
        let manager = manager(lister, MockDirectoryLister::new(), MockFetcher::new());

        let result = manager.list_releases("").await;

        assert!(matches!(result, Err(ReleaseError::List(ListError::NotFound(_)))));
    }

    #[test]
    fn installed_version_picks_highest_directory() {
        let mut directories = MockDirectoryLister::new();
        directories
            .expect_list_directories()
            .withf(|root| root == Path::new("/opt/releases"))
            .returning(|_| Ok(vec!["v0.14.1".to_string(), "v0.14.2".to_string()]));
        let manager = manager(MockReleaseLister::new(), directories, MockFetcher::new());

        let installed = manager.installed_version("~v0.14.0").unwrap();

        let expected = Path::new("/opt/releases/v0.14.2/fake-service-linux");
        assert_eq!(
            installed,
            Some(("v0.14.2".to_string(), expected.to_string_lossy().into_owned()))
        );
    }

    #[test]
    fn list_installed_surfaces_listing_failure() {
        let mut directories = MockDirectoryLister::new();
        directories.expect_list_directories().returning(|root| {
            Err(ListError::Io {
                path: root.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        });
        let manager = manager(MockReleaseLister::new(), directories, MockFetcher::new());

        let result = manager.list_installed("");

        assert!(matches!(result, Err(ReleaseError::List(ListError::Io { .. }))));
    }

    #[tokio::test]
    async fn download_release_delegates_to_fetcher() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let options = Options::builder(
            "nicholasjackson",
            "fake-service",
            NamingStrategy::from_templates("fake-service-{os}", "fake-service-{os}"),
        )
        .os("linux")
        .releases_path(temp_dir.path())
        .build();

        let mut fetcher = MockFetcher::new();
        fetcher.expect_fetch().times(1).returning(|_, _| Ok(()));
        let manager = ReleaseManager::new(
            options,
            Arc::new(MockReleaseLister::new()),
            Arc::new(MockDirectoryLister::new()),
            Arc::new(fetcher),
        );

        let path = manager
            .download_release("v0.12.2", "https://example.com/fake-service-linux")
            .await
            .unwrap();

        assert_eq!(path, temp_dir.path().join("v0.12.2").join("fake-service-linux"));
    }
}
