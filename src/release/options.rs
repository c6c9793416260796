use std::path::{Path, PathBuf};

use crate::config;
use crate::release::naming::NamingStrategy;

/// Immutable configuration for resolving and installing releases.
///
/// A blank OS or architecture is replaced with the running platform's value
/// when the options are built and stays fixed afterwards.
#[derive(Debug, Clone)]
pub struct Options {
    organization: String,
    repository: String,
    os: String,
    arch: String,
    naming: NamingStrategy,
    releases_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct OptionsBuilder {
    organization: String,
    repository: String,
    os: String,
    arch: String,
    naming: NamingStrategy,
    releases_path: Option<PathBuf>,
}

impl Options {
    pub fn builder(
        organization: impl Into<String>,
        repository: impl Into<String>,
        naming: NamingStrategy,
    ) -> OptionsBuilder {
        OptionsBuilder {
            organization: organization.into(),
            repository: repository.into(),
            os: String::new(),
            arch: String::new(),
            naming,
            releases_path: None,
        }
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn os(&self) -> &str {
        &self.os
    }

    pub fn arch(&self) -> &str {
        &self.arch
    }

    pub fn releases_path(&self) -> &Path {
        &self.releases_path
    }

    /// Expected release asset name for `tag` on the configured platform
    pub fn asset_name(&self, tag: &str) -> String {
        self.naming.asset_name(tag, &self.os, &self.arch)
    }

    /// Expected executable name for `tag` on the configured platform
    pub fn executable_name(&self, tag: &str) -> String {
        self.naming.executable_name(tag, &self.os, &self.arch)
    }
}

impl OptionsBuilder {
    pub fn os(mut self, os: impl Into<String>) -> Self {
        self.os = os.into();
        self
    }

    pub fn arch(mut self, arch: impl Into<String>) -> Self {
        self.arch = arch.into();
        self
    }

    /// Directory that holds one sub-directory per installed tag.
    /// Defaults to [`config::default_releases_path`].
    pub fn releases_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.releases_path = Some(path.into());
        self
    }

    pub fn build(self) -> Options {
        Options {
            organization: self.organization,
            repository: self.repository,
            os: or_platform_default(self.os, std::env::consts::OS),
            arch: or_platform_default(self.arch, std::env::consts::ARCH),
            naming: self.naming,
            releases_path: self
                .releases_path
                .unwrap_or_else(config::default_releases_path),
        }
    }
}

fn or_platform_default(value: String, platform: &str) -> String {
    if value.trim().is_empty() {
        platform.to_string()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naming() -> NamingStrategy {
        NamingStrategy::from_templates("fake-service-{os}-{arch}", "fake-service")
    }

    #[test]
    fn build_defaults_blank_platform_to_running_platform() {
        let options = Options::builder("nicholasjackson", "fake-service", naming())
            .os("  ")
            .releases_path("/tmp/releases")
            .build();

        assert_eq!(options.os(), std::env::consts::OS);
        assert_eq!(options.arch(), std::env::consts::ARCH);
    }

    #[test]
    fn build_keeps_explicit_values() {
        let options = Options::builder("nicholasjackson", "fake-service", naming())
            .os("linux")
            .arch("x64")
            .releases_path("/tmp/releases")
            .build();

        assert_eq!(options.organization(), "nicholasjackson");
        assert_eq!(options.repository(), "fake-service");
        assert_eq!(options.os(), "linux");
        assert_eq!(options.arch(), "x64");
        assert_eq!(options.releases_path(), Path::new("/tmp/releases"));
        assert_eq!(options.asset_name("v0.14.1"), "fake-service-linux-x64");
        assert_eq!(options.executable_name("v0.14.1"), "fake-service");
    }

    #[test]
    fn build_falls_back_to_default_releases_path() {
        let options = Options::builder("org", "repo", naming()).build();

        assert_eq!(options.releases_path(), config::default_releases_path());
    }
}
