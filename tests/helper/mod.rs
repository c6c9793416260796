//! Fake collaborators for integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use release_catalog::release::{
    Asset, DirectoryLister, Fetcher, NamingStrategy, Options, ReleaseLister, RemoteRelease,
};
use release_catalog::version::error::{FetchError, ListError};

/// In-memory release host keyed by `organization/repository`
#[derive(Default)]
pub struct FakeReleaseLister {
    releases: HashMap<String, Vec<RemoteRelease>>,
}

impl FakeReleaseLister {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a release whose assets are served from `https://example.com/{tag}/{asset}`
    pub fn with_release(mut self, repository: &str, tag: &str, assets: &[&str]) -> Self {
        let assets = assets
            .iter()
            .map(|name| Asset::new(*name, download_url(tag, name)))
            .collect();
        self.releases
            .entry(repository.to_string())
            .or_default()
            .push(RemoteRelease::new(tag, assets));
        self
    }
}

#[async_trait]
impl ReleaseLister for FakeReleaseLister {
    async fn list_releases(
        &self,
        organization: &str,
        repository: &str,
    ) -> Result<Vec<RemoteRelease>, ListError> {
        let key = format!("{organization}/{repository}");
        match self.releases.get(&key) {
            Some(releases) => Ok(releases.clone()),
            None => Err(ListError::NotFound(key)),
        }
    }
}

/// Directory lister returning a fixed set of names
pub struct FakeDirectoryLister {
    names: Vec<String>,
}

impl FakeDirectoryLister {
    pub fn new(names: &[&str]) -> Self {
        Self {
            names: names.iter().map(|n| n.to_string()).collect(),
        }
    }
}

impl DirectoryLister for FakeDirectoryLister {
    fn list_directories(&self, _root: &Path) -> Result<Vec<String>, ListError> {
        Ok(self.names.clone())
    }
}

/// Fetcher that writes `url` into a file named `executable` and records the call
pub struct RecordingFetcher {
    executable: String,
    calls: Mutex<Vec<(PathBuf, String)>>,
}

impl RecordingFetcher {
    pub fn new(executable: &str) -> Self {
        Self {
            executable: executable.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(PathBuf, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for RecordingFetcher {
    async fn fetch(&self, destination: &Path, url: &str) -> Result<(), FetchError> {
        self.calls
            .lock()
            .unwrap()
            .push((destination.to_path_buf(), url.to_string()));
        std::fs::write(destination.join(&self.executable), url)?;
        Ok(())
    }
}

pub fn download_url(tag: &str, asset: &str) -> String {
    format!("https://example.com/{tag}/{asset}")
}

/// Naming used by the fake-service releases: assets exist for linux and darwin only
pub fn fake_service_naming() -> NamingStrategy {
    NamingStrategy::uniform(|_version, os, _arch| match os {
        "linux" | "darwin" => format!("fake-service-{os}"),
        _ => String::new(),
    })
}

pub fn fake_service_options(os: &str, releases_path: &Path) -> Options {
    Options::builder("nicholasjackson", "fake-service", fake_service_naming())
        .os(os)
        .arch("amd64")
        .releases_path(releases_path)
        .build()
}
