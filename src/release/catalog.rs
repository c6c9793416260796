//! Release catalog resolution
//!
//! Turns a remote release listing or the names of installed directories
//! into a [`VersionCatalog`]: tag -> location (asset URL or executable path).

use std::collections::HashMap;
use std::collections::hash_map;

use tracing::debug;

use crate::release::options::Options;
use crate::release::types::RemoteRelease;
use crate::version::constraint::Constraint;
use crate::version::error::ReleaseError;
use crate::version::semver::{parse_version, sort_keys};

/// Mapping from original tag text to a location.
///
/// Carries no order; use [`VersionCatalog::sorted_tags`] or
/// [`VersionCatalog::latest`] to rank it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionCatalog {
    entries: HashMap<String, String>,
}

impl VersionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: impl Into<String>, location: impl Into<String>) {
        self.entries.insert(tag.into(), location.into());
    }

    pub fn get(&self, tag: &str) -> Option<&str> {
        self.entries.get(tag).map(String::as_str)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.entries.contains_key(tag)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Tags ordered by semver precedence. Tags that are not valid semver
    /// are left out.
    pub fn sorted_tags(&self, descending: bool) -> Vec<String> {
        sort_keys(self.entries.keys().map(String::as_str), descending)
    }

    /// Tags that are not valid semver, in text order
    pub fn unversioned_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self
            .entries
            .keys()
            .filter(|tag| parse_version(tag).is_none())
            .cloned()
            .collect();
        tags.sort();
        tags
    }

    /// The highest version and its location, or None when no tag parses
    pub fn latest(&self) -> Option<(String, String)> {
        let tag = self.sorted_tags(false).pop()?;
        let location = self.entries.get(&tag)?.clone();
        Some((tag, location))
    }

    pub fn into_inner(self) -> HashMap<String, String> {
        self.entries
    }
}

impl FromIterator<(String, String)> for VersionCatalog {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for VersionCatalog {
    type Item = (String, String);
    type IntoIter = hash_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Parse a caller-supplied constraint. A syntax error is fatal for the call.
pub(crate) fn parse_constraint(constraint: &str) -> Result<Constraint, ReleaseError> {
    Constraint::parse(constraint).map_err(ReleaseError::InvalidConstraint)
}

/// Whether a tag passes the constraint. With no constraint every tag
/// passes, semver or not; otherwise tags that do not parse are skipped.
fn admits(constraint: &Constraint, tag: &str) -> bool {
    if constraint.is_any() {
        return true;
    }

    match parse_version(tag) {
        Some(version) => constraint.matches(&version),
        None => {
            debug!("Skipping tag {:?}: not a semantic version", tag);
            false
        }
    }
}

/// Resolve remote releases into tag -> asset download URL
///
/// A release is kept when its tag satisfies `constraint` and it carries an
/// asset whose name matches the naming strategy, case-insensitively. The
/// first matching asset wins.
pub fn resolve_remote(
    releases: &[RemoteRelease],
    constraint: &str,
    options: &Options,
) -> Result<VersionCatalog, ReleaseError> {
    let constraint = parse_constraint(constraint)?;
    Ok(remote_catalog(releases, &constraint, options))
}

pub(crate) fn remote_catalog(
    releases: &[RemoteRelease],
    constraint: &Constraint,
    options: &Options,
) -> VersionCatalog {
    let mut catalog = VersionCatalog::new();

    for release in releases {
        if !admits(constraint, &release.tag_name) {
            continue;
        }

        let expected = options.asset_name(&release.tag_name);
        if expected.is_empty() {
            debug!(
                "No asset name for {} on {}/{}",
                release.tag_name,
                options.os(),
                options.arch()
            );
            continue;
        }

        match release
            .assets
            .iter()
            .find(|asset| asset.name.eq_ignore_ascii_case(&expected))
        {
            Some(asset) => catalog.insert(&release.tag_name, &asset.browser_download_url),
            None => debug!("Release {} has no asset named {}", release.tag_name, expected),
        }
    }

    catalog
}

/// Resolve installed release directories into tag -> executable path
///
/// Only builds the path; the executable is not checked for existence.
/// Entries for which the naming strategy yields no executable name are
/// left out.
pub fn resolve_installed<S: AsRef<str>>(
    entries: &[S],
    constraint: &str,
    options: &Options,
) -> Result<VersionCatalog, ReleaseError> {
    let constraint = parse_constraint(constraint)?;
    Ok(installed_catalog(entries, &constraint, options))
}

pub(crate) fn installed_catalog<S: AsRef<str>>(
    entries: &[S],
    constraint: &Constraint,
    options: &Options,
) -> VersionCatalog {
    entries
        .iter()
        .map(AsRef::as_ref)
        .filter(|tag| admits(constraint, tag))
        .filter_map(|tag| {
            let executable = options.executable_name(tag);
            if executable.is_empty() {
                debug!(
                    "No executable name for {} on {}/{}",
                    tag,
                    options.os(),
                    options.arch()
                );
                return None;
            }
            let path = options.releases_path().join(tag).join(executable);
            Some((tag.to_string(), path.to_string_lossy().into_owned()))
        })
        .collect()
}
