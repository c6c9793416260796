use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;
use semver::{BuildMetadata, Prerelease, Version};

use crate::version::constraint::Constraint;
use crate::version::error::VersionError;

/// Release tag grammar: optional `v`, one to three numeric components,
/// optional pre-release and build suffixes.
static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[vV]?(\d+)(?:\.(\d+))?(?:\.(\d+))?(?:-([0-9A-Za-z.-]+))?(?:\+([0-9A-Za-z.-]+))?$",
    )
    .expect("tag pattern is a valid regex")
});

/// Strip a leading `v` or `V` from a tag.
pub fn strip_v_prefix(tag: &str) -> &str {
    tag.strip_prefix(['v', 'V']).unwrap_or(tag)
}

/// Parse a release tag into a semver::Version.
///
/// Accepts an optional `v` prefix and pads partial versions with zeros.
/// Returns None for anything else, which callers treat as "skip this tag".
///
/// Examples:
/// - "v1" -> Version(1, 0, 0)
/// - "1.2" -> Version(1, 2, 0)
/// - "v0.13.0-beta" -> Version(0, 13, 0, pre: "beta")
pub fn parse_version(tag: &str) -> Option<Version> {
    let caps = TAG_PATTERN.captures(tag)?;

    let number = |i: usize| -> Option<u64> {
        caps.get(i)
            .map_or(Some(0), |m| m.as_str().parse::<u64>().ok())
    };

    let mut version = Version::new(number(1)?, number(2)?, number(3)?);
    if let Some(pre) = caps.get(4) {
        version.pre = Prerelease::new(pre.as_str()).ok()?;
    }
    if let Some(build) = caps.get(5) {
        version.build = BuildMetadata::new(build.as_str()).ok()?;
    }
    Some(version)
}

/// Order two versions by semver precedence, ignoring build metadata.
pub fn compare_precedence(a: &Version, b: &Version) -> Ordering {
    a.major
        .cmp(&b.major)
        .then(a.minor.cmp(&b.minor))
        .then(a.patch.cmp(&b.patch))
        .then_with(|| a.pre.cmp(&b.pre))
}

/// Check whether `version` satisfies `constraint`.
///
/// The constraint is validated first, so a malformed constraint is reported
/// even when the version is malformed too.
pub fn check(version: &str, constraint: &str) -> Result<bool, VersionError> {
    let constraint = Constraint::parse(constraint)?;
    let parsed =
        parse_version(version).ok_or_else(|| VersionError::InvalidVersion(version.to_string()))?;
    Ok(constraint.matches(&parsed))
}

/// Sort tags by semver precedence and return them in their original form.
///
/// Tags that do not parse are dropped. Tags of equal precedence are ordered
/// by their original text, so the result is deterministic and the
/// descending order is the exact reverse of the ascending one.
pub fn sort_keys<'a, I>(keys: I, descending: bool) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut parsed: Vec<(Version, &str)> = keys
        .into_iter()
        .filter_map(|key| parse_version(key).map(|v| (v, key)))
        .collect();

    parsed.sort_by(|(a, a_key), (b, b_key)| compare_precedence(a, b).then_with(|| a_key.cmp(b_key)));

    if descending {
        parsed.reverse();
    }

    parsed.into_iter().map(|(_, key)| key.to_string()).collect()
}
