//! Semantic version range constraints
//!
//! Supported forms:
//! - `1.2.3`, `=1.2.3` - exact match
//! - `^1.2.3` - compatible with version (>=1.2.3 <2.0.0, narrower for 0.x)
//! - `~1.2.3` - approximately equivalent (>=1.2.3 <1.3.0)
//! - `>=1.2.3`, `>1.2.3`, `<=1.2.3`, `<1.2.3`, `!=1.2.3` - comparison operators
//! - `1.2.x`, `1.x`, `1.2`, `*` - wildcards and partial versions
//! - `1.0.0 - 2.0.0` - hyphen ranges
//! - `>=1.0.0 <2.0.0`, `>=1.0.0, <2.0.0` - AND
//! - `^1.0.0 || ^2.0.0` - OR
//!
//! Versions inside a constraint may carry a `v` prefix (`~v0.12.0`).
//! The empty constraint matches every version.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use semver::{Prerelease, Version};

use crate::version::error::VersionError;
use crate::version::semver::{compare_precedence, strip_v_prefix};

/// A parsed range expression
#[derive(Debug, Clone)]
pub struct Constraint {
    raw: String,
    /// OR of AND-sets. Empty means unconstrained.
    alternatives: Vec<Vec<VersionRange>>,
}

/// Primitive comparator that every range form desugars into
#[derive(Debug, Clone, PartialEq, Eq)]
enum VersionRange {
    Any,
    Exact(Version),
    NotEqual(Version),
    Gt(Version),
    Gte(Version),
    Lt(Version),
    Lte(Version),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Exact,
    NotEqual,
    Gt,
    Gte,
    Lt,
    Lte,
    Caret,
    Tilde,
}

/// Longest operators first so `>=` is not read as `>`
const OPERATORS: &[(&str, Operator)] = &[
    (">=", Operator::Gte),
    ("<=", Operator::Lte),
    ("!=", Operator::NotEqual),
    (">", Operator::Gt),
    ("<", Operator::Lt),
    ("=", Operator::Exact),
    ("^", Operator::Caret),
    ("~", Operator::Tilde),
];

/// A version that may leave trailing components open (`1`, `1.2`, `1.x`)
#[derive(Debug, Clone)]
struct PartialVersion {
    major: Option<u64>,
    minor: Option<u64>,
    patch: Option<u64>,
    pre: Prerelease,
}

impl Constraint {
    /// Parse a range expression. Whitespace-only input is unconstrained.
    pub fn parse(expr: &str) -> Result<Self, VersionError> {
        let trimmed = expr.trim();
        if trimmed.is_empty() {
            return Ok(Self::any());
        }

        let alternatives = trimmed
            .split("||")
            .map(|part| parse_and_set(expr, part.trim()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            raw: expr.to_string(),
            alternatives,
        })
    }

    /// The unconstrained range
    pub fn any() -> Self {
        Self {
            raw: String::new(),
            alternatives: Vec::new(),
        }
    }

    pub fn is_any(&self) -> bool {
        self.alternatives.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Check if a version satisfies any alternative of this constraint
    pub fn matches(&self, version: &Version) -> bool {
        self.is_any()
            || self
                .alternatives
                .iter()
                .any(|set| set_satisfies(set, version))
    }
}

impl FromStr for Constraint {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// All ranges must hold. A pre-release only passes when some bound in the
/// set names a pre-release of the same major.minor.patch.
fn set_satisfies(set: &[VersionRange], version: &Version) -> bool {
    if !set.iter().all(|range| range.satisfies(version)) {
        return false;
    }

    if version.pre.is_empty() {
        return true;
    }

    let bounded = set.iter().any(|range| range.version().is_some());
    !bounded
        || set.iter().filter_map(VersionRange::version).any(|bound| {
            !bound.pre.is_empty()
                && bound.major == version.major
                && bound.minor == version.minor
                && bound.patch == version.patch
        })
}

/// Parse one `||` alternative: a hyphen range or a list of comparators
fn parse_and_set(expr: &str, part: &str) -> Result<Vec<VersionRange>, VersionError> {
    if part.is_empty() {
        return Err(VersionError::invalid_constraint(expr, "empty alternative"));
    }

    if let Some((from, to)) = part.split_once(" - ") {
        return parse_hyphen(expr, from.trim(), to.trim());
    }

    let mut ranges = Vec::new();
    for token in split_tokens(expr, part)? {
        ranges.extend(parse_comparator(expr, &token)?);
    }
    Ok(ranges)
}

/// Split on whitespace and commas, re-attaching operators written apart
/// from their version (`>= 1.2.3`).
fn split_tokens(expr: &str, part: &str) -> Result<Vec<String>, VersionError> {
    let mut tokens = Vec::new();
    let mut pending: Option<&str> = None;

    for raw in part
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
    {
        let is_operator = raw.chars().all(|c| "<>=!^~".contains(c));
        match (pending.take(), is_operator) {
            (Some(op), false) => tokens.push(format!("{op}{raw}")),
            (Some(op), true) => {
                return Err(VersionError::invalid_constraint(
                    expr,
                    format!("operator {op:?} followed by operator {raw:?}"),
                ));
            }
            (None, true) => pending = Some(raw),
            (None, false) => tokens.push(raw.to_string()),
        }
    }

    if let Some(op) = pending {
        return Err(VersionError::invalid_constraint(
            expr,
            format!("operator {op:?} has no version"),
        ));
    }

    Ok(tokens)
}

fn parse_comparator(expr: &str, token: &str) -> Result<Vec<VersionRange>, VersionError> {
    let (op, rest) = OPERATORS
        .iter()
        .find_map(|(prefix, op)| token.strip_prefix(prefix).map(|rest| (Some(*op), rest)))
        .unwrap_or((None, token));

    let partial = PartialVersion::parse(expr, rest)?;

    let Some(major) = partial.major else {
        return match op {
            None
            | Some(
                Operator::Exact | Operator::Gte | Operator::Lte | Operator::Caret | Operator::Tilde,
            ) => Ok(vec![VersionRange::Any]),
            Some(Operator::NotEqual | Operator::Gt | Operator::Lt) => Err(VersionError::invalid_constraint(
                expr,
                format!("{token:?} can never be satisfied"),
            )),
        };
    };

    let floor = partial.floor();
    let ranges = match op {
        None | Some(Operator::Exact) if partial.is_full() => vec![VersionRange::Exact(floor)],
        None | Some(Operator::Exact) => {
            vec![VersionRange::Gte(floor), VersionRange::Lt(partial.next())]
        }
        Some(Operator::NotEqual) if partial.is_full() => vec![VersionRange::NotEqual(floor)],
        Some(Operator::NotEqual) => {
            return Err(VersionError::invalid_constraint(
                expr,
                format!("{token:?} needs a full version"),
            ));
        }
        Some(Operator::Gt) if partial.is_full() => vec![VersionRange::Gt(floor)],
        Some(Operator::Gt) => vec![VersionRange::Gte(partial.next())],
        Some(Operator::Gte) => vec![VersionRange::Gte(floor)],
        Some(Operator::Lt) => vec![VersionRange::Lt(floor)],
        Some(Operator::Lte) if partial.is_full() => vec![VersionRange::Lte(floor)],
        Some(Operator::Lte) => vec![VersionRange::Lt(partial.next())],
        Some(Operator::Tilde) => {
            // ~1.2.3 -> >=1.2.3 <1.3.0, ~1 -> >=1.0.0 <2.0.0
            let upper = match partial.minor {
                Some(minor) => Version::new(major, minor.saturating_add(1), 0),
                None => Version::new(major.saturating_add(1), 0, 0),
            };
            vec![VersionRange::Gte(floor), VersionRange::Lt(upper)]
        }
        Some(Operator::Caret) => {
            // ^1.2.3 -> <2.0.0, ^0.2.3 -> <0.3.0, ^0.0.3 -> <0.0.4
            let upper = match (major, partial.minor, partial.patch) {
                (0, None, _) => Version::new(1, 0, 0),
                (0, Some(0), None) => Version::new(0, 1, 0),
                (0, Some(0), Some(patch)) => Version::new(0, 0, patch.saturating_add(1)),
                (0, Some(minor), _) => Version::new(0, minor.saturating_add(1), 0),
                (major, _, _) => Version::new(major.saturating_add(1), 0, 0),
            };
            vec![VersionRange::Gte(floor), VersionRange::Lt(upper)]
        }
    };

    Ok(ranges)
}

/// Parse hyphen range like "1.0.0 - 2.0.0"
fn parse_hyphen(expr: &str, from: &str, to: &str) -> Result<Vec<VersionRange>, VersionError> {
    let from = PartialVersion::parse(expr, from)?;
    let to = PartialVersion::parse(expr, to)?;

    let mut ranges = Vec::new();
    if from.major.is_some() {
        ranges.push(VersionRange::Gte(from.floor()));
    }
    if to.major.is_some() {
        ranges.push(if to.is_full() {
            VersionRange::Lte(to.floor())
        } else {
            VersionRange::Lt(to.next())
        });
    }
    if ranges.is_empty() {
        ranges.push(VersionRange::Any);
    }
    Ok(ranges)
}

impl VersionRange {
    fn satisfies(&self, version: &Version) -> bool {
        let cmp = |bound: &Version| compare_precedence(version, bound);
        match self {
            VersionRange::Any => true,
            VersionRange::Exact(v) => cmp(v) == Ordering::Equal,
            VersionRange::NotEqual(v) => cmp(v) != Ordering::Equal,
            VersionRange::Gt(v) => cmp(v) == Ordering::Greater,
            VersionRange::Gte(v) => cmp(v) != Ordering::Less,
            VersionRange::Lt(v) => cmp(v) == Ordering::Less,
            VersionRange::Lte(v) => cmp(v) != Ordering::Greater,
        }
    }

    fn version(&self) -> Option<&Version> {
        match self {
            VersionRange::Any => None,
            VersionRange::Exact(v)
            | VersionRange::NotEqual(v)
            | VersionRange::Gt(v)
            | VersionRange::Gte(v)
            | VersionRange::Lt(v)
            | VersionRange::Lte(v) => Some(v),
        }
    }
}

impl PartialVersion {
    fn parse(expr: &str, text: &str) -> Result<Self, VersionError> {
        let invalid = || VersionError::invalid_constraint(expr, format!("invalid version {text:?}"));

        let text = strip_v_prefix(text.trim());
        if text.is_empty() {
            return Err(invalid());
        }

        // build metadata never affects range matching
        let text = text.split_once('+').map_or(text, |(core, _)| core);
        let (core, pre) = match text.split_once('-') {
            Some((core, pre)) => (core, Some(pre)),
            None => (text, None),
        };

        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() > 3 {
            return Err(invalid());
        }

        let mut numbers = [None; 3];
        let mut wildcard_seen = false;
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            if matches!(*part, "x" | "X" | "*") {
                wildcard_seen = true;
                continue;
            }
            if wildcard_seen {
                return Err(invalid());
            }
            *slot = Some(part.parse::<u64>().map_err(|_| invalid())?);
        }

        let [major, minor, patch] = numbers;
        let pre = match pre {
            Some(pre) if patch.is_some() => Prerelease::new(pre).map_err(|_| invalid())?,
            Some(_) => return Err(invalid()),
            None => Prerelease::EMPTY,
        };

        Ok(Self {
            major,
            minor,
            patch,
            pre,
        })
    }

    fn is_full(&self) -> bool {
        self.patch.is_some()
    }

    /// Lowest version covered, open components filled with zeros
    fn floor(&self) -> Version {
        let mut version = Version::new(
            self.major.unwrap_or(0),
            self.minor.unwrap_or(0),
            self.patch.unwrap_or(0),
        );
        version.pre = self.pre.clone();
        version
    }

    /// First version past the range covered by the open components
    fn next(&self) -> Version {
        let major = self.major.unwrap_or(0);
        match (self.minor, self.patch) {
            (None, _) => Version::new(major.saturating_add(1), 0, 0),
            (Some(minor), None) => Version::new(major, minor.saturating_add(1), 0),
            (Some(minor), Some(patch)) => Version::new(major, minor, patch.saturating_add(1)),
        }
    }
}
