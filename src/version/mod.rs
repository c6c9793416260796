//! Semantic version engine
//!
//! Pure functions for turning release tags into versions, evaluating range
//! constraints and ordering version sets. No I/O happens here.
//!
//! # Modules
//!
//! - [`semver`]: Tolerant tag parsing, `check` and `sort_keys`
//! - [`constraint`]: Range expression parser and matcher
//! - [`error`]: Error types shared across the crate

pub mod constraint;
pub mod error;
pub mod semver;

pub use constraint::Constraint;
pub use error::{FetchError, ListError, ReleaseError, VersionError};
pub use semver::{check, parse_version, sort_keys};
