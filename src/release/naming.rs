//! Asset naming strategy
//!
//! Maps a (version, OS, architecture) tuple to the file name of the release
//! asset and of the executable it unpacks to. An empty name means the
//! platform has no asset; it is never an error.

use std::fmt;
use std::sync::Arc;

use crate::version::semver::strip_v_prefix;

/// `(version, os, arch) -> file name`
pub type NameFn = Arc<dyn Fn(&str, &str, &str) -> String + Send + Sync>;

#[derive(Clone)]
pub struct NamingStrategy {
    asset: NameFn,
    executable: NameFn,
}

impl NamingStrategy {
    pub fn new<A, E>(asset: A, executable: E) -> Self
    where
        A: Fn(&str, &str, &str) -> String + Send + Sync + 'static,
        E: Fn(&str, &str, &str) -> String + Send + Sync + 'static,
    {
        Self {
            asset: Arc::new(asset),
            executable: Arc::new(executable),
        }
    }

    /// Use one function for both the asset and the executable name
    pub fn uniform<F>(name: F) -> Self
    where
        F: Fn(&str, &str, &str) -> String + Send + Sync + 'static,
    {
        let name: NameFn = Arc::new(name);
        Self {
            asset: Arc::clone(&name),
            executable: name,
        }
    }

    /// Build names from templates with `{version}`, `{os}` and `{arch}`
    /// placeholders, e.g. `fake-service-{os}-{arch}`.
    pub fn from_templates(asset: impl Into<String>, executable: impl Into<String>) -> Self {
        let asset = asset.into();
        let executable = executable.into();
        Self::new(
            move |version, os, arch| render_template(&asset, version, os, arch),
            move |version, os, arch| render_template(&executable, version, os, arch),
        )
    }

    /// Expected asset file name. The tag's `v` prefix is stripped first.
    pub fn asset_name(&self, tag: &str, os: &str, arch: &str) -> String {
        (self.asset)(strip_v_prefix(tag), os, arch)
    }

    /// Expected executable file name. The tag's `v` prefix is stripped first.
    pub fn executable_name(&self, tag: &str, os: &str, arch: &str) -> String {
        (self.executable)(strip_v_prefix(tag), os, arch)
    }
}

impl fmt::Debug for NamingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamingStrategy").finish_non_exhaustive()
    }
}

fn render_template(template: &str, version: &str, os: &str, arch: &str) -> String {
    template
        .replace("{version}", version)
        .replace("{os}", os)
        .replace("{arch}", arch)
}
