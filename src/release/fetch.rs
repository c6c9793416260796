//! Fetch orchestration: create the release directory, hand the transfer to
//! a [`Fetcher`], report where the executable is expected to be.

use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info};

use crate::release::fetcher::Fetcher;
use crate::release::options::Options;
use crate::version::error::ReleaseError;

/// Download the asset at `url` into `releases_path/tag`.
///
/// Returns the path the executable is expected at. The path is predicted
/// from the naming strategy and is not checked after the fetcher returns.
/// A failed fetch is not retried and may leave a partially populated
/// directory behind.
pub async fn fetch_release(
    tag: &str,
    url: &str,
    options: &Options,
    fetcher: &dyn Fetcher,
) -> Result<PathBuf, ReleaseError> {
    let dir = release_dir(options.releases_path(), tag)?;

    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|source| ReleaseError::DirectoryCreate {
            path: dir.clone(),
            source,
        })?;
    debug!("Created release directory {:?}", dir);

    let executable = dir.join(options.executable_name(tag));

    info!("Fetching {} from {}", tag, url);
    fetcher.fetch(&dir, url).await?;
    info!("Fetched {} into {:?}", tag, dir);

    Ok(executable)
}

/// The tag must name exactly one directory below the releases root
fn release_dir(root: &Path, tag: &str) -> Result<PathBuf, ReleaseError> {
    let mut components = Path::new(tag).components();
    let single_normal = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );

    if tag.is_empty() || !single_normal || tag.contains(['/', '\\']) {
        return Err(ReleaseError::DirectoryCreate {
            path: root.join(tag),
            source: io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("tag {tag:?} is not a single directory name"),
            ),
        });
    }

    Ok(root.join(tag))
}
