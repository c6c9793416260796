//! Filesystem lister for installed release directories

use std::path::Path;

use tracing::debug;

use crate::release::lister::DirectoryLister;
use crate::version::error::ListError;

/// Lists the sub-directories of the releases root on the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsDirectoryLister;

impl DirectoryLister for FsDirectoryLister {
    fn list_directories(&self, root: &Path) -> Result<Vec<String>, ListError> {
        let io_error = |source| ListError::Io {
            path: root.to_path_buf(),
            source,
        };

        let mut names = Vec::new();
        for entry in std::fs::read_dir(root).map_err(io_error)? {
            let entry = entry.map_err(io_error)?;
            if !entry.path().is_dir() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(name) => debug!("Skipping non UTF-8 directory name {:?}", name),
            }
        }

        names.sort();
        Ok(names)
    }
}
