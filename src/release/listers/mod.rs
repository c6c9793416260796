//! Lister implementations for remote and installed releases

pub mod github;
pub mod local;

pub use github::GitHubReleaseLister;
pub use local::FsDirectoryLister;
