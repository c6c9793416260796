//! Release resolution and installation
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  ReleaseLister  │────▶│   Catalog   │────▶│   latest    │
//! │ DirectoryLister │     │  (resolve)  │     │  (select)   │
//! └─────────────────┘     └─────────────┘     └─────────────┘
//!                                                    │
//!                                                    ▼
//!                                             ┌─────────────┐
//!                                             │    fetch    │
//!                                             │  (Fetcher)  │
//!                                             └─────────────┘
//! ```
//!
//! [`ReleaseManager`] wires [`Options`] and the collaborators together.
//!
//! # Modules
//!
//! - [`catalog`]: Constraint-filtered tag -> location mapping and latest selection
//! - [`fetch`]: Creates the release directory and delegates the download
//! - [`manager`]: `Versions` trait and the `ReleaseManager` facade
//! - [`naming`]: Caller-supplied asset/executable naming strategy
//! - [`options`]: Immutable per-repository configuration
//! - [`lister`], [`fetcher`]: Collaborator traits
//! - [`listers`], [`fetchers`]: GitHub, filesystem and HTTP implementations
//! - [`types`]: `RemoteRelease` and `Asset`

pub mod catalog;
pub mod fetch;
pub mod fetcher;
pub mod fetchers;
pub mod lister;
pub mod listers;
pub mod manager;
pub mod naming;
pub mod options;
pub mod types;

pub use catalog::{VersionCatalog, resolve_installed, resolve_remote};
pub use fetch::fetch_release;
pub use fetcher::Fetcher;
pub use lister::{DirectoryLister, ReleaseLister};
pub use manager::{ReleaseManager, Versions};
pub use naming::NamingStrategy;
pub use options::{Options, OptionsBuilder};
pub use types::{Asset, RemoteRelease};
