//! Fetcher implementations

pub mod archive;
pub mod http;

pub use http::HttpFetcher;
