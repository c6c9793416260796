pub mod cli;
pub mod config;
pub mod logging;
pub mod release;
pub mod version;
