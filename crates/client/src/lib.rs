//! `wildcam-client` library crate.
//!
//! HTTP and file-backed implementations of the pipeline's collaborator
//! traits, plus environment configuration. The `wildcam-tv` binary
//! entrypoint lives in `main.rs`.

pub mod api;
pub mod assets;
pub mod config;

pub use api::{StackApi, StackApiError};
pub use assets::{fallback_source, FileAssetSource, HttpAssetSource};
pub use config::{ClientConfig, ConfigError};
