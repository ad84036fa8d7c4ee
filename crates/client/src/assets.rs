//! Fallback stack loaders.
//!
//! The fallback is a fixed `imgstack.json` shipped alongside the viewer,
//! either served over HTTP or read straight from disk. Both loaders decode
//! it exactly like a backend response.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use wildcam_core::error::CoreError;
use wildcam_core::stack::Stack;
use wildcam_pipeline::AssetSource;

use crate::config::ClientConfig;

/// Default location of the fallback stack.
pub const FALLBACK_ASSET_PATH: &str = "assets/imgstack.json";

/// Fetches the fallback stack with a `GET` request.
pub struct HttpAssetSource {
    client: reqwest::Client,
    url: String,
}

impl HttpAssetSource {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl AssetSource for HttpAssetSource {
    async fn fetch_fallback(&self) -> Result<Stack, CoreError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| CoreError::Asset(format!("{}: {e}", self.url)))?;

        let body = response
            .text()
            .await
            .map_err(|e| CoreError::Asset(format!("{}: {e}", self.url)))?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Reads the fallback stack from a local file.
pub struct FileAssetSource {
    path: PathBuf,
}

impl FileAssetSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl AssetSource for FileAssetSource {
    async fn fetch_fallback(&self) -> Result<Stack, CoreError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| CoreError::Asset(format!("{}: {e}", self.path.display())))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Pick the loader matching `config.asset_path`: URLs go over HTTP,
/// anything else is treated as a file path.
pub fn fallback_source(config: &ClientConfig, client: reqwest::Client) -> Arc<dyn AssetSource> {
    let location = config.asset_path.as_str();
    if location.starts_with("http://") || location.starts_with("https://") {
        Arc::new(HttpAssetSource::new(client, location))
    } else {
        Arc::new(FileAssetSource::new(location))
    }
}
