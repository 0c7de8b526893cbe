//! Release feed client.
//!
//! The feed is a JSON object with a tag name and a list of downloadable
//! assets, as served by the GitHub "latest release" endpoint.

use crate::error::{UpdateError, UpdateResult};
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    #[serde(rename = "browser_download_url")]
    pub download_url: String,
}

impl Release {
    /// First asset whose name contains `fragment`.
    pub fn find_asset(&self, fragment: &str) -> Option<&ReleaseAsset> {
        self.assets.iter().find(|asset| asset.name.contains(fragment))
    }
}

/// Source of release metadata and asset bodies.
pub trait ReleaseClient: Send + Sync {
    fn latest_release(&self) -> impl Future<Output = UpdateResult<Release>> + Send;

    fn download(&self, url: &str) -> impl Future<Output = UpdateResult<Vec<u8>>> + Send;
}

/// HTTP client for a GitHub-style release feed.
pub struct GitHubReleaseClient {
    client: reqwest::Client,
    release_url: String,
}

impl GitHubReleaseClient {
    pub fn new(release_url: impl Into<String>) -> UpdateResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!("mysql-mcp/{}", env!("CARGO_PKG_VERSION")))
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| UpdateError::check(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            release_url: release_url.into(),
        })
    }
}

impl ReleaseClient for GitHubReleaseClient {
    async fn latest_release(&self) -> UpdateResult<Release> {
        debug!(url = %self.release_url, "Fetching latest release");
        let resp = self
            .client
            .get(&self.release_url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| UpdateError::check(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(UpdateError::check(format!("HTTP {}", status)));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| UpdateError::check(e.to_string()))?;
        serde_json::from_slice(&body).map_err(|e| UpdateError::ParseRelease {
            message: e.to_string(),
        })
    }

    async fn download(&self, url: &str) -> UpdateResult<Vec<u8>> {
        debug!(url = %url, "Downloading release asset");
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| UpdateError::download(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(UpdateError::download(format!("HTTP {}", status)));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| UpdateError::download(e.to_string()))?;
        Ok(body.to_vec())
    }
}
