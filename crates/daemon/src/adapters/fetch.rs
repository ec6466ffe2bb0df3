// SPDX-License-Identifier: MIT

//! File retrieval collaborator.
//!
//! The agent never retries a fetch; the collaborator itself retries
//! internally until the caller's deadline expires.

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// Asynchronous file retrieval. Returns `true` on success; expiry of the
/// timeout is reported identically to any other failure.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch an absolute URL to a local path.
    async fn fetch_url(&self, url: &str, dest: &Path, timeout: Duration) -> bool;

    /// Fetch a named file from the deployment file server.
    async fn fetch_named(&self, filename: &str, dest: &Path, timeout: Duration) -> bool;
}

/// HTTP fetcher that polls until the deadline.
pub struct HttpFetcher {
    file_server_url: Option<String>,
    client: reqwest::Client,
    poll_interval: Duration,
}

impl HttpFetcher {
    pub fn new(file_server_url: Option<String>) -> Self {
        Self {
            file_server_url: file_server_url.map(|u| u.trim_end_matches('/').to_string()),
            client: reqwest::Client::new(),
            poll_interval: Duration::from_secs(2),
        }
    }

    async fn try_once(&self, url: &str, dest: &Path) -> Result<(), String> {
        let resp = self.client.get(url).send().await.map_err(|e| e.to_string())?;
        if !resp.status().is_success() {
            return Err(format!("server returned {}", resp.status()));
        }
        let bytes = resp.bytes().await.map_err(|e| e.to_string())?;
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| e.to_string())?;
        }
        tokio::fs::write(dest, &bytes).await.map_err(|e| e.to_string())?;
        debug!(url, dest = %dest.display(), bytes = bytes.len(), "fetched file");
        Ok(())
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_url(&self, url: &str, dest: &Path, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            match self.try_once(url, dest).await {
                Ok(()) => return true,
                Err(e) if tokio::time::Instant::now() + self.poll_interval < deadline => {
                    debug!(url, error = %e, "fetch attempt failed, retrying");
                    tokio::time::sleep(self.poll_interval).await;
                }
                Err(e) => {
                    warn!(url, error = %e, "fetch failed and deadline expired");
                    return false;
                }
            }
        }
    }

    async fn fetch_named(&self, filename: &str, dest: &Path, timeout: Duration) -> bool {
        let Some(base) = self.file_server_url.as_deref() else {
            warn!(filename, "no file server configured, cannot fetch");
            return false;
        };
        self.fetch_url(&format!("{base}/files/{filename}"), dest, timeout).await
    }
}
