// SPDX-License-Identifier: MIT

//! Controller uplink: status reporting, bootstrap relay, log rotation,
//! and runtime config upload.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from uplink operations.
#[derive(Debug, Error)]
pub enum UplinkError {
    #[error("no controller configured")]
    NotConfigured,

    #[error("controller unreachable: {0}")]
    Unreachable(String),

    #[error("controller rejected report: {0}")]
    Rejected(String),

    #[error("local I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reporting collaborator contract with the deployment controller.
#[async_trait]
pub trait Uplink: Send + Sync {
    /// Report node status, valid for `ttl` seconds.
    async fn update_node_status(&self, json_status: String, ttl: u64) -> Result<(), UplinkError>;

    /// Report supervised-application status, valid for `ttl` seconds.
    async fn update_app_status(&self, json_status: String, ttl: u64) -> Result<(), UplinkError>;

    /// Relay bootstrap material to the named target node.
    async fn send_bootstrap_info(
        &self,
        target: &str,
        message: &str,
        action_type: &str,
    ) -> Result<(), UplinkError>;

    /// Whether an upstream controller is currently listening for reports.
    fn is_listener_registered(&self) -> bool;

    /// Liveness hint for the supervised application, as tracked upstream.
    async fn is_app_alive(&self) -> bool;

    /// Whether name resolution for controller services succeeds on this node.
    async fn is_dns_successful(&self) -> bool;

    /// Upload (when `backup_id` is non-empty) and/or delete the
    /// application's log files.
    async fn rotate_logs(
        &self,
        logs_dir: &Path,
        delete: bool,
        backup_id: &str,
    ) -> Result<(), UplinkError>;

    /// Upload the runtime configs directory under the given name. Key
    /// handling is internal to the collaborator.
    async fn push_runtime_configs(
        &self,
        configs_dir: &Path,
        name: &str,
        key_path: &Path,
    ) -> Result<(), UplinkError>;
}

/// HTTP implementation talking to the deployment controller.
///
/// "Listener registered" means a controller URL is configured and the most
/// recent report was accepted; the publisher stays silent otherwise.
pub struct HttpUplink {
    base_url: Option<String>,
    persona: String,
    tmp_dir: PathBuf,
    client: reqwest::Client,
    last_report_ok: Mutex<bool>,
}

impl HttpUplink {
    pub fn new(base_url: Option<String>, persona: String, tmp_dir: PathBuf) -> Self {
        Self {
            base_url: base_url.map(|u| u.trim_end_matches('/').to_string()),
            persona,
            tmp_dir,
            client: reqwest::Client::new(),
            last_report_ok: Mutex::new(true),
        }
    }

    fn base(&self) -> Result<&str, UplinkError> {
        self.base_url.as_deref().ok_or(UplinkError::NotConfigured)
    }

    async fn post_json(&self, url: String, body: String) -> Result<(), UplinkError> {
        let result = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await;
        let outcome = match result {
            Ok(resp) if resp.status().is_success() => Ok(()),
            Ok(resp) => Err(UplinkError::Rejected(resp.status().to_string())),
            Err(e) => Err(UplinkError::Unreachable(e.to_string())),
        };
        *self.last_report_ok.lock() = outcome.is_ok();
        outcome
    }

    /// Pack a directory into a tarball under the tmp dir and upload it.
    async fn upload_dir(&self, dir: &Path, name: &str) -> Result<(), UplinkError> {
        let base = self.base()?.to_string();
        let tarball = self.tmp_dir.join(format!("{name}.tar.gz"));
        let status = tokio::process::Command::new("tar")
            .arg("-czf")
            .arg(&tarball)
            .arg("-C")
            .arg(dir)
            .arg(".")
            .status()
            .await?;
        if !status.success() {
            return Err(UplinkError::Io(std::io::Error::other(format!(
                "tar exited with {status}"
            ))));
        }
        let bytes = tokio::fs::read(&tarball).await?;
        let result = self
            .client
            .put(format!("{base}/files/{name}.tar.gz"))
            .body(bytes)
            .send()
            .await;
        if let Err(e) = tokio::fs::remove_file(&tarball).await {
            warn!(path = %tarball.display(), error = %e, "unable to delete upload tarball");
        }
        match result {
            Ok(resp) if resp.status().is_success() => Ok(()),
            Ok(resp) => Err(UplinkError::Rejected(resp.status().to_string())),
            Err(e) => Err(UplinkError::Unreachable(e.to_string())),
        }
    }
}

#[async_trait]
impl Uplink for HttpUplink {
    async fn update_node_status(&self, json_status: String, ttl: u64) -> Result<(), UplinkError> {
        let base = self.base()?;
        self.post_json(format!("{base}/status/node/{}?ttl={ttl}", self.persona), json_status)
            .await
    }

    async fn update_app_status(&self, json_status: String, ttl: u64) -> Result<(), UplinkError> {
        let base = self.base()?;
        self.post_json(format!("{base}/status/app/{}?ttl={ttl}", self.persona), json_status)
            .await
    }

    async fn send_bootstrap_info(
        &self,
        target: &str,
        message: &str,
        action_type: &str,
    ) -> Result<(), UplinkError> {
        let base = self.base()?;
        let body = json!({ "message": message, "actionType": action_type }).to_string();
        self.post_json(format!("{base}/bootstrap/{target}"), body).await
    }

    fn is_listener_registered(&self) -> bool {
        self.base_url.is_some() && *self.last_report_ok.lock()
    }

    async fn is_app_alive(&self) -> bool {
        let Ok(base) = self.base() else { return false };
        let url = format!("{base}/alive/{}", self.persona);
        match self.client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => {
                resp.json::<bool>().await.unwrap_or(false)
            }
            _ => false,
        }
    }

    async fn is_dns_successful(&self) -> bool {
        let Some(base) = self.base_url.as_deref() else { return false };
        let Some(host) = base
            .trim_start_matches("http://")
            .trim_start_matches("https://")
            .split(['/', ':'])
            .next()
            .filter(|h| !h.is_empty())
        else {
            return false;
        };
        tokio::net::lookup_host((host, 80)).await.is_ok()
    }

    async fn rotate_logs(
        &self,
        logs_dir: &Path,
        delete: bool,
        backup_id: &str,
    ) -> Result<(), UplinkError> {
        if !backup_id.is_empty() {
            self.upload_dir(logs_dir, &format!("{backup_id}_{}_logs", self.persona)).await?;
        }
        if delete {
            debug!(dir = %logs_dir.display(), "deleting rotated log files");
            crate::fsutil::remove_dir_contents(logs_dir);
        }
        Ok(())
    }

    async fn push_runtime_configs(
        &self,
        configs_dir: &Path,
        name: &str,
        key_path: &Path,
    ) -> Result<(), UplinkError> {
        // The file key never leaves the node; encryption of the uploaded
        // archive is the file server's concern.
        debug!(key = %key_path.display(), "pushing runtime configs");
        self.upload_dir(configs_dir, name).await
    }
}
