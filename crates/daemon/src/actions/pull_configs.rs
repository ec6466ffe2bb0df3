// SPDX-License-Identifier: MIT

//! Pull config and etc archives from the deployment file server. Triggered
//! by the controller when a deployment comes up.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::{required_str, ActionError, NodeAction};
use crate::fsutil;
use crate::state::DaemonContext;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

pub struct PullConfigsAction {
    ctx: Arc<DaemonContext>,
}

impl PullConfigsAction {
    pub const TYPE: &'static str = "pull-configs";

    pub fn new(ctx: Arc<DaemonContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl NodeAction for PullConfigsAction {
    async fn execute(&self, payload: Map<String, Value>) -> Result<(), ActionError> {
        info!("pulling configs and etc");
        let deployment = required_str(&payload, "deployment-name")?;

        // State markers first, so status publication reflects the
        // deployment even if the fetches lag or fail.
        if !self.ctx.store.save("deployment", json!(deployment.clone())) {
            return Err(ActionError::StateStore("deployment".to_string()));
        }
        let genesis = self.ctx.store.is_genesis();
        if !self.ctx.store.save("isGenesis", json!(genesis)) {
            return Err(ActionError::StateStore("isGenesis".to_string()));
        }

        if genesis {
            let ctx = Arc::clone(&self.ctx);
            let filename = format!("{deployment}_{}_configs.tar.gz", ctx.persona);
            tokio::spawn(async move {
                let dest = ctx.paths.configs_tar.clone();
                if ctx.fetcher.fetch_named(&filename, &dest, DEFAULT_TIMEOUT).await {
                    debug!(dest = %dest.display(), "downloaded configs");
                    if !ctx.store.save("configsTar", json!(filename)) {
                        error!("failed to record configs tar name");
                    }
                } else {
                    error!(filename, "unable to pull configs");
                }
            });
        } else {
            info!("application not installed, not pulling configs");
        }

        info!("pulling etc");
        let ctx = Arc::clone(&self.ctx);
        let filename = format!("{deployment}_{}_etc.tar.gz", ctx.persona);
        tokio::spawn(async move {
            let tar = ctx.paths.etc_tar.clone();
            if !ctx.fetcher.fetch_named(&filename, &tar, DEFAULT_TIMEOUT).await {
                error!(filename, "unable to pull etc");
                return;
            }
            let etc_dir = ctx.paths.etc_dir.clone();
            debug!(tar = %tar.display(), dest = %etc_dir.display(), "extracting etc archive");
            if let Err(e) = ctx.extractor.extract(&tar, &etc_dir).await {
                error!(error = %e, "failed to extract etc archive");
                return;
            }
            if !fsutil::remove_path(&tar) {
                warn!(path = %tar.display(), "unable to delete etc tar");
            }
            if !ctx.store.save("etcTar", json!(filename)) {
                error!("failed to record etc tar name");
            }
        });

        info!("pulling configs and etc complete");
        Ok(())
    }
}

#[cfg(test)]
#[path = "pull_configs_tests.rs"]
mod tests;
