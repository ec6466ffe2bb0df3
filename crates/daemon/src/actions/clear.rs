// SPDX-License-Identifier: MIT

//! Best-effort clearing of well-known directories and files. Each failed
//! deletion is a warning; the rest proceed.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::info;

use super::{ActionError, NodeAction};
use crate::fsutil;
use crate::state::DaemonContext;

/// Remove bootstrap artifacts (downloaded bundle and extraction dir).
pub struct ClearArtifactsAction {
    ctx: Arc<DaemonContext>,
}

impl ClearArtifactsAction {
    pub const TYPE: &'static str = "clear-artifacts";

    pub fn new(ctx: Arc<DaemonContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl NodeAction for ClearArtifactsAction {
    async fn execute(&self, _payload: Map<String, Value>) -> Result<(), ActionError> {
        info!("clearing artifacts from the node");
        let paths = &self.ctx.paths;
        fsutil::remove_path(&paths.bundle_file);
        fsutil::remove_path(&paths.bundle_dir);
        info!("cleared artifacts from the node");
        Ok(())
    }
}

/// Remove runtime configs, downloaded config/etc tars, and etc files.
pub struct ClearConfigsAndEtcAction {
    ctx: Arc<DaemonContext>,
}

impl ClearConfigsAndEtcAction {
    pub const TYPE: &'static str = "clear-configs-and-etc";

    pub fn new(ctx: Arc<DaemonContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl NodeAction for ClearConfigsAndEtcAction {
    async fn execute(&self, _payload: Map<String, Value>) -> Result<(), ActionError> {
        info!("clearing configs and etc from the node");
        let paths = &self.ctx.paths;
        if paths.data_configs_dir.is_dir() {
            fsutil::remove_dir_contents(&paths.data_configs_dir);
        }
        fsutil::remove_path(&paths.configs_tar);
        if paths.etc_dir.is_dir() {
            fsutil::remove_dir_contents(&paths.etc_dir);
        }
        fsutil::remove_path(&paths.etc_tar);
        info!("cleared configs and etc from the node");
        Ok(())
    }
}

#[cfg(test)]
#[path = "clear_tests.rs"]
mod tests;
