// SPDX-License-Identifier: MIT

//! Upload the runtime configs of a stopped deployment so the controller can
//! download them. The agent only sequences; archiving and key handling
//! belong to the uplink collaborator.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::info;

use super::{required_str, ActionError, NodeAction};
use crate::state::DaemonContext;

pub struct PushRuntimeConfigsAction {
    ctx: Arc<DaemonContext>,
}

impl PushRuntimeConfigsAction {
    pub const TYPE: &'static str = "push-runtime-configs";

    pub fn new(ctx: Arc<DaemonContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl NodeAction for PushRuntimeConfigsAction {
    async fn execute(&self, payload: Map<String, Value>) -> Result<(), ActionError> {
        info!("pushing runtime configs");
        let name = required_str(&payload, "name")?;

        let configs_dir = &self.ctx.paths.data_configs_dir;
        if !configs_dir.exists() {
            return Err(ActionError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("runtime configs directory {} does not exist", configs_dir.display()),
            )));
        }

        self.ctx
            .uplink
            .push_runtime_configs(configs_dir, &name, &self.ctx.paths.key_file)
            .await?;
        info!("pushing runtime configs complete");
        Ok(())
    }
}
