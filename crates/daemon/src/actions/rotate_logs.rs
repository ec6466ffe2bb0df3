// SPDX-License-Identifier: MIT

//! Back up and/or delete the application's logs. When deleting, the
//! application is also told to clear its internal message store.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{info, warn};

use super::{ActionError, NodeAction};
use crate::bridge::BridgeHandle;
use crate::state::DaemonContext;
use warden_core::ActionEnvelope;

pub struct RotateLogsAction {
    ctx: Arc<DaemonContext>,
    bridge: BridgeHandle,
}

impl RotateLogsAction {
    pub const TYPE: &'static str = "rotate-logs";

    pub fn new(ctx: Arc<DaemonContext>, bridge: BridgeHandle) -> Self {
        Self { ctx, bridge }
    }
}

#[async_trait]
impl NodeAction for RotateLogsAction {
    async fn execute(&self, payload: Map<String, Value>) -> Result<(), ActionError> {
        let backup_id = payload
            .get("backup-id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let delete = payload.get("delete").and_then(Value::as_bool).unwrap_or(true);

        info!(backup_id = backup_id.as_str(), delete, "rotating application logs");
        let logs_dir = &self.ctx.paths.logs_dir;
        if logs_dir.exists() {
            self.ctx.uplink.rotate_logs(logs_dir, delete, &backup_id).await?;
        } else {
            warn!(dir = %logs_dir.display(), "logs directory does not exist");
        }

        if delete {
            // The application keeps its own message history; tell it to
            // clear that too.
            info!("sending delete-messages action to application");
            let envelope = ActionEnvelope::new("delete-messages", Map::new());
            self.bridge.send(envelope.to_line()?);
        }
        Ok(())
    }
}
