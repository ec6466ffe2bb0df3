// SPDX-License-Identifier: MIT

//! Change the node's system timezone.

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{error, info};

use super::{required_str, ActionError, NodeAction};

pub struct SetTimezoneAction;

impl SetTimezoneAction {
    pub const TYPE: &'static str = "set-timezone";
}

#[async_trait]
impl NodeAction for SetTimezoneAction {
    async fn execute(&self, payload: Map<String, Value>) -> Result<(), ActionError> {
        let timezone = required_str(&payload, "timezone")?;
        info!(timezone = timezone.as_str(), "setting node timezone");
        let status = tokio::process::Command::new("timedatectl")
            .arg("set-timezone")
            .arg(&timezone)
            .status()
            .await?;
        if !status.success() {
            error!(timezone = timezone.as_str(), %status, "timedatectl failed");
        }
        Ok(())
    }
}
