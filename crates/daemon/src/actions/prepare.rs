// SPDX-License-Identifier: MIT

//! Introducer-side half of the bootstrap protocol.
//!
//! Remembers the bootstrap target so relay messages read from the
//! application can be routed to it, then forwards the action (minus the
//! target, which the application has no use for) so the application can
//! generate bootstrap material.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::info;

use super::{ActionError, NodeAction};
use crate::bridge::BridgeHandle;
use crate::state::DaemonContext;
use warden_core::ActionEnvelope;

pub struct PrepareToBootstrapAction {
    ctx: Arc<DaemonContext>,
    bridge: BridgeHandle,
}

impl PrepareToBootstrapAction {
    pub const TYPE: &'static str = "prepare-to-bootstrap";

    pub fn new(ctx: Arc<DaemonContext>, bridge: BridgeHandle) -> Self {
        Self { ctx, bridge }
    }
}

#[async_trait]
impl NodeAction for PrepareToBootstrapAction {
    async fn execute(&self, mut payload: Map<String, Value>) -> Result<(), ActionError> {
        let target = match payload.remove("target") {
            Some(Value::String(s)) if !s.is_empty() => s,
            Some(Value::String(_)) | None => return Err(ActionError::MissingField("target")),
            Some(_) => {
                return Err(ActionError::InvalidField { field: "target", expected: "a string" })
            }
        };

        // Only one bootstrap target at a time; a newer prepare wins.
        self.ctx.set_bootstrap_target(target.clone());

        let envelope = ActionEnvelope::new(Self::TYPE, payload);
        let line = envelope.to_line()?;
        info!(target, "forwarding prepare-to-bootstrap to application");
        self.bridge.send(line);
        Ok(())
    }
}

#[cfg(test)]
#[path = "prepare_tests.rs"]
mod tests;
