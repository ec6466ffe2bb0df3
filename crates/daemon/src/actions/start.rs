// SPDX-License-Identifier: MIT

//! Start the supervised application. Idempotent: a second start while the
//! process is alive is a warning, never a second instance.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{info, warn};

use super::{ActionError, NodeAction};
use crate::state::DaemonContext;

pub struct StartAction {
    ctx: Arc<DaemonContext>,
}

impl StartAction {
    pub const TYPE: &'static str = "start";

    pub fn new(ctx: Arc<DaemonContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl NodeAction for StartAction {
    async fn execute(&self, _payload: Map<String, Value>) -> Result<(), ActionError> {
        // Upstream liveness hint first, before taking the process lock;
        // the handle check below is authoritative for locally spawned runs.
        if self.ctx.uplink.is_app_alive().await {
            warn!("application reported alive upstream, ignoring start");
            return Ok(());
        }

        let mut process = self.ctx.app_process.lock();
        if let Some(handle) = process.as_mut() {
            if handle.is_alive() {
                warn!(pid = handle.id(), "application already running, ignoring start");
                return Ok(());
            }
        }

        let handle = self.ctx.launcher.spawn()?;
        info!(pid = handle.id(), "application started");
        *process = Some(handle);
        Ok(())
    }
}

#[cfg(test)]
#[path = "start_tests.rs"]
mod tests;
