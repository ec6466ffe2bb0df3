// SPDX-License-Identifier: MIT

//! Forcibly terminate the supervised application.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{error, info, warn};

use super::{ActionError, NodeAction};
use crate::state::DaemonContext;

pub struct KillAction {
    ctx: Arc<DaemonContext>,
}

impl KillAction {
    pub const TYPE: &'static str = "kill";

    pub fn new(ctx: Arc<DaemonContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl NodeAction for KillAction {
    async fn execute(&self, _payload: Map<String, Value>) -> Result<(), ActionError> {
        let mut process = self.ctx.app_process.lock();
        match process.take() {
            Some(mut handle) => {
                let pid = handle.id();
                if let Err(e) = handle.kill() {
                    // Not retried; the handle is dropped either way.
                    error!(pid, error = %e, "failed to kill application");
                } else {
                    info!(pid, "application killed");
                }
            }
            None => warn!("no application process to kill"),
        }
        Ok(())
    }
}
