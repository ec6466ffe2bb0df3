// SPDX-License-Identifier: MIT

//! Persist daemon configuration keys and restart the status publisher with
//! the new schedule. Each key is optional; a failed save is logged and the
//! remaining keys still apply.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{error, info};

use super::{ActionError, NodeAction};
use crate::publisher::StatusPublisher;
use crate::state::DaemonContext;

pub struct SetDaemonConfigAction {
    ctx: Arc<DaemonContext>,
    publisher: Arc<StatusPublisher>,
}

impl SetDaemonConfigAction {
    pub const TYPE: &'static str = "set-daemon-config";

    pub fn new(ctx: Arc<DaemonContext>, publisher: Arc<StatusPublisher>) -> Self {
        Self { ctx, publisher }
    }

    fn save(&self, key: &str, value: Value) {
        if !self.ctx.store.save(key, value) {
            error!(key, "failed to persist daemon config key");
        }
    }
}

#[async_trait]
impl NodeAction for SetDaemonConfigAction {
    async fn execute(&self, payload: Map<String, Value>) -> Result<(), ActionError> {
        info!("setting daemon config");

        if let Some(deployment) = payload.get("deployment-name").and_then(Value::as_str) {
            self.save("deployment", Value::from(deployment));
        }
        if let Some(genesis) = payload.get("genesis").and_then(Value::as_bool) {
            self.save("genesis", Value::from(genesis));
        }
        if let Some(app) = payload.get("app").and_then(Value::as_str) {
            self.save("app", Value::from(app));
        }

        let period = payload.get("period").and_then(Value::as_u64);
        if let Some(period) = period {
            self.save("period", Value::from(period));
        }
        let ttl_factor = payload.get("ttl-factor").and_then(Value::as_u64);
        if let Some(ttl_factor) = ttl_factor {
            self.save("ttl-factor", Value::from(ttl_factor));
        }

        self.publisher.start(period, ttl_factor);
        Ok(())
    }
}

#[cfg(test)]
#[path = "set_config_tests.rs"]
mod tests;
