// SPDX-License-Identifier: MIT

//! Action routing: every controller envelope lands here.
//!
//! Recognized types run a registered handler; anything else is forwarded
//! verbatim to the supervised application, making the router a superset
//! dispatcher for application-level commands. Handler failures are logged
//! and never escape dispatch.

mod clear;
mod kill;
mod prepare;
mod pull_configs;
mod push_runtime_configs;
mod rotate_logs;
mod set_config;
mod set_timezone;
mod start;

pub use clear::{ClearArtifactsAction, ClearConfigsAndEtcAction};
pub use kill::KillAction;
pub use prepare::PrepareToBootstrapAction;
pub use pull_configs::PullConfigsAction;
pub use push_runtime_configs::PushRuntimeConfigsAction;
pub use rotate_logs::RotateLogsAction;
pub use set_config::SetDaemonConfigAction;
pub use set_timezone::SetTimezoneAction;
pub use start::StartAction;

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

use crate::bootstrap::{BootstrapAction, BootstrapPhase};
use crate::bridge::BridgeHandle;
use crate::publisher::StatusPublisher;
use crate::state::DaemonContext;
use warden_core::ActionEnvelope;

/// Errors from action handlers. All of them abort the one action only.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("field {field} must be {expected}")]
    InvalidField { field: &'static str, expected: &'static str },

    #[error("bootstrap already in progress (phase {0})")]
    BootstrapInProgress(BootstrapPhase),

    #[error("state store rejected key {0}")]
    StateStore(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Uplink(#[from] crate::adapters::UplinkError),

    #[error(transparent)]
    Protocol(#[from] warden_core::ProtocolError),
}

/// One orchestration action the daemon executes directly.
#[async_trait]
pub trait NodeAction: Send + Sync {
    async fn execute(&self, payload: Map<String, Value>) -> Result<(), ActionError>;
}

/// Pull a required string field out of a payload.
pub(crate) fn required_str(
    payload: &Map<String, Value>,
    field: &'static str,
) -> Result<String, ActionError> {
    match payload.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::String(_)) | None => Err(ActionError::MissingField(field)),
        Some(_) => Err(ActionError::InvalidField { field, expected: "a string" }),
    }
}

/// Static registry mapping action types to handlers, built once at startup
/// so the full set stays auditable in one place.
pub struct ActionRouter {
    actions: HashMap<&'static str, Arc<dyn NodeAction>>,
    bridge: BridgeHandle,
    /// Serializes dispatch: one envelope's synchronous portion completes
    /// before the next begins, regardless of how many controller
    /// connections feed the router.
    gate: tokio::sync::Mutex<()>,
}

impl ActionRouter {
    pub fn new(
        ctx: Arc<DaemonContext>,
        bridge: BridgeHandle,
        publisher: Arc<StatusPublisher>,
    ) -> Self {
        let mut actions: HashMap<&'static str, Arc<dyn NodeAction>> = HashMap::new();

        let start = Arc::new(StartAction::new(Arc::clone(&ctx)));
        actions.insert(StartAction::TYPE, Arc::clone(&start) as Arc<dyn NodeAction>);
        actions.insert(KillAction::TYPE, Arc::new(KillAction::new(Arc::clone(&ctx))));
        actions.insert(
            BootstrapAction::TYPE,
            Arc::new(BootstrapAction::new(Arc::clone(&ctx), start)),
        );
        actions.insert(
            PrepareToBootstrapAction::TYPE,
            Arc::new(PrepareToBootstrapAction::new(Arc::clone(&ctx), bridge.clone())),
        );
        actions.insert(
            PullConfigsAction::TYPE,
            Arc::new(PullConfigsAction::new(Arc::clone(&ctx))),
        );
        actions.insert(
            PushRuntimeConfigsAction::TYPE,
            Arc::new(PushRuntimeConfigsAction::new(Arc::clone(&ctx))),
        );
        actions.insert(
            RotateLogsAction::TYPE,
            Arc::new(RotateLogsAction::new(Arc::clone(&ctx), bridge.clone())),
        );
        actions.insert(
            SetDaemonConfigAction::TYPE,
            Arc::new(SetDaemonConfigAction::new(Arc::clone(&ctx), publisher)),
        );
        actions.insert(SetTimezoneAction::TYPE, Arc::new(SetTimezoneAction));
        actions.insert(
            ClearConfigsAndEtcAction::TYPE,
            Arc::new(ClearConfigsAndEtcAction::new(Arc::clone(&ctx))),
        );
        actions.insert(
            ClearArtifactsAction::TYPE,
            Arc::new(ClearArtifactsAction::new(ctx)),
        );

        Self { actions, bridge, gate: tokio::sync::Mutex::new(()) }
    }

    /// Route one raw envelope line. Malformed input and handler errors are
    /// logged; the router itself never fails.
    pub async fn dispatch(&self, raw: &str) {
        let _gate = self.gate.lock().await;
        debug!(raw, "received action");

        let envelope = match ActionEnvelope::parse(raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                error!(error = %e, "ignoring malformed action");
                return;
            }
        };

        match self.actions.get(envelope.kind.as_str()) {
            Some(handler) => {
                if let Err(e) = handler.execute(envelope.payload).await {
                    error!(action = envelope.kind.as_str(), error = %e, "action failed");
                }
            }
            None => {
                debug!(action = envelope.kind.as_str(), "forwarding action to application");
                self.bridge.send(raw.to_string());
            }
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
