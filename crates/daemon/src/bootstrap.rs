// SPDX-License-Identifier: MIT

//! New-node side of the bootstrap protocol: fetch the bundle an introducer
//! published, extract it, run its install procedure, and start the
//! application.
//!
//! Each phase runs exactly once; any failure stops the chain, records
//! FAILED, and leaves completed phases' artifacts in place for diagnosis.
//! Retrying means resending the whole bootstrap action.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::actions::{required_str, ActionError, NodeAction, StartAction};
use crate::adapters::InstallOutcome;
use crate::fsutil;
use crate::state::DaemonContext;

const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Phase of this node's own bundle install.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapPhase {
    Idle,
    FetchingBundle,
    Extracting,
    Installing,
    Starting,
    Complete,
    Failed,
}

impl BootstrapPhase {
    /// Whether a new bootstrap may begin. In-flight phases reject overlap;
    /// terminal phases may be restarted by a fresh action.
    pub fn can_begin(&self) -> bool {
        matches!(self, BootstrapPhase::Idle | BootstrapPhase::Complete | BootstrapPhase::Failed)
    }
}

impl fmt::Display for BootstrapPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BootstrapPhase::Idle => "idle",
            BootstrapPhase::FetchingBundle => "fetching-bundle",
            BootstrapPhase::Extracting => "extracting",
            BootstrapPhase::Installing => "installing",
            BootstrapPhase::Starting => "starting",
            BootstrapPhase::Complete => "complete",
            BootstrapPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Handler for the `bootstrap` action. Claims the phase guard
/// synchronously, then runs the install chain as a spawned continuation so
/// dispatch returns immediately.
pub struct BootstrapAction {
    ctx: Arc<DaemonContext>,
    start: Arc<StartAction>,
}

impl BootstrapAction {
    pub const TYPE: &'static str = "bootstrap";

    pub fn new(ctx: Arc<DaemonContext>, start: Arc<StartAction>) -> Self {
        Self { ctx, start }
    }
}

#[async_trait]
impl NodeAction for BootstrapAction {
    async fn execute(&self, payload: Map<String, Value>) -> Result<(), ActionError> {
        let bundle_url = required_str(&payload, "bootstrap-bundle-url")?;
        let timeout_secs = match payload.get("timeout-secs") {
            Some(value) => value.as_u64().ok_or(ActionError::InvalidField {
                field: "timeout-secs",
                expected: "a non-negative integer",
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        {
            let mut phase = self.ctx.bootstrap_phase.lock();
            if !phase.can_begin() {
                return Err(ActionError::BootstrapInProgress(*phase));
            }
            *phase = BootstrapPhase::FetchingBundle;
        }

        info!(url = bundle_url.as_str(), timeout_secs, "bootstrapping application");
        let ctx = Arc::clone(&self.ctx);
        let start = Arc::clone(&self.start);
        tokio::spawn(async move {
            run_bundle_install(ctx, start, bundle_url, Duration::from_secs(timeout_secs)).await;
        });
        Ok(())
    }
}

/// Drive the phase machine to a terminal state. Entered with the phase
/// already set to FetchingBundle by the handler.
pub(crate) async fn run_bundle_install(
    ctx: Arc<DaemonContext>,
    start: Arc<StartAction>,
    bundle_url: String,
    timeout: Duration,
) {
    loop {
        let phase = ctx.bootstrap_phase();
        let next = match phase {
            BootstrapPhase::FetchingBundle => {
                let fetched = ctx
                    .fetcher
                    .fetch_url(&bundle_url, &ctx.paths.bundle_file, timeout)
                    .await;
                if fetched {
                    BootstrapPhase::Extracting
                } else {
                    error!(url = bundle_url.as_str(), "unable to fetch bootstrap bundle");
                    BootstrapPhase::Failed
                }
            }

            BootstrapPhase::Extracting => {
                match ctx.extractor.extract(&ctx.paths.bundle_file, &ctx.paths.bundle_dir).await {
                    Ok(()) => BootstrapPhase::Installing,
                    Err(e) => {
                        // Fetched file is kept for diagnosis.
                        error!(error = %e, "unable to extract bootstrap bundle");
                        BootstrapPhase::Failed
                    }
                }
            }

            BootstrapPhase::Installing => match ctx.installer.install(&ctx.paths.bundle_dir).await {
                Ok(InstallOutcome::Success) => BootstrapPhase::Starting,
                Ok(InstallOutcome::Failed { code }) => {
                    error!(exit_code = ?code, "install script failed");
                    BootstrapPhase::Failed
                }
                Err(e) => {
                    error!(error = %e, "unable to run install script");
                    BootstrapPhase::Failed
                }
            },

            BootstrapPhase::Starting => {
                // Payload does not matter for the start action; its
                // idempotence guarantee carries over.
                match start.execute(Map::new()).await {
                    Ok(()) => {
                        cleanup(&ctx);
                        info!("bootstrap complete");
                        BootstrapPhase::Complete
                    }
                    Err(e) => {
                        error!(error = %e, "unable to start application after install");
                        BootstrapPhase::Failed
                    }
                }
            }

            BootstrapPhase::Idle
            | BootstrapPhase::Complete
            | BootstrapPhase::Failed => break,
        };
        ctx.set_bootstrap_phase(next);
    }
}

/// Delete the downloaded bundle and extraction directory. Failures are
/// warnings only.
fn cleanup(ctx: &DaemonContext) {
    if !fsutil::remove_path(&ctx.paths.bundle_file) {
        warn!(path = %ctx.paths.bundle_file.display(), "unable to delete bootstrap bundle");
    }
    if !fsutil::remove_path(&ctx.paths.bundle_dir) {
        warn!(path = %ctx.paths.bundle_dir.display(), "unable to delete bootstrap directory");
    }
}

#[cfg(test)]
#[path = "bootstrap_tests.rs"]
mod tests;
