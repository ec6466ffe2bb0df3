// SPDX-License-Identifier: MIT

//! Duplex IPC bridge to the supervised application.
//!
//! Outbound: a single writer task drains an unbounded queue so sends
//! preserve submission order and never block the caller. Inbound: one
//! long-lived reader task classifies each line and either reports it
//! upstream or relays it to the current bootstrap target. Neither task
//! terminates on I/O errors; the reader backs off and resumes.

mod fifo;

pub use fifo::FifoEndpoint;

use async_trait::async_trait;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::state::DaemonContext;
use warden_core::{AppMessage, BS_COMPLETE};

/// One side of the line-framed channel to the application. Production uses
/// named pipes; tests inject channel-backed fakes.
#[async_trait]
pub trait AppEndpoint: Send + Sync {
    /// Block until one line is available. `Ok(None)` means the peer closed
    /// without data; the reader reopens after a pause.
    async fn read_line(&self) -> io::Result<Option<String>>;

    /// Write one line (newline appended by the endpoint).
    async fn write_line(&self, line: &str) -> io::Result<()>;
}

/// Cloneable outbound handle. Enqueues without blocking; delivery order is
/// submission order.
#[derive(Clone)]
pub struct BridgeHandle {
    tx: mpsc::UnboundedSender<String>,
}

impl BridgeHandle {
    /// Queue a message for the application. Failures after daemon shutdown
    /// are logged and dropped.
    pub fn send(&self, line: String) {
        if self.tx.send(line).is_err() {
            error!("bridge writer is gone, dropping outbound message");
        }
    }
}

/// Spawn the writer and reader tasks. Returns the outbound handle.
pub fn spawn(
    ctx: Arc<DaemonContext>,
    endpoint: Arc<dyn AppEndpoint>,
    backoff: Duration,
    cancel: CancellationToken,
) -> BridgeHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(run_writer(Arc::clone(&endpoint), rx, cancel.clone()));
    tokio::spawn(run_reader(ctx, endpoint, backoff, cancel));
    BridgeHandle { tx }
}

/// Drain the outbound queue one message at a time. Write failures are
/// logged and the message dropped; no retry, nothing propagates to callers.
async fn run_writer(
    endpoint: Arc<dyn AppEndpoint>,
    mut rx: mpsc::UnboundedReceiver<String>,
    cancel: CancellationToken,
) {
    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => break,
            line = rx.recv() => match line {
                Some(line) => line,
                None => break,
            },
        };
        debug!("sending action to application");
        if let Err(e) = endpoint.write_line(&line).await {
            error!(error = %e, "error sending to application");
        }
    }
}

/// Read lines from the application until cancelled. Errors and empty opens
/// pause for `backoff` and resume; the loop is the single always-on
/// consumer of the inbound channel.
pub(crate) async fn run_reader(
    ctx: Arc<DaemonContext>,
    endpoint: Arc<dyn AppEndpoint>,
    backoff: Duration,
    cancel: CancellationToken,
) {
    loop {
        let result = tokio::select! {
            _ = cancel.cancelled() => break,
            result = endpoint.read_line() => result,
        };
        match result {
            Ok(Some(line)) => {
                debug!(line = line.as_str(), "got line from application");
                handle_app_line(&ctx, &line).await;
            }
            Ok(None) => {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(backoff) => {}
                }
            }
            Err(e) => {
                error!(error = %e, "error reading from application");
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(backoff) => {}
                }
            }
        }
    }
    info!("bridge reader stopped");
}

/// Classify and act on one inbound line. Never fails; every bad message is
/// a logged drop, terminal for that message only.
pub(crate) async fn handle_app_line(ctx: &DaemonContext, line: &str) {
    let message = match AppMessage::parse(line) {
        Ok(message) => message,
        Err(e) => {
            error!(error = %e, "invalid message received from application");
            return;
        }
    };

    match message {
        AppMessage::Status { status, ttl } => {
            let ttl = u64::try_from(ttl).unwrap_or(0);
            if let Err(e) = ctx.uplink.update_app_status(status.to_string(), ttl).await {
                error!(error = %e, "failed to report application status");
            }
        }
        AppMessage::BootstrapInfo { message, action_type } => {
            if action_type == BS_COMPLETE {
                info!("bootstrap complete, clearing target");
                ctx.clear_bootstrap_target();
                return;
            }
            let target = ctx.bootstrap_target();
            if target.is_empty() {
                error!("no current bootstrap target, unable to forward bootstrap info");
                return;
            }
            if let Err(e) = ctx.uplink.send_bootstrap_info(&target, &message, &action_type).await {
                error!(target, error = %e, "failed to relay bootstrap info");
            }
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
