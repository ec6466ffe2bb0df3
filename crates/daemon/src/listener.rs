// SPDX-License-Identifier: MIT

//! Controller transport: a Unix socket accepting newline-delimited action
//! envelopes.
//!
//! Connections are handled in spawned tasks, but dispatch itself is
//! serialized inside the router, so envelope ordering holds even with
//! concurrent controller connections.

use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::UnixListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::actions::ActionRouter;

pub struct ControllerListener {
    socket: UnixListener,
    router: Arc<ActionRouter>,
}

impl ControllerListener {
    pub fn new(socket: UnixListener, router: Arc<ActionRouter>) -> Self {
        Self { socket, router }
    }

    /// Accept controller connections until shutdown.
    pub async fn run(self, cancel: CancellationToken) {
        loop {
            let accepted = tokio::select! {
                _ = cancel.cancelled() => break,
                accepted = self.socket.accept() => accepted,
            };
            match accepted {
                Ok((stream, _)) => {
                    debug!("controller connected");
                    let router = Arc::clone(&self.router);
                    let cancel = cancel.clone();
                    tokio::spawn(async move {
                        handle_connection(stream, router, cancel).await;
                    });
                }
                Err(e) => error!(error = %e, "accept error"),
            }
        }
        info!("controller listener stopped");
    }
}

/// Read envelopes line by line, dispatching each fully before the next.
async fn handle_connection(
    stream: tokio::net::UnixStream,
    router: Arc<ActionRouter>,
    cancel: CancellationToken,
) {
    let mut lines = BufReader::new(stream).lines();
    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => break,
            line = lines.next_line() => line,
        };
        match line {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                router.dispatch(&line).await;
            }
            Ok(None) => break,
            Err(e) => {
                error!(error = %e, "controller connection error");
                break;
            }
        }
    }
    debug!("controller disconnected");
}
