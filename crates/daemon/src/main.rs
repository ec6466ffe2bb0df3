// SPDX-License-Identifier: MIT

//! wardend: per-node orchestration agent.

use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use warden_daemon::lifecycle::{startup, Config};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env();
    let daemon = match startup(config).await {
        Ok(daemon) => daemon,
        Err(e) => {
            error!(error = %e, "daemon startup failed");
            std::process::exit(1);
        }
    };

    wait_for_shutdown().await;
    info!("shutting down");
    daemon.publisher.stop();
    daemon.cancel.cancel();
    let _ = daemon.listener_task.await;
}

async fn wait_for_shutdown() {
    let mut term = match signal(SignalKind::terminate()) {
        Ok(term) => term,
        Err(e) => {
            error!(error = %e, "unable to install SIGTERM handler");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = term.recv() => {}
    }
}
