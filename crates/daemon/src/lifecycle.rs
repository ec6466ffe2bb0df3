// SPDX-License-Identifier: MIT

//! Daemon startup: configuration, single-instance locking, adapter wiring,
//! and task spawning.

use fs2::FileExt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::UnixListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::actions::ActionRouter;
use crate::adapters::{
    HttpFetcher, HttpUplink, JsonStateStore, ProcessLauncher, ScriptInstaller, StateStore,
    TarExtractor,
};
use crate::bootstrap::BootstrapPhase;
use crate::bridge::{self, FifoEndpoint};
use crate::env;
use crate::listener::ControllerListener;
use crate::publisher::StatusPublisher;
use crate::state::{DaemonContext, NodePaths};
use warden_core::SystemClock;

/// Errors fatal to daemon startup. Nothing after startup is fatal.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("another daemon instance holds the lock: {0}")]
    LockFailed(std::io::Error),
}

/// Resolved daemon configuration.
pub struct Config {
    pub persona: String,
    pub state_dir: PathBuf,
    pub socket_path: PathBuf,
    pub lock_path: PathBuf,
    pub app_input_fifo: PathBuf,
    pub app_output_fifo: PathBuf,
    pub controller_url: Option<String>,
    pub file_server_url: Option<String>,
    pub app_command: Vec<String>,
    pub paths: NodePaths,
}

impl Config {
    pub fn from_env() -> Self {
        let state_dir = env::state_dir();
        let root = std::env::var("WARDEN_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/"));
        Self {
            persona: env::persona(),
            socket_path: state_dir.join("wardend.sock"),
            lock_path: state_dir.join("wardend.lock"),
            app_input_fifo: env::app_input_fifo(),
            app_output_fifo: env::app_output_fifo(),
            controller_url: env::controller_url(),
            file_server_url: env::file_server_url(),
            app_command: env::app_command(),
            paths: NodePaths::under_root(&root),
            state_dir,
        }
    }
}

/// Running daemon handles.
pub struct Daemon {
    pub cancel: CancellationToken,
    pub listener_task: tokio::task::JoinHandle<()>,
    pub publisher: Arc<StatusPublisher>,
    // Held for the process lifetime; dropping it releases the lock.
    _lock_file: std::fs::File,
}

/// Start the daemon: lock, wire adapters, spawn bridge/publisher/listener.
pub async fn startup(config: Config) -> Result<Daemon, LifecycleError> {
    std::fs::create_dir_all(&config.state_dir)?;
    std::fs::create_dir_all(&config.paths.tmp_dir)?;
    let lock_file = acquire_lock(&config.lock_path)?;

    info!(persona = config.persona.as_str(), "warden node daemon initializing");

    let store = Arc::new(JsonStateStore::open(config.state_dir.join("daemon-state.json")));
    let uplink = Arc::new(HttpUplink::new(
        config.controller_url.clone(),
        config.persona.clone(),
        config.paths.tmp_dir.clone(),
    ));
    let ctx = Arc::new(DaemonContext {
        persona: config.persona.clone(),
        paths: config.paths.clone(),
        bootstrap_target: parking_lot::Mutex::new(String::new()),
        bootstrap_phase: parking_lot::Mutex::new(BootstrapPhase::Idle),
        app_process: parking_lot::Mutex::new(None),
        uplink,
        fetcher: Arc::new(HttpFetcher::new(config.file_server_url.clone())),
        installer: Arc::new(ScriptInstaller),
        extractor: Arc::new(TarExtractor),
        store: Arc::clone(&store) as Arc<dyn crate::adapters::StateStore>,
        launcher: Arc::new(ProcessLauncher::new(config.app_command.clone())),
    });

    let cancel = CancellationToken::new();
    let endpoint = Arc::new(FifoEndpoint::create(
        config.app_input_fifo.clone(),
        config.app_output_fifo.clone(),
    )?);
    let bridge = bridge::spawn(Arc::clone(&ctx), endpoint, env::reader_backoff(), cancel.clone());

    let publisher = Arc::new(StatusPublisher::new(Arc::clone(&ctx), Arc::new(SystemClock)));
    let period = store.get("period").and_then(|v| v.as_u64());
    let ttl_factor = store.get("ttl-factor").and_then(|v| v.as_u64());
    publisher.start(period, ttl_factor);

    let router = Arc::new(ActionRouter::new(ctx, bridge, Arc::clone(&publisher)));

    // Stale socket from a previous run; the lock proves nobody owns it.
    let _ = std::fs::remove_file(&config.socket_path);
    let socket = UnixListener::bind(&config.socket_path)?;
    info!(socket = %config.socket_path.display(), "listening for controller actions");
    let listener = ControllerListener::new(socket, router);
    let listener_task = tokio::spawn(listener.run(cancel.clone()));

    Ok(Daemon { cancel, listener_task, publisher, _lock_file: lock_file })
}

/// Acquire the single-instance lock and record our PID in it.
fn acquire_lock(path: &Path) -> Result<std::fs::File, LifecycleError> {
    // Avoid truncating before we hold the lock, which would wipe the
    // running daemon's PID.
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;
    file.try_lock_exclusive().map_err(LifecycleError::LockFailed)?;
    file.set_len(0)?;
    writeln!(file, "{}", std::process::id())?;
    Ok(file)
}
