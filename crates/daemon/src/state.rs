// SPDX-License-Identifier: MIT

//! Process-wide daemon context shared by the router, bridge, coordinator,
//! and publisher.
//!
//! All fields except `bootstrap_target` and `bootstrap_phase` are written
//! once at startup or only from the synchronous dispatch path. The two
//! bootstrap fields are the cross-task state and sit behind mutexes; guards
//! must never be held across an await point.

use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;

use crate::adapters::{
    AppLauncher, AppProcess, ArchiveExtractor, Fetcher, Installer, StateStore, Uplink,
};
use crate::bootstrap::BootstrapPhase;

/// Well-known filesystem locations on the node.
#[derive(Debug, Clone)]
pub struct NodePaths {
    /// Supervised application executable; its presence means "installed".
    pub app_binary: PathBuf,
    /// Downloaded configs archive.
    pub configs_tar: PathBuf,
    /// Downloaded etc archive (deleted after extraction).
    pub etc_tar: PathBuf,
    /// Extraction target for the etc archive.
    pub etc_dir: PathBuf,
    /// Runtime configs directory; its presence means "configs extracted".
    pub data_configs_dir: PathBuf,
    /// Application log files, rotated on request.
    pub logs_dir: PathBuf,
    /// Scratch space for fetches and uploads.
    pub tmp_dir: PathBuf,
    /// Downloaded bootstrap bundle.
    pub bundle_file: PathBuf,
    /// Extraction target for the bootstrap bundle.
    pub bundle_dir: PathBuf,
    /// File encryption key handed to the upload collaborator.
    pub key_file: PathBuf,
    pub user_responses_file: PathBuf,
    pub jaeger_config_file: PathBuf,
}

impl NodePaths {
    /// Lay out every path under a single root. Production uses `/`;
    /// tests point this at a tempdir.
    pub fn under_root(root: &std::path::Path) -> Self {
        let tmp_dir = root.join("tmp/warden");
        Self {
            app_binary: root.join("usr/local/lib/warden/app/bin/racer"),
            configs_tar: tmp_dir.join("configs.tar.gz"),
            etc_tar: tmp_dir.join("etc.tar.gz"),
            etc_dir: root.join("etc/warden"),
            data_configs_dir: root.join("data/configs"),
            logs_dir: root.join("var/log/warden/app"),
            bundle_file: tmp_dir.join("bootstrap.tar.gz"),
            bundle_dir: tmp_dir.join("bootstrap"),
            key_file: root.join("etc/warden/file_key"),
            user_responses_file: root.join("etc/warden/user-responses.json"),
            jaeger_config_file: root.join("etc/warden/jaeger-config.yml"),
            tmp_dir,
        }
    }
}

/// Shared daemon context. Created once at startup and passed by `Arc` to
/// every component.
pub struct DaemonContext {
    pub persona: String,
    pub paths: NodePaths,

    /// Persona of the node currently being bootstrapped through this node.
    /// Non-empty only between a successful prepare-to-bootstrap and the
    /// BS_COMPLETE relay (or an explicit reset). Written by the prepare
    /// handler, read and cleared by the bridge reader.
    pub bootstrap_target: Mutex<String>,

    /// Phase of this node's own bundle install. Guards against overlapping
    /// bootstrap actions.
    pub bootstrap_phase: Mutex<BootstrapPhase>,

    /// Handle to the supervised application process, exclusively owned
    /// here; only start/kill mutate it, both on the dispatch path.
    pub app_process: Mutex<Option<Box<dyn AppProcess>>>,

    pub uplink: Arc<dyn Uplink>,
    pub fetcher: Arc<dyn Fetcher>,
    pub installer: Arc<dyn Installer>,
    pub extractor: Arc<dyn ArchiveExtractor>,
    pub store: Arc<dyn StateStore>,
    pub launcher: Arc<dyn AppLauncher>,
}

impl DaemonContext {
    /// Current bootstrap target, cloned so no guard outlives the call.
    pub fn bootstrap_target(&self) -> String {
        self.bootstrap_target.lock().clone()
    }

    pub fn set_bootstrap_target(&self, target: String) {
        *self.bootstrap_target.lock() = target;
    }

    pub fn clear_bootstrap_target(&self) {
        self.bootstrap_target.lock().clear();
    }

    pub fn bootstrap_phase(&self) -> BootstrapPhase {
        *self.bootstrap_phase.lock()
    }

    pub fn set_bootstrap_phase(&self, phase: BootstrapPhase) {
        *self.bootstrap_phase.lock() = phase;
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
