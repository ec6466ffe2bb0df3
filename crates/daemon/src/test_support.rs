// SPDX-License-Identifier: MIT

//! Shared test wiring: a daemon context backed entirely by fakes and a
//! tempdir filesystem layout.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::io;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::adapters::fake::{
    FakeExtractor, FakeFetcher, FakeInstaller, FakeLauncher, FakeStore, FakeUplink,
};
use crate::bootstrap::BootstrapPhase;
use crate::bridge::AppEndpoint;
use crate::state::{DaemonContext, NodePaths};

pub(crate) const TEST_PERSONA: &str = "race-client-00001";

pub(crate) struct TestHarness {
    pub ctx: Arc<DaemonContext>,
    pub uplink: Arc<FakeUplink>,
    pub fetcher: Arc<FakeFetcher>,
    pub installer: Arc<FakeInstaller>,
    pub extractor: Arc<FakeExtractor>,
    pub store: Arc<FakeStore>,
    pub launcher: Arc<FakeLauncher>,
    // Keeps the on-disk layout alive for the test's duration.
    #[allow(dead_code)]
    pub tmp: tempfile::TempDir,
}

impl TestHarness {
    pub fn new() -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let uplink = Arc::new(FakeUplink::new());
        let fetcher = Arc::new(FakeFetcher::new());
        let installer = Arc::new(FakeInstaller::new());
        let extractor = Arc::new(FakeExtractor::new());
        let store = Arc::new(FakeStore::new());
        let launcher = Arc::new(FakeLauncher::new());
        let ctx = Arc::new(DaemonContext {
            persona: TEST_PERSONA.to_string(),
            paths: NodePaths::under_root(tmp.path()),
            bootstrap_target: Mutex::new(String::new()),
            bootstrap_phase: Mutex::new(BootstrapPhase::Idle),
            app_process: Mutex::new(None),
            uplink: Arc::clone(&uplink) as _,
            fetcher: Arc::clone(&fetcher) as _,
            installer: Arc::clone(&installer) as _,
            extractor: Arc::clone(&extractor) as _,
            store: Arc::clone(&store) as _,
            launcher: Arc::clone(&launcher) as _,
        });
        Self { ctx, uplink, fetcher, installer, extractor, store, launcher, tmp }
    }
}

/// Channel-backed endpoint standing in for the named pipes. Inbound lines
/// come from the paired sender; outbound lines accumulate in `sent`.
pub(crate) struct FakeEndpoint {
    inbound: tokio::sync::Mutex<mpsc::UnboundedReceiver<String>>,
    pub sent: Mutex<Vec<String>>,
}

impl FakeEndpoint {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedSender<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let endpoint = Arc::new(Self {
            inbound: tokio::sync::Mutex::new(rx),
            sent: Mutex::new(Vec::new()),
        });
        (endpoint, tx)
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl AppEndpoint for FakeEndpoint {
    async fn read_line(&self) -> io::Result<Option<String>> {
        Ok(self.inbound.lock().await.recv().await)
    }

    async fn write_line(&self, line: &str) -> io::Result<()> {
        self.sent.lock().push(line.to_string());
        Ok(())
    }
}
