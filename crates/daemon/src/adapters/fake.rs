// SPDX-License-Identifier: MIT

//! Call-recording fake adapters for tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::{HashSet, VecDeque};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::{
    AppLauncher, AppProcess, ArchiveExtractor, Fetcher, InstallOutcome, Installer, StateStore,
    Uplink, UplinkError,
};

/// One recorded uplink interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum UplinkCall {
    NodeStatus { status: Value, ttl: u64 },
    AppStatus { status: Value, ttl: u64 },
    BootstrapInfo { target: String, message: String, action_type: String },
    RotateLogs { dir: PathBuf, delete: bool, backup_id: String },
    PushRuntimeConfigs { dir: PathBuf, name: String },
}

#[derive(Default)]
pub struct FakeUplink {
    pub registered: AtomicBool,
    pub app_alive: AtomicBool,
    pub dns: AtomicBool,
    calls: Mutex<Vec<UplinkCall>>,
}

impl FakeUplink {
    pub fn new() -> Self {
        let fake = Self::default();
        fake.registered.store(true, Ordering::SeqCst);
        fake.dns.store(true, Ordering::SeqCst);
        fake
    }

    pub fn calls(&self) -> Vec<UplinkCall> {
        self.calls.lock().clone()
    }

    pub fn node_status_ttls(&self) -> Vec<u64> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                UplinkCall::NodeStatus { ttl, .. } => Some(*ttl),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Uplink for FakeUplink {
    async fn update_node_status(&self, json_status: String, ttl: u64) -> Result<(), UplinkError> {
        let status = serde_json::from_str(&json_status).unwrap_or(Value::Null);
        self.calls.lock().push(UplinkCall::NodeStatus { status, ttl });
        Ok(())
    }

    async fn update_app_status(&self, json_status: String, ttl: u64) -> Result<(), UplinkError> {
        let status = serde_json::from_str(&json_status).unwrap_or(Value::Null);
        self.calls.lock().push(UplinkCall::AppStatus { status, ttl });
        Ok(())
    }

    async fn send_bootstrap_info(
        &self,
        target: &str,
        message: &str,
        action_type: &str,
    ) -> Result<(), UplinkError> {
        self.calls.lock().push(UplinkCall::BootstrapInfo {
            target: target.to_string(),
            message: message.to_string(),
            action_type: action_type.to_string(),
        });
        Ok(())
    }

    fn is_listener_registered(&self) -> bool {
        self.registered.load(Ordering::SeqCst)
    }

    async fn is_app_alive(&self) -> bool {
        self.app_alive.load(Ordering::SeqCst)
    }

    async fn is_dns_successful(&self) -> bool {
        self.dns.load(Ordering::SeqCst)
    }

    async fn rotate_logs(
        &self,
        logs_dir: &Path,
        delete: bool,
        backup_id: &str,
    ) -> Result<(), UplinkError> {
        self.calls.lock().push(UplinkCall::RotateLogs {
            dir: logs_dir.to_path_buf(),
            delete,
            backup_id: backup_id.to_string(),
        });
        Ok(())
    }

    async fn push_runtime_configs(
        &self,
        configs_dir: &Path,
        name: &str,
        _key_path: &Path,
    ) -> Result<(), UplinkError> {
        self.calls.lock().push(UplinkCall::PushRuntimeConfigs {
            dir: configs_dir.to_path_buf(),
            name: name.to_string(),
        });
        Ok(())
    }
}

/// One recorded fetch request.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchCall {
    pub locator: String,
    pub dest: PathBuf,
    pub timeout: Duration,
}

#[derive(Default)]
pub struct FakeFetcher {
    /// Scripted results, consumed front to back; empty means success.
    results: Mutex<VecDeque<bool>>,
    calls: Mutex<Vec<FetchCall>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script_results(&self, results: impl IntoIterator<Item = bool>) {
        self.results.lock().extend(results);
    }

    pub fn calls(&self) -> Vec<FetchCall> {
        self.calls.lock().clone()
    }

    async fn record(&self, locator: String, dest: &Path, timeout: Duration) -> bool {
        self.calls.lock().push(FetchCall { locator, dest: dest.to_path_buf(), timeout });
        let success = self.results.lock().pop_front().unwrap_or(true);
        if success {
            if let Some(parent) = dest.parent() {
                let _ = tokio::fs::create_dir_all(parent).await;
            }
            let _ = tokio::fs::write(dest, b"fetched").await;
        }
        success
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch_url(&self, url: &str, dest: &Path, timeout: Duration) -> bool {
        self.record(url.to_string(), dest, timeout).await
    }

    async fn fetch_named(&self, filename: &str, dest: &Path, timeout: Duration) -> bool {
        self.record(filename.to_string(), dest, timeout).await
    }
}

#[derive(Default)]
pub struct FakeInstaller {
    outcomes: Mutex<VecDeque<io::Result<InstallOutcome>>>,
    calls: Mutex<Vec<PathBuf>>,
}

impl FakeInstaller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script_outcome(&self, outcome: io::Result<InstallOutcome>) {
        self.outcomes.lock().push_back(outcome);
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Installer for FakeInstaller {
    async fn install(&self, extracted_dir: &Path) -> io::Result<InstallOutcome> {
        self.calls.lock().push(extracted_dir.to_path_buf());
        self.outcomes.lock().pop_front().unwrap_or(Ok(InstallOutcome::Success))
    }
}

#[derive(Default)]
pub struct FakeExtractor {
    pub fail: AtomicBool,
    calls: Mutex<Vec<(PathBuf, PathBuf)>>,
}

impl FakeExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<(PathBuf, PathBuf)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ArchiveExtractor for FakeExtractor {
    async fn extract(&self, archive: &Path, dest: &Path) -> io::Result<()> {
        self.calls.lock().push((archive.to_path_buf(), dest.to_path_buf()));
        if self.fail.load(Ordering::SeqCst) {
            return Err(io::Error::other("scripted extraction failure"));
        }
        tokio::fs::create_dir_all(dest).await?;
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeStore {
    map: Mutex<Map<String, Value>>,
    fail_keys: Mutex<HashSet<String>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_key(&self, key: &str) {
        self.fail_keys.lock().insert(key.to_string());
    }
}

impl StateStore for FakeStore {
    fn save(&self, key: &str, value: Value) -> bool {
        if self.fail_keys.lock().contains(key) {
            return false;
        }
        self.map.lock().insert(key.to_string(), value);
        true
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.map.lock().get(key).cloned()
    }
}

pub struct FakeProcess {
    alive: Arc<AtomicBool>,
    killed: Arc<AtomicBool>,
}

impl AppProcess for FakeProcess {
    fn is_alive(&mut self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    fn kill(&mut self) -> io::Result<()> {
        self.alive.store(false, Ordering::SeqCst);
        self.killed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn id(&self) -> u32 {
        4242
    }
}

#[derive(Default)]
pub struct FakeLauncher {
    pub spawn_count: AtomicUsize,
    pub fail: AtomicBool,
    processes: Mutex<Vec<(Arc<AtomicBool>, Arc<AtomicBool>)>>,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawned(&self) -> usize {
        self.spawn_count.load(Ordering::SeqCst)
    }

    /// Alive/killed flags of the most recent spawn.
    pub fn last_process(&self) -> Option<(Arc<AtomicBool>, Arc<AtomicBool>)> {
        self.processes.lock().last().cloned()
    }
}

impl AppLauncher for FakeLauncher {
    fn spawn(&self) -> io::Result<Box<dyn AppProcess>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(io::Error::other("scripted spawn failure"));
        }
        self.spawn_count.fetch_add(1, Ordering::SeqCst);
        let alive = Arc::new(AtomicBool::new(true));
        let killed = Arc::new(AtomicBool::new(false));
        self.processes.lock().push((Arc::clone(&alive), Arc::clone(&killed)));
        Ok(Box::new(FakeProcess { alive, killed }))
    }
}
