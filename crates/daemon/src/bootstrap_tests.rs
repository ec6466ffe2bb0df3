// SPDX-License-Identifier: MIT

use serde_json::{json, Map};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use yare::parameterized;

use super::{run_bundle_install, BootstrapAction, BootstrapPhase};
use crate::actions::{ActionError, NodeAction, StartAction};
use crate::adapters::InstallOutcome;
use crate::test_support::TestHarness;

const BUNDLE_URL: &str = "http://race-client-00002:8085/bundle.tar.gz";

#[parameterized(
    idle = { BootstrapPhase::Idle, true },
    fetching = { BootstrapPhase::FetchingBundle, false },
    extracting = { BootstrapPhase::Extracting, false },
    installing = { BootstrapPhase::Installing, false },
    starting = { BootstrapPhase::Starting, false },
    complete = { BootstrapPhase::Complete, true },
    failed = { BootstrapPhase::Failed, true },
)]
fn overlap_policy_per_phase(phase: BootstrapPhase, may_begin: bool) {
    assert_eq!(phase.can_begin(), may_begin);
}

/// Run the install chain to a terminal phase, entering it the way the
/// handler does.
async fn run(h: &TestHarness) {
    h.ctx.set_bootstrap_phase(BootstrapPhase::FetchingBundle);
    let start = Arc::new(StartAction::new(Arc::clone(&h.ctx)));
    run_bundle_install(
        Arc::clone(&h.ctx),
        start,
        BUNDLE_URL.to_string(),
        Duration::from_secs(600),
    )
    .await;
}

#[tokio::test]
async fn full_chain_ends_complete_with_app_running() {
    let h = TestHarness::new();
    run(&h).await;

    assert_eq!(h.ctx.bootstrap_phase(), BootstrapPhase::Complete);
    assert_eq!(h.launcher.spawned(), 1);

    let fetches = h.fetcher.calls();
    assert_eq!(fetches.len(), 1);
    assert_eq!(fetches[0].locator, BUNDLE_URL);
    assert_eq!(fetches[0].dest, h.ctx.paths.bundle_file);
    assert_eq!(fetches[0].timeout, Duration::from_secs(600));

    assert_eq!(h.installer.calls(), vec![h.ctx.paths.bundle_dir.clone()]);

    // Artifacts cleaned up after a successful start.
    assert!(!h.ctx.paths.bundle_file.exists());
    assert!(!h.ctx.paths.bundle_dir.exists());
}

#[tokio::test]
async fn fetch_failure_stops_the_chain() {
    let h = TestHarness::new();
    h.fetcher.script_results([false]);
    run(&h).await;

    assert_eq!(h.ctx.bootstrap_phase(), BootstrapPhase::Failed);
    assert!(h.extractor.calls().is_empty());
    assert!(h.installer.calls().is_empty());
    assert_eq!(h.launcher.spawned(), 0);
}

#[tokio::test]
async fn extract_failure_keeps_the_fetched_bundle() {
    let h = TestHarness::new();
    h.extractor.fail.store(true, Ordering::SeqCst);
    run(&h).await;

    assert_eq!(h.ctx.bootstrap_phase(), BootstrapPhase::Failed);
    assert!(h.installer.calls().is_empty());
    assert!(h.ctx.paths.bundle_file.exists());
}

#[tokio::test]
async fn install_script_failure_never_starts_the_app() {
    let h = TestHarness::new();
    h.installer.script_outcome(Ok(InstallOutcome::Failed { code: Some(2) }));
    run(&h).await;

    assert_eq!(h.ctx.bootstrap_phase(), BootstrapPhase::Failed);
    assert_eq!(h.launcher.spawned(), 0);
}

#[tokio::test]
async fn install_io_error_never_starts_the_app() {
    let h = TestHarness::new();
    h.installer.script_outcome(Err(std::io::Error::other("bash missing")));
    run(&h).await;

    assert_eq!(h.ctx.bootstrap_phase(), BootstrapPhase::Failed);
    assert_eq!(h.launcher.spawned(), 0);
}

#[tokio::test]
async fn start_failure_keeps_artifacts_for_diagnosis() {
    let h = TestHarness::new();
    h.launcher.fail.store(true, Ordering::SeqCst);
    run(&h).await;

    assert_eq!(h.ctx.bootstrap_phase(), BootstrapPhase::Failed);
    assert!(h.ctx.paths.bundle_file.exists());
}

#[tokio::test(start_paused = true)]
async fn action_claims_the_phase_guard_synchronously() {
    let h = TestHarness::new();
    let start = Arc::new(StartAction::new(Arc::clone(&h.ctx)));
    let action = BootstrapAction::new(Arc::clone(&h.ctx), start);

    let mut payload = Map::new();
    payload.insert("bootstrap-bundle-url".to_string(), json!(BUNDLE_URL));
    action.execute(payload).await.unwrap();
    assert!(!h.ctx.bootstrap_phase().can_begin());

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(h.ctx.bootstrap_phase(), BootstrapPhase::Complete);
    assert_eq!(h.launcher.spawned(), 1);
}

#[tokio::test]
async fn overlapping_bootstrap_is_rejected() {
    let h = TestHarness::new();
    h.ctx.set_bootstrap_phase(BootstrapPhase::Installing);
    let start = Arc::new(StartAction::new(Arc::clone(&h.ctx)));
    let action = BootstrapAction::new(Arc::clone(&h.ctx), start);

    let mut payload = Map::new();
    payload.insert("bootstrap-bundle-url".to_string(), json!(BUNDLE_URL));
    let result = action.execute(payload).await;

    assert!(matches!(
        result,
        Err(ActionError::BootstrapInProgress(BootstrapPhase::Installing))
    ));
    assert!(h.fetcher.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn terminal_phases_allow_a_fresh_bootstrap() {
    let h = TestHarness::new();
    h.ctx.set_bootstrap_phase(BootstrapPhase::Failed);
    let start = Arc::new(StartAction::new(Arc::clone(&h.ctx)));
    let action = BootstrapAction::new(Arc::clone(&h.ctx), start);

    let mut payload = Map::new();
    payload.insert("bootstrap-bundle-url".to_string(), json!(BUNDLE_URL));
    action.execute(payload).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(h.ctx.bootstrap_phase(), BootstrapPhase::Complete);
}

#[tokio::test]
async fn missing_bundle_url_is_rejected() {
    let h = TestHarness::new();
    let start = Arc::new(StartAction::new(Arc::clone(&h.ctx)));
    let action = BootstrapAction::new(Arc::clone(&h.ctx), start);

    let result = action.execute(Map::new()).await;
    assert!(matches!(
        result,
        Err(ActionError::MissingField("bootstrap-bundle-url"))
    ));
    assert_eq!(h.ctx.bootstrap_phase(), BootstrapPhase::Idle);
}

#[tokio::test]
async fn non_numeric_timeout_is_rejected() {
    let h = TestHarness::new();
    let start = Arc::new(StartAction::new(Arc::clone(&h.ctx)));
    let action = BootstrapAction::new(Arc::clone(&h.ctx), start);

    let mut payload = Map::new();
    payload.insert("bootstrap-bundle-url".to_string(), json!(BUNDLE_URL));
    payload.insert("timeout-secs".to_string(), json!("soon"));
    let result = action.execute(payload).await;

    assert!(matches!(
        result,
        Err(ActionError::InvalidField { field: "timeout-secs", .. })
    ));
    assert_eq!(h.ctx.bootstrap_phase(), BootstrapPhase::Idle);
}
