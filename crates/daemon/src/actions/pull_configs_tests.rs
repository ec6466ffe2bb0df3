// SPDX-License-Identifier: MIT

use serde_json::{json, Map};
use std::sync::Arc;
use std::time::Duration;

use super::PullConfigsAction;
use crate::actions::{ActionError, NodeAction};
use crate::adapters::StateStore;
use crate::test_support::{TestHarness, TEST_PERSONA};

fn payload(deployment: &str) -> Map<String, serde_json::Value> {
    let mut payload = Map::new();
    payload.insert("deployment-name".to_string(), json!(deployment));
    payload
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

#[tokio::test(start_paused = true)]
async fn genesis_node_pulls_configs_and_etc() {
    let h = TestHarness::new();
    let action = PullConfigsAction::new(Arc::clone(&h.ctx));

    action.execute(payload("exercise-7")).await.unwrap();
    settle().await;

    let locators: Vec<String> = h.fetcher.calls().into_iter().map(|c| c.locator).collect();
    assert!(locators.contains(&format!("exercise-7_{TEST_PERSONA}_configs.tar.gz")));
    assert!(locators.contains(&format!("exercise-7_{TEST_PERSONA}_etc.tar.gz")));

    assert_eq!(h.store.get("deployment"), Some(json!("exercise-7")));
    assert_eq!(h.store.get("isGenesis"), Some(json!(true)));
    assert_eq!(
        h.store.get("configsTar"),
        Some(json!(format!("exercise-7_{TEST_PERSONA}_configs.tar.gz")))
    );
    assert_eq!(
        h.store.get("etcTar"),
        Some(json!(format!("exercise-7_{TEST_PERSONA}_etc.tar.gz")))
    );
}

#[tokio::test(start_paused = true)]
async fn non_genesis_node_skips_configs() {
    let h = TestHarness::new();
    h.store.save("genesis", json!(false));
    let action = PullConfigsAction::new(Arc::clone(&h.ctx));

    action.execute(payload("exercise-7")).await.unwrap();
    settle().await;

    let locators: Vec<String> = h.fetcher.calls().into_iter().map(|c| c.locator).collect();
    assert_eq!(locators, vec![format!("exercise-7_{TEST_PERSONA}_etc.tar.gz")]);
    assert_eq!(h.store.get("isGenesis"), Some(json!(false)));
    assert_eq!(h.store.get("configsTar"), None);
}

#[tokio::test(start_paused = true)]
async fn etc_archive_is_extracted_then_deleted() {
    let h = TestHarness::new();
    h.store.save("genesis", json!(false));
    let action = PullConfigsAction::new(Arc::clone(&h.ctx));

    action.execute(payload("exercise-7")).await.unwrap();
    settle().await;

    assert_eq!(
        h.extractor.calls(),
        vec![(h.ctx.paths.etc_tar.clone(), h.ctx.paths.etc_dir.clone())]
    );
    // The fake fetcher wrote the tar; the handler removes it after extraction.
    assert!(!h.ctx.paths.etc_tar.exists());
    assert!(h.ctx.paths.etc_dir.is_dir());
}

#[tokio::test(start_paused = true)]
async fn failed_etc_fetch_skips_extraction() {
    let h = TestHarness::new();
    h.store.save("genesis", json!(false));
    h.fetcher.script_results([false]);
    let action = PullConfigsAction::new(Arc::clone(&h.ctx));

    action.execute(payload("exercise-7")).await.unwrap();
    settle().await;

    assert!(h.extractor.calls().is_empty());
    assert_eq!(h.store.get("etcTar"), None);
}

#[tokio::test]
async fn missing_deployment_name_is_rejected() {
    let h = TestHarness::new();
    let action = PullConfigsAction::new(Arc::clone(&h.ctx));

    let result = action.execute(Map::new()).await;
    assert!(matches!(result, Err(ActionError::MissingField("deployment-name"))));
    assert!(h.fetcher.calls().is_empty());
}

#[tokio::test]
async fn store_failure_aborts_before_fetching() {
    let h = TestHarness::new();
    h.store.fail_key("deployment");
    let action = PullConfigsAction::new(Arc::clone(&h.ctx));

    let result = action.execute(payload("exercise-7")).await;
    assert!(matches!(result, Err(ActionError::StateStore(_))));
    assert!(h.fetcher.calls().is_empty());
}
