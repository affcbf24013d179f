//! All-or-nothing commits and the durable event log

use assert_matches::assert_matches;
use async_trait::async_trait;
use hpv_core::effects::{EventSource, ValueTransfer};
use hpv_core::{Address, Amount, HpvError, HpvResult, PostId, RegistryConfig, RegistryEvent};
use hpv_registry::{Registry, RegistryEffects};
use hpv_testkit::{owner, valid_proof, wallet, FailingEventSink, FaultyLedgerStore, TestRegistry};
use std::sync::Arc;

#[tokio::test]
async fn failed_commit_leaves_no_trace() {
    let harness = TestRegistry::new();
    let chip = harness.verify_chip(0xaa).await;
    let before = harness.store.memory().snapshot().await;
    let events_before = harness.sink.events().await.len();

    harness.store.fail_commits(true);
    let err = harness
        .registry
        .become_guardian(wallet(1), chip, &valid_proof())
        .await
        .unwrap_err();
    assert_matches!(err, HpvError::Storage { .. });

    assert_eq!(harness.store.memory().snapshot().await, before);
    assert_eq!(harness.sink.events().await.len(), events_before);
    assert!(!harness.registry.is_guardian(&wallet(1)).await.unwrap());

    harness.store.fail_commits(false);
    let credential = harness
        .registry
        .become_guardian(wallet(1), chip, &valid_proof())
        .await
        .unwrap();
    assert_eq!(credential.token_id.value(), 1);
}

/// Payout that breaks the store before refusing, so the restore cannot commit
struct StoreBreakingTransfer {
    store: FaultyLedgerStore,
}

#[async_trait]
impl ValueTransfer for StoreBreakingTransfer {
    async fn transfer(&self, _to: Address, _amount: Amount) -> HpvResult<()> {
        self.store.fail_commits(true);
        Err(HpvError::transfer_failed("recipient rejected payment"))
    }
}

#[tokio::test]
async fn unrestorable_claim_reports_missing_balance() {
    let store = FaultyLedgerStore::new();
    let transfer = Arc::new(StoreBreakingTransfer {
        store: store.clone(),
    });
    let harness = TestRegistry::builder()
        .store(store)
        .transfer(transfer)
        .build();
    harness.registry.allocate_reward(owner(), wallet(4), 70).await.unwrap();

    let err = harness.registry.claim_rewards(wallet(4)).await.unwrap_err();
    assert_matches!(
        &err,
        HpvError::ClaimRestoreFailed { amount: 70, recipient, .. } if *recipient == wallet(4).to_string()
    );
    assert!(!err.is_business_rule());

    harness.store.fail_commits(false);
    assert_eq!(harness.registry.get_unclaimed_amount(&wallet(4)).await.unwrap(), 0);
}

#[tokio::test]
async fn failed_claim_commit_keeps_balance() {
    let harness = TestRegistry::new();
    harness.registry.allocate_reward(owner(), wallet(1), 40).await.unwrap();

    harness.store.fail_commits(true);
    let err = harness.registry.claim_rewards(wallet(1)).await.unwrap_err();
    assert_matches!(err, HpvError::Storage { .. });
    harness.store.fail_commits(false);

    assert_eq!(harness.registry.get_unclaimed_amount(&wallet(1)).await.unwrap(), 40);
    assert_eq!(harness.treasury.balance_of(&wallet(1)).await, 0);
}

#[tokio::test]
async fn rejected_operation_commits_nothing() {
    let harness = TestRegistry::new();
    let before = harness.store.memory().snapshot().await;

    let _ = harness
        .registry
        .allocate_rewards(owner(), &[wallet(1), wallet(2)], &[10, 0])
        .await;
    let _ = harness.registry.register_clinic(wallet(1), wallet(2)).await;

    assert_eq!(harness.store.memory().snapshot().await, before);
}

#[tokio::test]
async fn log_matches_published_events() {
    let harness = TestRegistry::new();
    let chip = harness.verify_chip(0xaa).await;
    harness
        .registry
        .become_guardian(wallet(1), chip, &valid_proof())
        .await
        .unwrap();
    harness.registry.allocate_reward(owner(), wallet(1), 5).await.unwrap();

    let published = harness.sink.events().await;
    let logged = harness.registry.events_since(0, 100).await.unwrap();

    assert_eq!(logged, published);
    assert_eq!(
        logged.iter().map(|e| e.sequence).collect::<Vec<_>>(),
        vec![1, 2, 3, 4]
    );
    assert_eq!(harness.registry.latest_sequence().await.unwrap(), 4);
}

#[tokio::test]
async fn events_since_pages_through_log() {
    let harness = TestRegistry::builder().event_page_size(2).build();
    for n in 1..=5 {
        harness
            .registry
            .create_post(wallet(n), PostId::from_label(&format!("post-{n}")), "cid")
            .await
            .unwrap();
    }

    let first = harness.registry.events_since(0, 10).await.unwrap();
    assert_eq!(first.len(), 2);

    let mut cursor = 0;
    let mut seen = Vec::new();
    loop {
        let page = harness.registry.events_since(cursor, 10).await.unwrap();
        if page.is_empty() {
            break;
        }
        cursor = page.last().map(|e| e.sequence).unwrap();
        seen.extend(page);
    }
    assert_eq!(seen.len(), 5);
    assert!(harness.registry.events_since(5, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn idempotent_noops_do_not_log() {
    let harness = TestRegistry::new();
    harness.verify_chip(0xaa).await;
    harness.verify_chip(0xaa).await;

    assert_eq!(harness.registry.latest_sequence().await.unwrap(), 2);
}

#[tokio::test]
async fn failing_sink_does_not_fail_operation() {
    let harness = TestRegistry::builder()
        .sink(Arc::new(FailingEventSink))
        .build();

    harness.registry.allocate_reward(owner(), wallet(1), 5).await.unwrap();

    assert_eq!(harness.sink.events().await.len(), 1);
    assert_eq!(harness.registry.latest_sequence().await.unwrap(), 1);
}

#[tokio::test]
async fn registry_resumes_over_existing_store() {
    let harness = TestRegistry::new();
    let chip = harness.verify_chip(0xaa).await;
    harness
        .registry
        .become_guardian(wallet(1), chip, &valid_proof())
        .await
        .unwrap();

    let reopened = TestRegistry::builder().store(harness.store.clone()).build();
    assert!(reopened.registry.is_guardian(&wallet(1)).await.unwrap());

    let credential = reopened
        .registry
        .become_guardian(wallet(2), chip, &valid_proof())
        .await
        .unwrap();
    assert_eq!(credential.token_id.value(), 2);

    let last = reopened.sink.events().await.pop().unwrap();
    assert_eq!(last.sequence, 4);
    assert_matches!(last.event, RegistryEvent::GuardianNFTMinted { .. });
}

#[tokio::test]
async fn invalid_config_is_rejected() {
    let mut config = RegistryConfig::new(owner());
    config.event_page_size = 0;
    let err = Registry::new(config, RegistryEffects::default()).unwrap_err();
    assert_matches!(err, HpvError::Config { .. });
}
