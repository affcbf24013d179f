//! Forum posts and upvotes

use assert_matches::assert_matches;
use hpv_core::{HpvError, PostId, RegistryEvent};
use hpv_testkit::{wallet, TestRegistry, GENESIS_TIME};

const CID: &str = "bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi";

#[tokio::test]
async fn create_and_read_post() {
    let harness = TestRegistry::new();
    let post_id = PostId::from_label("welcome");

    let post = harness.registry.create_post(wallet(1), post_id, CID).await.unwrap();

    assert_eq!(post.author, wallet(1));
    assert_eq!(post.upvotes, 0);
    assert_eq!(post.created_at, GENESIS_TIME);
    assert_eq!(harness.registry.get_post(&post_id).await.unwrap(), Some(post));
    assert_eq!(harness.sink.event_names().await, vec!["PostCreated"]);
}

#[tokio::test]
async fn duplicate_post_id_is_refused() {
    let harness = TestRegistry::new();
    let post_id = PostId::from_label("welcome");
    harness.registry.create_post(wallet(1), post_id, CID).await.unwrap();

    let err = harness
        .registry
        .create_post(wallet(2), post_id, "other")
        .await
        .unwrap_err();

    assert_matches!(err, HpvError::PostAlreadyExists { .. });
    let stored = harness.registry.get_post(&post_id).await.unwrap().unwrap();
    assert_eq!(stored.author, wallet(1));
}

#[tokio::test]
async fn blank_content_is_refused() {
    let harness = TestRegistry::new();
    let err = harness
        .registry
        .create_post(wallet(1), PostId::from_label("empty"), "   ")
        .await
        .unwrap_err();
    assert_matches!(err, HpvError::InvalidContent { .. });
}

#[tokio::test]
async fn upvotes_count_once_per_voter() {
    let harness = TestRegistry::new();
    let post_id = PostId::from_label("welcome");
    harness.registry.create_post(wallet(1), post_id, CID).await.unwrap();

    assert_eq!(harness.registry.upvote(wallet(2), post_id).await.unwrap(), 1);
    assert_eq!(harness.registry.upvote(wallet(3), post_id).await.unwrap(), 2);

    let err = harness.registry.upvote(wallet(2), post_id).await.unwrap_err();
    assert_matches!(err, HpvError::AlreadyUpvoted { .. });

    assert!(harness.registry.has_upvoted(&post_id, &wallet(2)).await.unwrap());
    assert!(!harness.registry.has_upvoted(&post_id, &wallet(4)).await.unwrap());
    assert_eq!(
        harness.registry.get_post(&post_id).await.unwrap().map(|p| p.upvotes),
        Some(2)
    );

    let last = harness.sink.events().await.pop().unwrap();
    assert_eq!(
        last.event,
        RegistryEvent::PostUpvoted {
            post_id,
            voter: wallet(3),
            new_upvote_count: 2,
            timestamp: GENESIS_TIME,
        }
    );
}

#[tokio::test]
async fn upvoting_missing_post_fails() {
    let harness = TestRegistry::new();
    let err = harness
        .registry
        .upvote(wallet(2), PostId::from_label("missing"))
        .await
        .unwrap_err();
    assert_matches!(err, HpvError::PostNotFound { .. });
}
