//! Forum post and upvote ledger

use crate::ledger::LedgerTxn;
use hpv_core::effects::LedgerKey;
use hpv_core::{Address, HpvError, HpvResult, Post, PostId, RegistryEvent};

pub(crate) async fn post(txn: &LedgerTxn<'_>, post_id: &PostId) -> HpvResult<Option<Post>> {
    txn.read(&LedgerKey::post(post_id)).await
}

pub(crate) async fn has_upvoted(
    txn: &LedgerTxn<'_>,
    post_id: &PostId,
    voter: &Address,
) -> HpvResult<bool> {
    Ok(txn
        .read::<bool>(&LedgerKey::upvote(post_id, voter))
        .await?
        .unwrap_or(false))
}

pub(crate) async fn create_post(
    txn: &mut LedgerTxn<'_>,
    caller: Address,
    post_id: PostId,
    cid: &str,
    now: u64,
) -> HpvResult<Post> {
    let cid = cid.trim();
    if cid.is_empty() {
        return Err(HpvError::invalid_content("content id must not be empty"));
    }
    if post(txn, &post_id).await?.is_some() {
        return Err(HpvError::PostAlreadyExists {
            post_id: post_id.to_string(),
        });
    }

    let record = Post {
        post_id,
        author: caller,
        cid: cid.to_string(),
        created_at: now,
        upvotes: 0,
    };
    txn.write(LedgerKey::post(&post_id), &record)?;
    txn.emit(RegistryEvent::PostCreated {
        post_id,
        author: caller,
        cid: record.cid.clone(),
        timestamp: now,
    });
    Ok(record)
}

pub(crate) async fn upvote(
    txn: &mut LedgerTxn<'_>,
    caller: Address,
    post_id: PostId,
    now: u64,
) -> HpvResult<u64> {
    let mut record = post(txn, &post_id)
        .await?
        .ok_or_else(|| HpvError::PostNotFound {
            post_id: post_id.to_string(),
        })?;

    if has_upvoted(txn, &post_id, &caller).await? {
        return Err(HpvError::AlreadyUpvoted {
            post_id: post_id.to_string(),
            voter: caller.to_string(),
        });
    }

    record.upvotes = record
        .upvotes
        .checked_add(1)
        .ok_or_else(|| HpvError::overflow("upvote counter"))?;
    txn.write(LedgerKey::upvote(&post_id, &caller), &true)?;
    txn.write(LedgerKey::post(&post_id), &record)?;
    txn.emit(RegistryEvent::PostUpvoted {
        post_id,
        voter: caller,
        new_upvote_count: record.upvotes,
        timestamp: now,
    });
    Ok(record.upvotes)
}
