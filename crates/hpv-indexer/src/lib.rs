//! HPV Indexer - queryable view of registry events
//!
//! Turns the registry's event stream into guardian, clinic, chip
//! verification, post, upvote, reward, and claim entities plus a global
//! totals record. The indexer subscribes as an `EventSink` for live updates
//! and replays the registry's durable log through `EventSource` to recover
//! anything it missed.

#![forbid(unsafe_code)]

/// Entity records and id helpers
pub mod entities;

/// Event handlers and queries
pub mod indexer;

pub use entities::{
    ChipVerificationEntity, ClaimEntity, ClinicEntity, GlobalStats, GuardianEntity, PostEntity,
    RewardEntity, UpvoteEntity, GLOBAL_STATS_ID,
};
pub use indexer::{EventIndexer, IndexedEntities, CATCH_UP_PAGE_SIZE};
