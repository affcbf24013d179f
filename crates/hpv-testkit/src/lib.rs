//! HPV Testing Infrastructure
//!
//! Shared fixtures for registry and indexer tests: deterministic clinic keys,
//! fault-injecting effect handlers, and a [`TestRegistry`] harness that wires
//! a registry to memory handlers while keeping a handle on each of them.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! hpv-testkit = { path = "../hpv-testkit" }
//! ```
//!
//! ```rust,ignore
//! let harness = TestRegistry::builder().build();
//! let chip = harness.verify_chip(0xaa).await;
//! harness.registry.become_guardian(wallet(1), chip, &valid_proof()).await?;
//! ```

#![forbid(unsafe_code)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

pub mod faults;
pub mod harness;
pub mod keys;

pub use faults::{FailingEventSink, FaultyLedgerStore, RejectAllProofs};
pub use harness::{TestRegistry, TestRegistryBuilder, DEFAULT_RESERVE, GENESIS_TIME};
pub use keys::{clinic_signer, owner, valid_proof, wallet};

/// Install a `tracing` subscriber honoring `RUST_LOG`. Safe to call from
/// every test.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
