//! Ledger storage handlers

mod memory;

pub use memory::MemoryLedgerStore;
