//! Ledger and blocklist backends.

pub mod memory;

pub use memory::InMemoryLedger;
