//! In-memory ledger and blocklist.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;

use crate::core::{Blocklist, Ledger, LedgerEntry, LedgerError};
use crate::util::serde::{ChangeKind, ItemId, TenantId};

/// Ledger and blocklist held in process memory, for development and tests.
///
/// Entries are kept per tenant in insertion order; reads walk them backwards
/// to produce newest-first results.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    entries: RwLock<HashMap<TenantId, Vec<LedgerEntry>>>,
    blocked: RwLock<HashMap<TenantId, HashSet<ItemId>>>,
}

impl InMemoryLedger {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries for a tenant in insertion order (oldest first).
    pub fn entries(&self, tenant: &str) -> Vec<LedgerEntry> {
        self.entries.read().get(tenant).cloned().unwrap_or_default()
    }

    fn newest_first<F>(&self, tenant: &str, limit: usize, keep: F) -> Vec<LedgerEntry>
    where
        F: Fn(&LedgerEntry) -> bool,
    {
        self.entries
            .read()
            .get(tenant)
            .map(|entries| {
                entries
                    .iter()
                    .rev()
                    .filter(|entry| keep(entry))
                    .take(limit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Ledger for InMemoryLedger {
    fn recent_adds(&self, tenant: &str, limit: usize) -> Result<Vec<LedgerEntry>, LedgerError> {
        Ok(self.newest_first(tenant, limit, |entry| entry.change == ChangeKind::Add))
    }

    fn history(&self, tenant: &str, limit: usize) -> Result<Vec<LedgerEntry>, LedgerError> {
        Ok(self.newest_first(tenant, limit, |_| true))
    }

    fn append(&self, entry: LedgerEntry) -> Result<(), LedgerError> {
        self.entries
            .write()
            .entry(entry.tenant.clone())
            .or_default()
            .push(entry);
        Ok(())
    }
}

impl Blocklist for InMemoryLedger {
    fn contains(&self, tenant: &str, item_id: &str) -> Result<bool, LedgerError> {
        Ok(self
            .blocked
            .read()
            .get(tenant)
            .is_some_and(|items| items.contains(item_id)))
    }

    fn block(&self, tenant: &str, item_id: &str) -> Result<(), LedgerError> {
        self.blocked
            .write()
            .entry(tenant.to_owned())
            .or_default()
            .insert(item_id.to_owned());
        Ok(())
    }
}
