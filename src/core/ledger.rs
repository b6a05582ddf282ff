//! Ledger and blocklist contracts.
//!
//! The ledger is an append-only, per-tenant history of committed pool
//! changes. Entries are written only after the matching external mutation
//! succeeded and are never edited afterwards. The blocklist is a per-tenant
//! deny-list consulted at decision time.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::LedgerError;
use crate::util::clock::now_ms;
use crate::util::serde::{ChangeKind, ItemId, TenantId};

/// One committed pool change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Entry identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant: TenantId,
    /// Item that was installed or evicted.
    pub item_id: ItemId,
    /// What happened to the item.
    pub change: ChangeKind,
    /// Item was on the tenant's blocklist when the entry was written.
    pub blocked: bool,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
}

/// Append-only history store.
pub trait Ledger: Send + Sync {
    /// Most recent `Add` entries for a tenant, newest first, at most `limit`.
    fn recent_adds(&self, tenant: &str, limit: usize) -> Result<Vec<LedgerEntry>, LedgerError>;

    /// Most recent entries of any kind for a tenant, newest first.
    fn history(&self, tenant: &str, limit: usize) -> Result<Vec<LedgerEntry>, LedgerError>;

    /// Append an entry.
    fn append(&self, entry: LedgerEntry) -> Result<(), LedgerError>;
}

/// Per-tenant deny-list of items.
pub trait Blocklist: Send + Sync {
    /// Whether the item is blocked for the tenant.
    fn contains(&self, tenant: &str, item_id: &str) -> Result<bool, LedgerError>;

    /// Block an item for the tenant. Blocking twice is a no-op.
    fn block(&self, tenant: &str, item_id: &str) -> Result<(), LedgerError>;
}

/// Build a ledger entry stamped with a fresh id and the current time.
pub fn build_entry(
    tenant: impl Into<TenantId>,
    item_id: impl Into<ItemId>,
    change: ChangeKind,
    blocked: bool,
) -> LedgerEntry {
    LedgerEntry {
        id: Uuid::new_v4(),
        tenant: tenant.into(),
        item_id: item_id.into(),
        change,
        blocked,
        created_at_ms: now_ms(),
    }
}
